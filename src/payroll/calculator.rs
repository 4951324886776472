//! Statutory payroll arithmetic.
//!
//! Rates and thresholds are fixed by statute and live here as constants.
//! All arithmetic saturates at the edge of the decimal range, so computing a
//! payslip never fails for any input that parsed.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;

/// Employees at or above this age are exempt from social insurance.
pub const SOCIAL_INSURANCE_AGE_LIMIT: i32 = 60;
/// 5.6% of gross.
pub const SOCIAL_INSURANCE_RATE: Decimal = dec!(0.056);
/// Monthly income above this amount is taxed.
pub const TAX_THRESHOLD: Decimal = dec!(130000);
pub const TAX_RATE: Decimal = dec!(0.28);

/// Raw figures entered for a pay period. Missing values are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PayInputs {
    pub basic: Decimal,
    pub overtime: Decimal,
    pub allowances: Decimal,
    pub hours_worked: Decimal,
    pub rate_per_hour: Decimal,
}

impl PayInputs {
    pub fn hourly_total(&self) -> Decimal {
        self.hours_worked.saturating_mul(self.rate_per_hour)
    }

    pub fn gross(&self) -> Decimal {
        self.basic
            .saturating_add(self.overtime)
            .saturating_add(self.allowances)
            .saturating_add(self.hourly_total())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PayBreakdown {
    #[schema(value_type = String)]
    pub gross: Decimal,
    #[schema(value_type = String)]
    pub social_insurance: Decimal,
    #[schema(value_type = String)]
    pub tax: Decimal,
    #[schema(value_type = String)]
    pub net: Decimal,
}

/// Compute gross, deductions and net pay.
///
/// An unknown age is treated like an exempt one: no social insurance is
/// withheld. Net pay is not floored and may go negative.
pub fn compute(employee_age: Option<i32>, inputs: &PayInputs) -> PayBreakdown {
    let gross = inputs.gross();
    let social_insurance = social_insurance(employee_age, gross);
    let tax = income_tax(gross);
    let net = gross.saturating_sub(social_insurance.saturating_add(tax));

    PayBreakdown {
        gross,
        social_insurance,
        tax,
        net,
    }
}

pub fn social_insurance(employee_age: Option<i32>, gross: Decimal) -> Decimal {
    match employee_age {
        Some(age) if age < SOCIAL_INSURANCE_AGE_LIMIT => gross
            .saturating_mul(SOCIAL_INSURANCE_RATE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        _ => Decimal::ZERO,
    }
}

pub fn income_tax(gross: Decimal) -> Decimal {
    if gross > TAX_THRESHOLD {
        (gross - TAX_THRESHOLD).saturating_mul(TAX_RATE)
    } else {
        Decimal::ZERO
    }
}
