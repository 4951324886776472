use std::ops::{Add, AddAssign};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::payslip::Payslip;

/// Field-wise sums over the payslips of one employee. Sums saturate at the
/// edge of the decimal range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct YtdTotals {
    #[schema(value_type = String)]
    pub basic_pay: Decimal,
    #[schema(value_type = String)]
    pub overtime_pay: Decimal,
    #[schema(value_type = String)]
    pub allowances: Decimal,
    #[schema(value_type = String)]
    pub tax: Decimal,
    #[schema(value_type = String)]
    pub social_insurance: Decimal,
    #[schema(value_type = String)]
    pub other_deductions: Decimal,
    #[schema(value_type = String)]
    pub net_pay: Decimal,
}

impl YtdTotals {
    pub fn from_payslips<'a>(payslips: impl IntoIterator<Item = &'a Payslip>) -> Self {
        payslips.into_iter().fold(Self::default(), |mut totals, slip| {
            totals += slip;
            totals
        })
    }
}

impl AddAssign<&Payslip> for YtdTotals {
    fn add_assign(&mut self, slip: &Payslip) {
        self.basic_pay = self.basic_pay.saturating_add(slip.basic_pay);
        self.overtime_pay = self.overtime_pay.saturating_add(slip.overtime_pay);
        self.allowances = self.allowances.saturating_add(slip.allowances);
        self.tax = self.tax.saturating_add(slip.tax);
        self.social_insurance = self.social_insurance.saturating_add(slip.social_insurance);
        self.other_deductions = self.other_deductions.saturating_add(slip.other_deductions);
        self.net_pay = self.net_pay.saturating_add(slip.net_pay);
    }
}

impl Add for YtdTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            basic_pay: self.basic_pay.saturating_add(rhs.basic_pay),
            overtime_pay: self.overtime_pay.saturating_add(rhs.overtime_pay),
            allowances: self.allowances.saturating_add(rhs.allowances),
            tax: self.tax.saturating_add(rhs.tax),
            social_insurance: self.social_insurance.saturating_add(rhs.social_insurance),
            other_deductions: self.other_deductions.saturating_add(rhs.other_deductions),
            net_pay: self.net_pay.saturating_add(rhs.net_pay),
        }
    }
}

/// Inclusive `[1 January, period_end]` window of `period_end`'s year.
pub fn window(period_end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start_of_year = period_end.with_ordinal(1).unwrap_or(period_end);
    (start_of_year, period_end)
}
