use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{employee::Employee, payslip::Payslip};

use super::ytd::YtdTotals;

/// Everything a renderer needs to print one payslip.
#[derive(Debug, Serialize, ToSchema)]
pub struct PayStatement {
    pub company_name: String,
    #[schema(example = "Jane Doe")]
    pub employee_name: String,
    pub employee: Employee,
    pub payslip: Payslip,
    #[schema(value_type = String)]
    pub gross: Decimal,
    pub ytd: YtdTotals,
    /// Suggested download name of the printed document
    #[schema(example = "Payslip_Doe_2026-01-31.pdf")]
    pub filename: String,
}

impl PayStatement {
    pub fn new(company_name: &str, employee: Employee, payslip: Payslip, ytd: YtdTotals) -> Self {
        let filename = download_filename(&employee.last_name, payslip.period_end);

        Self {
            company_name: company_name.to_string(),
            employee_name: employee.full_name(),
            gross: payslip.gross(),
            employee,
            payslip,
            ytd,
            filename,
        }
    }
}

/// `Payslip_<last name>_<period end>.pdf`, with path and quote characters replaced.
pub fn download_filename(last_name: &str, period_end: NaiveDate) -> String {
    let safe_name: String = last_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' => '_',
            c => c,
        })
        .collect();

    format!("Payslip_{}_{}.pdf", safe_name, period_end.format("%Y-%m-%d"))
}
