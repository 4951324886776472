use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use utoipa::ToSchema;

use crate::payroll::calculator::PayInputs;

/// One stored pay statement. Money is exact decimal, serialized as text.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Payslip {
    pub id: i64,
    pub employee_id: i64,

    #[schema(value_type = String, format = "date", example = "2026-01-01")]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = "date", example = "2026-01-31")]
    pub period_end: NaiveDate,

    #[schema(value_type = String, example = "100000.00")]
    pub basic_pay: Decimal,
    #[schema(value_type = String, example = "0")]
    pub overtime_pay: Decimal,
    #[schema(value_type = String, example = "0")]
    pub allowances: Decimal,
    #[schema(value_type = String, example = "0")]
    pub hours_worked: Decimal,
    #[schema(value_type = String, example = "0")]
    pub rate_per_hour: Decimal,

    #[schema(value_type = String, example = "0")]
    pub tax: Decimal,
    #[schema(value_type = String, example = "5600.00")]
    pub social_insurance: Decimal,
    #[schema(value_type = String, example = "0")]
    pub other_deductions: Decimal,
    #[schema(value_type = String, example = "94400.00")]
    pub net_pay: Decimal,

    pub created_by: Option<i64>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl Payslip {
    /// The raw figures the calculator consumes.
    pub fn inputs(&self) -> PayInputs {
        PayInputs {
            basic: self.basic_pay,
            overtime: self.overtime_pay,
            allowances: self.allowances,
            hours_worked: self.hours_worked,
            rate_per_hour: self.rate_per_hour,
        }
    }

    /// Gross pay derived from the stored inputs; never persisted.
    pub fn gross(&self) -> Decimal {
        self.inputs().gross()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Payslip {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            period_start: row.try_get("period_start")?,
            period_end: row.try_get("period_end")?,
            basic_pay: decimal(row, "basic_pay")?,
            overtime_pay: decimal(row, "overtime_pay")?,
            allowances: decimal(row, "allowances")?,
            hours_worked: decimal(row, "hours_worked")?,
            rate_per_hour: decimal(row, "rate_per_hour")?,
            tax: decimal(row, "tax")?,
            social_insurance: decimal(row, "social_insurance")?,
            other_deductions: decimal(row, "other_deductions")?,
            net_pay: decimal(row, "net_pay")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn decimal(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;

    Decimal::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
