use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "department": "Operations",
        "position": "Guard",
        "email": "john.doe@company.com",
        "nis_number": "A123456",
        "tax_reference": "TIN-778899",
        "bank_name": "Republic Bank",
        "bank_account": "0011223344",
        "date_of_birth": "1980-05-17"
    })
)]
pub struct Employee {
    pub id: i64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub position: String,
    pub email: String,

    /// National insurance number
    pub nis_number: Option<String>,
    pub tax_reference: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account: Option<String>,

    #[schema(value_type = Option<String>, format = "date")]
    pub date_of_birth: Option<NaiveDate>,
}

impl Employee {
    /// Age in whole years as of today, `None` without a date of birth.
    pub fn age(&self) -> Option<i32> {
        self.age_on(Local::now().date_naive())
    }

    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.date_of_birth.map(|dob| age_between(dob, today))
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Completed years from `dob` to `today`; negative for a birth date in the future.
pub fn age_between(dob: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday = (today.month(), today.day()) < (dob.month(), dob.day());
    today.year() - dob.year() - i32::from(before_birthday)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(dob: Option<NaiveDate>) -> Employee {
        Employee {
            id: 1,
            employee_code: "EMP-001".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            department: "Ops".to_string(),
            position: "Guard".to_string(),
            email: "jane@example.com".to_string(),
            nis_number: None,
            tax_reference: None,
            bank_name: None,
            bank_account: None,
            date_of_birth: dob,
        }
    }

    #[test]
    fn test_age_counts_completed_years() {
        let dob = date(1966, 6, 15);

        assert_eq!(age_between(dob, date(2026, 6, 14)), 59);
        assert_eq!(age_between(dob, date(2026, 6, 15)), 60);
        assert_eq!(age_between(dob, date(2026, 12, 31)), 60);
    }

    #[test]
    fn test_age_absent_without_date_of_birth() {
        assert_eq!(employee(None).age_on(date(2026, 1, 1)), None);
        assert_eq!(employee(Some(date(2000, 1, 1))).age_on(date(2026, 1, 1)), Some(26));
    }

    #[test]
    fn test_leap_day_birthday() {
        let dob = date(2000, 2, 29);

        assert_eq!(age_between(dob, date(2025, 2, 28)), 24);
        assert_eq!(age_between(dob, date(2025, 3, 1)), 25);
    }
}
