use chrono::NaiveDate;

use crate::error::{AppError, AppResult};

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`). Malformed text is a
/// validation failure naming the field.
pub fn parse_iso_date(field: &str, raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

pub fn require_iso_date(field: &str, raw: Option<&str>) -> AppResult<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_iso_date(field, raw),
        None => Err(AppError::validation(format!("{field} is required"))),
    }
}

/// Empty text counts as "not supplied".
pub fn optional_iso_date(field: &str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_iso_date(field, raw).map(Some),
        None => Ok(None),
    }
}

pub fn ensure_period(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start > end {
        return Err(AppError::validation("period_start must not be after period_end"));
    }
    Ok(())
}
