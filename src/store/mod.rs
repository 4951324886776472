//! sqlx queries, one module per table. Every function returns [`AppResult`]
//! so constraint violations surface as typed failures.
//!
//! [`AppResult`]: crate::error::AppResult

pub mod employee;
pub mod payslip;
pub mod token;
pub mod user;
