pub mod dashboard;
pub mod employee;
pub mod payslip;
pub mod user;
