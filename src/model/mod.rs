pub mod employee;
pub mod payslip;
pub mod role;
pub mod user;
