pub mod calculator;
pub mod statement;
pub mod ytd;
