pub mod pricing;
pub mod schedule;
pub mod valuation;
pub mod yields;
pub mod ytm;
