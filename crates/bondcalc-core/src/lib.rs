pub mod error;
pub mod rounding;
pub mod types;

#[cfg(feature = "fixed_income")]
pub mod fixed_income;

pub use error::ValuationError;
pub use types::*;

/// Standard result type for all bond valuation operations
pub type ValuationResult<T> = Result<T, ValuationError>;
