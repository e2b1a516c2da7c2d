use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Coupon rates on inputs are the
/// one exception and are documented as percent where they appear.
pub type Rate = Decimal;

/// Whole number of coupon periods.
pub type Periods = u32;

/// Envelope around every engine result: the payload plus how it was
/// produced and anything the caller should know about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    /// Derived terms and solver settings the result depends on.
    pub assumptions: serde_json::Value,
    /// Non-fatal conditions such as a floored period count or an
    /// unconverged estimate.
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap `result` in the envelope, timing the computation from `started`.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    started: Instant,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: started.elapsed().as_micros() as u64,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
