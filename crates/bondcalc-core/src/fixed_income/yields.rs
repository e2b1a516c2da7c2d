//! Current yield and premium/discount classification.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::ValuationError;
use crate::rounding::round_yield;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where the market price sits relative to face value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PremiumOrDiscount {
    Premium,
    Discount,
    Par,
}

impl fmt::Display for PremiumOrDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PremiumOrDiscount::Premium => "Premium",
            PremiumOrDiscount::Discount => "Discount",
            PremiumOrDiscount::Par => "Par",
        };
        f.write_str(label)
    }
}

/// Input for a standalone current-yield calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentYieldInput {
    pub face_value: Money,
    /// Annual coupon rate in percent (5 = 5%).
    pub coupon_rate: Decimal,
    pub market_price: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentYieldOutput {
    pub current_yield: Rate,
    pub annual_coupon: Money,
    pub premium_or_discount: PremiumOrDiscount,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Annual coupon income over market price:
/// `(coupon_rate / 100 × face_value) / market_price`.
///
/// `coupon_rate` is in percent. `market_price` must be positive.
pub fn current_yield(face_value: Money, coupon_rate: Decimal, market_price: Money) -> Rate {
    annual_coupon(face_value, coupon_rate) / market_price
}

/// Classify a bond against its face value.
pub fn classify(market_price: Money, face_value: Money) -> PremiumOrDiscount {
    if market_price > face_value {
        PremiumOrDiscount::Premium
    } else if market_price < face_value {
        PremiumOrDiscount::Discount
    } else {
        PremiumOrDiscount::Par
    }
}

/// Standalone current yield, wrapped in the computation envelope.
pub fn calculate_current_yield(
    input: &CurrentYieldInput,
) -> ValuationResult<ComputationOutput<CurrentYieldOutput>> {
    let start = Instant::now();

    if input.face_value <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "faceValue".into(),
            reason: "Face value must be positive".into(),
        });
    }
    if input.market_price <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "marketPrice".into(),
            reason: "Market price must be positive".into(),
        });
    }
    if input.coupon_rate < Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "couponRate".into(),
            reason: "Coupon rate cannot be negative".into(),
        });
    }

    let output = CurrentYieldOutput {
        current_yield: round_yield(current_yield(
            input.face_value,
            input.coupon_rate,
            input.market_price,
        )),
        annual_coupon: annual_coupon(input.face_value, input.coupon_rate),
        premium_or_discount: classify(input.market_price, input.face_value),
    };

    let assumptions = serde_json::json!({
        "coupon_rate_units": "percent",
        "rounding": "6dp, half away from zero"
    });

    Ok(with_metadata(
        "Current Yield (annual coupon / market price)",
        &assumptions,
        Vec::new(),
        start,
        output,
    ))
}

fn annual_coupon(face_value: Money, coupon_rate: Decimal) -> Money {
    coupon_rate / dec!(100) * face_value
}
