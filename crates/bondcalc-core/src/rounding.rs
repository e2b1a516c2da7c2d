//! Final-output rounding applied before any figure leaves the engine.
//!
//! Yields carry 6 decimal places, currency amounts carry 2. Both use
//! round-half-away-from-zero rather than banker's rounding.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Money, Rate};

/// Decimal places kept on yield figures (current yield, YTM).
pub const YIELD_DECIMAL_PLACES: u32 = 6;

/// Decimal places kept on currency figures.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Round a yield to 6 decimal places, half away from zero.
pub fn round_yield(value: Rate) -> Rate {
    round_half_away(value, YIELD_DECIMAL_PLACES)
}

/// Round a currency amount to 2 decimal places, half away from zero.
pub fn round_money(value: Money) -> Money {
    round_half_away(value, MONEY_DECIMAL_PLACES)
}

fn round_half_away(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_midpoint_rounds_away_from_zero() {
        assert_eq!(round_money(dec!(2.345)), dec!(2.35));
        assert_eq!(round_money(dec!(2.355)), dec!(2.36));
        assert_eq!(round_money(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn test_money_not_bankers_rounding() {
        // Banker's rounding would give 0.12
        assert_eq!(round_money(dec!(0.125)), dec!(0.13));
    }

    #[test]
    fn test_yield_six_places() {
        assert_eq!(round_yield(dec!(0.0816326530)), dec!(0.081633));
        assert_eq!(round_yield(dec!(0.0000005)), dec!(0.000001));
        assert_eq!(round_yield(dec!(0.05)), dec!(0.05));
    }

    #[test]
    fn test_already_rounded_values_unchanged() {
        assert_eq!(round_money(dec!(1060)), dec!(1060));
        assert_eq!(round_yield(Decimal::ZERO), Decimal::ZERO);
    }
}
