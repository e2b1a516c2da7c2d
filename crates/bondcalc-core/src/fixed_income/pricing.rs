//! Theoretical price of a fixed-coupon bullet bond and its first derivative
//! with respect to the periodic discount rate.
//!
//! ```text
//! price(r)      = Σ C/(1+r)^t + F/(1+r)^n
//! derivative(r) = Σ -t·C/(1+r)^(t+1) - n·F/(1+r)^(n+1)
//! ```

use rust_decimal::Decimal;

use crate::types::{Money, Periods, Rate};

/// Price and slope of the price/yield curve at a trial periodic rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceAndDerivative {
    pub price: Money,
    /// dPrice/dr. Negative for any bond with positive cash flows.
    pub derivative: Decimal,
}

/// Evaluate price and derivative at periodic rate `rate`.
///
/// Discount factors are accumulated by repeated multiplication, so one call
/// is O(`total_periods`). Once `(1+r)^t` grows past the range of `Decimal`
/// every later term is below its resolution, so the sums stop there and the
/// remaining coupons and the principal contribute zero.
///
/// Returns `None` only when `1 + rate` is not positive or the sums themselves
/// cannot be represented (a rate close to `-1` over many periods); the caller
/// treats that the same as a non-finite rate.
pub fn price_and_derivative(
    face_value: Money,
    coupon_payment: Money,
    rate: Rate,
    total_periods: Periods,
) -> Option<PriceAndDerivative> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut price = Decimal::ZERO;
    let mut derivative = Decimal::ZERO;
    // (1+r)^t
    let mut discount = Decimal::ONE;

    for t in 1..=total_periods {
        let Some(next) = discount.checked_mul(one_plus_r) else {
            return Some(PriceAndDerivative { price, derivative });
        };
        discount = next;
        let t_dec = Decimal::from(t);

        price = price.checked_add(coupon_payment.checked_div(discount)?)?;
        let slope = discounted_slope(t_dec.checked_mul(coupon_payment)?, discount, one_plus_r)?;
        derivative = derivative.checked_sub(slope)?;
    }

    // Principal shares the discount factor of the final coupon
    let n_dec = Decimal::from(total_periods);
    price = price.checked_add(face_value.checked_div(discount)?)?;
    let principal_slope = discounted_slope(n_dec.checked_mul(face_value)?, discount, one_plus_r)?;
    derivative = derivative.checked_sub(principal_slope)?;

    Some(PriceAndDerivative { price, derivative })
}

/// `weighted / (discount · (1+r))`, taken as zero when the denominator
/// overflows.
fn discounted_slope(weighted: Decimal, discount: Decimal, one_plus_r: Decimal) -> Option<Decimal> {
    match discount.checked_mul(one_plus_r) {
        Some(denominator) => weighted.checked_div(denominator),
        None => Some(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_par_bond_prices_at_face() {
        let pd = price_and_derivative(dec!(1000), dec!(50), dec!(0.05), 10).unwrap();
        assert!(
            close(pd.price, dec!(1000), dec!(0.0000001)),
            "Par bond should price at face, got {}",
            pd.price
        );
        assert!(pd.derivative < Decimal::ZERO);
    }

    #[test]
    fn test_single_period_closed_form() {
        // price = 1060 / 1.06, derivative = -1060 / 1.06^2
        let pd = price_and_derivative(dec!(1000), dec!(60), dec!(0.06), 1).unwrap();
        assert!(close(pd.price, dec!(1000), dec!(0.0000001)), "got {}", pd.price);
        let expected = dec!(-1060) / (dec!(1.06) * dec!(1.06));
        assert!(
            close(pd.derivative, expected, dec!(0.0000001)),
            "derivative {} vs {}",
            pd.derivative,
            expected
        );
    }

    #[test]
    fn test_zero_rate_is_undiscounted_sum() {
        let pd = price_and_derivative(dec!(1000), dec!(25), Decimal::ZERO, 20).unwrap();
        assert_eq!(pd.price, dec!(1500));
        // -(Σ t·25 for t=1..20) - 20·1000 = -5250 - 20000
        assert_eq!(pd.derivative, dec!(-25250));
    }

    #[test]
    fn test_zero_coupon_matches_direct_discounting() {
        let pd = price_and_derivative(dec!(1000), Decimal::ZERO, dec!(0.05), 2).unwrap();
        let expected = dec!(1000) / (dec!(1.05) * dec!(1.05));
        assert!(close(pd.price, expected, dec!(0.0000001)));
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let r = dec!(0.04);
        let h = dec!(0.0000001);
        let up = price_and_derivative(dec!(1000), dec!(30), r + h, 12).unwrap();
        let down = price_and_derivative(dec!(1000), dec!(30), r - h, 12).unwrap();
        let at = price_and_derivative(dec!(1000), dec!(30), r, 12).unwrap();
        let numeric = (up.price - down.price) / (dec!(2) * h);
        assert!(
            close(numeric, at.derivative, dec!(0.01)),
            "numeric {} vs analytic {}",
            numeric,
            at.derivative
        );
    }

    #[test]
    fn test_rate_at_or_below_minus_one_is_rejected() {
        assert!(price_and_derivative(dec!(1000), dec!(50), dec!(-1), 10).is_none());
        assert!(price_and_derivative(dec!(1000), dec!(50), dec!(-1.5), 10).is_none());
    }

    #[test]
    fn test_unrepresentable_sum_reported_as_none() {
        // (1 + r) tiny: 50 / 0.0000001^60 cannot be represented
        assert!(price_and_derivative(dec!(1000), dec!(50), dec!(-0.9999999), 60).is_none());
    }

    #[test]
    fn test_vanishing_terms_saturate_to_perpetuity() {
        // 1.4^200 overflows Decimal; the tail is negligible and the price is
        // the perpetuity value C / r = 200 / 0.4
        let pd = price_and_derivative(dec!(1000), dec!(200), dec!(0.4), 200).unwrap();
        assert!(
            close(pd.price, dec!(500), dec!(0.0000001)),
            "Saturated price should be 500, got {}",
            pd.price
        );
        // d/dr (C / r) = -C / r^2 = -1250
        assert!(
            close(pd.derivative, dec!(-1250), dec!(0.0000001)),
            "Saturated derivative should be -1250, got {}",
            pd.derivative
        );
    }

    #[test]
    fn test_saturation_matches_unsaturated_neighbour() {
        // 2^100 overflows, 2^90 does not; the extra periods add nothing visible
        let short = price_and_derivative(dec!(1000), dec!(50), dec!(1), 90).unwrap();
        let long = price_and_derivative(dec!(1000), dec!(50), dec!(1), 100).unwrap();
        assert!(close(short.price, long.price, dec!(0.0000001)));
        assert!(close(short.price, dec!(50), dec!(0.0000001)), "got {}", short.price);
    }
}
