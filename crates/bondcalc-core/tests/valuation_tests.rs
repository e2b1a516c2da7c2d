use bondcalc_core::fixed_income::pricing::price_and_derivative;
use bondcalc_core::fixed_income::schedule::{
    generate_cash_flow_schedule, CashFlowPeriod, ScheduleInput,
};
use bondcalc_core::fixed_income::valuation::{
    calculate_bond, derive_terms, BondInput, CouponFrequency,
};
use bondcalc_core::fixed_income::yields::PremiumOrDiscount;
use bondcalc_core::fixed_income::ytm::{solve_ytm, SolverConfig};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn settlement() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

fn bond(
    face_value: Decimal,
    coupon_rate: Decimal,
    market_price: Decimal,
    years: Decimal,
    coupon_frequency: CouponFrequency,
) -> BondInput {
    BondInput {
        face_value,
        coupon_rate,
        market_price,
        years_to_maturity: years,
        coupon_frequency,
    }
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn test_scenario_a_par_annual() {
    let input = bond(dec!(1000), dec!(5), dec!(1000), dec!(10), CouponFrequency::Annual);
    let out = calculate_bond(&input, settlement()).unwrap().result;

    assert_eq!(out.current_yield, dec!(0.05));
    assert!((out.ytm - dec!(0.05)).abs() < dec!(0.000001), "ytm {}", out.ytm);
    assert_eq!(out.total_interest, dec!(500));
    assert_eq!(out.premium_or_discount, PremiumOrDiscount::Par);
    assert_eq!(out.cash_flow_schedule.len(), 10);
}

#[test]
fn test_scenario_b_zero_coupon_discount() {
    let input = bond(dec!(1000), Decimal::ZERO, dec!(614), dec!(10), CouponFrequency::Annual);
    let out = calculate_bond(&input, settlement()).unwrap().result;

    assert_eq!(out.current_yield, Decimal::ZERO);
    // (1000 / 614)^(1/10) - 1 ≈ 0.04999
    assert!(
        (out.ytm - dec!(0.0499)).abs() < dec!(0.0005),
        "zero-coupon YTM should be ~4.99%, got {}",
        out.ytm
    );
    assert_eq!(out.total_interest, Decimal::ZERO);
    assert_eq!(out.premium_or_discount, PremiumOrDiscount::Discount);
    assert!(out
        .cash_flow_schedule
        .iter()
        .all(|p| p.coupon_payment.is_zero()));
}

#[test]
fn test_scenario_c_one_year_discount() {
    let input = bond(dec!(1000), dec!(6), dec!(980), dec!(1), CouponFrequency::Annual);
    let out = calculate_bond(&input, settlement()).unwrap().result;

    assert_eq!(out.ytm, dec!(0.081633));
    assert_eq!(out.cash_flow_schedule.len(), 1);
    assert_eq!(
        out.cash_flow_schedule[0],
        CashFlowPeriod {
            period: 1,
            payment_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            coupon_payment: dec!(60),
            principal_payment: dec!(1000),
            total_payment: dec!(1060),
            cumulative_interest: dec!(60),
            remaining_principal: Decimal::ZERO,
        }
    );
}

#[test]
fn test_scenario_d_semi_annual_discount() {
    let input = bond(dec!(1000), dec!(5), dec!(950), dec!(10), CouponFrequency::SemiAnnual);
    let out = calculate_bond(&input, settlement()).unwrap().result;

    assert_eq!(out.premium_or_discount, PremiumOrDiscount::Discount);
    assert!(out.ytm > dec!(0.05), "Discount bond YTM should exceed coupon, got {}", out.ytm);
    assert!(out.ytm < dec!(0.06), "got {}", out.ytm);
    assert_eq!(out.cash_flow_schedule.len(), 20);
    assert_eq!(out.total_interest, dec!(500));
}

#[test]
fn test_premium_bond_ytm_below_coupon() {
    let input = bond(dec!(1000), dec!(8), dec!(1100), dec!(15), CouponFrequency::SemiAnnual);
    let out = calculate_bond(&input, settlement()).unwrap().result;
    assert_eq!(out.premium_or_discount, PremiumOrDiscount::Premium);
    assert!(out.ytm < dec!(0.08), "got {}", out.ytm);
    assert!(out.current_yield < dec!(0.08));
}

#[test]
fn test_zero_coupon_at_par_is_exactly_zero() {
    let input = bond(dec!(1000), Decimal::ZERO, dec!(1000), dec!(7), CouponFrequency::SemiAnnual);
    let out = calculate_bond(&input, settlement()).unwrap();
    assert_eq!(out.result.ytm, Decimal::ZERO);
    assert_eq!(out.result.premium_or_discount, PremiumOrDiscount::Par);
    assert_eq!(out.assumptions["iterations"], 0);
}

#[test]
fn test_high_yield_long_bond_values_at_perpetuity_rate() {
    // 200 per half-year on a 500 price: 40% per period, 80% annual. The
    // discount factor leaves Decimal range long before period 200.
    let input = bond(dec!(1000), dec!(40), dec!(500), dec!(100), CouponFrequency::SemiAnnual);
    let out = calculate_bond(&input, settlement()).unwrap();
    assert_eq!(out.result.ytm, dec!(0.8));
    assert_eq!(out.assumptions["converged"], true);
    assert!(out.warnings.is_empty(), "warnings: {:?}", out.warnings);
    assert_eq!(out.result.premium_or_discount, PremiumOrDiscount::Discount);
    assert_eq!(out.result.cash_flow_schedule.len(), 200);
}

// ===========================================================================
// Schedule invariants
// ===========================================================================

#[test]
fn test_schedule_invariants_hold_on_full_valuation() {
    let input = bond(dec!(5000), dec!(4.375), dec!(4890.5), dec!(12), CouponFrequency::SemiAnnual);
    let out = calculate_bond(&input, settlement()).unwrap().result;
    let schedule = &out.cash_flow_schedule;
    let n = schedule.len();

    assert_eq!(n, 24);
    for (i, p) in schedule.iter().enumerate() {
        let is_final = i + 1 == n;
        assert_eq!(p.period as usize, i + 1);
        assert_eq!(p.principal_payment > Decimal::ZERO, is_final);
        assert_eq!(p.remaining_principal.is_zero(), is_final);
        if is_final {
            assert_eq!(p.principal_payment, dec!(5000));
        } else {
            assert_eq!(p.remaining_principal, dec!(5000));
        }
        assert_eq!(p.total_payment, p.coupon_payment + p.principal_payment);
    }
    for w in schedule.windows(2) {
        assert!(w[1].cumulative_interest >= w[0].cumulative_interest);
        assert!(w[1].payment_date > w[0].payment_date);
    }
    assert_eq!(schedule[n - 1].cumulative_interest, out.total_interest);
}

#[test]
fn test_standalone_schedule_matches_valuation_schedule() {
    let input = bond(dec!(1000), dec!(5), dec!(950), dec!(10), CouponFrequency::SemiAnnual);
    let terms = derive_terms(&input).unwrap();
    let valued = calculate_bond(&input, settlement()).unwrap().result;

    let standalone = generate_cash_flow_schedule(&ScheduleInput {
        face_value: input.face_value,
        coupon_payment: terms.coupon_payment,
        total_periods: terms.total_periods,
        periods_per_year: terms.periods_per_year,
        anchor_date: settlement(),
    })
    .unwrap();

    assert_eq!(standalone.result, valued.cash_flow_schedule);
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_par_bonds_yield_their_coupon() {
    for (rate, freq) in [
        (dec!(2.5), CouponFrequency::Annual),
        (dec!(7), CouponFrequency::SemiAnnual),
        (dec!(12.25), CouponFrequency::Annual),
    ] {
        let input = bond(dec!(1000), rate, dec!(1000), dec!(20), freq);
        let out = calculate_bond(&input, settlement()).unwrap().result;
        assert_eq!(out.premium_or_discount, PremiumOrDiscount::Par);
        assert!(
            (out.ytm - rate / dec!(100)).abs() <= dec!(0.000001),
            "par bond at {}% yielded {}",
            rate,
            out.ytm
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_solution_reprices_market(
        face in 100u32..10_000,
        coupon_bp in 0u32..=4_000,
        // Below three times face the closed-form start stays above -1
        price_pct in 5u32..300,
        years in 1u32..=100,
        semi in any::<bool>(),
    ) {
        let face_value = Decimal::from(face);
        let m: u32 = if semi { 2 } else { 1 };
        let coupon = Decimal::from(coupon_bp) / dec!(10000) / Decimal::from(m) * face_value;
        let price = face_value * Decimal::from(price_pct) / dec!(100);
        let n = years * m;

        let config = SolverConfig::default();
        let sol = solve_ytm(face_value, coupon, price, n, m, &config).unwrap();
        prop_assert!(sol.converged, "did not converge: {:?}", sol);

        let pd = price_and_derivative(face_value, coupon, sol.periodic_rate, n).unwrap();
        prop_assert!((pd.price - price).abs() < config.tolerance);
    }

    #[test]
    fn prop_cheaper_price_means_higher_yield(
        coupon_bp in 0u32..=4_000,
        price_pct in 5u32..300,
        years in 1u32..=100,
    ) {
        let face_value = dec!(1000);
        let coupon = Decimal::from(coupon_bp) / dec!(10000) * face_value;
        let high = face_value * Decimal::from(price_pct) / dec!(100);
        let low = high - dec!(25);
        let config = SolverConfig::default();

        let at_high = solve_ytm(face_value, coupon, high, years, 1, &config).unwrap();
        let at_low = solve_ytm(face_value, coupon, low, years, 1, &config).unwrap();
        prop_assert!(
            at_low.annual_rate > at_high.annual_rate,
            "price {} -> {}, price {} -> {}",
            high, at_high.annual_rate, low, at_low.annual_rate
        );
    }
}
