//! Full bond valuation: current yield, YTM, total interest, premium/discount
//! classification and the cash-flow schedule in one call.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::warn;

use super::schedule::{generate_schedule, CashFlowPeriod};
use super::yields::{classify, current_yield, PremiumOrDiscount};
use super::ytm::{solve_ytm, SolverConfig};
use crate::error::ValuationError;
use crate::rounding::{round_money, round_yield};
use crate::types::{with_metadata, ComputationOutput, Money, Periods, Rate};
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Coupon payment frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouponFrequency {
    #[serde(rename = "annual")]
    Annual,
    #[serde(rename = "semi-annual")]
    SemiAnnual,
}

impl CouponFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CouponFrequency::Annual => 1,
            CouponFrequency::SemiAnnual => 2,
        }
    }
}

impl fmt::Display for CouponFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponFrequency::Annual => f.write_str("annual"),
            CouponFrequency::SemiAnnual => f.write_str("semi-annual"),
        }
    }
}

/// Bond terms as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondInput {
    /// Principal repaid at maturity.
    pub face_value: Money,
    /// Annual coupon rate in percent (5 = 5%).
    pub coupon_rate: Decimal,
    /// Price the yield is solved against.
    pub market_price: Money,
    pub years_to_maturity: Decimal,
    pub coupon_frequency: CouponFrequency,
}

/// Valuation result. Yields are rounded to 6dp, currency to 2dp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondResult {
    pub current_yield: Rate,
    /// Annualised yield to maturity.
    pub ytm: Rate,
    pub total_interest: Money,
    pub premium_or_discount: PremiumOrDiscount,
    pub cash_flow_schedule: Vec<CashFlowPeriod>,
}

/// Quantities derived from a [`BondInput`] before any solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondTerms {
    pub periods_per_year: u32,
    /// `floor(years_to_maturity × periods_per_year)`.
    pub total_periods: Periods,
    /// Coupon cash per period, unrounded.
    pub coupon_payment: Money,
    /// True when flooring discarded part of a period.
    pub fractional_period_dropped: bool,
}

/// Engine options. The default reproduces the best-effort solver contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    pub solver: SolverConfig,
    /// Fail with `ConvergenceFailure` instead of returning an unconverged
    /// estimate with a warning.
    pub strict_convergence: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Value a bond with the default engine configuration.
///
/// `settlement_date` anchors the payment dates of the schedule.
pub fn calculate_bond(
    input: &BondInput,
    settlement_date: NaiveDate,
) -> ValuationResult<ComputationOutput<BondResult>> {
    calculate_bond_with_config(input, settlement_date, &ValuationConfig::default())
}

/// Value a bond with explicit solver and convergence settings.
pub fn calculate_bond_with_config(
    input: &BondInput,
    settlement_date: NaiveDate,
    config: &ValuationConfig,
) -> ValuationResult<ComputationOutput<BondResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Validation --
    validate_bond_input(input)?;

    let terms = derive_terms(input)?;
    if terms.fractional_period_dropped {
        let msg = format!(
            "{} years at {} periods per year is not a whole number of periods; using {}",
            input.years_to_maturity, terms.periods_per_year, terms.total_periods
        );
        warn!("{msg}");
        warnings.push(msg);
    }

    // -- Yields --
    let current = current_yield(input.face_value, input.coupon_rate, input.market_price);

    let solution = solve_ytm(
        input.face_value,
        terms.coupon_payment,
        input.market_price,
        terms.total_periods,
        terms.periods_per_year,
        &config.solver,
    )?;

    if !solution.converged {
        if config.strict_convergence {
            return Err(ValuationError::ConvergenceFailure {
                function: "YTM Newton-Raphson".into(),
                iterations: solution.iterations,
                last_delta: solution.residual,
            });
        }
        warnings.push(format!(
            "YTM did not converge within {} iterations (price residual {}); returning best estimate",
            solution.iterations, solution.residual
        ));
    }

    // -- Schedule and classification --
    let cash_flow_schedule = generate_schedule(
        input.face_value,
        terms.coupon_payment,
        terms.total_periods,
        terms.periods_per_year,
        settlement_date,
    )?;
    let premium_or_discount = classify(input.market_price, input.face_value);
    let total_interest = terms.coupon_payment * Decimal::from(terms.total_periods);

    let output = BondResult {
        current_yield: round_yield(current),
        ytm: round_yield(solution.annual_rate),
        total_interest: round_money(total_interest),
        premium_or_discount,
        cash_flow_schedule,
    };

    let assumptions = serde_json::json!({
        "settlement_date": settlement_date,
        "coupon_frequency": input.coupon_frequency.to_string(),
        "periods_per_year": terms.periods_per_year,
        "total_periods": terms.total_periods,
        "coupon_payment": terms.coupon_payment,
        "ytm_method": "Newton-Raphson on periodic rate",
        "max_iterations": config.solver.max_iterations,
        "convergence_tolerance": config.solver.tolerance,
        "iterations": solution.iterations,
        "converged": solution.converged,
        "rounding": "yields 6dp, currency 2dp, half away from zero"
    });

    Ok(with_metadata(
        "Fixed-Coupon Bullet Bond Valuation",
        &assumptions,
        warnings,
        start,
        output,
    ))
}

/// Derive period count and per-period coupon from the caller's terms.
///
/// A fractional period count is floored; zero whole periods is rejected.
pub fn derive_terms(input: &BondInput) -> ValuationResult<BondTerms> {
    let periods_per_year = input.coupon_frequency.periods_per_year();
    let m = Decimal::from(periods_per_year);

    let exact_periods = input.years_to_maturity * m;
    let whole_periods = exact_periods.floor();
    let total_periods = whole_periods
        .to_u32()
        .ok_or_else(|| ValuationError::InvalidInput {
            field: "yearsToMaturity".into(),
            reason: "Number of coupon periods is out of range".into(),
        })?;

    if total_periods == 0 {
        return Err(ValuationError::InvalidInput {
            field: "yearsToMaturity".into(),
            reason: "Maturity is shorter than one coupon period".into(),
        });
    }

    let coupon_payment = input.coupon_rate / dec!(100) / m * input.face_value;

    Ok(BondTerms {
        periods_per_year,
        total_periods,
        coupon_payment,
        fractional_period_dropped: whole_periods != exact_periods,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_bond_input(input: &BondInput) -> ValuationResult<()> {
    if input.face_value <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "faceValue".into(),
            reason: "Face value must be positive".into(),
        });
    }
    if input.coupon_rate < Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "couponRate".into(),
            reason: "Coupon rate cannot be negative".into(),
        });
    }
    if input.market_price <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "marketPrice".into(),
            reason: "Market price must be positive".into(),
        });
    }
    if input.years_to_maturity <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "yearsToMaturity".into(),
            reason: "Years to maturity must be positive".into(),
        });
    }
    Ok(())
}
