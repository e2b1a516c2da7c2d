//! Yield to maturity via Newton-Raphson on the periodic discount rate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::pricing::price_and_derivative;
use crate::error::ValuationError;
use crate::types::{Money, Periods, Rate};
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum Newton-Raphson iterations for the YTM solve.
pub const MAX_YTM_ITERATIONS: u32 = 1000;

/// Convergence tolerance on the absolute price residual (1e-6).
pub const YTM_TOLERANCE: Decimal = dec!(0.000001);

/// Periodic rate the solver restarts from when an update leaves the
/// domain `r > -1` or cannot be represented.
pub const RESTART_RATE: Rate = dec!(0.001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Tuning knobs for the Newton-Raphson solve. Defaults reproduce the
/// documented engine behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: u32,
    /// Absolute price residual accepted as converged.
    pub tolerance: Decimal,
    /// Periodic rate used to restart after a divergent step.
    pub restart_rate: Rate,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: MAX_YTM_ITERATIONS,
            tolerance: YTM_TOLERANCE,
            restart_rate: RESTART_RATE,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> ValuationResult<()> {
        if self.max_iterations == 0 {
            return Err(ValuationError::InvalidInput {
                field: "max_iterations".into(),
                reason: "Solver needs at least one iteration".into(),
            });
        }
        if self.tolerance <= Decimal::ZERO {
            return Err(ValuationError::InvalidInput {
                field: "tolerance".into(),
                reason: "Tolerance must be positive".into(),
            });
        }
        if self.restart_rate <= dec!(-1) {
            return Err(ValuationError::InvalidInput {
                field: "restart_rate".into(),
                reason: "Restart rate must be greater than -100%".into(),
            });
        }
        Ok(())
    }
}

/// Outcome of a YTM solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YtmSolution {
    /// Solved rate per coupon period.
    pub periodic_rate: Rate,
    /// `periodic_rate * periods_per_year`.
    pub annual_rate: Rate,
    /// Newton updates performed before stopping.
    pub iterations: u32,
    /// False when the iteration cap ran out before the residual met tolerance.
    pub converged: bool,
    /// Last observed `price - market_price`.
    pub residual: Decimal,
}

/// Result of a single Newton-Raphson step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonStep {
    /// Residual is inside tolerance at the current rate.
    Converged { residual: Decimal },
    /// Move to `next_rate`. `restarted` is set when the raw update was
    /// unusable and the restart rate was substituted.
    Continue {
        next_rate: Rate,
        residual: Decimal,
        restarted: bool,
    },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Closed-form YTM approximation used as the starting point:
///
/// ```text
/// (C·m + (F - P) / years) / ((F + P) / 2)
/// ```
///
/// where `years = total_periods / periods_per_year`. Returns an annual rate.
pub fn approximate_annual_ytm(
    face_value: Money,
    coupon_payment: Money,
    market_price: Money,
    total_periods: Periods,
    periods_per_year: u32,
) -> Option<Rate> {
    let m = Decimal::from(periods_per_year);
    let years = Decimal::from(total_periods).checked_div(m)?;
    let annual_coupon = coupon_payment.checked_mul(m)?;
    let pull_to_par = face_value.checked_sub(market_price)?.checked_div(years)?;
    let average_price = face_value.checked_add(market_price)?.checked_div(dec!(2))?;
    annual_coupon.checked_add(pull_to_par)?.checked_div(average_price)
}

/// Perform one Newton-Raphson step at `rate`.
///
/// Fails with [`ValuationError::DerivativeZero`] when the slope is exactly
/// zero. A rate outside the pricing domain, or an update that is not
/// representable or falls to `-1` or below, continues from
/// `config.restart_rate`.
pub fn newton_step(
    face_value: Money,
    coupon_payment: Money,
    market_price: Money,
    total_periods: Periods,
    rate: Rate,
    iteration: u32,
    config: &SolverConfig,
) -> ValuationResult<NewtonStep> {
    let restart = |residual: Decimal| NewtonStep::Continue {
        next_rate: config.restart_rate,
        residual,
        restarted: true,
    };

    let Some(pd) = price_and_derivative(face_value, coupon_payment, rate, total_periods) else {
        return Ok(restart(Decimal::MAX));
    };

    let diff = pd.price - market_price;
    if diff.abs() < config.tolerance {
        return Ok(NewtonStep::Converged { residual: diff });
    }

    if pd.derivative.is_zero() {
        return Err(ValuationError::DerivativeZero { iteration, rate });
    }

    let next = diff
        .checked_div(pd.derivative)
        .and_then(|step| rate.checked_sub(step));

    match next {
        Some(next_rate) if next_rate > dec!(-1) => Ok(NewtonStep::Continue {
            next_rate,
            residual: diff,
            restarted: false,
        }),
        _ => Ok(restart(diff)),
    }
}

/// Solve for the yield to maturity.
///
/// A zero-coupon bond priced exactly at face returns zero without iterating.
/// Otherwise iterates from the closed-form approximation for at most
/// `config.max_iterations` steps. An exhausted cap is not an error here:
/// the last rate is returned with `converged == false`.
pub fn solve_ytm(
    face_value: Money,
    coupon_payment: Money,
    market_price: Money,
    total_periods: Periods,
    periods_per_year: u32,
    config: &SolverConfig,
) -> ValuationResult<YtmSolution> {
    config.validate()?;
    if total_periods == 0 {
        return Err(ValuationError::InvalidInput {
            field: "total_periods".into(),
            reason: "Computed number of periods is zero".into(),
        });
    }
    if periods_per_year == 0 {
        return Err(ValuationError::InvalidInput {
            field: "periods_per_year".into(),
            reason: "Periods per year must be positive".into(),
        });
    }

    if coupon_payment.is_zero() && face_value == market_price {
        return Ok(YtmSolution {
            periodic_rate: Decimal::ZERO,
            annual_rate: Decimal::ZERO,
            iterations: 0,
            converged: true,
            residual: Decimal::ZERO,
        });
    }

    let m = Decimal::from(periods_per_year);
    let mut rate = approximate_annual_ytm(
        face_value,
        coupon_payment,
        market_price,
        total_periods,
        periods_per_year,
    )
    .and_then(|annual| annual.checked_div(m))
    .filter(|r| *r > dec!(-1))
    .unwrap_or(config.restart_rate);

    debug!(initial_rate = %rate, total_periods, "starting YTM solve");

    let mut residual = Decimal::MAX;
    for iteration in 0..config.max_iterations {
        match newton_step(
            face_value,
            coupon_payment,
            market_price,
            total_periods,
            rate,
            iteration,
            config,
        )? {
            NewtonStep::Converged { residual } => {
                debug!(iterations = iteration, periodic_rate = %rate, %residual, "YTM converged");
                let (periodic_rate, annual_rate) = annualise(rate, m, config);
                return Ok(YtmSolution {
                    periodic_rate,
                    annual_rate,
                    iterations: iteration,
                    converged: true,
                    residual,
                });
            }
            NewtonStep::Continue {
                next_rate,
                residual: diff,
                restarted,
            } => {
                if restarted {
                    debug!(iteration, from = %rate, to = %next_rate, "YTM step diverged; restarting");
                }
                rate = next_rate;
                residual = diff;
            }
        }
    }

    warn!(
        iterations = config.max_iterations,
        periodic_rate = %rate,
        %residual,
        "YTM iteration cap reached without convergence"
    );

    let (periodic_rate, annual_rate) = annualise(rate, m, config);
    Ok(YtmSolution {
        periodic_rate,
        annual_rate,
        iterations: config.max_iterations,
        converged: false,
        residual,
    })
}

/// Pair a periodic rate with its annual equivalent. A rate too large to
/// annualise falls back to `config.restart_rate`.
fn annualise(rate: Rate, m: Decimal, config: &SolverConfig) -> (Rate, Rate) {
    match rate.checked_mul(m) {
        Some(annual) => (rate, annual),
        None => {
            warn!(periodic_rate = %rate, "periodic rate cannot be annualised; using restart rate");
            (config.restart_rate, config.restart_rate * m)
        }
    }
}
