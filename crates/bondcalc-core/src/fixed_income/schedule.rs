//! Periodic cash-flow ledger for a fixed-coupon bullet bond.
//!
//! Payment dates advance whole calendar months from an explicit anchor date.
//! Each date is computed from the anchor, not from the previous payment, and
//! a day that does not exist in the target month clamps to that month's last
//! day (Jan 31 + 1 month = Feb 28/29, + 6 months = Jul 31).

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ValuationError;
use crate::rounding::round_money;
use crate::types::{with_metadata, ComputationOutput, Money, Periods};
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One coupon period of the schedule. Currency fields are rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowPeriod {
    /// 1-indexed period number.
    pub period: Periods,
    pub payment_date: NaiveDate,
    pub coupon_payment: Money,
    /// Face value on the final period, zero otherwise.
    pub principal_payment: Money,
    pub total_payment: Money,
    /// Running sum of coupons through this period.
    pub cumulative_interest: Money,
    /// Face value until the final period, zero on it.
    pub remaining_principal: Money,
}

/// Input for standalone schedule generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub face_value: Money,
    /// Coupon cash amount per period (not a rate).
    pub coupon_payment: Money,
    pub total_periods: Periods,
    /// 1 (annual) or 2 (semi-annual).
    pub periods_per_year: u32,
    /// Settlement date the payment dates are counted from.
    pub anchor_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full ordered schedule, one entry per period.
///
/// Period `p` pays on `anchor_date + p × (12 / periods_per_year)` months.
/// `periods_per_year` must divide 12.
pub fn generate_schedule(
    face_value: Money,
    coupon_payment: Money,
    total_periods: Periods,
    periods_per_year: u32,
    anchor_date: NaiveDate,
) -> ValuationResult<Vec<CashFlowPeriod>> {
    let months_per_period = months_per_period(periods_per_year)?;

    (1..=total_periods)
        .scan(Decimal::ZERO, |cumulative, period| {
            *cumulative += coupon_payment;
            Some((period, *cumulative))
        })
        .map(|(period, cumulative)| -> ValuationResult<CashFlowPeriod> {
            let is_final = period == total_periods;
            let principal = if is_final { face_value } else { Decimal::ZERO };
            let remaining = if is_final { Decimal::ZERO } else { face_value };
            let months = months_per_period.checked_mul(period).ok_or_else(|| {
                ValuationError::DateError(format!("Month offset overflow at period {period}"))
            })?;

            Ok(CashFlowPeriod {
                period,
                payment_date: add_months(anchor_date, months)?,
                coupon_payment: round_money(coupon_payment),
                principal_payment: round_money(principal),
                total_payment: round_money(coupon_payment + principal),
                cumulative_interest: round_money(cumulative),
                remaining_principal: round_money(remaining),
            })
        })
        .collect()
}

/// Standalone schedule generation, validated and wrapped in the computation
/// envelope.
pub fn generate_cash_flow_schedule(
    input: &ScheduleInput,
) -> ValuationResult<ComputationOutput<Vec<CashFlowPeriod>>> {
    let start = Instant::now();

    validate_schedule_input(input)?;

    let schedule = generate_schedule(
        input.face_value,
        input.coupon_payment,
        input.total_periods,
        input.periods_per_year,
        input.anchor_date,
    )?;

    let assumptions = serde_json::json!({
        "anchor_date": input.anchor_date,
        "months_per_period": 12 / input.periods_per_year,
        "date_roll": "whole months from anchor, day clamped to month end",
        "rounding": "2dp, half away from zero"
    });

    Ok(with_metadata(
        "Bullet Bond Cash-Flow Schedule",
        &assumptions,
        Vec::new(),
        start,
        schedule,
    ))
}

/// Add whole calendar months, clamping the day to the last day of the
/// resulting month.
pub fn add_months(date: NaiveDate, months: u32) -> ValuationResult<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        ValuationError::DateError(format!("{date} + {months} months is out of range"))
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn months_per_period(periods_per_year: u32) -> ValuationResult<u32> {
    if periods_per_year == 0 || 12 % periods_per_year != 0 {
        return Err(ValuationError::InvalidInput {
            field: "periodsPerYear".into(),
            reason: "Periods per year must divide 12".into(),
        });
    }
    Ok(12 / periods_per_year)
}

fn validate_schedule_input(input: &ScheduleInput) -> ValuationResult<()> {
    if input.face_value <= Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "faceValue".into(),
            reason: "Face value must be positive".into(),
        });
    }
    if input.coupon_payment < Decimal::ZERO {
        return Err(ValuationError::InvalidInput {
            field: "couponPayment".into(),
            reason: "Coupon payment cannot be negative".into(),
        });
    }
    if input.total_periods == 0 {
        return Err(ValuationError::InvalidInput {
            field: "totalPeriods".into(),
            reason: "Schedule needs at least one period".into(),
        });
    }
    if !matches!(input.periods_per_year, 1 | 2) {
        return Err(ValuationError::InvalidInput {
            field: "periodsPerYear".into(),
            reason: "Periods per year must be 1 (annual) or 2 (semi-annual)".into(),
        });
    }
    Ok(())
}
