use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use bondcalc_core::fixed_income::schedule::{self, ScheduleInput};
use bondcalc_core::fixed_income::valuation::{self, BondInput, CouponFrequency, ValuationConfig};
use bondcalc_core::fixed_income::yields::{self, CurrentYieldInput};
use bondcalc_core::fixed_income::ytm::SolverConfig;

use crate::input;

/// Coupon frequency as accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Annual,
    SemiAnnual,
}

impl From<FrequencyArg> for CouponFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Annual => CouponFrequency::Annual,
            FrequencyArg::SemiAnnual => CouponFrequency::SemiAnnual,
        }
    }
}

/// Newton-Raphson solver overrides
#[derive(Args, Debug, Default)]
pub struct SolverArgs {
    /// Maximum Newton-Raphson iterations (default 1000)
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Absolute price residual accepted as converged (default 0.000001)
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Fail instead of returning an unconverged YTM estimate
    #[arg(long)]
    pub strict: bool,
}

impl SolverArgs {
    pub fn to_config(&self) -> ValuationConfig {
        let defaults = SolverConfig::default();
        ValuationConfig {
            solver: SolverConfig {
                max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
                tolerance: self.tolerance.unwrap_or(defaults.tolerance),
                restart_rate: defaults.restart_rate,
            },
            strict_convergence: self.strict,
        }
    }
}

/// Arguments for full bond valuation
#[derive(Args, Debug)]
#[command(allow_hyphen_values = true)]
pub struct CalculateArgs {
    /// Face (par) value repaid at maturity
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Annual coupon rate in percent (e.g. 5 for 5%)
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Current market price
    #[arg(long)]
    pub market_price: Option<Decimal>,

    /// Years to maturity
    #[arg(long, alias = "years-to-maturity")]
    pub years: Option<Decimal>,

    /// Coupon frequency
    #[arg(long, value_enum, default_value = "annual")]
    pub frequency: FrequencyArg,

    /// Settlement date the schedule is anchored to (YYYY-MM-DD, default today)
    #[arg(long)]
    pub settlement_date: Option<NaiveDate>,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for standalone cash-flow schedule generation
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Face (par) value repaid on the final period
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Coupon cash amount per period
    #[arg(long)]
    pub coupon_payment: Option<Decimal>,

    /// Number of coupon periods
    #[arg(long)]
    pub total_periods: Option<u32>,

    /// Coupon periods per year (1 or 2)
    #[arg(long, default_value = "2")]
    pub periods_per_year: u32,

    /// Anchor date for payment dates (YYYY-MM-DD, default today)
    #[arg(long)]
    pub anchor_date: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for current yield
#[derive(Args, Debug)]
pub struct CurrentYieldArgs {
    /// Face (par) value
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Annual coupon rate in percent (e.g. 5 for 5%)
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Current market price
    #[arg(long)]
    pub market_price: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bond_input: BondInput = if args.input.is_none() && args.face_value.is_some() {
        bond_input_from_flags(&args)?
    } else {
        input::read_input(args.input.as_deref())?
            .ok_or("--input <file.json>, stdin or --face-value and friends required for calculate")?
    };
    let settlement = settlement_or_today(args.settlement_date);
    let config = args.solver.to_config();

    let result = valuation::calculate_bond_with_config(&bond_input, settlement, &config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if args.input.is_none() && args.face_value.is_some() {
        schedule_input_from_flags(&args)?
    } else {
        input::read_input(args.input.as_deref())?
            .ok_or("--input <file.json>, stdin or --face-value and friends required for schedule")?
    };
    let result = schedule::generate_cash_flow_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_current_yield(args: CurrentYieldArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cy_input: CurrentYieldInput = if args.input.is_none() && args.face_value.is_some() {
        CurrentYieldInput {
            face_value: args.face_value.ok_or("--face-value is required (or provide --input)")?,
            coupon_rate: args
                .coupon_rate
                .ok_or("--coupon-rate is required (or provide --input)")?,
            market_price: args
                .market_price
                .ok_or("--market-price is required (or provide --input)")?,
        }
    } else {
        input::read_input(args.input.as_deref())?
            .ok_or("--input <file.json>, stdin or --face-value and friends required for current-yield")?
    };
    let result = yields::calculate_current_yield(&cy_input)?;
    Ok(serde_json::to_value(result)?)
}

fn bond_input_from_flags(args: &CalculateArgs) -> Result<BondInput, Box<dyn std::error::Error>> {
    Ok(BondInput {
        face_value: args
            .face_value
            .ok_or("--face-value is required (or provide --input)")?,
        coupon_rate: args
            .coupon_rate
            .ok_or("--coupon-rate is required (or provide --input)")?,
        market_price: args
            .market_price
            .ok_or("--market-price is required (or provide --input)")?,
        years_to_maturity: args.years.ok_or("--years is required (or provide --input)")?,
        coupon_frequency: args.frequency.into(),
    })
}

fn schedule_input_from_flags(
    args: &ScheduleArgs,
) -> Result<ScheduleInput, Box<dyn std::error::Error>> {
    Ok(ScheduleInput {
        face_value: args
            .face_value
            .ok_or("--face-value is required (or provide --input)")?,
        coupon_payment: args
            .coupon_payment
            .ok_or("--coupon-payment is required (or provide --input)")?,
        total_periods: args
            .total_periods
            .ok_or("--total-periods is required (or provide --input)")?,
        periods_per_year: args.periods_per_year,
        anchor_date: settlement_or_today(args.anchor_date),
    })
}

fn settlement_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| {
        let today = chrono::Local::now().date_naive();
        debug!(%today, "no settlement date given; anchoring schedule at today");
        today
    })
}
