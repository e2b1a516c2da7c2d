mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::bond::{CalculateArgs, CurrentYieldArgs, ScheduleArgs};

/// Fixed-coupon bond yield and cash-flow calculations
#[derive(Parser)]
#[command(
    name = "bondcalc",
    version,
    about = "Fixed-coupon bond yield and cash-flow calculations",
    long_about = "A CLI for valuing fixed-coupon, bullet-repayment bonds with decimal \
                  precision. Solves yield to maturity by Newton-Raphson, computes current \
                  yield and premium/discount classification, and produces the periodic \
                  cash-flow schedule."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver diagnostics to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full valuation: current yield, YTM, total interest, classification and schedule
    Calculate(CalculateArgs),
    /// Generate the cash-flow schedule for known coupon terms
    Schedule(ScheduleArgs),
    /// Current yield only (annual coupon / market price)
    CurrentYield(CurrentYieldArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::bond::run_calculate(args),
        Commands::Schedule(args) => commands::bond::run_schedule(args),
        Commands::CurrentYield(args) => commands::bond::run_current_yield(args),
        Commands::Version => {
            println!("bondcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
