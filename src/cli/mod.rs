//! Command-line parsing for the early-withdrawal penalty estimator.
//!
//! Argument parsing and command dispatch stay separate from the engine; the
//! handlers in `app` turn these structs into engine calls.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::domain::OverrunPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "penalty", version, about = "Early-withdrawal penalty estimator")]
pub struct Cli {
    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate the penalty for a single withdrawal.
    Compute(ComputeArgs),
    /// Answer a JSON request (stdin by default) with a JSON response.
    Json(JsonArgs),
    /// Show how the penalty decays over the term.
    Schedule(ScheduleArgs),
    /// Estimate every row of a CSV file.
    Batch(BatchArgs),
    /// Run a seeded synthetic portfolio through the batch pipeline.
    Simulate(SimulateArgs),
    /// Launch the interactive TUI (default).
    Tui(TuiArgs),
}

/// Engine overrides shared by every subcommand.
///
/// Unset flags fall back to `PENALTY_*` environment variables, then defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct EngineArgs {
    /// What to do when days remaining exceeds the term.
    #[arg(long, value_enum, global = true)]
    pub overrun: Option<OverrunPolicy>,

    /// Penalty/principal ratio at which severity becomes Medium.
    #[arg(long, global = true, value_name = "RATIO")]
    pub medium_threshold: Option<Decimal>,

    /// Penalty/principal ratio at which severity becomes High.
    #[arg(long, global = true, value_name = "RATIO")]
    pub high_threshold: Option<Decimal>,

    /// Decimal places kept on the penalty amount.
    #[arg(long, global = true)]
    pub scale: Option<u32>,
}

/// The request inputs, given either as day counts or as calendar dates.
#[derive(Debug, Args, Clone)]
pub struct RequestArgs {
    /// Amount saved.
    #[arg(short = 'p', long, allow_hyphen_values = true)]
    pub principal: Decimal,

    /// Nominal penalty rate in percent.
    #[arg(short = 'r', long, allow_hyphen_values = true)]
    pub rate: Decimal,

    /// Days left until maturity.
    #[arg(short = 'd', long)]
    pub days_remaining: Option<u32>,

    /// Length of the term in days.
    #[arg(short = 't', long, conflicts_with_all = ["start_date", "maturity_date"])]
    pub total_days: Option<u32>,

    /// Term start date (YYYY-MM-DD); use with --maturity-date.
    #[arg(long, requires = "maturity_date")]
    pub start_date: Option<NaiveDate>,

    /// Term maturity date (YYYY-MM-DD); use with --start-date.
    #[arg(long, requires = "start_date")]
    pub maturity_date: Option<NaiveDate>,

    /// Date of the withdrawal when using dates (defaults to today).
    #[arg(long, requires = "start_date", conflicts_with = "days_remaining")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct ComputeArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Print the JSON response instead of the text report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct JsonArgs {
    /// Read the request from a file instead of stdin.
    #[arg(long, value_name = "JSON")]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ScheduleArgs {
    /// Days remaining defaults to the full term.
    #[command(flatten)]
    pub request: RequestArgs,

    /// Days between schedule points.
    #[arg(long, default_value_t = 30)]
    pub step: u32,

    /// Render an ASCII plot below the table.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the schedule to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// CSV with id,principal,penalty_rate_percent,days_remaining,total_maturity_days.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Export per-row results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Print the per-row table as well as the summary.
    #[arg(long)]
    pub rows: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Number of synthetic requests.
    #[arg(short = 'n', long, default_value_t = 1_000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Highest nominal penalty rate drawn, in percent.
    #[arg(long, default_value = "10")]
    pub max_rate: Decimal,

    /// Export per-row results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Initial form values for the TUI.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[arg(short = 'p', long, default_value = "1000")]
    pub principal: Decimal,

    #[arg(short = 'r', long, default_value = "2.5")]
    pub rate: Decimal,

    #[arg(short = 'd', long, default_value_t = 90)]
    pub days_remaining: u32,

    #[arg(short = 't', long, default_value_t = 120)]
    pub total_days: u32,
}

impl Default for TuiArgs {
    fn default() -> Self {
        Self {
            principal: Decimal::from(1000),
            rate: Decimal::new(25, 1),
            days_remaining: 90,
            total_days: 120,
        }
    }
}
