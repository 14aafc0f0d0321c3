//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves the engine configuration
//! - installs the log subscriber
//! - runs the requested command and prints reports/plots
//! - writes optional exports

use std::fs::File;
use std::io::{self, BufReader};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    BatchArgs, Command, ComputeArgs, EngineArgs, JsonArgs, RequestArgs, ScheduleArgs, SimulateArgs,
    TuiArgs,
};
use crate::data::SampleConfig;
use crate::domain::{EngineConfig, MaturityTerm, PenaltyRequest, Severity};
use crate::engine::{PenaltyError, compute_penalty_with, decay_schedule, validate, waiting_days_for};
use crate::error::AppError;
use crate::io::{ErrorResponse, PenaltyResponse};
use crate::report::WaitHint;

pub mod pipeline;

const SUBCOMMANDS: [&str; 6] = ["compute", "json", "schedule", "batch", "simulate", "tui"];

/// Entry point for the `penalty` binary.
pub fn run() -> Result<(), AppError> {
    // `penalty` and `penalty --overrun clamp` behave like `penalty tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(matches!(cli.command, Command::Tui(_)));
    let config = engine_config_from_args(&cli.engine)?;

    match cli.command {
        Command::Compute(args) => handle_compute(args, &config),
        Command::Json(args) => handle_json(args, &config),
        Command::Schedule(args) => handle_schedule(args, &config),
        Command::Batch(args) => handle_batch(args, &config),
        Command::Simulate(args) => handle_simulate(args, &config),
        Command::Tui(args) => handle_tui(args, config),
    }
}

/// Logs go to stderr so stdout stays machine-readable. The TUI owns the
/// terminal, so it only gets a subscriber when `RUST_LOG` asks for one.
fn init_logging(tui: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if tui => return,
        Err(_) => EnvFilter::new("warn"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Defaults, then `PENALTY_*` environment variables, then CLI flags.
pub fn engine_config_from_args(args: &EngineArgs) -> Result<EngineConfig, AppError> {
    let mut config = EngineConfig::from_env()?;
    apply_engine_args(&mut config, args);
    config.validate()?;
    Ok(config)
}

fn apply_engine_args(config: &mut EngineConfig, args: &EngineArgs) {
    if let Some(policy) = args.overrun {
        config.overrun_policy = policy;
    }
    if let Some(medium) = args.medium_threshold {
        config.thresholds.medium = medium;
    }
    if let Some(high) = args.high_threshold {
        config.thresholds.high = high;
    }
    if let Some(scale) = args.scale {
        config.amount_scale = scale;
    }
}

/// Whether a missing `--days-remaining` is an error or means "full term".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DaysDefault {
    Required,
    FullTerm,
}

fn resolve_request(args: &RequestArgs, days_default: DaysDefault) -> Result<PenaltyRequest, AppError> {
    let (days_remaining, total_maturity_days) = match (args.start_date, args.maturity_date) {
        (Some(start), Some(maturity)) => {
            let as_of = args.as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
            let days = MaturityTerm::from_dates(start, maturity, as_of)?;
            (
                args.days_remaining.unwrap_or(days.days_remaining),
                days.total_maturity_days,
            )
        }
        _ => {
            let total = args.total_days.ok_or_else(|| {
                AppError::new(2, "Provide --total-days or --start-date with --maturity-date.")
            })?;
            let days = match (args.days_remaining, days_default) {
                (Some(d), _) => d,
                (None, DaysDefault::FullTerm) => total,
                (None, DaysDefault::Required) => {
                    return Err(AppError::new(2, "Provide --days-remaining (or term dates)."));
                }
            };
            (days, total)
        }
    };
    Ok(PenaltyRequest::new(args.principal, args.rate, days_remaining, total_maturity_days))
}

/// How long to wait for each severity tier below the current one.
pub fn wait_hints(
    request: &PenaltyRequest,
    current: Severity,
    config: &EngineConfig,
) -> Result<Vec<WaitHint>, PenaltyError> {
    Severity::ALL
        .into_iter()
        .filter(|s| *s < current)
        .map(|target| {
            Ok(WaitHint {
                target,
                days: waiting_days_for(request, target, config)?,
            })
        })
        .collect()
}

fn handle_compute(args: ComputeArgs, config: &EngineConfig) -> Result<(), AppError> {
    let request = resolve_request(&args.request, DaysDefault::Required)?;

    if args.json {
        return match compute_penalty_with(&request, config) {
            Ok(result) => print_json(&PenaltyResponse::from(&result)),
            Err(err) => {
                print_json(&ErrorResponse::from(&err))?;
                Err(err.into())
            }
        };
    }

    let result = compute_penalty_with(&request, config)?;
    // Report the request as the engine saw it (after overrun handling).
    let request = validate(&request, config)?;
    let hints = wait_hints(&request, result.severity, config)?;
    print!("{}", crate::report::format_estimate(&request, &result, config, &hints));
    Ok(())
}

fn handle_json(args: JsonArgs, config: &EngineConfig) -> Result<(), AppError> {
    let stdout = io::stdout();
    match &args.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open JSON '{}': {e}", path.display())))?;
            crate::io::respond(BufReader::new(file), stdout.lock(), config)
        }
        None => crate::io::respond(io::stdin().lock(), stdout.lock(), config),
    }
}

fn handle_schedule(args: ScheduleArgs, config: &EngineConfig) -> Result<(), AppError> {
    let request = resolve_request(&args.request, DaysDefault::FullTerm)?;
    let schedule = decay_schedule(&request, args.step, config)?;

    println!(
        "Decay schedule: principal={} rate={}% term={} days (step {})\n",
        crate::report::fmt_money(schedule.request.principal),
        crate::report::fmt_pct(schedule.request.penalty_rate_percent),
        schedule.request.total_maturity_days,
        args.step,
    );
    println!("{}", crate::report::format_schedule(&schedule));

    if args.plot {
        println!("{}", crate::plot::render_decay_plot(&schedule, args.width, args.height));
    }
    if let Some(path) = &args.export {
        crate::io::export::write_schedule_csv(path, &schedule)?;
    }
    Ok(())
}

fn handle_batch(args: BatchArgs, config: &EngineConfig) -> Result<(), AppError> {
    let ingested = crate::io::ingest::load_requests(&args.input, config)?;
    let run = pipeline::run_batch(ingested, config)?;

    if args.rows {
        println!("{}", crate::report::format_outcomes(&run.outcomes));
    }
    if !run.row_errors.is_empty() {
        eprintln!("Skipped rows:");
        eprint!("{}", crate::report::format_row_errors(&run.row_errors));
    }
    println!("{}", crate::report::format_summary(&run.summary));

    if let Some(path) = &args.export {
        crate::io::export::write_results_csv(path, &run.outcomes)?;
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs, config: &EngineConfig) -> Result<(), AppError> {
    let sample = SampleConfig {
        count: args.count,
        seed: args.seed,
        max_rate: args.max_rate,
        ..SampleConfig::default()
    };
    let run = pipeline::run_simulation(&sample, config)?;
    println!("Simulated {} requests (seed {}).\n", sample.count, sample.seed);
    println!("{}", crate::report::format_summary(&run.summary));

    if let Some(path) = &args.export {
        crate::io::export::write_results_csv(path, &run.outcomes)?;
    }
    Ok(())
}

fn handle_tui(args: TuiArgs, config: EngineConfig) -> Result<(), AppError> {
    crate::tui::run(args, config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(4, format!("Failed to serialize JSON: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Rewrite argv so `penalty` defaults to `penalty tui`.
///
/// Rules:
/// - `penalty`                          -> `penalty tui`
/// - `penalty --overrun clamp`          -> `penalty tui --overrun clamp`
/// - `penalty --help/--version/-h/help` -> unchanged
/// - any argv naming a subcommand       -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // Global flags may precede the subcommand.
    if argv[1..].iter().any(|a| SUBCOMMANDS.contains(&a.as_str())) {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
