//! CSV exports: per-row batch results and decay schedules.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts, so amounts are written as plain decimal strings (no float noise).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{BatchOutcome, DecaySchedule};
use crate::error::AppError;

const RESULTS_HEADER: [&str; 11] = [
    "id",
    "line",
    "principal",
    "penalty_rate_percent",
    "days_remaining",
    "total_maturity_days",
    "penalty_amount",
    "net_withdrawal",
    "effective_penalty_percent",
    "severity",
    "error",
];

/// Write per-row batch results to a CSV file.
pub fn write_results_csv(path: &Path, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, outcomes)
}

pub fn write_results<W: Write>(writer: W, outcomes: &[BatchOutcome]) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(RESULTS_HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for o in outcomes {
        let req = &o.request;
        let (penalty, net, effective, severity, error) = match &o.result {
            Ok(r) => (
                r.penalty_amount.to_string(),
                r.net_withdrawal.to_string(),
                r.effective_penalty_percent.round_dp(6).normalize().to_string(),
                r.severity.to_string(),
                String::new(),
            ),
            Err(e) => (String::new(), String::new(), String::new(), String::new(), e.to_string()),
        };
        w.write_record([
            o.id.clone(),
            o.line.to_string(),
            req.principal.to_string(),
            req.penalty_rate_percent.to_string(),
            req.days_remaining.to_string(),
            req.total_maturity_days.to_string(),
            penalty,
            net,
            effective,
            severity,
            error,
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    w.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

/// Write a decay schedule to a CSV file.
pub fn write_schedule_csv(path: &Path, schedule: &DecaySchedule) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create schedule CSV '{}': {e}", path.display())))?;
    write_schedule(file, schedule)
}

pub fn write_schedule<W: Write>(writer: W, schedule: &DecaySchedule) -> Result<(), AppError> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(["days_remaining", "penalty_amount", "net_withdrawal", "severity"])
        .map_err(|e| AppError::new(2, format!("Failed to write schedule CSV header: {e}")))?;
    for p in &schedule.points {
        w.write_record([
            p.days_remaining.to_string(),
            p.penalty_amount.to_string(),
            p.net_withdrawal.to_string(),
            p.severity.to_string(),
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write schedule CSV row: {e}")))?;
    }
    w.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush schedule CSV: {e}")))
}
