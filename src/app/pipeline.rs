//! Shared batch pipeline used by the `batch` and `simulate` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! rows -> parallel compute -> ordered outcomes -> summary
//!
//! The front-ends then focus on presentation (printing vs exporting).

use rayon::prelude::*;
use tracing::info;

use crate::data::{SampleConfig, generate_sample};
use crate::domain::{BatchOutcome, EngineConfig};
use crate::engine::compute_penalty_with;
use crate::error::AppError;
use crate::io::ingest::{BatchRow, IngestedRequests, RowError};
use crate::report::BatchSummary;

/// All computed outputs of a batch run.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub outcomes: Vec<BatchOutcome>,
    /// Rows that never reached the engine (CSV/parse errors).
    pub row_errors: Vec<RowError>,
    pub summary: BatchSummary,
}

/// Compute every row in parallel. Output order matches input order.
pub fn compute_rows(rows: &[BatchRow], config: &EngineConfig) -> Vec<BatchOutcome> {
    rows.par_iter()
        .map(|row| BatchOutcome {
            line: row.line,
            id: row.id.clone(),
            request: row.request,
            result: compute_penalty_with(&row.request, config),
        })
        .collect()
}

/// Execute a batch over ingested CSV rows.
pub fn run_batch(ingested: IngestedRequests, config: &EngineConfig) -> Result<BatchRun, AppError> {
    config.validate()?;

    let outcomes = compute_rows(&ingested.rows, config);
    let summary = BatchSummary::from_outcomes(&outcomes, ingested.row_errors.len());
    info!(
        rows_read = ingested.rows_read,
        computed = summary.computed,
        failed = summary.failed,
        skipped = summary.skipped,
        "batch complete"
    );

    Ok(BatchRun {
        outcomes,
        row_errors: ingested.row_errors,
        summary,
    })
}

/// Generate a synthetic portfolio and run it through the batch pipeline.
pub fn run_simulation(sample: &SampleConfig, config: &EngineConfig) -> Result<BatchRun, AppError> {
    let rows = generate_sample(sample)?;
    let ingested = IngestedRequests {
        rows_read: rows.len(),
        rows,
        row_errors: Vec::new(),
    };
    run_batch(ingested, config)
}
