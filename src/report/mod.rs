//! Reporting utilities: batch summaries and formatted terminal output.

use rust_decimal::Decimal;

use crate::domain::{BatchOutcome, Severity};

pub mod format;

pub use format::*;

/// Aggregate view over a batch of outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Rows the engine produced a result for.
    pub computed: usize,
    /// Rows the engine rejected.
    pub failed: usize,
    /// Rows that never reached the engine (ingest errors).
    pub skipped: usize,
    /// Counts indexed by `Severity as usize`.
    pub by_severity: [usize; 3],
    pub total_principal: Decimal,
    pub total_penalty: Decimal,
    pub total_net: Decimal,
    /// Penalty as a share of principal over all computed rows.
    pub aggregate_penalty_percent: Option<Decimal>,
    /// Unweighted mean of the per-row effective penalty percent.
    pub mean_effective_percent: Option<Decimal>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome], skipped: usize) -> Self {
        let mut s = BatchSummary {
            skipped,
            ..BatchSummary::default()
        };

        let mut effective_sum = Decimal::ZERO;
        for o in outcomes {
            let Ok(r) = &o.result else {
                s.failed += 1;
                continue;
            };
            s.computed += 1;
            s.by_severity[r.severity as usize] += 1;
            s.total_principal = s.total_principal.saturating_add(o.request.principal);
            s.total_penalty = s.total_penalty.saturating_add(r.penalty_amount);
            s.total_net = s.total_net.saturating_add(r.net_withdrawal);
            effective_sum = effective_sum.saturating_add(r.effective_penalty_percent);
        }

        if s.computed > 0 {
            s.mean_effective_percent = effective_sum.checked_div(Decimal::from(s.computed));
        }
        if s.total_principal > Decimal::ZERO {
            s.aggregate_penalty_percent = s
                .total_penalty
                .checked_div(s.total_principal)
                .and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED));
        }
        s
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity[severity as usize]
    }
}
