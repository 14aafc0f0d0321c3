//! Formatted terminal output.
//!
//! All human-readable text lives here so the engine stays free of presentation
//! concerns and output changes stay localized.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{BatchOutcome, DecaySchedule, EngineConfig, PenaltyRequest, PenaltyResult, Severity};
use crate::io::ingest::RowError;
use crate::report::BatchSummary;

/// Days to wait until the estimate drops to `target` or below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitHint {
    pub target: Severity,
    pub days: u32,
}

/// Format a single estimate with its inputs and optional wait hints.
pub fn format_estimate(
    request: &PenaltyRequest,
    result: &PenaltyResult,
    config: &EngineConfig,
    hints: &[WaitHint],
) -> String {
    let mut out = String::new();

    out.push_str("=== penalty - early withdrawal estimate ===\n");
    out.push_str(&format!("Principal:        {}\n", fmt_money(request.principal)));
    out.push_str(&format!("Penalty rate:     {}%\n", fmt_pct(request.penalty_rate_percent)));
    out.push_str(&format!(
        "Days remaining:   {} of {}\n",
        request.days_remaining, request.total_maturity_days
    ));
    out.push_str(&format!("Overrun policy:   {}\n", config.overrun_policy.as_str()));

    out.push_str("\nEstimate:\n");
    out.push_str(&format!("- time to maturity : {}%\n", fmt_pct(result.maturity_progress_percent)));
    out.push_str(&format!("- adjusted rate    : {}%\n", fmt_pct(result.adjusted_penalty_percent)));
    out.push_str(&format!("- penalty          : {}\n", fmt_money(result.penalty_amount)));
    out.push_str(&format!("- net withdrawal   : {}\n", fmt_money(result.net_withdrawal)));
    out.push_str(&format!("- effective rate   : {}%\n", fmt_pct(result.effective_penalty_percent)));
    out.push_str(&format!("- severity         : {}\n", result.severity));

    if !hints.is_empty() {
        out.push('\n');
        for h in hints {
            out.push_str(&format!("{}\n", format_wait_hint(h)));
        }
    }

    out
}

/// One-line wait hint, shared by the CLI report and the TUI.
pub fn format_wait_hint(hint: &WaitHint) -> String {
    match hint.days {
        0 => format!("Already at {} or below.", hint.target),
        1 => format!("Wait 1 day to reach {}.", hint.target),
        n => format!("Wait {n} days to reach {}.", hint.target),
    }
}

/// Format a decay schedule as a table. The row matching the request's own
/// position is marked with `*`.
pub fn format_schedule(schedule: &DecaySchedule) -> String {
    let mut out = String::new();
    let current_days = schedule.request.days_remaining;

    out.push_str(
        format!(
            "  {:>8} {:>16} {:>16} {:<8}\n",
            "days", "penalty", "net", "severity"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("  {:-<8} {:-<16} {:-<16} {:-<8}\n", "", "", "", "").trim_end());
    out.push('\n');

    for p in &schedule.points {
        let mark = if p.days_remaining == current_days { "*" } else { " " };
        out.push_str(
            format!(
                "{mark} {:>8} {:>16} {:>16} {:<8}\n",
                p.days_remaining,
                fmt_money(p.penalty_amount),
                fmt_money(p.net_withdrawal),
                p.severity.as_str(),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the batch summary block.
pub fn format_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();

    out.push_str("=== penalty - batch summary ===\n");
    out.push_str(&format!(
        "Rows: computed={} | failed={} | skipped={}\n",
        summary.computed, summary.failed, summary.skipped
    ));
    out.push_str("Severity:");
    for s in Severity::ALL {
        out.push_str(&format!(" {}={}", s.as_str(), summary.count(s)));
    }
    out.push('\n');
    out.push_str(&format!("Total principal: {}\n", fmt_money(summary.total_principal)));
    out.push_str(&format!("Total penalty:   {}\n", fmt_money(summary.total_penalty)));
    out.push_str(&format!("Total net:       {}\n", fmt_money(summary.total_net)));
    if let Some(v) = summary.mean_effective_percent {
        out.push_str(&format!("Mean effective rate: {}%\n", fmt_pct(v)));
    }
    if let Some(v) = summary.aggregate_penalty_percent {
        out.push_str(&format!("Aggregate penalty:   {}% of principal\n", fmt_pct(v)));
    }

    out
}

/// Format the per-row outcome table.
pub fn format_outcomes(outcomes: &[BatchOutcome]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<16} {:>6} {:>16} {:>16} {:>10} {:<8}\n",
            "id", "line", "principal", "penalty", "eff_%", "severity"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<16} {:-<6} {:-<16} {:-<16} {:-<10} {:-<8}\n", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for o in outcomes {
        let line = match &o.result {
            Ok(r) => format!(
                "{:<16} {:>6} {:>16} {:>16} {:>10} {:<8}\n",
                truncate(&o.id, 16),
                o.line,
                fmt_money(o.request.principal),
                fmt_money(r.penalty_amount),
                fmt_pct(r.effective_penalty_percent),
                r.severity.as_str(),
            ),
            Err(e) => format!(
                "{:<16} {:>6} {:>16} error: {e}\n",
                truncate(&o.id, 16),
                o.line,
                fmt_money(o.request.principal),
            ),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Format ingest errors, one per line.
pub fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = String::new();
    for e in errors {
        match &e.id {
            Some(id) => out.push_str(&format!("line {} ({id}): {}\n", e.line, e.message)),
            None => out.push_str(&format!("line {}: {}\n", e.line, e.message)),
        }
    }
    out
}

/// Amounts at full engine precision, trailing zeros dropped but never fewer
/// than two decimals.
pub fn fmt_money(v: Decimal) -> String {
    let v = v.normalize();
    if v.scale() < 2 {
        format!("{v:.2}")
    } else {
        v.to_string()
    }
}

/// Percentages show up to four decimals with trailing zeros dropped.
pub fn fmt_pct(v: Decimal) -> String {
    v.round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
        .normalize()
        .to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute_penalty, decay_schedule};
    use rust_decimal_macros::dec;

    #[test]
    fn money_and_percent_formatting() {
        assert_eq!(fmt_money(dec!(1000)), "1000.00");
        assert_eq!(fmt_money(dec!(18.75)), "18.75");
        assert_eq!(fmt_money(dec!(5.0000)), "5.00");
        assert_eq!(fmt_money(dec!(0.125)), "0.125");
        assert_eq!(fmt_money(dec!(0.000000000000000001)), "0.000000000000000001");
        assert_eq!(fmt_pct(dec!(1.87500000)), "1.875");
        assert_eq!(fmt_pct(dec!(33.333333333)), "33.3333");
    }

    #[test]
    fn estimate_report_contains_key_lines() {
        let req = PenaltyRequest::new(dec!(1000), dec!(2.5), 90, 120);
        let res = compute_penalty(&req).unwrap();
        let hints = [WaitHint {
            target: Severity::Low,
            days: 0,
        }];
        let text = format_estimate(&req, &res, &EngineConfig::default(), &hints);
        assert!(text.contains("Days remaining:   90 of 120"));
        assert!(text.contains("- penalty          : 18.75"));
        assert!(text.contains("- net withdrawal   : 981.25"));
        assert!(text.contains("- severity         : Low"));
        assert!(text.contains("Already at Low or below."));
    }

    #[test]
    fn estimate_report_keeps_sub_cent_amounts() {
        let req = PenaltyRequest::new(dec!(1.0), dec!(10), 30, 365);
        let res = compute_penalty(&req).unwrap();
        let text = format_estimate(&req, &res, &EngineConfig::default(), &[]);
        assert!(text.contains("- penalty          : 0.00821917808219178"));
        assert!(text.contains("- net withdrawal   : 0.9917808219178082"));
    }

    #[test]
    fn wait_hint_wording() {
        let hint = |days| WaitHint {
            target: Severity::Medium,
            days,
        };
        assert_eq!(format_wait_hint(&hint(1)), "Wait 1 day to reach Medium.");
        assert_eq!(format_wait_hint(&hint(12)), "Wait 12 days to reach Medium.");
    }

    #[test]
    fn schedule_marks_current_row() {
        let req = PenaltyRequest::new(dec!(100), dec!(10), 5, 10);
        let schedule = decay_schedule(&req, 5, &EngineConfig::default()).unwrap();
        let text = format_schedule(&schedule);
        let marked: Vec<&str> = text.lines().filter(|l| l.starts_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("5.00"));
        assert_eq!(text.lines().count(), 2 + schedule.points.len());
    }

    #[test]
    fn summary_lists_every_severity() {
        let summary = BatchSummary {
            computed: 3,
            by_severity: [1, 1, 1],
            ..BatchSummary::default()
        };
        let text = format_summary(&summary);
        assert!(text.contains("computed=3"));
        assert!(text.contains("Low=1 Medium=1 High=1"));
        assert!(!text.contains("Mean effective"));
    }

    #[test]
    fn outcomes_show_errors_inline() {
        let req = PenaltyRequest::new(dec!(0), dec!(10), 5, 10);
        let outcomes = vec![BatchOutcome {
            line: 2,
            id: "a-very-long-identifier-here".into(),
            request: req,
            result: compute_penalty(&req),
        }];
        let text = format_outcomes(&outcomes);
        let row = text.lines().nth(2).unwrap();
        assert!(row.starts_with("a-very-long-ide."));
        assert!(row.contains("error: invalid input: principal must be greater than zero"));
    }

    #[test]
    fn row_errors_include_id_when_known() {
        let errors = vec![
            RowError {
                line: 3,
                id: Some("x1".into()),
                message: "bad".into(),
            },
            RowError {
                line: 4,
                id: None,
                message: "worse".into(),
            },
        ];
        assert_eq!(format_row_errors(&errors), "line 3 (x1): bad\nline 4: worse\n");
    }
}
