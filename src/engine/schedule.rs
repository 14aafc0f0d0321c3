//! Penalty over time: decay schedules and "how long until it gets cheaper".

use crate::domain::{DecaySchedule, EngineConfig, PenaltyRequest, SchedulePoint, Severity};
use crate::engine::penalty::compute_validated;
use crate::engine::{PenaltyError, validate};

/// Upper bound on schedule length; keeps a 1-day step over a huge term from
/// allocating without limit.
pub const MAX_SCHEDULE_POINTS: usize = 100_000;

/// Penalty at `total, total - step, ..., 0` days remaining.
///
/// Both endpoints are always present, days strictly decrease and the penalty
/// never increases along the schedule.
pub fn decay_schedule(
    request: &PenaltyRequest,
    step_days: u32,
    config: &EngineConfig,
) -> Result<DecaySchedule, PenaltyError> {
    config.validate()?;
    if step_days == 0 {
        return Err(PenaltyError::InvalidArgument("schedule step must be at least 1 day".into()));
    }
    let request = validate(request, config)?;

    let total = request.total_maturity_days;
    let n_points = (total / step_days) as usize + 2;
    if n_points > MAX_SCHEDULE_POINTS {
        return Err(PenaltyError::InvalidArgument(format!(
            "schedule step of {step_days} day(s) over {total} days exceeds {MAX_SCHEDULE_POINTS} points"
        )));
    }

    let mut points = Vec::with_capacity(n_points);
    let mut days = total;
    loop {
        let r = compute_validated(&request.at_days_remaining(days), config)?;
        points.push(SchedulePoint {
            days_remaining: days,
            penalty_amount: r.penalty_amount,
            net_withdrawal: r.net_withdrawal,
            severity: r.severity,
        });
        if days == 0 {
            break;
        }
        days = days.saturating_sub(step_days);
    }

    let current = compute_validated(&request, config)?;

    Ok(DecaySchedule {
        request,
        points,
        current,
    })
}

/// Minimum number of days to wait until the estimate is at most `target`.
///
/// Waiting one day reduces `days_remaining` by one. Severity is monotone in
/// days remaining, so this is a binary search; withdrawing at maturity always
/// classifies as `Low`.
pub fn waiting_days_for(
    request: &PenaltyRequest,
    target: Severity,
    config: &EngineConfig,
) -> Result<u32, PenaltyError> {
    config.validate()?;
    let request = validate(request, config)?;
    let severity_at =
        |days: u32| compute_validated(&request.at_days_remaining(days), config).map(|r| r.severity);

    let days = request.days_remaining;
    if severity_at(days)? <= target {
        return Ok(0);
    }

    // Invariant: severity_at(lo) <= target < severity_at(hi).
    let (mut lo, mut hi) = (0u32, days);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if severity_at(mid)? <= target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(days - lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_penalty;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn schedule_includes_both_endpoints() {
        let req = PenaltyRequest::new(dec!(100), dec!(10), 45, 100);
        let s = decay_schedule(&req, 30, &EngineConfig::default()).unwrap();
        let days: Vec<u32> = s.points.iter().map(|p| p.days_remaining).collect();
        assert_eq!(days, vec![100, 70, 40, 10, 0]);
        assert_eq!(s.points[0].penalty_amount, dec!(10));
        assert_eq!(s.points.last().unwrap().penalty_amount, Decimal::ZERO);
        assert_eq!(s.current, compute_penalty(&req).unwrap());
    }

    #[test]
    fn schedule_penalty_never_increases() {
        let req = PenaltyRequest::new(dec!(3.75), dec!(17.5), 200, 365);
        let s = decay_schedule(&req, 7, &EngineConfig::default()).unwrap();
        for pair in s.points.windows(2) {
            assert!(pair[0].days_remaining > pair[1].days_remaining);
            assert!(pair[0].penalty_amount >= pair[1].penalty_amount);
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn zero_step_is_rejected() {
        let req = PenaltyRequest::new(dec!(1), dec!(1), 1, 1);
        assert!(matches!(
            decay_schedule(&req, 0, &EngineConfig::default()),
            Err(PenaltyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn oversized_schedule_is_rejected() {
        let req = PenaltyRequest::new(dec!(1), dec!(1), 0, u32::MAX);
        assert!(matches!(
            decay_schedule(&req, 1, &EngineConfig::default()),
            Err(PenaltyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn waiting_days_reaches_the_exact_boundary() {
        // 20% nominal over 100 days: ratio = 0.2 * d / 100.
        // High needs d >= 75, Medium needs d >= 25.
        let req = PenaltyRequest::new(dec!(1000), dec!(20), 90, 100);
        let config = EngineConfig::default();
        assert_eq!(compute_penalty(&req).unwrap().severity, Severity::High);

        assert_eq!(waiting_days_for(&req, Severity::High, &config).unwrap(), 0);
        // d = 74 -> ratio 0.148 (Medium)
        assert_eq!(waiting_days_for(&req, Severity::Medium, &config).unwrap(), 16);
        // d = 24 -> ratio 0.048 (Low)
        assert_eq!(waiting_days_for(&req, Severity::Low, &config).unwrap(), 66);
    }

    #[test]
    fn waiting_days_propagates_validation_errors() {
        let req = PenaltyRequest::new(dec!(0), dec!(20), 90, 100);
        let err = waiting_days_for(&req, Severity::Low, &EngineConfig::default()).unwrap_err();
        assert!(err.is_division_undefined());
    }
}
