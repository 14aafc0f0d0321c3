//! Linear time-decayed early-withdrawal penalty.
//!
//! The nominal rate applies in full when withdrawing at inception and decays
//! linearly to zero at maturity:
//!
//! ```text
//! time_ratio      = days_remaining / total_maturity_days
//! adjusted_pct    = penalty_rate_percent * time_ratio
//! penalty_amount  = principal * adjusted_pct / 100
//! net_withdrawal  = principal - penalty_amount
//! ```
//!
//! All arithmetic is checked `Decimal`; the penalty is rounded once, to
//! `EngineConfig::amount_scale`, and the net amount is derived from the rounded
//! value so the two always sum back to the principal. The effective rate and
//! severity are taken from the unrounded penalty.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::domain::{EngineConfig, PenaltyRequest, PenaltyResult};
use crate::engine::{PenaltyError, classify_severity_with, validate};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Compute a penalty estimate with the default configuration.
pub fn compute_penalty(request: &PenaltyRequest) -> Result<PenaltyResult, PenaltyError> {
    compute_penalty_with(request, &EngineConfig::default())
}

/// Compute a penalty estimate.
pub fn compute_penalty_with(
    request: &PenaltyRequest,
    config: &EngineConfig,
) -> Result<PenaltyResult, PenaltyError> {
    config.validate()?;
    let request = validate(request, config)?;
    let result = compute_validated(&request, config)?;

    debug!(
        principal = %request.principal,
        rate = %request.penalty_rate_percent,
        days_remaining = request.days_remaining,
        total_maturity_days = request.total_maturity_days,
        penalty = %result.penalty_amount,
        severity = %result.severity,
        "computed penalty"
    );

    Ok(result)
}

/// Arithmetic only; `request` must already have passed `validate`.
pub(crate) fn compute_validated(
    request: &PenaltyRequest,
    config: &EngineConfig,
) -> Result<PenaltyResult, PenaltyError> {
    let days = Decimal::from(request.days_remaining);
    let total = Decimal::from(request.total_maturity_days);

    let time_ratio = days.checked_div(total).ok_or(PenaltyError::Overflow("time ratio"))?;
    let adjusted_penalty_percent = request
        .penalty_rate_percent
        .checked_mul(time_ratio)
        .ok_or(PenaltyError::Overflow("adjusted penalty percent"))?;

    // Multiplying first keeps full precision; dividing first keeps principals
    // near `Decimal::MAX` in range.
    let exact_penalty = request
        .principal
        .checked_mul(adjusted_penalty_percent)
        .and_then(|v| v.checked_div(HUNDRED))
        .or_else(|| {
            adjusted_penalty_percent
                .checked_div(HUNDRED)
                .and_then(|pct| request.principal.checked_mul(pct))
        })
        .ok_or(PenaltyError::Overflow("penalty amount"))?;
    let penalty_amount =
        exact_penalty.round_dp_with_strategy(config.amount_scale, RoundingStrategy::MidpointNearestEven);

    let net_withdrawal = request
        .principal
        .checked_sub(penalty_amount)
        .ok_or(PenaltyError::Overflow("net withdrawal"))?;

    // Ratio and severity use the unrounded penalty so amounts below one unit
    // at `amount_scale` still classify by the rate the saver faces.
    let effective_penalty_percent = exact_penalty
        .checked_div(request.principal)
        .and_then(|v| v.checked_mul(HUNDRED))
        .ok_or(PenaltyError::Overflow("effective penalty percent"))?;

    let maturity_progress_percent = days
        .checked_div(total)
        .and_then(|v| v.checked_mul(HUNDRED))
        .ok_or(PenaltyError::Overflow("maturity progress percent"))?;

    let severity = classify_severity_with(exact_penalty, request.principal, &config.thresholds)?;

    Ok(PenaltyResult {
        time_ratio,
        adjusted_penalty_percent,
        penalty_amount: penalty_amount.normalize(),
        net_withdrawal: net_withdrawal.normalize(),
        effective_penalty_percent,
        maturity_progress_percent,
        severity,
    })
}
