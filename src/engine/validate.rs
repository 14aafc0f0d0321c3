//! Input validation, kept separate from the arithmetic so front-ends can gate
//! on it without computing anything.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tracing::warn;

use crate::domain::{EngineConfig, Field, OverrunPolicy, PenaltyRequest};
use crate::engine::{FieldError, FieldErrorKind, PenaltyError};

/// Check every field and return the request the engine should compute.
///
/// All field errors are collected, not just the first. Under
/// `OverrunPolicy::Clamp` the returned request may differ from the input.
pub fn validate(request: &PenaltyRequest, config: &EngineConfig) -> Result<PenaltyRequest, PenaltyError> {
    let mut errors = Vec::new();
    let mut checked = *request;

    if request.principal.is_sign_negative() && !request.principal.is_zero() {
        errors.push(FieldError::new(Field::Principal, FieldErrorKind::Negative));
    } else if request.principal.is_zero() {
        // 0/0 only arises when there is a penalty to express as a share.
        let nominal_penalty = request.penalty_rate_percent > Decimal::ZERO && request.days_remaining > 0;
        let kind = if nominal_penalty {
            FieldErrorKind::DivisionUndefined
        } else {
            FieldErrorKind::NotPositive
        };
        errors.push(FieldError::new(Field::Principal, kind));
    }

    if request.penalty_rate_percent < Decimal::ZERO {
        errors.push(FieldError::new(Field::PenaltyRatePercent, FieldErrorKind::Negative));
    }

    if request.total_maturity_days == 0 {
        errors.push(FieldError::new(Field::TotalMaturityDays, FieldErrorKind::DivisionUndefined));
    } else if request.days_remaining > request.total_maturity_days {
        match config.overrun_policy {
            OverrunPolicy::Reject => {
                errors.push(FieldError::new(Field::DaysRemaining, FieldErrorKind::ExceedsMaturity));
            }
            OverrunPolicy::Clamp => {
                warn!(
                    days_remaining = request.days_remaining,
                    total_maturity_days = request.total_maturity_days,
                    "days remaining exceeds term; clamping to full term"
                );
                checked.days_remaining = request.total_maturity_days;
            }
        }
    }

    if errors.is_empty() {
        Ok(checked)
    } else {
        Err(PenaltyError::InvalidInput(errors))
    }
}

/// Convert a decimal day count into whole days.
pub fn days_from_decimal(value: Decimal) -> Result<u32, FieldErrorKind> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FieldErrorKind::Negative);
    }
    if !value.fract().is_zero() {
        return Err(FieldErrorKind::NotInteger);
    }
    value.to_u32().ok_or(FieldErrorKind::OutOfRange)
}

fn decimal_from_f64(field: Field, value: f64, errors: &mut Vec<FieldError>) -> Option<Decimal> {
    if !value.is_finite() {
        errors.push(FieldError::new(field, FieldErrorKind::NotFinite));
        return None;
    }
    match Decimal::from_f64(value) {
        Some(d) => Some(d),
        None => {
            errors.push(FieldError::new(field, FieldErrorKind::OutOfRange));
            None
        }
    }
}

fn days_from_f64(field: Field, value: f64, errors: &mut Vec<FieldError>) -> Option<u32> {
    let decimal = decimal_from_f64(field, value, errors)?;
    match days_from_decimal(decimal) {
        Ok(days) => Some(days),
        Err(kind) => {
            errors.push(FieldError::new(field, kind));
            None
        }
    }
}

impl PenaltyRequest {
    /// Build a request from float inputs (e.g. form sliders).
    ///
    /// Rejects non-finite values and fractional/negative day counts. Value
    /// constraints (positivity etc.) are left to `validate`.
    pub fn from_f64(
        principal: f64,
        penalty_rate_percent: f64,
        days_remaining: f64,
        total_maturity_days: f64,
    ) -> Result<Self, PenaltyError> {
        let mut errors = Vec::new();
        let principal = decimal_from_f64(Field::Principal, principal, &mut errors);
        let rate = decimal_from_f64(Field::PenaltyRatePercent, penalty_rate_percent, &mut errors);
        let days = days_from_f64(Field::DaysRemaining, days_remaining, &mut errors);
        let total = days_from_f64(Field::TotalMaturityDays, total_maturity_days, &mut errors);

        match (principal, rate, days, total) {
            (Some(p), Some(r), Some(d), Some(t)) if errors.is_empty() => Ok(Self::new(p, r, d, t)),
            _ => Err(PenaltyError::InvalidInput(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kinds(err: &PenaltyError) -> Vec<(Field, FieldErrorKind)> {
        err.field_errors().iter().map(|e| (e.field, e.kind)).collect()
    }

    #[test]
    fn valid_request_passes_through_unchanged() {
        let req = PenaltyRequest::new(dec!(1.5), dec!(10), 30, 365);
        assert_eq!(validate(&req, &EngineConfig::default()).unwrap(), req);
    }

    #[test]
    fn zero_principal_with_penalty_is_division_undefined() {
        let req = PenaltyRequest::new(dec!(0), dec!(10), 5, 10);
        let err = validate(&req, &EngineConfig::default()).unwrap_err();
        assert!(err.is_division_undefined());
        assert_eq!(kinds(&err), vec![(Field::Principal, FieldErrorKind::DivisionUndefined)]);
        assert!(err.to_string().contains("principal must be greater than zero"));
    }

    #[test]
    fn zero_principal_without_penalty_is_not_positive() {
        let req = PenaltyRequest::new(dec!(0), dec!(10), 0, 10);
        let err = validate(&req, &EngineConfig::default()).unwrap_err();
        assert_eq!(kinds(&err), vec![(Field::Principal, FieldErrorKind::NotPositive)]);
        assert!(!err.is_division_undefined());
    }

    #[test]
    fn collects_every_invalid_field() {
        let req = PenaltyRequest::new(dec!(-1), dec!(-0.5), 3, 0);
        let err = validate(&req, &EngineConfig::default()).unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![
                (Field::Principal, FieldErrorKind::Negative),
                (Field::PenaltyRatePercent, FieldErrorKind::Negative),
                (Field::TotalMaturityDays, FieldErrorKind::DivisionUndefined),
            ]
        );
    }

    #[test]
    fn overrun_rejected_by_default() {
        let req = PenaltyRequest::new(dec!(1), dec!(10), 400, 365);
        let err = validate(&req, &EngineConfig::default()).unwrap_err();
        assert_eq!(kinds(&err), vec![(Field::DaysRemaining, FieldErrorKind::ExceedsMaturity)]);
    }

    #[test]
    fn overrun_clamped_when_configured() {
        let config = EngineConfig {
            overrun_policy: OverrunPolicy::Clamp,
            ..EngineConfig::default()
        };
        let req = PenaltyRequest::new(dec!(1), dec!(10), 400, 365);
        let checked = validate(&req, &config).unwrap();
        assert_eq!(checked.days_remaining, 365);
        assert_eq!(checked.total_maturity_days, 365);
    }

    #[test]
    fn rate_above_hundred_is_accepted() {
        let req = PenaltyRequest::new(dec!(1), dec!(250), 10, 10);
        assert!(validate(&req, &EngineConfig::default()).is_ok());
    }

    #[test]
    fn days_from_decimal_rules() {
        assert_eq!(days_from_decimal(dec!(30)), Ok(30));
        assert_eq!(days_from_decimal(dec!(30.0)), Ok(30));
        assert_eq!(days_from_decimal(dec!(0)), Ok(0));
        assert_eq!(days_from_decimal(dec!(-1)), Err(FieldErrorKind::Negative));
        assert_eq!(days_from_decimal(dec!(1.5)), Err(FieldErrorKind::NotInteger));
        assert_eq!(days_from_decimal(dec!(5000000000)), Err(FieldErrorKind::OutOfRange));
    }

    #[test]
    fn from_f64_rejects_non_finite_and_fractional_days() {
        let err = PenaltyRequest::from_f64(f64::NAN, 10.0, 2.5, f64::INFINITY).unwrap_err();
        assert_eq!(
            kinds(&err),
            vec![
                (Field::Principal, FieldErrorKind::NotFinite),
                (Field::DaysRemaining, FieldErrorKind::NotInteger),
                (Field::TotalMaturityDays, FieldErrorKind::NotFinite),
            ]
        );
    }

    #[test]
    fn from_f64_accepts_plain_values() {
        let req = PenaltyRequest::from_f64(1.0, 10.0, 30.0, 365.0).unwrap();
        assert_eq!(req, PenaltyRequest::new(dec!(1), dec!(10), 30, 365));
    }
}
