//! Severity classification of a penalty relative to its principal.

use rust_decimal::Decimal;

use crate::domain::{Field, Severity, SeverityThresholds};
use crate::engine::{FieldError, FieldErrorKind, PenaltyError};

/// Classify with the default 5% / 15% thresholds.
pub fn classify_severity(penalty_amount: Decimal, principal: Decimal) -> Result<Severity, PenaltyError> {
    classify_severity_with(penalty_amount, principal, &SeverityThresholds::default())
}

/// Classify `penalty_amount / principal` against `thresholds`.
///
/// Comparisons are strict-less-than against each tier's upper bound, so a
/// ratio equal to a threshold lands in the higher tier.
pub fn classify_severity_with(
    penalty_amount: Decimal,
    principal: Decimal,
    thresholds: &SeverityThresholds,
) -> Result<Severity, PenaltyError> {
    let mut errors = Vec::new();
    if principal <= Decimal::ZERO {
        let kind = if principal.is_zero() {
            FieldErrorKind::DivisionUndefined
        } else {
            FieldErrorKind::Negative
        };
        errors.push(FieldError::new(Field::Principal, kind));
    }
    if penalty_amount < Decimal::ZERO {
        errors.push(FieldError::new(Field::PenaltyAmount, FieldErrorKind::Negative));
    }
    if !errors.is_empty() {
        return Err(PenaltyError::InvalidInput(errors));
    }

    let ratio = penalty_amount
        .checked_div(principal)
        .ok_or(PenaltyError::Overflow("penalty ratio"))?;

    Ok(if ratio < thresholds.medium {
        Severity::Low
    } else if ratio < thresholds.high {
        Severity::Medium
    } else {
        Severity::High
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn boundaries_promote_to_higher_tier() {
        assert_eq!(classify_severity(dec!(5), dec!(100)).unwrap(), Severity::Medium);
        assert_eq!(classify_severity(dec!(15), dec!(100)).unwrap(), Severity::High);
        assert_eq!(classify_severity(dec!(0.049999), dec!(1)).unwrap(), Severity::Low);
        assert_eq!(classify_severity(dec!(0.149999), dec!(1)).unwrap(), Severity::Medium);
    }

    #[test]
    fn zero_penalty_is_low() {
        assert_eq!(classify_severity(Decimal::ZERO, dec!(10)).unwrap(), Severity::Low);
    }

    #[test]
    fn penalty_above_principal_is_high() {
        assert_eq!(classify_severity(dec!(3), dec!(2)).unwrap(), Severity::High);
    }

    #[test]
    fn non_positive_principal_fails() {
        let err = classify_severity(dec!(1), Decimal::ZERO).unwrap_err();
        assert!(err.is_division_undefined());

        let err = classify_severity(dec!(1), dec!(-5)).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(!err.is_division_undefined());
    }

    #[test]
    fn negative_penalty_fails() {
        let err = classify_severity(dec!(-0.01), dec!(1)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn custom_thresholds() {
        let thresholds = SeverityThresholds {
            medium: dec!(0.01),
            high: dec!(0.02),
        };
        assert_eq!(classify_severity_with(dec!(0.5), dec!(100), &thresholds).unwrap(), Severity::Low);
        assert_eq!(classify_severity_with(dec!(1), dec!(100), &thresholds).unwrap(), Severity::Medium);
        assert_eq!(classify_severity_with(dec!(2), dec!(100), &thresholds).unwrap(), Severity::High);
    }
}
