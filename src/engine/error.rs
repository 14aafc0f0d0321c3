//! Engine error taxonomy.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::Field;

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldErrorKind {
    Missing,
    NotNumeric,
    NotFinite,
    NotInteger,
    Negative,
    NotPositive,
    OutOfRange,
    ExceedsMaturity,
    /// The value would make a ratio in the calculation undefined (x / 0).
    DivisionUndefined,
}

/// One rejected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldError {
    pub field: Field,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: Field, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }

    /// Human-readable message naming the field.
    pub fn message(&self) -> String {
        let field = self.field;
        match self.kind {
            FieldErrorKind::Missing => format!("{field} is required"),
            FieldErrorKind::NotNumeric => format!("{field} must be a number"),
            FieldErrorKind::NotFinite => format!("{field} must be a finite number"),
            FieldErrorKind::NotInteger => format!("{field} must be a whole number of days"),
            FieldErrorKind::Negative => format!("{field} must not be negative"),
            FieldErrorKind::NotPositive | FieldErrorKind::DivisionUndefined => {
                format!("{field} must be greater than zero")
            }
            FieldErrorKind::OutOfRange => format!("{field} is out of range"),
            FieldErrorKind::ExceedsMaturity => {
                format!("{field} must not exceed {}", Field::TotalMaturityDays)
            }
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PenaltyError {
    /// One or more inputs were rejected. Never empty.
    #[error("invalid input: {}", join_messages(.0))]
    InvalidInput(Vec<FieldError>),

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl PenaltyError {
    pub fn field(field: Field, kind: FieldErrorKind) -> Self {
        PenaltyError::InvalidInput(vec![FieldError::new(field, kind)])
    }

    /// Field errors carried by an `InvalidInput`, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            PenaltyError::InvalidInput(errors) => errors,
            _ => &[],
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PenaltyError::InvalidInput(_))
    }

    /// True when any rejected field would have caused a division by zero.
    pub fn is_division_undefined(&self) -> bool {
        self.field_errors()
            .iter()
            .any(|e| e.kind == FieldErrorKind::DivisionUndefined)
    }

    /// Stable name of the top-level kind (used by the JSON error body).
    pub fn kind_name(&self) -> &'static str {
        match self {
            PenaltyError::InvalidInput(_) => "InvalidInput",
            PenaltyError::Overflow(_) => "Overflow",
            PenaltyError::InvalidArgument(_) => "InvalidArgument",
        }
    }
}

fn join_messages(errors: &[FieldError]) -> String {
    let parts: Vec<String> = errors.iter().map(FieldError::message).collect();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_field() {
        let err = PenaltyError::InvalidInput(vec![
            FieldError::new(Field::Principal, FieldErrorKind::DivisionUndefined),
            FieldError::new(Field::DaysRemaining, FieldErrorKind::Missing),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid input: principal must be greater than zero; daysRemaining is required"
        );
        assert!(err.is_division_undefined());
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn overflow_is_not_an_input_error() {
        let err = PenaltyError::Overflow("penalty amount");
        assert!(!err.is_invalid_input());
        assert!(!err.is_division_undefined());
        assert!(err.field_errors().is_empty());
        assert_eq!(err.kind_name(), "Overflow");
    }

    #[test]
    fn exceeds_maturity_message_names_both_fields() {
        let e = FieldError::new(Field::DaysRemaining, FieldErrorKind::ExceedsMaturity);
        assert_eq!(e.to_string(), "daysRemaining must not exceed totalMaturityDays");
    }
}
