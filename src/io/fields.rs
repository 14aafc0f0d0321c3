//! Field parsing shared by the JSON contract and CSV batch ingest.
//!
//! Both surfaces receive loosely-typed values (JSON numbers/strings, CSV text).
//! A `RequestDraft` holds each field's parse outcome so that every problem,
//! type-level or value-level, is reported in one go.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::{EngineConfig, Field, PenaltyRequest};
use crate::engine::{FieldError, FieldErrorKind, PenaltyError, days_from_decimal, validate};

type FieldResult<T> = Result<T, FieldErrorKind>;

/// Parse a decimal from text (`"1.5"`, `"1e-3"`).
pub fn parse_decimal_text(text: &str) -> FieldResult<Decimal> {
    let t = text.trim();
    if t.is_empty() {
        return Err(FieldErrorKind::Missing);
    }
    if let Ok(d) = Decimal::from_str(t) {
        return Ok(d);
    }
    if let Ok(d) = Decimal::from_scientific(t) {
        return Ok(d);
    }
    match t.parse::<f64>() {
        Ok(f) if !f.is_finite() => Err(FieldErrorKind::NotFinite),
        Ok(_) => Err(FieldErrorKind::OutOfRange),
        Err(_) => Err(FieldErrorKind::NotNumeric),
    }
}

/// Parse a whole day count from text.
pub fn parse_days_text(text: &str) -> FieldResult<u32> {
    days_from_decimal(parse_decimal_text(text)?)
}

/// Decimal from a JSON value. Numeric strings are accepted.
pub fn decimal_from_json(value: Option<&Value>) -> FieldResult<Decimal> {
    match value {
        None | Some(Value::Null) => Err(FieldErrorKind::Missing),
        Some(Value::Number(n)) => parse_decimal_text(&n.to_string()),
        Some(Value::String(s)) => parse_decimal_text(s),
        Some(_) => Err(FieldErrorKind::NotNumeric),
    }
}

/// Whole day count from a JSON value.
pub fn days_from_json(value: Option<&Value>) -> FieldResult<u32> {
    days_from_decimal(decimal_from_json(value)?)
}

/// Per-field parse outcomes of a request that has not been validated yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDraft {
    pub principal: FieldResult<Decimal>,
    pub penalty_rate_percent: FieldResult<Decimal>,
    pub days_remaining: FieldResult<u32>,
    pub total_maturity_days: FieldResult<u32>,
}

impl RequestDraft {
    pub fn from_text(principal: &str, rate: &str, days_remaining: &str, total_maturity_days: &str) -> Self {
        Self {
            principal: parse_decimal_text(principal),
            penalty_rate_percent: parse_decimal_text(rate),
            days_remaining: parse_days_text(days_remaining),
            total_maturity_days: parse_days_text(total_maturity_days),
        }
    }

    /// Finish the draft.
    ///
    /// If every field parsed, the typed request is returned as-is (the engine
    /// validates values when it computes). Otherwise the error lists the parse
    /// failures together with value-level problems of the fields that did
    /// parse, ordered by field.
    pub fn finish(self, config: &EngineConfig) -> Result<PenaltyRequest, PenaltyError> {
        if let (Ok(p), Ok(r), Ok(d), Ok(t)) = (
            self.principal,
            self.penalty_rate_percent,
            self.days_remaining,
            self.total_maturity_days,
        ) {
            return Ok(PenaltyRequest::new(p, r, d, t));
        }

        let mut errors: Vec<FieldError> = [
            (Field::Principal, self.principal.err()),
            (Field::PenaltyRatePercent, self.penalty_rate_percent.err()),
            (Field::DaysRemaining, self.days_remaining.err()),
            (Field::TotalMaturityDays, self.total_maturity_days.err()),
        ]
        .into_iter()
        .filter_map(|(field, kind)| kind.map(|k| FieldError::new(field, k)))
        .collect();

        // Stand-ins that can never fail validation on their own.
        let patched = PenaltyRequest::new(
            self.principal.unwrap_or(Decimal::ONE),
            self.penalty_rate_percent.unwrap_or(Decimal::ZERO),
            self.days_remaining.unwrap_or(0),
            self.total_maturity_days.unwrap_or(u32::MAX),
        );
        if let Err(err) = validate(&patched, config) {
            let failed: Vec<Field> = errors.iter().map(|e| e.field).collect();
            errors.extend(
                err.field_errors()
                    .iter()
                    .filter(|e| !failed.contains(&e.field))
                    .copied(),
            );
        }

        errors.sort_by_key(|e| e.field);
        Err(PenaltyError::InvalidInput(errors))
    }
}
