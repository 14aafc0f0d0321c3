//! JSON request/response contract.
//!
//! Request:
//!
//! ```json
//! { "principal": 1.0, "penaltyRatePercent": 10, "daysRemaining": 30, "totalMaturityDays": 365 }
//! ```
//!
//! Response:
//!
//! ```json
//! { "penaltyAmount": 0.0082, "netWithdrawal": 0.9918, "effectivePenaltyPercent": 0.82,
//!   "maturityProgressPercent": 8.22, "severity": "Low" }
//! ```
//!
//! Errors come back as `{ "error": { "kind", "message", "fields": [...] } }`.

use std::io::{Read, Write};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{EngineConfig, Field, PenaltyResult, Severity};
use crate::engine::{FieldError, FieldErrorKind, PenaltyError, compute_penalty_with};
use crate::error::AppError;
use crate::io::fields::{RequestDraft, days_from_json, decimal_from_json};

/// Request body with every field kept loosely typed until validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPenaltyRequest {
    #[serde(default)]
    pub principal: Option<Value>,
    #[serde(default)]
    pub penalty_rate_percent: Option<Value>,
    #[serde(default)]
    pub days_remaining: Option<Value>,
    #[serde(default)]
    pub total_maturity_days: Option<Value>,
}

impl RawPenaltyRequest {
    pub fn draft(&self) -> RequestDraft {
        RequestDraft {
            principal: decimal_from_json(self.principal.as_ref()),
            penalty_rate_percent: decimal_from_json(self.penalty_rate_percent.as_ref()),
            days_remaining: days_from_json(self.days_remaining.as_ref()),
            total_maturity_days: days_from_json(self.total_maturity_days.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub penalty_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_withdrawal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub effective_penalty_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub maturity_progress_percent: Decimal,
    pub severity: Severity,
}

impl From<&PenaltyResult> for PenaltyResponse {
    fn from(r: &PenaltyResult) -> Self {
        Self {
            penalty_amount: r.penalty_amount,
            net_withdrawal: r.net_withdrawal,
            effective_penalty_percent: r.effective_penalty_percent,
            maturity_progress_percent: r.maturity_progress_percent,
            severity: r.severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldErrorBody {
    pub field: Field,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl From<&FieldError> for FieldErrorBody {
    fn from(e: &FieldError) -> Self {
        Self {
            field: e.field,
            kind: e.kind,
            message: e.message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    pub fields: Vec<FieldErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl From<&PenaltyError> for ErrorResponse {
    fn from(err: &PenaltyError) -> Self {
        Self {
            error: ErrorBody {
                kind: err.kind_name(),
                message: err.to_string(),
                fields: err.field_errors().iter().map(FieldErrorBody::from).collect(),
            },
        }
    }
}

impl ErrorResponse {
    fn malformed(message: String) -> Self {
        Self {
            error: ErrorBody {
                kind: "MalformedRequest",
                message,
                fields: Vec::new(),
            },
        }
    }

    /// Exit code the CLI uses when it emits this error.
    pub fn exit_code(&self) -> u8 {
        match self.error.kind {
            "Overflow" => 4,
            _ => 2,
        }
    }
}

/// Evaluate one JSON request body.
pub fn evaluate_json(body: &str, config: &EngineConfig) -> Result<PenaltyResponse, ErrorResponse> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ErrorResponse::malformed(format!("request is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(ErrorResponse::malformed("request must be a JSON object".to_string()));
    }
    let raw: RawPenaltyRequest = serde_json::from_value(value)
        .map_err(|e| ErrorResponse::malformed(format!("request has an unexpected shape: {e}")))?;

    let request = raw.draft().finish(config).map_err(|e| ErrorResponse::from(&e))?;
    let result = compute_penalty_with(&request, config).map_err(|e| ErrorResponse::from(&e))?;
    Ok(PenaltyResponse::from(&result))
}

/// Read a request from `reader`, write the response (or error body) to `writer`.
///
/// The error body is written before the `AppError` is returned, so callers
/// always get a JSON document on the output stream.
pub fn respond<R: Read, W: Write>(mut reader: R, mut writer: W, config: &EngineConfig) -> Result<(), AppError> {
    let mut body = String::new();
    reader
        .read_to_string(&mut body)
        .map_err(|e| AppError::new(2, format!("Failed to read JSON request: {e}")))?;

    let outcome = evaluate_json(&body, config);
    let written = match &outcome {
        Ok(response) => serde_json::to_writer_pretty(&mut writer, response),
        Err(error) => serde_json::to_writer_pretty(&mut writer, error),
    };
    written.map_err(|e| AppError::new(2, format!("Failed to write JSON response: {e}")))?;
    writeln!(writer).map_err(|e| AppError::new(2, format!("Failed to write JSON response: {e}")))?;

    match outcome {
        Ok(_) => Ok(()),
        Err(error) => Err(AppError::new(error.exit_code(), error.error.message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn computes_a_valid_request() {
        let body = r#"{"principal": 1.0, "penaltyRatePercent": 10, "daysRemaining": 30, "totalMaturityDays": 365}"#;
        let response = evaluate_json(body, &EngineConfig::default()).unwrap();
        assert_eq!(response.severity, Severity::Low);

        let v = serde_json::to_value(&response).unwrap();
        let penalty = v["penaltyAmount"].as_f64().unwrap();
        assert!((penalty - 0.008219).abs() < 1e-6);
        assert!((v["netWithdrawal"].as_f64().unwrap() - 0.991781).abs() < 1e-6);
        assert_eq!(v["severity"], json!("Low"));
        assert_eq!(v.as_object().unwrap().len(), 5);
    }

    #[test]
    fn zero_principal_error_body() {
        let body = r#"{"principal": 0, "penaltyRatePercent": 10, "daysRemaining": 5, "totalMaturityDays": 10}"#;
        let err = evaluate_json(body, &EngineConfig::default()).unwrap_err();
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["error"]["kind"], json!("InvalidInput"));
        assert_eq!(v["error"]["fields"][0]["field"], json!("principal"));
        assert_eq!(v["error"]["fields"][0]["kind"], json!("DivisionUndefined"));
        assert_eq!(
            v["error"]["fields"][0]["message"],
            json!("principal must be greater than zero")
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn every_bad_field_is_named() {
        let body = r#"{"principal": "lots", "penaltyRatePercent": -1, "daysRemaining": 2.5}"#;
        let err = evaluate_json(body, &EngineConfig::default()).unwrap_err();
        let fields: Vec<Field> = err.error.fields.iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::Principal,
                Field::PenaltyRatePercent,
                Field::DaysRemaining,
                Field::TotalMaturityDays,
            ]
        );
        assert_eq!(err.error.fields[3].kind, FieldErrorKind::Missing);
    }

    #[test]
    fn malformed_bodies() {
        let err = evaluate_json("{not json", &EngineConfig::default()).unwrap_err();
        assert_eq!(err.error.kind, "MalformedRequest");
        let err = evaluate_json("[1, 2]", &EngineConfig::default()).unwrap_err();
        assert_eq!(err.error.kind, "MalformedRequest");
    }

    #[test]
    fn respond_writes_error_document_and_fails() {
        let input = br#"{"principal": 1, "penaltyRatePercent": 10, "daysRemaining": 400, "totalMaturityDays": 365}"#;
        let mut out = Vec::new();
        let err = respond(&input[..], &mut out, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let v: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["error"]["fields"][0]["kind"], json!("ExceedsMaturity"));
    }

    #[test]
    fn respond_writes_response() {
        let input = br#"{"principal": "2.0", "penaltyRatePercent": "20", "daysRemaining": 300, "totalMaturityDays": 365}"#;
        let mut out = Vec::new();
        respond(&input[..], &mut out, &EngineConfig::default()).unwrap();
        let v: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["severity"], json!("High"));
    }
}
