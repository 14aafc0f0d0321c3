//! Shared domain types.
//!
//! These types are intentionally kept small and `Copy` so they can be:
//!
//! - passed by value through the engine without allocation
//! - shared freely across rayon workers in batch mode
//! - converted to/from the JSON and CSV surfaces in `io`

use std::fmt;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input fields of a penalty request.
///
/// The `Display` form is the wire name used by the JSON contract, so error
/// messages read the same on every surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Principal,
    PenaltyRatePercent,
    DaysRemaining,
    TotalMaturityDays,
    /// Only an input to severity classification, never part of a request.
    PenaltyAmount,
}

impl Field {
    /// The four request fields, in wire order.
    pub const REQUEST: [Field; 4] = [
        Field::Principal,
        Field::PenaltyRatePercent,
        Field::DaysRemaining,
        Field::TotalMaturityDays,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Principal => "principal",
            Field::PenaltyRatePercent => "penaltyRatePercent",
            Field::DaysRemaining => "daysRemaining",
            Field::TotalMaturityDays => "totalMaturityDays",
            Field::PenaltyAmount => "penaltyAmount",
        }
    }

    /// Column name used by the batch CSV format.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Principal => "principal",
            Field::PenaltyRatePercent => "penalty_rate_percent",
            Field::DaysRemaining => "days_remaining",
            Field::TotalMaturityDays => "total_maturity_days",
            Field::PenaltyAmount => "penalty_amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Qualitative bucket for the penalty-to-principal ratio.
///
/// Variants are ordered so `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when `days_remaining` exceeds `total_maturity_days`.
///
/// A time ratio above 1 would charge more than the nominal rate, which is never
/// a meaningful estimate; the caller chooses whether that is an error or a
/// data-entry slip to be absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverrunPolicy {
    /// Reject the request with `ExceedsMaturity`.
    #[default]
    Reject,
    /// Treat the request as withdrawing at inception (full nominal penalty).
    Clamp,
}

impl OverrunPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(OverrunPolicy::Reject),
            "clamp" => Some(OverrunPolicy::Clamp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OverrunPolicy::Reject => "reject",
            OverrunPolicy::Clamp => "clamp",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            OverrunPolicy::Reject => OverrunPolicy::Clamp,
            OverrunPolicy::Clamp => OverrunPolicy::Reject,
        }
    }
}

/// Ratio thresholds separating the severity tiers.
///
/// `ratio < medium` is Low, `medium <= ratio < high` is Medium, everything
/// else is High.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityThresholds {
    pub medium: Decimal,
    pub high: Decimal,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            medium: Decimal::new(5, 2),
            high: Decimal::new(15, 2),
        }
    }
}

/// Inputs to a single penalty estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyRequest {
    /// Saved amount subject to the penalty.
    pub principal: Decimal,
    /// Nominal penalty rate, applied in full when withdrawing at inception.
    pub penalty_rate_percent: Decimal,
    pub days_remaining: u32,
    pub total_maturity_days: u32,
}

impl PenaltyRequest {
    pub fn new(
        principal: Decimal,
        penalty_rate_percent: Decimal,
        days_remaining: u32,
        total_maturity_days: u32,
    ) -> Self {
        Self {
            principal,
            penalty_rate_percent,
            days_remaining,
            total_maturity_days,
        }
    }

    /// Same request with a different `days_remaining`.
    pub fn at_days_remaining(self, days_remaining: u32) -> Self {
        Self {
            days_remaining,
            ..self
        }
    }
}

/// Output of a single penalty estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyResult {
    /// Fraction of the term still outstanding (1 = inception, 0 = maturity).
    pub time_ratio: Decimal,
    /// Nominal rate scaled by `time_ratio`.
    pub adjusted_penalty_percent: Decimal,
    pub penalty_amount: Decimal,
    pub net_withdrawal: Decimal,
    pub effective_penalty_percent: Decimal,
    /// `time_ratio` expressed as a percentage ("time to maturity").
    pub maturity_progress_percent: Decimal,
    pub severity: Severity,
}

/// One row of a decay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePoint {
    pub days_remaining: u32,
    pub penalty_amount: Decimal,
    pub net_withdrawal: Decimal,
    pub severity: Severity,
}

/// Penalty as a function of days remaining over a full term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecaySchedule {
    /// The request the schedule was built for (after overrun handling).
    pub request: PenaltyRequest,
    /// Points ordered from `total_maturity_days` down to `0`.
    pub points: Vec<SchedulePoint>,
    /// Estimate at the request's own `days_remaining`.
    pub current: PenaltyResult,
}

/// Outcome of one batch row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub line: usize,
    pub id: String,
    pub request: PenaltyRequest,
    pub result: Result<PenaltyResult, crate::engine::PenaltyError>,
}
