//! Domain types used throughout the engine and its front-ends.
//!
//! This module defines:
//!
//! - request/result value types (`PenaltyRequest`, `PenaltyResult`, `Severity`)
//! - engine configuration (`EngineConfig`, `OverrunPolicy`, `SeverityThresholds`)
//! - calendar helpers for deriving day counts (`MaturityTerm`)

pub mod config;
pub mod term;
pub mod types;

pub use config::*;
pub use term::*;
pub use types::*;
