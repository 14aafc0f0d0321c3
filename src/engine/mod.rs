//! Penalty estimation engine.
//!
//! Pure functions only: no I/O, no clocks, no randomness. Every front-end
//! (CLI, JSON, batch, TUI) goes through here.

pub mod error;
pub mod penalty;
pub mod schedule;
pub mod severity;
pub mod validate;

pub use error::*;
pub use penalty::{compute_penalty, compute_penalty_with};
pub use schedule::*;
pub use severity::*;
pub use validate::*;
