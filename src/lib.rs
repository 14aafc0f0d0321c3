//! `savings-penalty` library crate.
//!
//! The binary (`penalty`) is a thin wrapper around this library so that:
//!
//! - the engine is testable without spawning processes
//! - the JSON contract can be embedded by other hosts
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
