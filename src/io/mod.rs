//! Input/output helpers.
//!
//! - field parsing shared by every loosely-typed surface (`fields`)
//! - JSON request/response contract (`json`)
//! - CSV batch ingest + validation (`ingest`)
//! - result and schedule exports (`export`)

pub mod export;
pub mod fields;
pub mod ingest;
pub mod json;

pub use export::*;
pub use fields::*;
pub use ingest::*;
pub use json::*;
