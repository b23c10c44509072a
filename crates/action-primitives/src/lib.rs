//! Shared action vocabulary
//!
//! This crate holds the pieces every interaction component agrees on:
//! - typed selector strategies and anchors
//! - expected observable effects used to verify an interaction
//! - the single bounded wait primitive (`poll_until`)
//! - per-strategy attempt logs and action reports

pub mod errors;
pub mod types;
mod waiting;

pub use errors::*;
pub use types::*;
pub use waiting::*;
