//! listing-relay library
//!
//! Page automation for relaying an Amazon product into an eBay listing:
//! classification, per-page step machines, image handoff and item specifics.

pub mod cli;
pub mod config;
pub mod errors;
pub mod pages;

pub use config::RelayConfig;
pub use errors::AutomationError;
pub use pages::{classify_url, dispatch, PageContext, PageKind, PageOutcome};
