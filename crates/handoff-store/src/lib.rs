//! Cross-page handoff store.
//!
//! Two storage areas mirror the browser's per-extension storage: `Local`
//! carries the listing draft between page loads, `Sync` carries user
//! settings. Absent keys read as empty; nothing here assumes a key survives
//! the navigation that follows it.

pub mod draft;
pub mod errors;
pub mod keys;
pub mod store;

pub use draft::{DraftError, DraftStore, ListingDraft};
pub use errors::StoreError;
pub use store::{HandoffStore, JsonFileStore, MemoryStore, StorageArea};
