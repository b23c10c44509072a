//! Page driver port.
//!
//! Every DOM interaction the relay performs goes through [`DomPort`]. Two
//! backends are provided:
//! - [`CdpPage`]: a live Chromium tab driven over the DevTools protocol
//! - [`MemoryPage`]: an in-memory DOM with scripted reactions, used by tests
//!   and dry runs

pub mod cdp;
pub mod errors;
pub mod memory;
pub mod model;
pub mod port;
mod scripts;

pub use cdp::{connect_tab, CdpPage};
pub use errors::{AdapterError, AdapterErrorKind};
pub use memory::{DomTree, Interaction, InteractionKind, MemoryPage, NodeSpec, Reacts, Trigger};
pub use model::{DomEvent, DragPhase, ElementHandle, ElementSnapshot, FileBlob, Rect};
pub use port::DomPort;
