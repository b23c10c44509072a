//! Element resolution
//!
//! - typed selector strategies (CSS, text, attribute) tried in anchor order
//! - interactability filter applied before anything counts as found
//! - bounded polling via the shared wait primitive; not-found is an empty
//!   result, never an error
//! - observable-effect verification for interaction strategies

pub mod errors;
pub mod expect;
pub mod filter;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use filter::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
