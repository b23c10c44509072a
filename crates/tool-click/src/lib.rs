pub mod api;
pub mod errors;
pub mod model;
pub mod policy;

mod runner;

pub use api::{ClickTool, ClickToolBuilder};
pub use errors::ClickError;
pub use model::{ClickParams, ClickStrategy, ClickTarget};
pub use policy::{ClickPolicyView, ClickTimeouts};
