//! Step state machine
//!
//! A run walks a fixed, ordered list of steps once. Each step is checked for
//! being already satisfied before its action runs, may retry with backoff,
//! and on final failure either aborts the run (fatal) or is logged and
//! skipped over (soft).

pub mod errors;
pub mod machine;
pub mod strategies;
pub mod types;

pub use errors::FlowError;
pub use machine::{Step, StepMachine};
pub use strategies::{DefaultFailureHandler, FailureHandler, FailureHandlerResult};
pub use types::{Criticality, RetryPolicy, RunReport, RunStatus, StepResult, StepStatus};
