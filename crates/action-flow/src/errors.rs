//! Step error types

use thiserror::Error;

/// Why a step failed.
#[derive(Debug, Error, Clone)]
pub enum FlowError {
    /// An element the step needs never appeared
    #[error("Element not found: {0}")]
    NotFound(String),

    /// The step acted but its effect never materialised
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// A required handoff value is missing
    #[error("Missing stored value: {0}")]
    StorageMiss(String),

    #[error("Step {step_id} failed: {reason}")]
    StepFailed { step_id: String, reason: String },

    /// Action primitive error
    #[error("Action error: {0}")]
    ActionError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<action_primitives::ActionError> for FlowError {
    fn from(err: action_primitives::ActionError) -> Self {
        match err {
            action_primitives::ActionError::NotFound(what) => FlowError::NotFound(what),
            action_primitives::ActionError::VerificationFailed(what) => {
                FlowError::VerificationFailed(what)
            }
            other => FlowError::ActionError(other.to_string()),
        }
    }
}
