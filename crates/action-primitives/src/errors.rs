//! Error types for actions

use page_adapter::AdapterError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Expected element never appeared within the wait window
    #[error("Not found: {0}")]
    NotFound(String),

    /// Interaction ran but the expected effect never materialised
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Operation was cancelled or its budget ran out
    #[error("Operation interrupted: {0}")]
    Interrupted(String),

    /// Page driver failure
    #[error("Page driver error: {0}")]
    Adapter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActionError::NotFound(_) | ActionError::VerificationFailed(_) | ActionError::Adapter(_)
        )
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::Internal(_) => 3,
            ActionError::Adapter(_) | ActionError::VerificationFailed(_) => 2,
            ActionError::NotFound(_) => 1,
            ActionError::Interrupted(_) => 0,
        }
    }
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        ActionError::Adapter(err.to_string())
    }
}
