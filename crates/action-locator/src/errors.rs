//! Error types for locator system

use page_adapter::AdapterError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// Anchor carries no usable strategy
    #[error("Invalid anchor: {0}")]
    InvalidAnchor(String),

    #[error("Strategy '{strategy}' failed: {reason}")]
    StrategyFailed { strategy: String, reason: String },

    #[error("Page driver error: {0}")]
    Adapter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LocatorError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LocatorError::Adapter(_) | LocatorError::StrategyFailed { .. }
        )
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            LocatorError::Internal(_) => 3,
            LocatorError::Adapter(_) => 2,
            LocatorError::StrategyFailed { .. } => 1,
            LocatorError::InvalidAnchor(_) => 0,
        }
    }
}

impl From<AdapterError> for LocatorError {
    fn from(err: AdapterError) -> Self {
        LocatorError::Adapter(err.to_string())
    }
}
