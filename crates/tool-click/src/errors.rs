use action_primitives::AttemptLog;
use page_adapter::AdapterError;
use relay_core_types::RelayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClickError {
    #[error("tool disabled by policy")]
    Disabled,
    #[error("click target '{0}' not found")]
    NotFound(String),
    #[error("all click strategies exhausted for '{label}'")]
    Exhausted { label: String, attempts: AttemptLog },
    #[error("operation cancelled")]
    Cancelled,
    #[error("page driver: {0}")]
    Adapter(#[from] AdapterError),
}

impl ClickError {
    /// Attempt log when strategies actually ran.
    pub fn attempts(&self) -> Option<&AttemptLog> {
        match self {
            ClickError::Exhausted { attempts, .. } => Some(attempts),
            _ => None,
        }
    }
}

impl From<ClickError> for RelayError {
    fn from(err: ClickError) -> Self {
        RelayError::new(err.to_string())
    }
}
