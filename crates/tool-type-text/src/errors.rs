use action_primitives::AttemptLog;
use page_adapter::AdapterError;
use relay_core_types::RelayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeTextError {
    #[error("tool disabled by policy")]
    Disabled,
    #[error("text exceeds {max} characters")]
    TooLong { max: usize },
    #[error("text field '{0}' not found")]
    NotFound(String),
    #[error("all input modes exhausted for '{label}'")]
    Exhausted { label: String, attempts: AttemptLog },
    #[error("operation cancelled")]
    Cancelled,
    #[error("page driver: {0}")]
    Adapter(#[from] AdapterError),
}

impl TypeTextError {
    pub fn attempts(&self) -> Option<&AttemptLog> {
        match self {
            TypeTextError::Exhausted { attempts, .. } => Some(attempts),
            _ => None,
        }
    }
}

impl From<TypeTextError> for RelayError {
    fn from(err: TypeTextError) -> Self {
        RelayError::new(err.to_string())
    }
}
