use relay_core_types::RelayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encoding: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("store file is corrupt: {0}")]
    Corrupt(String),
}

impl From<StoreError> for RelayError {
    fn from(err: StoreError) -> Self {
        RelayError::new(err.to_string())
    }
}
