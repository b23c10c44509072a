use handoff_store::StoreError;
use page_adapter::AdapterError;
use relay_core_types::RelayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("image processing: {0}")]
    Image(#[from] image::ImageError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("image rejected: {0}")]
    Rejected(String),
    #[error("upload control not found: {0}")]
    ControlMissing(String),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("no stored images to upload")]
    NothingToUpload,
    #[error("photo counter reached {observed:?}, expected at least {expected}")]
    VerificationFailed {
        expected: usize,
        observed: Option<u32>,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PipelineError> for RelayError {
    fn from(err: PipelineError) -> Self {
        RelayError::new(err.to_string())
    }
}
