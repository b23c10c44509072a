use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AdapterErrorKind {
    #[error("target element not found")]
    TargetNotFound,
    #[error("script evaluation failed")]
    Script,
    #[error("cdp i/o failure")]
    CdpIo,
    #[error("internal error")]
    Internal,
}

/// Enriched error metadata passed back to higher layers.
#[derive(Clone, Debug)]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub hint: Option<String>,
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(hint) = &self.hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for AdapterError {}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind) -> Self {
        Self { kind, hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn target_not_found(handle: impl fmt::Display) -> Self {
        Self::new(AdapterErrorKind::TargetNotFound).with_hint(format!("element {handle} detached"))
    }

    pub fn is_detached(&self) -> bool {
        self.kind == AdapterErrorKind::TargetNotFound
    }
}

impl From<chromiumoxide::error::CdpError> for AdapterError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AdapterError::new(AdapterErrorKind::CdpIo).with_hint(err.to_string())
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::new(AdapterErrorKind::Script).with_hint(err.to_string())
    }
}
