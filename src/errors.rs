//! Automation error taxonomy
//!
//! Component errors are folded into four outcomes at step and pipeline
//! boundaries.

use action_flow::FlowError;
use action_locator::LocatorError;
use handoff_store::StoreError;
use image_pipeline::PipelineError;
use page_adapter::AdapterError;
use relay_core_types::RelayError;
use thiserror::Error;
use tool_click::ClickError;
use tool_type_text::TypeTextError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutomationError {
    /// An expected element never appeared within its window
    #[error("not found: {0}")]
    NotFound(String),

    /// An action ran but its observable effect never materialised
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// No further progress is possible on this page
    #[error("fatal: {0}")]
    Fatal(String),

    /// A required stored value is absent
    #[error("missing stored value: {0}")]
    StorageMiss(String),
}

impl From<ClickError> for AutomationError {
    fn from(err: ClickError) -> Self {
        match err {
            ClickError::NotFound(label) => AutomationError::NotFound(label),
            ClickError::Exhausted { label, attempts } => AutomationError::VerificationFailed(
                format!("click on '{}' (tried {})", label, attempts.tried().join(", ")),
            ),
            other => AutomationError::Fatal(other.to_string()),
        }
    }
}

impl From<TypeTextError> for AutomationError {
    fn from(err: TypeTextError) -> Self {
        match err {
            TypeTextError::NotFound(label) => AutomationError::NotFound(label),
            TypeTextError::Exhausted { label, attempts } => AutomationError::VerificationFailed(
                format!("text entry into '{}' (tried {})", label, attempts.tried().join(", ")),
            ),
            other => AutomationError::Fatal(other.to_string()),
        }
    }
}

impl From<PipelineError> for AutomationError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ControlMissing(what) => AutomationError::NotFound(what),
            PipelineError::NothingToUpload => {
                AutomationError::StorageMiss(handoff_store::keys::WATERMARKED_IMAGES.into())
            }
            err @ PipelineError::VerificationFailed { .. } => {
                AutomationError::VerificationFailed(err.to_string())
            }
            other => AutomationError::Fatal(other.to_string()),
        }
    }
}

impl From<StoreError> for AutomationError {
    fn from(err: StoreError) -> Self {
        AutomationError::Fatal(format!("handoff store: {}", err))
    }
}

impl From<LocatorError> for AutomationError {
    fn from(err: LocatorError) -> Self {
        AutomationError::Fatal(err.to_string())
    }
}

impl From<AdapterError> for AutomationError {
    fn from(err: AdapterError) -> Self {
        AutomationError::Fatal(format!("page driver: {}", err))
    }
}

impl From<AutomationError> for FlowError {
    fn from(err: AutomationError) -> Self {
        match err {
            AutomationError::NotFound(what) => FlowError::NotFound(what),
            AutomationError::VerificationFailed(what) => FlowError::VerificationFailed(what),
            AutomationError::StorageMiss(key) => FlowError::StorageMiss(key),
            AutomationError::Fatal(reason) => FlowError::Internal(reason),
        }
    }
}

impl From<AutomationError> for RelayError {
    fn from(err: AutomationError) -> Self {
        RelayError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::AttemptLog;

    #[test]
    fn exhausted_click_is_a_verification_failure() {
        let mut attempts = AttemptLog::new();
        attempts.record_failed("direct", "no effect", 10);
        attempts.record_failed("mouse_sequence", "no effect", 10);
        let err = AutomationError::from(ClickError::Exhausted {
            label: "continue".into(),
            attempts,
        });
        assert_eq!(
            err,
            AutomationError::VerificationFailed(
                "click on 'continue' (tried direct, mouse_sequence)".into()
            )
        );
    }

    #[test]
    fn taxonomy_maps_onto_step_errors() {
        assert!(matches!(
            FlowError::from(AutomationError::StorageMiss("ebayPrice".into())),
            FlowError::StorageMiss(key) if key == "ebayPrice"
        ));
        assert!(matches!(
            FlowError::from(AutomationError::NotFound("title".into())),
            FlowError::NotFound(_)
        ));
    }
}
