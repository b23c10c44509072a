use async_trait::async_trait;

use crate::errors::AdapterError;
use crate::model::{DomEvent, DragPhase, ElementHandle, ElementSnapshot, FileBlob};

/// DOM driver surface used by every automation component.
///
/// Query methods return elements in document order. Methods taking a handle
/// fail with `TargetNotFound` once the element has been detached.
#[async_trait]
pub trait DomPort: Send + Sync {
    async fn current_url(&self) -> Result<String, AdapterError>;

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>, AdapterError>;

    async fn query_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementSnapshot>, AdapterError>;

    /// `Ok(None)` when the element no longer exists.
    async fn snapshot(&self, target: &ElementHandle)
        -> Result<Option<ElementSnapshot>, AdapterError>;

    /// Native `HTMLElement.click()`.
    async fn click(&self, target: &ElementHandle) -> Result<(), AdapterError>;

    async fn focus(&self, target: &ElementHandle) -> Result<(), AdapterError>;

    async fn dispatch(&self, target: &ElementHandle, event: DomEvent) -> Result<(), AdapterError>;

    /// Assigns `value` through the native setter without dispatching events.
    async fn set_value(&self, target: &ElementHandle, value: &str) -> Result<(), AdapterError>;

    /// One simulated keystroke: keydown, value append, input, keyup.
    async fn type_char(&self, target: &ElementHandle, ch: char) -> Result<(), AdapterError>;

    /// Submits the form owning `target`.
    async fn submit_form(&self, target: &ElementHandle) -> Result<(), AdapterError>;

    /// Replaces the `files` list of a file input.
    async fn assign_files(
        &self,
        target: &ElementHandle,
        files: &[FileBlob],
    ) -> Result<(), AdapterError>;

    async fn dispatch_drag(
        &self,
        target: &ElementHandle,
        phase: DragPhase,
        files: &[FileBlob],
    ) -> Result<(), AdapterError>;

    async fn set_attribute(
        &self,
        target: &ElementHandle,
        name: &str,
        value: &str,
    ) -> Result<(), AdapterError>;
}
