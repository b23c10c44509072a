//! Destination-page upload: strategies, thumbnail check and counter verification.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use action_locator::{ElementResolver, PollingResolver};
use action_primitives::{poll_until, settle, Anchor, AttemptLog, WaitSpec};
use handoff_store::DraftStore;
use page_adapter::{DomEvent, DragPhase, FileBlob};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::collect::{collect, convert, DEFAULT_MIN_PAYLOAD_LEN};
use crate::errors::PipelineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStrategy {
    /// Assign the files to an `<input type=file>` and dispatch `change`
    FileInput,
    /// `dragenter`, `dragover`, `drop` on the drop zone
    DragDrop,
}

impl UploadStrategy {
    pub fn chain() -> Vec<UploadStrategy> {
        vec![UploadStrategy::FileInput, UploadStrategy::DragDrop]
    }

    pub fn name(&self) -> &'static str {
        match self {
            UploadStrategy::FileInput => "file_input",
            UploadStrategy::DragDrop => "drag_drop",
        }
    }
}

impl fmt::Display for UploadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_min_payload_len")]
    pub min_payload_len: usize,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_discover_ms")]
    pub discover_ms: u64,
    #[serde(default = "default_verify_ms")]
    pub verify_ms: u64,
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

fn default_min_payload_len() -> usize {
    DEFAULT_MIN_PAYLOAD_LEN
}

fn default_settle_ms() -> u64 {
    1_500
}

fn default_discover_ms() -> u64 {
    5_000
}

fn default_verify_ms() -> u64 {
    30_000
}

fn default_poll_ms() -> u64 {
    500
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            min_payload_len: default_min_payload_len(),
            settle_ms: default_settle_ms(),
            discover_ms: default_discover_ms(),
            verify_ms: default_verify_ms(),
            poll_ms: default_poll_ms(),
        }
    }
}

impl UploadSettings {
    fn discover(&self) -> WaitSpec {
        WaitSpec::new(
            Duration::from_millis(self.poll_ms),
            Duration::from_millis(self.discover_ms),
        )
    }

    fn verify(&self) -> WaitSpec {
        WaitSpec::new(
            Duration::from_millis(self.poll_ms),
            Duration::from_millis(self.verify_ms),
        )
    }
}

/// Page elements the pipeline interacts with.
#[derive(Clone, Debug)]
pub struct UploadAnchors {
    /// Usually hidden, so resolved without the interactability filter
    pub file_input: Anchor,
    pub drop_zone: Anchor,
    /// Rendered previews; only `blob:` and `data:` sources count
    pub thumbnails: Anchor,
    /// Element whose text carries the uploaded photo count
    pub photo_counter: Anchor,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub expected: usize,
    pub observed: u32,
    pub files: Vec<String>,
    pub attempts: AttemptLog,
    /// Strategy that produced new thumbnails, if any did
    pub strategy: Option<UploadStrategy>,
}

pub struct UploadPipeline {
    resolver: Arc<PollingResolver>,
    drafts: DraftStore,
    anchors: UploadAnchors,
    settings: UploadSettings,
    strategies: Vec<UploadStrategy>,
    cancel: Option<CancellationToken>,
}

/// First run of ASCII digits in `text`.
pub(crate) fn first_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

impl UploadPipeline {
    pub fn new(resolver: Arc<PollingResolver>, drafts: DraftStore, anchors: UploadAnchors) -> Self {
        Self {
            resolver,
            drafts,
            anchors,
            settings: UploadSettings::default(),
            strategies: UploadStrategy::chain(),
            cancel: None,
        }
    }

    pub fn with_settings(mut self, settings: UploadSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_strategies(mut self, strategies: Vec<UploadStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Uploads the stored images. Stored images are cleared only after the
    /// photo counter confirms every converted file.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result<UploadOutcome, PipelineError> {
        let stored = self.drafts.images().await?;
        let images = collect(&stored, self.settings.min_payload_len);
        let files = convert(&images);
        info!(
            stored = stored.len(),
            collected = images.len(),
            converted = files.len(),
            "prepared images for upload"
        );
        if files.is_empty() {
            return Err(PipelineError::NothingToUpload);
        }
        let expected = files.len();

        let baseline = self.thumbnail_count().await;
        let mut attempts = AttemptLog::new();
        let mut used = None;
        for strategy in &self.strategies {
            if self.is_cancelled() {
                break;
            }
            let started = Instant::now();
            let outcome = self.attempt(*strategy, &files).await;
            let elapsed = started.elapsed().as_millis() as u64;
            match outcome {
                Ok(()) => {
                    settle(Duration::from_millis(self.settings.settle_ms)).await;
                    let rendered = self.thumbnail_count().await;
                    if rendered > baseline {
                        debug!(strategy = %strategy, new = rendered - baseline, "thumbnails rendered");
                        attempts.record_ok(strategy.name(), elapsed);
                        used = Some(*strategy);
                        break;
                    }
                    attempts.record_failed(strategy.name(), "no new thumbnails", elapsed);
                }
                Err(err) => {
                    debug!(strategy = %strategy, error = %err, "upload strategy failed");
                    attempts.record_failed(strategy.name(), err.to_string(), elapsed);
                }
            }
        }
        if used.is_none() {
            warn!(tried = ?attempts.tried(), "no strategy rendered thumbnails, checking counter anyway");
        }

        let observed = self.wait_for_counter(expected).await;
        match observed {
            Some(count) if count as usize >= expected => {
                self.drafts.clear_images().await?;
                info!(expected, observed = count, "upload verified, stored images cleared");
                Ok(UploadOutcome {
                    expected,
                    observed: count,
                    files: files.into_iter().map(|f| f.name).collect(),
                    attempts,
                    strategy: used,
                })
            }
            observed => {
                warn!(expected, ?observed, "photo counter did not confirm upload");
                Err(PipelineError::VerificationFailed { expected, observed })
            }
        }
    }

    async fn attempt(&self, strategy: UploadStrategy, files: &[FileBlob]) -> Result<(), PipelineError> {
        let port = self.resolver.port();
        match strategy {
            UploadStrategy::FileInput => {
                let input = self
                    .resolver
                    .wait_for(&self.anchors.file_input, self.settings.discover())
                    .await
                    .ok_or_else(|| PipelineError::ControlMissing(self.anchors.file_input.label.clone()))?;
                port.assign_files(input.handle(), files).await?;
                port.dispatch(input.handle(), DomEvent::Change).await?;
            }
            UploadStrategy::DragDrop => {
                let zone = self
                    .resolver
                    .wait_for(&self.anchors.drop_zone, self.settings.discover())
                    .await
                    .ok_or_else(|| PipelineError::ControlMissing(self.anchors.drop_zone.label.clone()))?;
                for phase in DragPhase::sequence() {
                    port.dispatch_drag(zone.handle(), phase, files).await?;
                }
            }
        }
        Ok(())
    }

    async fn thumbnail_count(&self) -> usize {
        match self.resolver.resolve_all(&self.anchors.thumbnails).await {
            Ok(found) => found
                .iter()
                .filter(|el| {
                    el.src
                        .as_deref()
                        .map(|src| src.starts_with("blob:") || src.starts_with("data:"))
                        .unwrap_or(false)
                })
                .count(),
            Err(err) => {
                debug!(error = %err, "thumbnail query failed");
                0
            }
        }
    }

    async fn read_counter(&self) -> Option<u32> {
        match self.resolver.resolve_once(&self.anchors.photo_counter).await {
            Ok(Some(found)) => first_integer(&found.element.text),
            _ => None,
        }
    }

    /// Polls the counter until it reaches `expected`; returns the last reading.
    async fn wait_for_counter(&self, expected: usize) -> Option<u32> {
        let reached = poll_until(self.settings.verify(), self.cancel.as_ref(), || async move {
            self.read_counter()
                .await
                .filter(|count| *count as usize >= expected)
        })
        .await;
        match reached.ready() {
            Some(count) => Some(count),
            None => self.read_counter().await,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|c| c.is_cancelled())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_text_parsing() {
        assert_eq!(first_integer("5 photos"), Some(5));
        assert_eq!(first_integer("Photos: 12 of 24"), Some(12));
        assert_eq!(first_integer("no photos yet"), None);
    }
}
