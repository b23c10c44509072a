//! Page classification and per-page automation.
//!
//! A page load is classified once into a [`PageKind`] and dispatched to the
//! matching handler. Collaborators are owned by a [`PageContext`] that lives
//! for one page load; only the handoff store outlives it.

pub mod destination;
pub mod intermediate;
pub mod item_specifics;
pub mod selectors;
pub mod source;

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use action_flow::{RunReport, RunStatus};
use action_locator::PollingResolver;
use futures::FutureExt;
use handoff_store::{DraftStore, HandoffStore};
use page_adapter::DomPort;
use relay_core_types::RunId;
use relay_event_bus::{EventBus, InMemoryBus, RelayMessage};
use serde::{Deserialize, Serialize};
use tool_click::{ClickTool, ClickToolBuilder};
use tool_type_text::{TempoPort, TypeTextTool, TypeTextToolBuilder};
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::config::RelayConfig;
use crate::errors::AutomationError;

pub use source::SourceCapture;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Amazon product page
    Source,
    /// eBay prelist: title search, match dialog, condition
    Intermediate,
    /// eBay listing form: photos, price, SKU, item specifics
    Destination,
    Unknown,
}

impl PageKind {
    pub fn name(&self) -> &'static str {
        match self {
            PageKind::Source => "source",
            PageKind::Intermediate => "intermediate",
            PageKind::Destination => "destination",
            PageKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn host_is(url: &Url, brand: &str) -> bool {
    url.host_str()
        .map(|host| {
            host.split('.')
                .collect::<Vec<_>>()
                .windows(2)
                .any(|pair| pair[0] == brand && !pair[1].is_empty())
        })
        .unwrap_or(false)
}

/// Classifies a page by its URL. Anything unparsable or unrecognised is
/// `Unknown`.
pub fn classify_url(raw: &str) -> PageKind {
    let Ok(url) = Url::parse(raw) else {
        return PageKind::Unknown;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return PageKind::Unknown;
    }
    let path = url.path();
    if host_is(&url, "amazon") && (path.contains("/dp/") || path.contains("/gp/product/")) {
        return PageKind::Source;
    }
    if host_is(&url, "ebay") {
        if path.starts_with("/sl/prelist") {
            return PageKind::Intermediate;
        }
        if path.starts_with("/lstng") || path.starts_with("/sl/list") {
            return PageKind::Destination;
        }
    }
    PageKind::Unknown
}

/// Collaborators for one page load.
#[derive(Clone)]
pub struct PageContext {
    pub run_id: RunId,
    pub port: Arc<dyn DomPort>,
    pub resolver: Arc<PollingResolver>,
    pub click: Arc<dyn ClickTool>,
    pub typer: Arc<dyn TypeTextTool>,
    pub drafts: DraftStore,
    pub bus: Arc<InMemoryBus<RelayMessage>>,
    pub config: Arc<RelayConfig>,
}

impl PageContext {
    pub fn new(port: Arc<dyn DomPort>, store: Arc<dyn HandoffStore>, config: RelayConfig) -> Self {
        let bus = InMemoryBus::new(config.bus_capacity);
        Self::assemble(port, store, Arc::new(config), bus, None)
    }

    pub fn with_bus(self, bus: Arc<InMemoryBus<RelayMessage>>) -> Self {
        Self { bus, ..self }
    }

    /// Rebuilds the text tool with a different keystroke tempo.
    pub fn with_tempo(self, tempo: Arc<dyn TempoPort>) -> Self {
        let store = self.drafts.raw().clone();
        Self::assemble(self.port, store, self.config, self.bus, Some(tempo))
    }

    fn assemble(
        port: Arc<dyn DomPort>,
        store: Arc<dyn HandoffStore>,
        config: Arc<RelayConfig>,
        bus: Arc<InMemoryBus<RelayMessage>>,
        tempo: Option<Arc<dyn TempoPort>>,
    ) -> Self {
        let resolver = Arc::new(PollingResolver::new(port.clone()).with_wait(config.resolver_wait()));
        let click = ClickToolBuilder::new(port.clone())
            .with_policy(config.click_policy())
            .with_resolver(resolver.clone())
            .build();
        let mut typer = TypeTextToolBuilder::new(port.clone())
            .with_policy(config.type_policy())
            .with_resolver(resolver.clone());
        if let Some(tempo) = tempo {
            typer = typer.with_tempo(tempo);
        }
        Self {
            run_id: RunId::new(),
            port,
            resolver,
            click,
            typer: typer.build(),
            drafts: DraftStore::new(store),
            bus,
            config,
        }
    }

    /// Publishes one message per step plus the run outcome.
    pub(crate) fn publish_report(&self, report: &RunReport) {
        for step in &report.steps {
            self.bus.notify(RelayMessage::StepFinished {
                run: report.run_id.clone(),
                step: step.step_id.clone(),
                ok: step.error.is_none(),
            });
        }
        self.bus.notify(RelayMessage::RunFinished {
            run: report.run_id.clone(),
            ok: report.is_success(),
        });
    }
}

/// What happened on one page load.
#[derive(Debug)]
pub enum PageOutcome {
    Captured(SourceCapture),
    Ran { kind: PageKind, report: RunReport },
    Failed { kind: PageKind, error: AutomationError },
    Panicked { kind: PageKind },
    Unrecognised { url: String },
}

impl PageOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            PageOutcome::Captured(_) => true,
            PageOutcome::Ran { report, .. } => report.is_success(),
            _ => false,
        }
    }

    /// One line for the console.
    pub fn summary(&self) -> String {
        match self {
            PageOutcome::Captured(capture) => format!(
                "captured '{}' with {} image(s)",
                capture.title,
                capture.image_urls.len()
            ),
            PageOutcome::Ran { kind, report } => match &report.status {
                RunStatus::Aborted { step_id } => {
                    format!("{} run aborted at step '{}'", kind, step_id)
                }
                _ => format!(
                    "{} run finished: {} step(s), {} soft failure(s)",
                    kind,
                    report.steps.len(),
                    report.soft_failures().len()
                ),
            },
            PageOutcome::Failed { kind, error } => format!("{} page failed: {}", kind, error),
            PageOutcome::Panicked { kind } => format!("{} handler crashed", kind),
            PageOutcome::Unrecognised { url } => format!("no automation for {}", url),
        }
    }
}

async fn handle(ctx: &PageContext, kind: PageKind, url: &str) -> PageOutcome {
    let result = match kind {
        PageKind::Source => source::capture(ctx).await.map(PageOutcome::Captured),
        PageKind::Intermediate => intermediate::run(ctx)
            .await
            .map(|report| PageOutcome::Ran { kind, report }),
        PageKind::Destination => destination::run(ctx)
            .await
            .map(|report| PageOutcome::Ran { kind, report }),
        PageKind::Unknown => Ok(PageOutcome::Unrecognised {
            url: url.to_string(),
        }),
    };
    result.unwrap_or_else(|error| PageOutcome::Failed { kind, error })
}

/// Classifies the current page and runs its handler. Failures and panics
/// inside a handler are logged and reported, never propagated.
#[instrument(skip_all, fields(run = %ctx.run_id))]
pub async fn dispatch(ctx: &PageContext) -> PageOutcome {
    let url = match ctx.port.current_url().await {
        Ok(url) => url,
        Err(err) => {
            warn!("cannot read page url: {}", err);
            return PageOutcome::Failed {
                kind: PageKind::Unknown,
                error: err.into(),
            };
        }
    };
    let kind = classify_url(&url);
    info!(%url, %kind, "page classified");
    ctx.bus.notify(RelayMessage::PageClassified {
        url: url.clone(),
        kind: kind.name().to_string(),
    });

    match AssertUnwindSafe(handle(ctx, kind, &url)).catch_unwind().await {
        Ok(outcome) => {
            match &outcome {
                PageOutcome::Failed { error, .. } => warn!(%kind, "page automation failed: {}", error),
                PageOutcome::Unrecognised { .. } => info!("page has no automation"),
                other if !other.is_success() => warn!(%kind, "{}", other.summary()),
                other => info!(%kind, "{}", other.summary()),
            }
            outcome
        }
        Err(_) => {
            error!(%kind, "page handler panicked");
            PageOutcome::Panicked { kind }
        }
    }
}
