//! Element resolver with fallback chain orchestration

use std::sync::Arc;

use action_primitives::{poll_until, Anchor, PollOutcome, SelectorStrategy, Visibility, WaitSpec};
use async_trait::async_trait;
use page_adapter::{DomPort, ElementHandle, ElementSnapshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::LocatorError;
use crate::filter::is_interactable;
use crate::strategies::{AttributeStrategy, CssStrategy, Strategy, TextStrategy};
use crate::types::ResolutionResult;

#[async_trait]
pub trait ElementResolver: Send + Sync {
    /// Single pass over the anchor's strategies.
    async fn resolve_once(&self, anchor: &Anchor)
        -> Result<Option<ResolutionResult>, LocatorError>;

    /// Polls until the anchor resolves or `wait` elapses. Driver errors during
    /// polling count as "not yet found".
    async fn wait_for(&self, anchor: &Anchor, wait: WaitSpec) -> Option<ResolutionResult>;

    /// Every element matched by the first strategy that matches anything.
    async fn resolve_all(&self, anchor: &Anchor) -> Result<Vec<ElementSnapshot>, LocatorError>;

    /// Like `resolve_all`, restricted to descendants of `scope`.
    async fn resolve_within(
        &self,
        scope: &ElementHandle,
        anchor: &Anchor,
    ) -> Result<Vec<ElementSnapshot>, LocatorError>;
}

/// Resolver polling a [`DomPort`].
pub struct PollingResolver {
    port: Arc<dyn DomPort>,
    wait: WaitSpec,
    cancel: Option<CancellationToken>,
    css_strategy: Arc<CssStrategy>,
    text_strategy: Arc<TextStrategy>,
    attribute_strategy: Arc<AttributeStrategy>,
}

impl PollingResolver {
    pub fn new(port: Arc<dyn DomPort>) -> Self {
        Self {
            port,
            wait: WaitSpec::default(),
            cancel: None,
            css_strategy: Arc::new(CssStrategy),
            text_strategy: Arc::new(TextStrategy),
            attribute_strategy: Arc::new(AttributeStrategy),
        }
    }

    pub fn with_wait(mut self, wait: WaitSpec) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Default wait used by callers that have no window of their own.
    pub fn default_wait(&self) -> WaitSpec {
        self.wait
    }

    pub fn port(&self) -> &Arc<dyn DomPort> {
        &self.port
    }

    fn get_strategy(&self, selector: &SelectorStrategy) -> Arc<dyn Strategy> {
        match selector {
            SelectorStrategy::Css(_) => self.css_strategy.clone(),
            SelectorStrategy::Text { .. } => self.text_strategy.clone(),
            SelectorStrategy::Attribute { .. } => self.attribute_strategy.clone(),
        }
    }

    async fn matches(
        &self,
        anchor: &Anchor,
        scope: Option<&ElementHandle>,
    ) -> Result<Option<(usize, Vec<ElementSnapshot>)>, LocatorError> {
        if anchor.strategies.is_empty() {
            return Err(LocatorError::InvalidAnchor(format!(
                "anchor '{}' has no strategies",
                anchor.label
            )));
        }
        for (index, selector) in anchor.strategies.iter().enumerate() {
            let strategy = self.get_strategy(selector);
            let found = match strategy.candidates(self.port.as_ref(), selector, scope).await {
                Ok(found) => found,
                Err(LocatorError::Adapter(reason)) if scope.is_none() => {
                    warn!("Strategy {} failed on {}: {}", strategy.name(), selector, reason);
                    continue;
                }
                Err(err) => return Err(err),
            };
            let kept: Vec<_> = match anchor.visibility {
                Visibility::Interactable => found.into_iter().filter(is_interactable).collect(),
                Visibility::Any => found,
            };
            if !kept.is_empty() {
                return Ok(Some((index, kept)));
            }
            debug!("Strategy {} returned no candidates", selector);
        }
        Ok(None)
    }
}

#[async_trait]
impl ElementResolver for PollingResolver {
    async fn resolve_once(
        &self,
        anchor: &Anchor,
    ) -> Result<Option<ResolutionResult>, LocatorError> {
        let Some((index, mut found)) = self.matches(anchor, None).await? else {
            return Ok(None);
        };
        let element = found.remove(0);
        Ok(Some(ResolutionResult::new(
            element,
            anchor.strategies[index].clone(),
            index,
        )))
    }

    async fn wait_for(&self, anchor: &Anchor, wait: WaitSpec) -> Option<ResolutionResult> {
        let outcome = poll_until(wait, self.cancel.as_ref(), || async move {
            match self.resolve_once(anchor).await {
                Ok(found) => found,
                Err(err) => {
                    debug!("Resolution of '{}' failed: {}", anchor.label, err);
                    None
                }
            }
        })
        .await;

        match outcome {
            PollOutcome::Ready(resolution) => {
                info!(
                    anchor = %anchor.label,
                    strategy = %resolution.strategy,
                    element = %resolution.handle(),
                    "resolved element"
                );
                Some(resolution)
            }
            PollOutcome::TimedOut => {
                info!(anchor = %anchor.label, timeout_ms = wait.timeout.as_millis() as u64, "element not found");
                None
            }
            PollOutcome::Cancelled => {
                debug!(anchor = %anchor.label, "resolution cancelled");
                None
            }
        }
    }

    async fn resolve_all(&self, anchor: &Anchor) -> Result<Vec<ElementSnapshot>, LocatorError> {
        Ok(self
            .matches(anchor, None)
            .await?
            .map(|(_, found)| found)
            .unwrap_or_default())
    }

    async fn resolve_within(
        &self,
        scope: &ElementHandle,
        anchor: &Anchor,
    ) -> Result<Vec<ElementSnapshot>, LocatorError> {
        Ok(self
            .matches(anchor, Some(scope))
            .await?
            .map(|(_, found)| found)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_adapter::{MemoryPage, NodeSpec};
    use std::time::Duration;

    fn resolver(page: &Arc<MemoryPage>) -> PollingResolver {
        PollingResolver::new(page.clone())
    }

    #[tokio::test]
    async fn falls_back_to_later_strategy() {
        let page = MemoryPage::new("https://example.test/");
        page.insert(NodeSpec::button("Continue").matches("button"));
        let anchor = Anchor::new("continue")
            .css("#continue-btn")
            .text("button", "continue");

        let found = resolver(&page).resolve_once(&anchor).await.unwrap().unwrap();
        assert_eq!(found.strategy_index, 1);
        assert!(found.used_fallback());
    }

    #[tokio::test]
    async fn filtered_elements_are_never_found() {
        let page = MemoryPage::new("https://example.test/");
        page.insert(NodeSpec::button("Hidden").matches("#go").hidden());
        page.insert(NodeSpec::button("Disabled").matches("#go").disabled());
        let anchor = Anchor::new("go").css("#go");

        assert!(resolver(&page).resolve_once(&anchor).await.unwrap().is_none());
        let any = anchor.unfiltered();
        assert_eq!(resolver(&page).resolve_all(&any).await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_late_element() {
        let page = MemoryPage::new("https://example.test/");
        let late = page.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(900)).await;
            late.insert(NodeSpec::button("Late").matches("#late"));
        });

        let found = resolver(&page)
            .wait_for(&Anchor::new("late").css("#late"), WaitSpec::default())
            .await;
        assert!(found.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn absent_element_is_not_found_not_error() {
        let page = MemoryPage::new("https://example.test/");
        let spec = WaitSpec::new(Duration::from_millis(300), Duration::from_secs(3));
        let found = resolver(&page)
            .wait_for(&Anchor::new("missing").css("#missing"), spec)
            .await;
        assert!(found.is_none());
        assert!(page.query_count() >= 10);
    }
}
