//! Item specifics quick-fill.
//!
//! Single greedy pass: every field group that offers suggested values and has
//! no value yet gets its first suggestion clicked. Clicks are not checked
//! against the resulting form value.

use std::sync::Arc;

use action_locator::{ElementResolver, PollingResolver};
use action_primitives::{Anchor, EffectProbe, Expectation};
use async_trait::async_trait;
use page_adapter::{DomPort, ElementHandle, ElementSnapshot};
use serde::{Deserialize, Serialize};
use tool_click::{ClickParams, ClickTool};
use tracing::{debug, info, instrument};

use super::selectors::{self, PROCESSED_MARKER, SUGGESTION_PHRASES};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillSummary {
    pub groups: usize,
    pub filled: usize,
    pub skipped_prefilled: usize,
    pub skipped_no_suggestion: usize,
    pub failed: usize,
}

/// Accepts any outcome; suggestion clicks are fire-and-forget.
struct Unverified;

#[async_trait]
impl EffectProbe for Unverified {
    async fn observed(&self, _port: &dyn DomPort, _target: &ElementHandle) -> bool {
        true
    }

    fn describe(&self) -> &str {
        "unverified"
    }
}

/// Placeholder texts shown by an empty dropdown.
pub fn is_placeholder(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    text.is_empty()
        || text == "-"
        || text == "--"
        || text.starts_with("select")
        || text.starts_with("choose")
        || text.starts_with("enter your own")
}

pub fn offers_suggestions(caption: &str) -> bool {
    let caption = caption.to_lowercase();
    SUGGESTION_PHRASES.iter().any(|p| caption.contains(p))
}

pub struct ItemSpecificsFiller<'a> {
    resolver: &'a PollingResolver,
    click: &'a dyn ClickTool,
}

enum GroupOutcome {
    Filled,
    Prefilled,
    NoSuggestion,
    Failed,
}

impl<'a> ItemSpecificsFiller<'a> {
    pub fn new(resolver: &'a PollingResolver, click: &'a dyn ClickTool) -> Self {
        Self { resolver, click }
    }

    #[instrument(skip_all)]
    pub async fn fill(&self) -> FillSummary {
        let mut summary = FillSummary::default();
        let groups = match self.resolver.resolve_all(&selectors::specifics_groups()).await {
            Ok(groups) => groups,
            Err(err) => {
                debug!(error = %err, "item specifics groups unavailable");
                return summary;
            }
        };

        for group in &groups {
            summary.groups += 1;
            match self.fill_group(group).await {
                GroupOutcome::Filled => summary.filled += 1,
                GroupOutcome::Prefilled => summary.skipped_prefilled += 1,
                GroupOutcome::NoSuggestion => summary.skipped_no_suggestion += 1,
                GroupOutcome::Failed => summary.failed += 1,
            }
        }
        info!(
            groups = summary.groups,
            filled = summary.filled,
            prefilled = summary.skipped_prefilled,
            failed = summary.failed,
            "item specifics pass finished"
        );
        summary
    }

    async fn within(&self, group: &ElementSnapshot, anchor: &Anchor) -> Vec<ElementSnapshot> {
        self.resolver
            .resolve_within(&group.handle, anchor)
            .await
            .unwrap_or_default()
    }

    async fn caption(&self, group: &ElementSnapshot) -> String {
        let captions = self.within(group, &selectors::specifics_caption()).await;
        if captions.is_empty() {
            group.text.clone()
        } else {
            captions
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        }
    }

    async fn has_value(&self, group: &ElementSnapshot) -> bool {
        let dropdowns = self.within(group, &selectors::specifics_value_button()).await;
        if dropdowns.iter().any(|d| !is_placeholder(&d.text)) {
            return true;
        }
        let inputs = self.within(group, &selectors::specifics_value_input()).await;
        inputs
            .iter()
            .any(|i| i.value.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false))
    }

    async fn fill_group(&self, group: &ElementSnapshot) -> GroupOutcome {
        if !offers_suggestions(&self.caption(group).await) {
            return GroupOutcome::NoSuggestion;
        }
        if self.has_value(group).await {
            return GroupOutcome::Prefilled;
        }
        let suggestions = self.within(group, &selectors::specifics_suggestions()).await;
        let Some(first) = suggestions
            .into_iter()
            .find(|s| s.attribute(PROCESSED_MARKER).is_none())
        else {
            return GroupOutcome::NoSuggestion;
        };

        if let Err(err) = self
            .resolver
            .port()
            .set_attribute(&first.handle, PROCESSED_MARKER, "true")
            .await
        {
            debug!(error = %err, "could not mark suggestion");
        }
        let label = first.text.trim().to_string();
        match self
            .click
            .click(ClickParams::element(
                first,
                Expectation::Probe(Arc::new(Unverified)),
            ))
            .await
        {
            Ok(_) => {
                debug!(suggestion = %label, "accepted suggestion");
                GroupOutcome::Filled
            }
            Err(err) => {
                debug!(suggestion = %label, error = %err, "suggestion click failed");
                GroupOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_texts() {
        assert!(is_placeholder("  "));
        assert!(is_placeholder("Select"));
        assert!(is_placeholder("-- "));
        assert!(!is_placeholder("Apple"));
    }

    #[test]
    fn caption_phrases() {
        assert!(offers_suggestions("Frequently selected:"));
        assert!(offers_suggestions("Suggested values"));
        assert!(!offers_suggestions("Brand"));
    }
}
