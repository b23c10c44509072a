//! eBay prelist automation: title search, match dialog, condition.

use std::sync::Arc;

use action_flow::{Criticality, FlowError, RunReport, Step, StepMachine};
use action_locator::ElementResolver;
use action_primitives::{Anchor, EffectProbe, Expectation};
use async_trait::async_trait;
use handoff_store::keys;
use page_adapter::{DomPort, ElementHandle, ElementSnapshot};
use relay_core_types::ConditionCode;
use relay_event_bus::{EventBus, RelayMessage};
use tool_click::ClickParams;
use tool_type_text::TextParams;
use tracing::{debug, info, warn};

use super::selectors;
use super::PageContext;
use crate::errors::AutomationError;

/// Input of one prelist run.
pub struct AutomationRun {
    pub page: PageContext,
    pub title: String,
    pub condition: ConditionCode,
}

impl AutomationRun {
    async fn present(&self, anchor: &Anchor) -> bool {
        matches!(self.page.resolver.resolve_once(anchor).await, Ok(Some(_)))
    }
}

/// Observes a toggle control reporting itself as selected.
pub struct Selected;

pub fn is_selected(el: &ElementSnapshot) -> bool {
    let flagged = ["aria-checked", "aria-pressed", "aria-selected"]
        .iter()
        .any(|name| el.attribute(name) == Some("true"));
    flagged
        || el.attribute("checked").is_some()
        || el.has_class("selected")
        || el.has_class("btn--selected")
}

#[async_trait]
impl EffectProbe for Selected {
    async fn observed(&self, port: &dyn DomPort, target: &ElementHandle) -> bool {
        matches!(port.snapshot(target).await, Ok(Some(el)) if is_selected(&el))
    }

    fn describe(&self) -> &str {
        "control selected"
    }
}

fn normalized(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Picks the option for `labels`: an exact (case-insensitive) label match
/// wins over a substring match, and earlier labels win over later ones.
pub fn pick_condition<'a>(
    options: &'a [ElementSnapshot],
    labels: &[&str],
) -> Option<&'a ElementSnapshot> {
    let texts: Vec<String> = options.iter().map(|o| normalized(&o.text)).collect();
    for label in labels {
        let wanted = normalized(label);
        if let Some(idx) = texts.iter().position(|t| *t == wanted) {
            return Some(&options[idx]);
        }
    }
    for label in labels {
        let wanted = normalized(label);
        if let Some(idx) = texts.iter().position(|t| t.contains(&wanted)) {
            return Some(&options[idx]);
        }
    }
    None
}

pub struct TitleFill;

#[async_trait]
impl Step<AutomationRun> for TitleFill {
    fn id(&self) -> &'static str {
        "title_fill"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Fatal
    }

    /// The search view is gone and the condition picker is showing.
    async fn already_satisfied(&self, run: &AutomationRun) -> bool {
        !run.present(&selectors::title_input()).await
            && run.present(&selectors::condition_options()).await
    }

    async fn run(&self, run: &AutomationRun) -> Result<(), FlowError> {
        run.page
            .typer
            .type_text(TextParams::anchor(selectors::title_input(), run.title.clone()))
            .await
            .map_err(AutomationError::from)?;
        run.page
            .click
            .click(ClickParams::anchor(
                selectors::search_button(),
                Expectation::Disappears(selectors::title_input()),
            ))
            .await
            .map_err(AutomationError::from)?;
        Ok(())
    }
}

pub struct DismissMatchDialog;

#[async_trait]
impl Step<AutomationRun> for DismissMatchDialog {
    fn id(&self) -> &'static str {
        "dismiss_match_dialog"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    async fn already_satisfied(&self, run: &AutomationRun) -> bool {
        run.present(&selectors::condition_options()).await
    }

    async fn run(&self, run: &AutomationRun) -> Result<(), FlowError> {
        let anchor = selectors::match_skip_button();
        let Some(found) = run
            .page
            .resolver
            .wait_for(&anchor, run.page.config.dialog_wait())
            .await
        else {
            info!("no product match dialog shown");
            return Ok(());
        };
        run.page
            .click
            .click(ClickParams::element(
                found.element,
                Expectation::Disappears(anchor),
            ))
            .await
            .map_err(AutomationError::from)?;
        Ok(())
    }
}

pub struct ConditionSelect;

impl ConditionSelect {
    async fn target(&self, run: &AutomationRun) -> Result<ElementSnapshot, AutomationError> {
        let anchor = selectors::condition_options();
        if run
            .page
            .resolver
            .wait_for(&anchor, run.page.config.resolver_wait())
            .await
            .is_none()
        {
            return Err(AutomationError::NotFound(anchor.label));
        }
        let options = run.page.resolver.resolve_all(&anchor).await?;
        pick_condition(&options, run.condition.labels())
            .cloned()
            .ok_or_else(|| {
                AutomationError::NotFound(format!("condition option for {}", run.condition.code()))
            })
    }
}

#[async_trait]
impl Step<AutomationRun> for ConditionSelect {
    fn id(&self) -> &'static str {
        "condition_select"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    async fn already_satisfied(&self, run: &AutomationRun) -> bool {
        let Ok(options) = run
            .page
            .resolver
            .resolve_all(&selectors::condition_options())
            .await
        else {
            return false;
        };
        pick_condition(&options, run.condition.labels())
            .map(is_selected)
            .unwrap_or(false)
    }

    async fn run(&self, run: &AutomationRun) -> Result<(), FlowError> {
        let option = self.target(run).await?;
        debug!(option = %option.text.trim(), code = run.condition.code(), "selecting condition");
        run.page
            .click
            .click(ClickParams::element(
                option,
                Expectation::Probe(Arc::new(Selected)),
            ))
            .await
            .map_err(AutomationError::from)?;
        Ok(())
    }
}

pub struct ContinueToListing;

#[async_trait]
impl Step<AutomationRun> for ContinueToListing {
    fn id(&self) -> &'static str {
        "continue_to_listing"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    async fn run(&self, run: &AutomationRun) -> Result<(), FlowError> {
        run.page
            .click
            .click(ClickParams::anchor(
                selectors::continue_button(),
                Expectation::TargetGone,
            ))
            .await
            .map_err(AutomationError::from)?;
        Ok(())
    }
}

pub fn machine(ctx: &PageContext) -> StepMachine<AutomationRun> {
    StepMachine::new(ctx.run_id.clone())
        .with_step(TitleFill)
        .with_step(DismissMatchDialog)
        .with_step(ConditionSelect)
        .with_step(ContinueToListing)
}

/// Runs the prelist steps. Without a stored title nothing on the page is
/// touched.
pub async fn run(ctx: &PageContext) -> Result<RunReport, AutomationError> {
    let mut machine = machine(ctx);
    run_with(ctx, &mut machine).await
}

/// Same as [`run`] with a caller-owned machine, so completed steps carry
/// over between attempts on the same page.
pub async fn run_with(
    ctx: &PageContext,
    machine: &mut StepMachine<AutomationRun>,
) -> Result<RunReport, AutomationError> {
    let Some(title) = ctx.drafts.title().await? else {
        warn!("no stored title, listing setup not started");
        return Err(AutomationError::StorageMiss(keys::EBAY_TITLE.to_string()));
    };
    let condition = ctx
        .drafts
        .condition()
        .await?
        .and_then(ConditionCode::from_code)
        .unwrap_or_default();
    info!(%title, condition = condition.code(), "starting listing setup");

    ctx.bus.notify(RelayMessage::SetupComplete {
        run: ctx.run_id.clone(),
        kind: "intermediate".to_string(),
    });
    let run = AutomationRun {
        page: ctx.clone(),
        title,
        condition,
    };
    let report = machine.run(&run).await;
    ctx.publish_report(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_adapter::{ElementHandle, Rect};
    use std::collections::BTreeMap;

    fn option(id: &str, text: &str) -> ElementSnapshot {
        ElementSnapshot {
            handle: ElementHandle(id.to_string()),
            tag: "button".into(),
            text: text.into(),
            value: None,
            input_type: None,
            disabled: false,
            classes: Vec::new(),
            rect: Rect::new(0.0, 0.0, 100.0, 30.0),
            in_form: false,
            src: None,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn exact_label_beats_substring() {
        let options = vec![
            option("a", "New other (see details)"),
            option("b", "  New "),
            option("c", "Used"),
        ];
        let picked = pick_condition(&options, ConditionCode::New.labels()).unwrap();
        assert_eq!(picked.handle.0, "b");
    }

    #[test]
    fn falls_back_to_substring_match() {
        let options = vec![option("a", "New"), option("b", "Pre-owned - Good")];
        let picked = pick_condition(&options, ConditionCode::Used.labels()).unwrap();
        assert_eq!(picked.handle.0, "b");
        assert!(pick_condition(&options, ConditionCode::ForParts.labels()).is_none());
    }

    #[test]
    fn selection_state_is_read_from_aria_or_class() {
        let mut el = option("a", "Used");
        assert!(!is_selected(&el));
        el.attributes.insert("aria-checked".into(), "true".into());
        assert!(is_selected(&el));
        let mut el = option("b", "Used");
        el.classes.push("btn--selected".into());
        assert!(is_selected(&el));
    }
}
