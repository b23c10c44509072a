//! eBay listing form automation.
//!
//! Every step here is soft: a missing photo counter or price field never
//! stops the remaining fields from being filled.

use async_trait::async_trait;

use action_flow::{Criticality, FlowError, RunReport, Step, StepMachine};
use action_locator::ElementResolver;
use action_primitives::Anchor;
use handoff_store::keys;
use image_pipeline::UploadPipeline;
use relay_event_bus::{EventBus, RelayMessage};
use tool_type_text::TextParams;
use tracing::{debug, info, warn};

use super::item_specifics::ItemSpecificsFiller;
use super::selectors;
use super::PageContext;
use crate::errors::AutomationError;

/// Input of one listing-form run.
pub struct DestinationRun {
    pub page: PageContext,
    pub title: String,
    pub price: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
}

impl DestinationRun {
    async fn value_of(&self, anchor: &Anchor) -> Option<String> {
        match self.page.resolver.resolve_once(anchor).await {
            Ok(Some(found)) => found.element.value,
            _ => None,
        }
    }

    async fn holds(&self, anchor: &Anchor, expected: &str) -> bool {
        self.value_of(anchor)
            .await
            .map(|v| v.trim() == expected.trim())
            .unwrap_or(false)
    }

    async fn enter(&self, anchor: Anchor, text: &str) -> Result<(), FlowError> {
        self.page
            .typer
            .type_text(TextParams::anchor(anchor, text))
            .await
            .map_err(AutomationError::from)?;
        Ok(())
    }
}

pub struct FillTitle;

#[async_trait]
impl Step<DestinationRun> for FillTitle {
    fn id(&self) -> &'static str {
        "fill_title"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    async fn already_satisfied(&self, run: &DestinationRun) -> bool {
        run.holds(&selectors::listing_title(), &run.title).await
    }

    async fn run(&self, run: &DestinationRun) -> Result<(), FlowError> {
        run.enter(selectors::listing_title(), &run.title).await
    }
}

pub struct UploadImages;

#[async_trait]
impl Step<DestinationRun> for UploadImages {
    fn id(&self) -> &'static str {
        "upload_images"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    /// Images are cleared from the store after a verified upload.
    async fn already_satisfied(&self, run: &DestinationRun) -> bool {
        matches!(run.page.drafts.images().await, Ok(images) if images.is_empty())
    }

    async fn run(&self, run: &DestinationRun) -> Result<(), FlowError> {
        let pipeline = UploadPipeline::new(
            run.page.resolver.clone(),
            run.page.drafts.clone(),
            selectors::upload_anchors(),
        )
        .with_settings(run.page.config.upload.clone());
        let outcome = pipeline.run().await.map_err(AutomationError::from)?;
        info!(
            expected = outcome.expected,
            observed = outcome.observed,
            strategy = ?outcome.strategy.map(|s| s.name()),
            "photos uploaded"
        );
        run.page.bus.notify(RelayMessage::UploadVerified {
            run: run.page.run_id.clone(),
            count: outcome.observed as usize,
        });
        Ok(())
    }
}

pub struct FillPrice;

#[async_trait]
impl Step<DestinationRun> for FillPrice {
    fn id(&self) -> &'static str {
        "fill_price"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    async fn already_satisfied(&self, run: &DestinationRun) -> bool {
        match &run.price {
            Some(price) => run.holds(&selectors::price_input(), price).await,
            None => false,
        }
    }

    async fn run(&self, run: &DestinationRun) -> Result<(), FlowError> {
        let Some(price) = &run.price else {
            return Err(AutomationError::StorageMiss(keys::EBAY_PRICE.to_string()).into());
        };
        run.enter(selectors::price_input(), price).await
    }
}

pub struct FillSku;

#[async_trait]
impl Step<DestinationRun> for FillSku {
    fn id(&self) -> &'static str {
        "fill_sku"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    async fn already_satisfied(&self, run: &DestinationRun) -> bool {
        match &run.sku {
            Some(sku) => run.holds(&selectors::sku_input(), sku).await,
            None => false,
        }
    }

    async fn run(&self, run: &DestinationRun) -> Result<(), FlowError> {
        let Some(sku) = &run.sku else {
            return Err(AutomationError::StorageMiss(keys::EBAY_SKU.to_string()).into());
        };
        run.enter(selectors::sku_input(), sku).await
    }
}

pub struct FillDescription;

#[async_trait]
impl Step<DestinationRun> for FillDescription {
    fn id(&self) -> &'static str {
        "fill_description"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    /// Nothing to do without a stored description.
    async fn already_satisfied(&self, run: &DestinationRun) -> bool {
        match &run.description {
            Some(text) => run.holds(&selectors::description_input(), text).await,
            None => true,
        }
    }

    async fn run(&self, run: &DestinationRun) -> Result<(), FlowError> {
        match &run.description {
            Some(text) => run.enter(selectors::description_input(), text).await,
            None => Ok(()),
        }
    }
}

pub struct FillItemSpecifics;

#[async_trait]
impl Step<DestinationRun> for FillItemSpecifics {
    fn id(&self) -> &'static str {
        "item_specifics"
    }

    fn criticality(&self) -> Criticality {
        Criticality::Soft
    }

    async fn run(&self, run: &DestinationRun) -> Result<(), FlowError> {
        let filler = ItemSpecificsFiller::new(&run.page.resolver, run.page.click.as_ref());
        let summary = filler.fill().await;
        debug!(?summary, "item specifics");
        Ok(())
    }
}

pub fn machine(ctx: &PageContext) -> StepMachine<DestinationRun> {
    StepMachine::new(ctx.run_id.clone())
        .with_step(FillTitle)
        .with_step(UploadImages)
        .with_step(FillPrice)
        .with_step(FillSku)
        .with_step(FillDescription)
        .with_step(FillItemSpecifics)
}

/// Fills the listing form from the stored draft. Without a stored title
/// nothing on the page is touched.
pub async fn run(ctx: &PageContext) -> Result<RunReport, AutomationError> {
    let Some(title) = ctx.drafts.title().await? else {
        warn!("no stored title, listing form left untouched");
        return Err(AutomationError::StorageMiss(keys::EBAY_TITLE.to_string()));
    };
    let run = DestinationRun {
        page: ctx.clone(),
        title,
        price: ctx.drafts.price().await?,
        sku: ctx.drafts.resolve_sku().await?,
        description: ctx.drafts.description().await?,
    };
    info!(
        title = %run.title,
        has_price = run.price.is_some(),
        has_sku = run.sku.is_some(),
        "filling listing form"
    );
    ctx.bus.notify(RelayMessage::SetupComplete {
        run: ctx.run_id.clone(),
        kind: "destination".to_string(),
    });
    let report = machine(ctx).run(&run).await;
    ctx.publish_report(&report);
    Ok(report)
}
