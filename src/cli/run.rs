use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use handoff_store::HandoffStore;
use page_adapter::{connect_tab, DomPort};
use relay_event_bus::{to_mpsc, InMemoryBus, RelayMessage};
use serde::Serialize;
use tracing::debug;

use crate::cli::context::CliContext;
use crate::pages::{dispatch, PageContext, PageOutcome};
use action_flow::RunReport;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// DevTools websocket endpoint of a running Chromium
    #[arg(long, value_name = "URL")]
    pub cdp: String,

    /// Attach to the first tab whose URL contains this text
    #[arg(long = "match", value_name = "TEXT")]
    pub url_match: Option<String>,
}

#[derive(Serialize)]
struct RunView<'a> {
    success: bool,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a RunReport>,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let (_browser, page) = connect_tab(&args.cdp, args.url_match.as_deref())
        .await
        .with_context(|| format!("attaching to {}", args.cdp))?;
    let port: Arc<dyn DomPort> = Arc::new(page);
    let store: Arc<dyn HandoffStore> = ctx.store().await?;

    let bus = InMemoryBus::<RelayMessage>::new(ctx.config().bus_capacity);
    let mut messages = to_mpsc(bus.clone(), ctx.config().bus_capacity);
    tokio::spawn(async move {
        while let Some(message) = messages.recv().await {
            debug!(?message, "relay progress");
        }
    });

    let page_ctx = PageContext::new(port, store, ctx.config().clone()).with_bus(bus);
    let outcome = dispatch(&page_ctx).await;

    let report = match &outcome {
        PageOutcome::Ran { report, .. } => Some(report),
        _ => None,
    };
    ctx.output().emit(
        &RunView {
            success: outcome.is_success(),
            summary: outcome.summary(),
            report,
        },
        |view| view.summary.clone(),
    )?;

    match outcome {
        PageOutcome::Failed { .. } | PageOutcome::Panicked { .. } => {
            bail!("{}", outcome.summary())
        }
        _ => Ok(()),
    }
}
