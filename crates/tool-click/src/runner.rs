use action_locator::{ElementResolver, PollingResolver};
use action_primitives::{ActionReport, AttemptLog, ExecCtx, WaitSpec};
use chrono::Utc;
use page_adapter::{AdapterError, DomEvent, DomPort, ElementSnapshot};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::errors::ClickError;
use crate::model::{ClickParams, ClickStrategy, ClickTarget};
use crate::policy::ClickPolicyView;

pub struct RuntimeDeps<'a> {
    pub port: &'a dyn DomPort,
    pub resolver: &'a PollingResolver,
    pub policy: &'a ClickPolicyView,
}

#[instrument(skip_all, fields(action = %ctx.action_id, click_target = %params.target.label()))]
pub async fn execute(
    ctx: &ExecCtx,
    params: ClickParams,
    deps: RuntimeDeps<'_>,
) -> Result<ActionReport, ClickError> {
    if !deps.policy.enabled {
        return Err(ClickError::Disabled);
    }
    let started_at = Utc::now();
    let started = Instant::now();
    let label = params.target.label();

    let element = match &params.target {
        ClickTarget::Element(el) => el.clone(),
        ClickTarget::Anchor(anchor) => {
            let window = WaitSpec::new(deps.policy.timeouts.poll(), deps.policy.timeouts.resolve());
            match deps.resolver.wait_for(anchor, window).await {
                Some(found) => found.element,
                None => return Err(ClickError::NotFound(label)),
            }
        }
    };

    let mut attempts = AttemptLog::new();
    for strategy in &deps.policy.strategies {
        if ctx.is_cancelled() {
            return Err(ClickError::Cancelled);
        }
        if ctx.is_timeout() {
            warn!(strategy = %strategy, "click budget exhausted");
            break;
        }
        if !strategy.applies_to(&element) {
            debug!(strategy = %strategy, "strategy not applicable");
            continue;
        }

        let attempt_started = Instant::now();
        let outcome = perform(deps.port, *strategy, &element).await;
        let effect = match outcome {
            Ok(()) => {
                let window = ctx.window(deps.policy.timeouts.poll(), deps.policy.timeouts.verify());
                deps.resolver
                    .verify(&params.expect, &element.handle, window, Some(&ctx.cancel_token))
                    .await
            }
            Err(err) => {
                debug!(strategy = %strategy, error = %err, "strategy dispatch failed");
                // A late effect of an earlier strategy may have detached the target.
                err.is_detached() && deps.resolver.observe(&params.expect, &element.handle).await
            }
        };
        let elapsed = attempt_started.elapsed().as_millis() as u64;

        if effect {
            attempts.record_ok(strategy.name(), elapsed);
            info!(strategy = %strategy, "click effect observed");
            return Ok(ActionReport::success(
                ctx.action_id.clone(),
                started_at,
                started.elapsed().as_millis() as u64,
                attempts,
            ));
        }
        attempts.record_failed(strategy.name(), "expected effect not observed", elapsed);
    }

    warn!(tried = ?attempts.tried(), "all click strategies exhausted");
    Err(ClickError::Exhausted { label, attempts })
}

async fn perform(
    port: &dyn DomPort,
    strategy: ClickStrategy,
    element: &ElementSnapshot,
) -> Result<(), AdapterError> {
    let target = &element.handle;
    match strategy {
        ClickStrategy::Direct => port.click(target).await,
        ClickStrategy::FocusThenClick => {
            port.focus(target).await?;
            port.click(target).await
        }
        ClickStrategy::MouseSequence => {
            port.dispatch(target, DomEvent::MouseDown).await?;
            port.dispatch(target, DomEvent::MouseUp).await?;
            port.dispatch(target, DomEvent::Click).await
        }
        ClickStrategy::FormSubmit => port.submit_form(target).await,
    }
}
