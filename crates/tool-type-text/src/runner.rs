use action_locator::{ElementResolver, PollingResolver};
use action_primitives::{settle, ActionReport, AttemptLog, ExecCtx, Expectation, WaitSpec};
use chrono::Utc;
use page_adapter::{AdapterError, DomEvent, DomPort, ElementHandle};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::errors::TypeTextError;
use crate::model::{InputMode, TextParams, TextTarget};
use crate::policy::TypePolicyView;
use crate::tempo::TempoPort;

pub struct RuntimeDeps<'a> {
    pub port: &'a dyn DomPort,
    pub resolver: &'a PollingResolver,
    pub tempo: &'a dyn TempoPort,
    pub policy: &'a TypePolicyView,
}

#[instrument(skip_all, fields(action = %ctx.action_id, field = %params.target.label(), len = params.text.chars().count()))]
pub async fn execute(
    ctx: &ExecCtx,
    params: TextParams,
    deps: RuntimeDeps<'_>,
) -> Result<ActionReport, TypeTextError> {
    if !deps.policy.enabled {
        return Err(TypeTextError::Disabled);
    }
    if params.text.chars().count() > deps.policy.max_text_len {
        return Err(TypeTextError::TooLong {
            max: deps.policy.max_text_len,
        });
    }
    let started_at = Utc::now();
    let started = Instant::now();
    let label = params.target.label();

    let target = match &params.target {
        TextTarget::Element(el) => el.handle.clone(),
        TextTarget::Anchor(anchor) => {
            let window = WaitSpec::new(deps.policy.timeouts.poll(), deps.policy.timeouts.resolve());
            match deps.resolver.wait_for(anchor, window).await {
                Some(found) => found.element.handle,
                None => return Err(TypeTextError::NotFound(label)),
            }
        }
    };

    let expect = Expectation::ValueEquals(params.text.clone());
    let mut attempts = AttemptLog::new();
    for mode in &deps.policy.modes {
        if ctx.is_cancelled() {
            return Err(TypeTextError::Cancelled);
        }
        if ctx.is_timeout() {
            warn!(mode = mode.name(), "typing budget exhausted");
            break;
        }

        let attempt_started = Instant::now();
        let outcome = match mode {
            InputMode::Paste => paste(deps.port, &target, &params.text).await,
            InputMode::Natural => natural(ctx, &deps, &target, &params.text).await,
        };
        let elapsed = || attempt_started.elapsed().as_millis() as u64;
        if let Err(err) = outcome {
            debug!(mode = mode.name(), error = %err, "input mode failed");
            attempts.record_failed(mode.name(), err.to_string(), elapsed());
            if err.is_detached() {
                break;
            }
            continue;
        }

        let window = ctx.window(deps.policy.timeouts.poll(), deps.policy.timeouts.verify());
        if deps
            .resolver
            .verify(&expect, &target, window, Some(&ctx.cancel_token))
            .await
        {
            attempts.record_ok(mode.name(), elapsed());
            info!(mode = mode.name(), "field value verified");
            return Ok(ActionReport::success(
                ctx.action_id.clone(),
                started_at,
                started.elapsed().as_millis() as u64,
                attempts,
            ));
        }
        attempts.record_failed(mode.name(), "field value differs from text", elapsed());
    }

    warn!(tried = ?attempts.tried(), "all input modes exhausted");
    Err(TypeTextError::Exhausted { label, attempts })
}

async fn paste(port: &dyn DomPort, target: &ElementHandle, text: &str) -> Result<(), AdapterError> {
    port.focus(target).await?;
    port.set_value(target, text).await?;
    port.dispatch(target, DomEvent::Input).await?;
    port.dispatch(target, DomEvent::Change).await
}

async fn natural(
    ctx: &ExecCtx,
    deps: &RuntimeDeps<'_>,
    target: &ElementHandle,
    text: &str,
) -> Result<(), AdapterError> {
    let port = deps.port;
    port.focus(target).await?;
    port.set_value(target, "").await?;
    port.dispatch(target, DomEvent::Input).await?;
    for step in deps.tempo.build_plan(text).steps {
        if ctx.is_cancelled() || ctx.is_timeout() {
            break;
        }
        port.type_char(target, step.ch).await?;
        settle(Duration::from_millis(step.delay_ms)).await;
    }
    port.dispatch(target, DomEvent::Change).await
}
