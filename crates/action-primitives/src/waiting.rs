//! The bounded wait primitive every component polls through.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::types::WaitSpec;

/// How a bounded wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    TimedOut,
    Cancelled,
}

impl<T> PollOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            PollOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready(_))
    }
}

/// Calls `probe` every `spec.interval` until it yields a value, the timeout
/// elapses or `cancel` fires. The probe always runs at least once.
pub async fn poll_until<T, F, Fut>(
    spec: WaitSpec,
    cancel: Option<&CancellationToken>,
    mut probe: F,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + spec.timeout;
    let mut rounds = 0u32;
    loop {
        if cancel.map(|c| c.is_cancelled()).unwrap_or(false) {
            return PollOutcome::Cancelled;
        }
        rounds += 1;
        if let Some(value) = probe().await {
            trace!(rounds, "poll satisfied");
            return PollOutcome::Ready(value);
        }

        let now = Instant::now();
        if now >= deadline {
            trace!(rounds, "poll timed out");
            return PollOutcome::TimedOut;
        }
        let nap = spec.interval.min(deadline - now);
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => return PollOutcome::Cancelled,
                    _ = sleep(nap) => {}
                }
            }
            None => sleep(nap).await,
        }
    }
}

/// Fixed pause that lets the page react to an interaction.
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
