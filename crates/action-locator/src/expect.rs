//! Observable-effect verification.

use action_primitives::{poll_until, Expectation, WaitSpec};
use page_adapter::ElementHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::resolver::{ElementResolver, PollingResolver};

impl PollingResolver {
    /// One observation of `expectation` against the current page.
    pub async fn observe(&self, expectation: &Expectation, target: &ElementHandle) -> bool {
        match expectation {
            Expectation::Appears(anchor) => {
                matches!(self.resolve_once(anchor).await, Ok(Some(_)))
            }
            Expectation::Disappears(anchor) => {
                matches!(self.resolve_once(anchor).await, Ok(None))
            }
            Expectation::TargetGone => {
                matches!(self.port().snapshot(target).await, Ok(None))
            }
            Expectation::ValueEquals(expected) => match self.port().snapshot(target).await {
                Ok(Some(el)) => el.value.as_deref() == Some(expected.as_str()),
                _ => false,
            },
            Expectation::Probe(probe) => probe.observed(self.port().as_ref(), target).await,
        }
    }

    /// Polls `expectation` for the window; `true` once it is observed.
    pub async fn verify(
        &self,
        expectation: &Expectation,
        target: &ElementHandle,
        window: WaitSpec,
        cancel: Option<&CancellationToken>,
    ) -> bool {
        let seen = poll_until(window, cancel, || async move {
            self.observe(expectation, target).await.then_some(())
        })
        .await
        .is_ready();
        debug!(?expectation, target = %target, seen, "effect verification");
        seen
    }
}
