use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::debug;

use relay_core_types::RunId;

/// Trait implemented by payload types that can be carried on the bus.
pub trait Event: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> Event for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

pub trait EventBus<E>: Send + Sync
where
    E: Event,
{
    /// Fire-and-forget publish; having no subscriber is not an error.
    fn notify(&self, event: E);
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// Messages exchanged between the coordinator and page handlers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RelayMessage {
    PageClassified { url: String, kind: String },
    SetupComplete { run: RunId, kind: String },
    StepFinished { run: RunId, step: String, ok: bool },
    UploadVerified { run: RunId, count: usize },
    RunFinished { run: RunId, ok: bool },
}

/// Simple in-memory bus; one per relay process.
pub struct InMemoryBus<E>
where
    E: Event,
{
    sender: broadcast::Sender<E>,
}

impl<E> InMemoryBus<E>
where
    E: Event,
{
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }
}

impl<E> EventBus<E> for InMemoryBus<E>
where
    E: Event,
{
    fn notify(&self, event: E) {
        if self.sender.send(event).is_err() {
            debug!("bus message dropped: no subscribers");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}

/// Helper to materialise an mpsc receiver from the bus subscription
/// so callers can await events without handling broadcast semantics directly.
pub fn to_mpsc<E>(bus: Arc<InMemoryBus<E>>, capacity: usize) -> mpsc::Receiver<E>
where
    E: Event,
{
    let mut rx = bus.subscribe();
    let (tx, out_rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        while let Ok(ev) = rx.recv().await {
            if tx.send(ev).await.is_err() {
                break;
            }
        }
    });
    out_rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_without_subscribers_is_silent() {
        let bus = InMemoryBus::<RelayMessage>::new(4);
        bus.notify(RelayMessage::RunFinished {
            run: RunId::new(),
            ok: true,
        });
        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn mpsc_bridge_forwards_messages() {
        let bus = InMemoryBus::<RelayMessage>::new(8);
        let mut rx = to_mpsc(bus.clone(), 8);
        let run = RunId::new();
        bus.notify(RelayMessage::UploadVerified {
            run: run.clone(),
            count: 3,
        });
        let received = rx.recv().await.expect("message forwarded");
        assert_eq!(received, RelayMessage::UploadVerified { run, count: 3 });
    }
}
