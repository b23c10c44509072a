use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::ClickStrategy;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClickPolicyView {
    pub enabled: bool,
    /// Strategies in the order they are tried.
    pub strategies: Vec<ClickStrategy>,
    pub timeouts: ClickTimeouts,
}

impl Default for ClickPolicyView {
    fn default() -> Self {
        Self {
            enabled: true,
            strategies: ClickStrategy::chain().to_vec(),
            timeouts: ClickTimeouts::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClickTimeouts {
    /// Window for locating an anchor target.
    pub resolve_ms: u64,
    /// Budget shared by every strategy of one click.
    pub budget_ms: u64,
    /// Per-strategy window for observing the expected effect.
    pub verify_ms: u64,
    pub poll_ms: u64,
}

impl ClickTimeouts {
    pub fn resolve(&self) -> Duration {
        Duration::from_millis(self.resolve_ms)
    }

    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }

    pub fn verify(&self) -> Duration {
        Duration::from_millis(self.verify_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

impl Default for ClickTimeouts {
    fn default() -> Self {
        Self {
            resolve_ms: 10_000,
            budget_ms: 15_000,
            verify_ms: 2_000,
            poll_ms: 300,
        }
    }
}
