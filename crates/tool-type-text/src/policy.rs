use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::model::InputMode;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypePolicyView {
    pub enabled: bool,
    pub modes: Vec<InputMode>,
    pub max_text_len: usize,
    pub timeouts: TypeTimeouts,
    pub delays: TypeDelays,
}

impl Default for TypePolicyView {
    fn default() -> Self {
        Self {
            enabled: true,
            modes: InputMode::chain().to_vec(),
            max_text_len: 4000,
            timeouts: TypeTimeouts::default(),
            delays: TypeDelays::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeTimeouts {
    pub resolve_ms: u64,
    /// Shared by every input mode of one entry.
    pub budget_ms: u64,
    pub verify_ms: u64,
    pub poll_ms: u64,
}

impl TypeTimeouts {
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

impl Default for TypeTimeouts {
    fn default() -> Self {
        Self {
            resolve_ms: 10_000,
            budget_ms: 60_000,
            verify_ms: 1_500,
            poll_ms: 300,
        }
    }
}

/// Inter-key delay range for natural typing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TypeDelays {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for TypeDelays {
    fn default() -> Self {
        Self {
            min_ms: 30,
            max_ms: 120,
        }
    }
}
