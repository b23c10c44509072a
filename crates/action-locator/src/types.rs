//! Core types for locator system

use action_primitives::SelectorStrategy;
use page_adapter::{ElementHandle, ElementSnapshot};
use serde::{Deserialize, Serialize};

/// First element that satisfied an anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub element: ElementSnapshot,

    /// Strategy that produced the match
    pub strategy: SelectorStrategy,

    /// Position of that strategy in the anchor's fallback list
    pub strategy_index: usize,
}

impl ResolutionResult {
    pub fn new(element: ElementSnapshot, strategy: SelectorStrategy, strategy_index: usize) -> Self {
        Self {
            element,
            strategy,
            strategy_index,
        }
    }

    pub fn handle(&self) -> &ElementHandle {
        &self.element.handle
    }

    /// True when a fallback strategy, not the primary one, matched.
    pub fn used_fallback(&self) -> bool {
        self.strategy_index > 0
    }
}
