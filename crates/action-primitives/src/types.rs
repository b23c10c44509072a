//! Core data types for actions

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use page_adapter::{DomPort, ElementHandle};
use relay_core_types::ActionId;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::ActionError;

/// Execution context shared by every strategy of one action.
///
/// All strategies draw from the same deadline; a strategy never gets a
/// fresh timeout of its own.
#[derive(Clone, Debug)]
pub struct ExecCtx {
    pub action_id: ActionId,
    pub deadline: Instant,
    pub cancel_token: CancellationToken,
}

impl ExecCtx {
    pub fn new(budget: Duration) -> Self {
        Self {
            action_id: ActionId::new(),
            deadline: Instant::now() + budget,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn is_timeout(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Wait spec bounded by both `max` and the remaining budget.
    pub fn window(&self, interval: Duration, max: Duration) -> WaitSpec {
        WaitSpec {
            interval,
            timeout: max.min(self.remaining_time()),
        }
    }

    /// Fails once the budget is spent or the action was cancelled.
    pub fn ensure_active(&self) -> Result<(), ActionError> {
        if self.is_cancelled() {
            return Err(ActionError::Interrupted(format!(
                "action {} cancelled",
                self.action_id
            )));
        }
        if self.is_timeout() {
            return Err(ActionError::Interrupted(format!(
                "action {} exhausted its budget",
                self.action_id
            )));
        }
        Ok(())
    }
}

/// Poll interval and overall timeout of a bounded wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitSpec {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitSpec {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(300),
            timeout: Duration::from_secs(10),
        }
    }
}

/// One way of locating an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorStrategy {
    /// Plain CSS selector
    Css(String),

    /// Elements matching `scope` whose visible text contains `contains`
    /// (case-insensitive)
    Text { scope: String, contains: String },

    /// Elements matching `scope` whose attribute `name` contains `contains`
    /// (case-insensitive)
    Attribute {
        scope: String,
        name: String,
        contains: String,
    },
}

impl SelectorStrategy {
    pub fn css(selector: impl Into<String>) -> Self {
        SelectorStrategy::Css(selector.into())
    }

    pub fn text(scope: impl Into<String>, contains: impl Into<String>) -> Self {
        SelectorStrategy::Text {
            scope: scope.into(),
            contains: contains.into(),
        }
    }

    pub fn attribute(
        scope: impl Into<String>,
        name: impl Into<String>,
        contains: impl Into<String>,
    ) -> Self {
        SelectorStrategy::Attribute {
            scope: scope.into(),
            name: name.into(),
            contains: contains.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SelectorStrategy::Css(_) => "css",
            SelectorStrategy::Text { .. } => "text",
            SelectorStrategy::Attribute { .. } => "attribute",
        }
    }
}

impl fmt::Display for SelectorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorStrategy::Css(s) => write!(f, "css:{}", s),
            SelectorStrategy::Text { scope, contains } => {
                write!(f, "text:{}~'{}'", scope, contains)
            }
            SelectorStrategy::Attribute {
                scope,
                name,
                contains,
            } => write!(f, "attr:{}[{}~'{}']", scope, name, contains),
        }
    }
}

/// Whether matches must pass the interactability filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Interactable,
    /// Hidden-by-design controls such as file inputs
    Any,
}

/// Named element target with ordered fallback strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub label: String,
    pub strategies: Vec<SelectorStrategy>,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Anchor {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            strategies: Vec::new(),
            visibility: Visibility::Interactable,
        }
    }

    pub fn css(mut self, selector: impl Into<String>) -> Self {
        self.strategies.push(SelectorStrategy::css(selector));
        self
    }

    pub fn text(mut self, scope: impl Into<String>, contains: impl Into<String>) -> Self {
        self.strategies.push(SelectorStrategy::text(scope, contains));
        self
    }

    pub fn attribute(
        mut self,
        scope: impl Into<String>,
        name: impl Into<String>,
        contains: impl Into<String>,
    ) -> Self {
        self.strategies
            .push(SelectorStrategy::attribute(scope, name, contains));
        self
    }

    pub fn unfiltered(mut self) -> Self {
        self.visibility = Visibility::Any;
        self
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Custom observable effect.
#[async_trait]
pub trait EffectProbe: Send + Sync {
    async fn observed(&self, port: &dyn DomPort, target: &ElementHandle) -> bool;

    fn describe(&self) -> &str {
        "custom probe"
    }
}

/// Effect an interaction must produce to count as successful.
#[derive(Clone)]
pub enum Expectation {
    /// An element matching the anchor becomes present
    Appears(Anchor),
    /// No element matches the anchor any more
    Disappears(Anchor),
    /// The interacted element is detached
    TargetGone,
    /// The interacted element's value equals the string
    ValueEquals(String),
    Probe(Arc<dyn EffectProbe>),
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Appears(a) => write!(f, "Appears({})", a),
            Expectation::Disappears(a) => write!(f, "Disappears({})", a),
            Expectation::TargetGone => f.write_str("TargetGone"),
            Expectation::ValueEquals(v) => write!(f, "ValueEquals({:?})", v),
            Expectation::Probe(p) => write!(f, "Probe({})", p.describe()),
        }
    }
}

/// Outcome of one interaction strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: String,
    pub ok: bool,
    pub error: Option<String>,
    pub latency_ms: u64,
}

/// Ordered record of the strategies tried for one goal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptLog {
    attempts: Vec<StrategyAttempt>,
}

impl AttemptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ok(&mut self, strategy: impl Into<String>, latency_ms: u64) {
        self.attempts.push(StrategyAttempt {
            strategy: strategy.into(),
            ok: true,
            error: None,
            latency_ms,
        });
    }

    pub fn record_failed(
        &mut self,
        strategy: impl Into<String>,
        error: impl Into<String>,
        latency_ms: u64,
    ) {
        self.attempts.push(StrategyAttempt {
            strategy: strategy.into(),
            ok: false,
            error: Some(error.into()),
            latency_ms,
        });
    }

    pub fn attempts(&self) -> &[StrategyAttempt] {
        &self.attempts
    }

    /// Strategy names in the order they were tried.
    pub fn tried(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.strategy.as_str()).collect()
    }

    pub fn succeeded_with(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|a| a.ok)
            .map(|a| a.strategy.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }
}

/// Report of one executed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    pub action_id: ActionId,

    pub ok: bool,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finished_at: DateTime<Utc>,

    pub latency_ms: u64,

    pub attempts: AttemptLog,

    pub error: Option<String>,
}

impl ActionReport {
    pub fn success(
        action_id: ActionId,
        started_at: DateTime<Utc>,
        latency_ms: u64,
        attempts: AttemptLog,
    ) -> Self {
        Self {
            action_id,
            ok: true,
            started_at,
            finished_at: Utc::now(),
            latency_ms,
            attempts,
            error: None,
        }
    }

    pub fn failure(
        action_id: ActionId,
        started_at: DateTime<Utc>,
        latency_ms: u64,
        attempts: AttemptLog,
        error: &ActionError,
    ) -> Self {
        Self {
            action_id,
            ok: false,
            started_at,
            finished_at: Utc::now(),
            latency_ms,
            attempts,
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_keeps_strategy_order() {
        let anchor = Anchor::new("continue")
            .css("#continue")
            .text("button", "Continue")
            .attribute("button", "aria-label", "continue");
        let kinds: Vec<_> = anchor.strategies.iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec!["css", "text", "attribute"]);
        assert_eq!(anchor.visibility, Visibility::Interactable);
        assert_eq!(anchor.unfiltered().visibility, Visibility::Any);
    }

    #[test]
    fn attempt_log_reports_first_success() {
        let mut log = AttemptLog::new();
        log.record_failed("direct", "no effect", 5);
        log.record_ok("focus_then_click", 7);
        assert_eq!(log.tried(), vec!["direct", "focus_then_click"]);
        assert_eq!(log.succeeded_with(), Some("focus_then_click"));
    }

    #[tokio::test(start_paused = true)]
    async fn ctx_window_is_capped_by_budget() {
        let ctx = ExecCtx::new(Duration::from_secs(2));
        let spec = ctx.window(Duration::from_millis(300), Duration::from_secs(5));
        assert!(spec.timeout <= Duration::from_secs(2));
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(ctx.ensure_active().is_err());
    }
}
