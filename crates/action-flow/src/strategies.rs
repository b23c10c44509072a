//! Failure handling strategies

use crate::errors::FlowError;
use crate::types::{Criticality, RetryPolicy};
use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

#[async_trait]
pub trait FailureHandler: Send + Sync {
    /// Decides what happens after `attempt` (1-based) failed with `error`.
    async fn handle_failure(
        &self,
        step_id: &str,
        criticality: Criticality,
        retry: RetryPolicy,
        error: &FlowError,
        attempt: u32,
    ) -> FailureHandlerResult;

    fn should_retry(&self, retry: RetryPolicy, attempt: u32) -> bool;

    fn calculate_backoff(&self, retry: RetryPolicy, attempt: u32) -> Duration;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureHandlerResult {
    /// Abort the entire run
    Abort(String),

    /// Continue to next step
    Continue(String),

    /// Retry the current step
    Retry { attempt: u32, backoff_ms: u64 },
}

/// Retries with exponential backoff, then applies the step's criticality.
pub struct DefaultFailureHandler;

impl DefaultFailureHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultFailureHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FailureHandler for DefaultFailureHandler {
    async fn handle_failure(
        &self,
        step_id: &str,
        criticality: Criticality,
        retry: RetryPolicy,
        error: &FlowError,
        attempt: u32,
    ) -> FailureHandlerResult {
        if self.should_retry(retry, attempt) {
            let backoff = self.calculate_backoff(retry, attempt);
            info!(
                "Step {} failed (attempt {}), retrying after {}ms",
                step_id,
                attempt,
                backoff.as_millis()
            );
            sleep(backoff).await;
            return FailureHandlerResult::Retry {
                attempt: attempt + 1,
                backoff_ms: backoff.as_millis() as u64,
            };
        }

        match criticality {
            Criticality::Fatal => {
                warn!("Step {} failed, aborting run: {}", step_id, error);
                FailureHandlerResult::Abort(error.to_string())
            }
            Criticality::Soft => {
                warn!("Step {} failed, continuing to next step: {}", step_id, error);
                FailureHandlerResult::Continue(error.to_string())
            }
        }
    }

    fn should_retry(&self, retry: RetryPolicy, attempt: u32) -> bool {
        attempt < retry.max_attempts
    }

    fn calculate_backoff(&self, retry: RetryPolicy, attempt: u32) -> Duration {
        // Exponential backoff: backoff_ms * 2^(attempt-1)
        let multiplier = 2u64.saturating_pow(attempt.saturating_sub(1));
        let total_ms = retry.backoff_ms.saturating_mul(multiplier);
        Duration::from_millis(total_ms.min(60_000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_retry() {
        let handler = DefaultFailureHandler::new();
        assert!(!handler.should_retry(RetryPolicy::once(), 1));

        let retry = RetryPolicy::attempts(3, 100);
        assert!(handler.should_retry(retry, 1));
        assert!(handler.should_retry(retry, 2));
        assert!(!handler.should_retry(retry, 3));
    }

    #[test]
    fn test_calculate_backoff() {
        let handler = DefaultFailureHandler::new();
        let retry = RetryPolicy::attempts(5, 1000);

        assert_eq!(handler.calculate_backoff(retry, 1).as_millis(), 1000);
        assert_eq!(handler.calculate_backoff(retry, 2).as_millis(), 2000);
        assert_eq!(handler.calculate_backoff(retry, 3).as_millis(), 4000);
        assert_eq!(handler.calculate_backoff(retry, 10).as_millis(), 60_000);
    }

    #[tokio::test]
    async fn test_final_failure_follows_criticality() {
        let handler = DefaultFailureHandler::new();
        let err = FlowError::NotFound("#continue".into());

        let fatal = handler
            .handle_failure("title", Criticality::Fatal, RetryPolicy::once(), &err, 1)
            .await;
        assert!(matches!(fatal, FailureHandlerResult::Abort(_)));

        let soft = handler
            .handle_failure("dismiss", Criticality::Soft, RetryPolicy::once(), &err, 1)
            .await;
        assert!(matches!(soft, FailureHandlerResult::Continue(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_before_policy() {
        let handler = DefaultFailureHandler::new();
        let err = FlowError::NotFound("#continue".into());
        let result = handler
            .handle_failure("title", Criticality::Fatal, RetryPolicy::attempts(2, 250), &err, 1)
            .await;
        assert_eq!(
            result,
            FailureHandlerResult::Retry {
                attempt: 2,
                backoff_ms: 250
            }
        );
    }
}
