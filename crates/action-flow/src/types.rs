//! Run and step result types

use chrono::{DateTime, Utc};
use relay_core_types::RunId;
use serde::{Deserialize, Serialize};

/// What a final step failure does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criticality {
    /// Abort the run; later steps are not attempted
    Fatal,
    /// Log a warning and continue with the next step
    Soft,
}

/// Attempts allowed before the criticality policy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl RetryPolicy {
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
        }
    }

    pub fn attempts(max_attempts: u32, backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Step execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,

    pub status: StepStatus,

    /// True when the step was already satisfied (or marked complete) and its
    /// action never ran
    pub action_skipped: bool,

    pub attempts: u32,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    pub latency_ms: u64,

    pub error: Option<String>,
}

impl StepResult {
    pub fn new(step_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            step_id: step_id.into(),
            status: StepStatus::Pending,
            action_skipped: false,
            attempts: 0,
            started_at: now,
            finished_at: now,
            latency_ms: 0,
            error: None,
        }
    }

    pub fn with_success(mut self) -> Self {
        self.status = StepStatus::Completed;
        self.error = None;
        self
    }

    pub fn with_skipped_action(mut self) -> Self {
        self.status = StepStatus::Completed;
        self.action_skipped = true;
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.status = StepStatus::Failed;
        self.error = Some(error);
        self
    }

    /// Set finish time and calculate latency
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self.latency_ms = (self.finished_at - self.started_at).num_milliseconds().max(0) as u64;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    InProgress,
    Completed,
    /// A fatal step failed
    Aborted { step_id: String },
}

/// Outcome of one pass over the step list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub status: RunStatus,
    pub steps: Vec<StepResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub latency_ms: u64,
}

impl RunReport {
    pub fn new(run_id: RunId) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            status: RunStatus::InProgress,
            steps: Vec::new(),
            started_at: now,
            finished_at: now,
            latency_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn step(&self, step_id: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Steps that failed without aborting the run.
    pub fn soft_failures(&self) -> Vec<&StepResult> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .filter(|s| !matches!(&self.status, RunStatus::Aborted { step_id } if *step_id == s.step_id))
            .collect()
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self.latency_ms = (self.finished_at - self.started_at).num_milliseconds().max(0) as u64;
        self
    }
}
