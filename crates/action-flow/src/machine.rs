//! Ordered, resumable step execution.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use relay_core_types::RunId;
use tracing::{debug, info, instrument, warn};

use crate::errors::FlowError;
use crate::strategies::{DefaultFailureHandler, FailureHandler, FailureHandlerResult};
use crate::types::{Criticality, RetryPolicy, RunReport, RunStatus, StepResult, StepStatus};

/// One unit of work in a run. Steps receive only the run context; they must
/// re-resolve any element they need instead of relying on earlier steps.
#[async_trait]
pub trait Step<C: Sync>: Send + Sync {
    fn id(&self) -> &'static str;

    fn criticality(&self) -> Criticality;

    fn retry(&self) -> RetryPolicy {
        RetryPolicy::once()
    }

    /// When true the step is marked completed without running its action.
    async fn already_satisfied(&self, _ctx: &C) -> bool {
        false
    }

    async fn run(&self, ctx: &C) -> Result<(), FlowError>;
}

pub struct StepMachine<C> {
    run_id: RunId,
    steps: Vec<Box<dyn Step<C>>>,
    completed: HashSet<String>,
    statuses: Vec<StepStatus>,
    handler: Arc<dyn FailureHandler>,
}

impl<C: Sync> StepMachine<C> {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            steps: Vec::new(),
            completed: HashSet::new(),
            statuses: Vec::new(),
            handler: Arc::new(DefaultFailureHandler::new()),
        }
    }

    pub fn with_step(mut self, step: impl Step<C> + 'static) -> Self {
        self.push(Box::new(step));
        self
    }

    pub fn with_failure_handler(mut self, handler: Arc<dyn FailureHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn push(&mut self, step: Box<dyn Step<C>>) {
        self.steps.push(step);
        self.statuses.push(StepStatus::Pending);
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Records `step_id` as done so its action is skipped on the next run.
    pub fn mark_completed(&mut self, step_id: &str) {
        self.completed.insert(step_id.to_string());
        if let Some(idx) = self.index_of(step_id) {
            self.statuses[idx] = StepStatus::Completed;
        }
    }

    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed.contains(step_id)
    }

    pub fn status(&self, step_id: &str) -> Option<StepStatus> {
        self.index_of(step_id).map(|idx| self.statuses[idx])
    }

    pub fn step_ids(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    fn index_of(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id() == step_id)
    }

    /// Walks every step once. Steps already completed are reported without
    /// running; a fatal failure stops the walk.
    #[instrument(skip_all, fields(run = %self.run_id, steps = self.steps.len()))]
    pub async fn run(&mut self, ctx: &C) -> RunReport {
        let mut report = RunReport::new(self.run_id.clone());

        for idx in 0..self.steps.len() {
            let step = &self.steps[idx];
            let step_id = step.id();
            let mut result = StepResult::new(step_id);

            if self.completed.contains(step_id) {
                debug!(step = step_id, "step already completed");
                report.steps.push(result.with_skipped_action().finish());
                continue;
            }

            self.statuses[idx] = StepStatus::Running;
            if step.already_satisfied(ctx).await {
                info!(step = step_id, "step already satisfied, skipping action");
                self.completed.insert(step_id.to_string());
                self.statuses[idx] = StepStatus::Completed;
                report.steps.push(result.with_skipped_action().finish());
                continue;
            }

            let mut attempt = 1;
            let outcome = loop {
                result.attempts = attempt;
                let err = match step.run(ctx).await {
                    Ok(()) => break Ok(()),
                    Err(err) => err,
                };
                match self
                    .handler
                    .handle_failure(step_id, step.criticality(), step.retry(), &err, attempt)
                    .await
                {
                    FailureHandlerResult::Retry { attempt: next, .. } => attempt = next,
                    FailureHandlerResult::Abort(reason) => break Err((true, reason)),
                    FailureHandlerResult::Continue(reason) => break Err((false, reason)),
                }
            };

            match outcome {
                Ok(()) => {
                    info!(step = step_id, attempts = attempt, "step completed");
                    self.completed.insert(step_id.to_string());
                    self.statuses[idx] = StepStatus::Completed;
                    report.steps.push(result.with_success().finish());
                }
                Err((abort, reason)) => {
                    self.statuses[idx] = StepStatus::Failed;
                    report.steps.push(result.with_error(reason).finish());
                    if abort {
                        warn!(step = step_id, "fatal step failed, run aborted");
                        report.status = RunStatus::Aborted {
                            step_id: step_id.to_string(),
                        };
                        return report.finish();
                    }
                }
            }
        }

        report.status = RunStatus::Completed;
        report.finish()
    }
}
