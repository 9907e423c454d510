//! Multi-step Workflow
//!
//! The document store gives per-document atomicity only. Operations that
//! write more than one document run their writes as named steps through a
//! `Workflow`, so a failure after the first write is reported as a
//! `PartialFailure` listing what was already applied instead of a bare 500.
//! Every step must be idempotent: re-sending the same request re-applies the
//! completed steps harmlessly and retries the failed one.
//!
//! ```ignore
//! let mut workflow = Workflow::new("assign_decorator", &ctx);
//! workflow.step("assign booking", self.bookings.assign_decorator(&id, &snapshot)).await?;
//! workflow.step("mark decorator busy", self.users.set_work_status(&decorator_id, WorkStatus::Busy)).await?;
//! workflow.finish();
//! ```

use std::future::Future;

use tracing::{debug, error, info};

use super::error::UseCaseError;
use super::execution_context::ExecutionContext;
use crate::shared::error::PlatformError;

pub struct Workflow {
    name: &'static str,
    execution_id: String,
    completed: Vec<String>,
}

impl Workflow {
    pub fn new(name: &'static str, ctx: &ExecutionContext) -> Self {
        Self {
            name,
            execution_id: ctx.execution_id.clone(),
            completed: Vec::new(),
        }
    }

    /// Run one write. On failure, any previously completed steps turn the
    /// error into a `PartialFailure`.
    pub async fn step<T, F>(&mut self, step: &str, write: F) -> Result<T, UseCaseError>
    where
        F: Future<Output = Result<T, PlatformError>>,
    {
        match write.await {
            Ok(value) => {
                debug!(
                    workflow = self.name,
                    execution_id = %self.execution_id,
                    step,
                    "Workflow step applied"
                );
                self.completed.push(step.to_string());
                Ok(value)
            }
            Err(err) if self.completed.is_empty() => Err(err.into()),
            Err(err) => {
                error!(
                    workflow = self.name,
                    execution_id = %self.execution_id,
                    step,
                    completed = ?self.completed,
                    error = %err,
                    "Workflow step failed after earlier writes were applied"
                );
                Err(UseCaseError::partial_failure(
                    format!("{} failed: {}", step, err),
                    self.completed.clone(),
                ))
            }
        }
    }

    /// Record a step whose effect is already present in the store
    pub fn skip(&mut self, step: &str) {
        debug!(
            workflow = self.name,
            execution_id = %self.execution_id,
            step,
            "Workflow step already applied, skipping"
        );
        self.completed.push(format!("{} (already applied)", step));
    }

    pub fn completed_steps(&self) -> &[String] {
        &self.completed
    }

    pub fn finish(self) {
        info!(
            workflow = self.name,
            execution_id = %self.execution_id,
            steps = self.completed.len(),
            "Workflow completed"
        );
    }
}
