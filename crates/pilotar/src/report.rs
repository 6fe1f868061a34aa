//! Run reporting.
//!
//! [`RunReport`] is the harness-facing summary of one workflow run: per-step
//! outcomes and timings, plus failure context (step, phase, message, and a
//! page snapshot) when the run did not complete. Reports are plain data and
//! serialize to JSON for archival alongside CI output.

use crate::driver::{PageDriver, PageSnapshot};
use crate::flow::{StepPhase, Workflow, WorkflowResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Outcome and timing of one executed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Zero-based step index
    pub index: usize,
    /// Step name
    pub name: String,
    /// Whether the step completed
    pub passed: bool,
    /// Time spent in the step
    pub elapsed: Duration,
}

impl StepReport {
    /// Report for a completed step
    #[must_use]
    pub fn pass(index: usize, name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            index,
            name: name.into(),
            passed: true,
            elapsed,
        }
    }

    /// Report for a failed step
    #[must_use]
    pub fn fail(index: usize, name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            index,
            name: name.into(),
            passed: false,
            elapsed,
        }
    }
}

/// Failure context attached to a failed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    /// Zero-based index of the failing step
    pub step: usize,
    /// Name of the failing step
    pub step_name: String,
    /// Phase in which the step failed
    pub phase: StepPhase,
    /// Rendered failure reason
    pub message: String,
    /// Page state captured right after the failure, when available
    pub snapshot: Option<PageSnapshot>,
}

/// Summary of one workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Workflow name
    pub workflow: String,
    /// Whether every step completed
    pub passed: bool,
    /// Per-step reports, in execution order
    pub steps: Vec<StepReport>,
    /// Failure context, `None` on success
    pub failure: Option<FailureReport>,
    /// Total run duration
    pub elapsed: Duration,
}

impl RunReport {
    /// Build a report from a finished run
    #[must_use]
    pub fn from_result(
        workflow: impl Into<String>,
        result: WorkflowResult,
        snapshot: Option<PageSnapshot>,
    ) -> Self {
        match result {
            WorkflowResult::Success { steps, elapsed } => Self {
                workflow: workflow.into(),
                passed: true,
                steps,
                failure: None,
                elapsed,
            },
            WorkflowResult::Failure {
                step,
                step_name,
                phase,
                reason,
                steps,
                elapsed,
            } => Self {
                workflow: workflow.into(),
                passed: false,
                steps,
                failure: Some(FailureReport {
                    step,
                    step_name,
                    phase,
                    message: reason.to_string(),
                    snapshot,
                }),
                elapsed,
            },
        }
    }

    /// Run a workflow and report on it, consuming the session.
    ///
    /// On failure the page is snapshotted for the report; either way the
    /// session is closed before returning, so the browser connection never
    /// outlives the run.
    pub fn capture<D: PageDriver>(workflow: &Workflow, mut session: Session<D>) -> Self {
        let result = workflow.run(&mut session);
        let snapshot = if result.is_success() {
            None
        } else {
            session.snapshot().ok()
        };
        if let Err(e) = session.close() {
            warn!(error = %e, "session close failed after run");
        }
        Self::from_result(workflow.name(), result, snapshot)
    }

    /// Steps that completed
    #[must_use]
    pub fn steps_completed(&self) -> usize {
        self.steps.iter().filter(|s| s.passed).count()
    }

    /// Steps the workflow declared
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// One-line human summary
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.failure {
            None => format!(
                "{}: passed, {} steps in {}ms",
                self.workflow,
                self.total_steps(),
                self.elapsed.as_millis()
            ),
            Some(f) => format!(
                "{}: failed at step {} '{}' while {}: {}",
                self.workflow, f.step, f.step_name, f.phase, f.message
            ),
        }
    }
}
