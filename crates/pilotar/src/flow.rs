//! Workflow sequencing.
//!
//! A [`Workflow`] is an ordered list of [`Step`]s run strictly in sequence.
//! Each step goes locating → interacting → awaiting its post-condition; the
//! first failure aborts the remainder of the run and surfaces as
//! [`WorkflowResult::Failure`] with the step index, the phase, and the
//! reason. Nothing is retried across steps and nothing is rolled back; the
//! application under test is not transactional from the engine's point of
//! view.
//!
//! Value post-conditions distinguish latency from wrong state: if the wait
//! budget elapses without the element or its value ever materializing the
//! failure is a timeout, but if a value was observed and simply never matched
//! it is an [`PilotarError::AssertionMismatch`] carrying expected and
//! observed.

use crate::driver::PageDriver;
use crate::interaction::ReadTarget;
use crate::report::StepReport;
use crate::result::{PilotarError, PilotarResult};
use crate::session::Session;
use crate::step::{PostCheck, PostCondition, Step};
use crate::wait::{Wait, WaitOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Phase of step execution in which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepPhase {
    /// Resolving the target element
    Locating,
    /// Performing the interaction
    Interacting,
    /// Waiting on the declared post-condition
    AwaitingPostCondition,
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Locating => "locating",
            Self::Interacting => "interacting",
            Self::AwaitingPostCondition => "awaiting post-condition",
        };
        f.write_str(s)
    }
}

/// Terminal outcome of one workflow run. Exactly one per run.
#[derive(Debug)]
pub enum WorkflowResult {
    /// Every step completed
    Success {
        /// Per-step reports, in execution order
        steps: Vec<StepReport>,
        /// Total run duration
        elapsed: Duration,
    },
    /// A step failed; later steps never ran
    Failure {
        /// Zero-based index of the failing step
        step: usize,
        /// Name of the failing step
        step_name: String,
        /// Phase in which it failed
        phase: StepPhase,
        /// Why
        reason: PilotarError,
        /// Per-step reports up to and including the failing step
        steps: Vec<StepReport>,
        /// Total run duration
        elapsed: Duration,
    },
}

impl WorkflowResult {
    /// Whether the run completed
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Steps that completed before the run ended
    #[must_use]
    pub fn steps_completed(&self) -> usize {
        let steps = match self {
            Self::Success { steps, .. } | Self::Failure { steps, .. } => steps,
        };
        steps.iter().filter(|s| s.passed).count()
    }

    /// The failure reason, if the run failed
    #[must_use]
    pub fn reason(&self) -> Option<&PilotarError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }

    /// Harness-facing failure message, `None` on success
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::Failure {
                step,
                step_name,
                phase,
                reason,
                ..
            } => Some(format!(
                "step {step} '{step_name}' failed while {phase}: {reason}"
            )),
        }
    }
}

/// Named, ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    name: String,
    steps: Vec<Step>,
}

impl Workflow {
    /// Create an empty workflow
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Append every step of another workflow
    #[must_use]
    pub fn then(mut self, other: Self) -> Self {
        self.steps.extend(other.steps);
        self
    }

    /// Apply one wait budget to every step's locator and post-condition
    #[must_use]
    pub fn with_waits(mut self, options: WaitOptions) -> Self {
        self.steps = self
            .steps
            .into_iter()
            .map(|s| s.with_waits(options))
            .collect();
        self
    }

    /// Workflow name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The steps, in execution order
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run the workflow against a session, fail-fast.
    ///
    /// Steps execute strictly in order, index 0 first. The session stays
    /// usable afterwards; teardown belongs to whoever owns it.
    pub fn run<D: PageDriver>(&self, session: &mut Session<D>) -> WorkflowResult {
        let start = Instant::now();
        info!(workflow = %self.name, steps = self.steps.len(), "starting workflow");

        let mut reports = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let step_start = Instant::now();
            debug!(step = index, name = step.name(), "executing step");
            match execute_step(session, step) {
                Ok(()) => {
                    reports.push(StepReport::pass(index, step.name(), step_start.elapsed()));
                }
                Err((phase, reason)) => {
                    warn!(
                        workflow = %self.name,
                        step = index,
                        name = step.name(),
                        phase = %phase,
                        error = %reason,
                        "step failed, aborting run"
                    );
                    reports.push(StepReport::fail(index, step.name(), step_start.elapsed()));
                    return WorkflowResult::Failure {
                        step: index,
                        step_name: step.name().to_string(),
                        phase,
                        reason,
                        steps: reports,
                        elapsed: start.elapsed(),
                    };
                }
            }
        }

        info!(
            workflow = %self.name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "workflow complete"
        );
        WorkflowResult::Success {
            steps: reports,
            elapsed: start.elapsed(),
        }
    }
}

fn execute_step<D: PageDriver>(
    session: &mut Session<D>,
    step: &Step,
) -> Result<(), (StepPhase, PilotarError)> {
    let driver = session.driver_mut();

    let handle = step
        .target()
        .resolve(driver)
        .map_err(|e| (StepPhase::Locating, e))?;

    step.interaction()
        .perform(driver, &handle)
        .map_err(|e| (StepPhase::Interacting, e))?;

    if let Some(post) = step.post() {
        await_post_condition(driver, post).map_err(|e| (StepPhase::AwaitingPostCondition, e))?;
    }
    Ok(())
}

fn await_post_condition<D: PageDriver>(
    driver: &mut D,
    post: &PostCondition,
) -> PilotarResult<()> {
    let description = post.check().describe();
    match post.check() {
        PostCheck::Location(pattern) => {
            Wait::with_options(post.wait()).until(&description, || {
                let url = driver.current_url()?;
                if pattern.matches(&url) {
                    Ok(Some(()))
                } else {
                    Ok(None)
                }
            })
        }
        PostCheck::ValueEquals {
            selector,
            read,
            expected,
            ..
        } => {
            let mut last_observed: Option<String> = None;
            let result = Wait::with_options(post.wait()).until(&description, || {
                let handle = match driver.find(selector)? {
                    Some(h) => h,
                    None => return Ok(None),
                };
                let observed = match read {
                    ReadTarget::Text => Some(driver.read_text(&handle)?),
                    ReadTarget::Attribute(name) => driver.read_attribute(&handle, name)?,
                };
                let observed = match observed {
                    Some(v) => v,
                    None => return Ok(None),
                };
                last_observed = Some(observed.clone());
                if post.value_matches(&observed) {
                    Ok(Some(()))
                } else {
                    Ok(None)
                }
            });

            // A value that was seen but never matched is an application-state
            // problem, not latency.
            match result {
                Err(PilotarError::Timeout { condition, ms }) => match last_observed {
                    Some(actual) => Err(PilotarError::AssertionMismatch {
                        expected: expected.clone(),
                        actual,
                        context: description,
                    }),
                    None => Err(PilotarError::Timeout { condition, ms }),
                },
                other => other,
            }
        }
    }
}
