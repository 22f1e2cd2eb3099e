//! Test case execution.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::debug;

use crate::config::RunSettings;
use crate::context::Context;
use crate::error::{Result, StagehandError};
use crate::logging::{LogLevel, Logger};
use crate::testcase::{Stage, TestCase};

use super::coordinator::{Coordinator, DrainMode};
use super::failure::{classify, run_guarded, FailedStep};

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Validated, not yet run.
    NotStarted,
    /// Running the setup stage.
    Setup,
    /// Running the execution stage.
    Execution,
    /// Running the cleanup stage.
    Cleanup,
    /// Every stage succeeded.
    Passed,
    /// A stage failed.
    Failed,
}

impl From<Stage> for RunState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Setup => RunState::Setup,
            Stage::Execution => RunState::Execution,
            Stage::Cleanup => RunState::Cleanup,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::NotStarted => "not started",
            RunState::Setup => "setup",
            RunState::Execution => "execution",
            RunState::Cleanup => "cleanup",
            RunState::Passed => "passed",
            RunState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Shared view of a runner's [`RunState`].
///
/// The handle outlives the runner, so the state can be read while
/// [`TestRunner::run`] is in progress on another thread and after it
/// returns.
#[derive(Debug, Clone)]
pub struct RunStateHandle(Arc<Mutex<RunState>>);

impl RunStateHandle {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(RunState::NotStarted)))
    }

    /// Current state.
    pub fn get(&self) -> RunState {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, state: RunState) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// Terminal result of a run.
#[derive(Debug)]
pub enum TestOutcome {
    /// Every stage succeeded.
    Passed,
    /// The error that ended the run.
    Failed(StagehandError),
}

impl TestOutcome {
    /// Whether the run passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    /// Convert into a `Result`.
    pub fn into_result(self) -> Result<()> {
        match self {
            TestOutcome::Passed => Ok(()),
            TestOutcome::Failed(error) => Err(error),
        }
    }
}

/// Runs one test case through Setup, Execution and Cleanup.
///
/// A runner is good for exactly one run: [`TestRunner::run`] consumes it.
pub struct TestRunner {
    test_case: TestCase,
    context: Context,
    logger: Arc<dyn Logger>,
    coordinator: Coordinator,
    settings: RunSettings,
    state: RunStateHandle,
}

impl TestRunner {
    /// Create a runner and validate every step of the test case.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for the first step whose configuration is
    /// rejected. No step has executed at that point.
    pub fn new(test_case: TestCase, settings: RunSettings, logger: Arc<dyn Logger>) -> Result<Self> {
        let context = Context::new(&test_case.name, logger.clone());
        let coordinator = Coordinator::new(&test_case.name, logger.clone(), &settings);
        let runner = Self {
            test_case,
            context,
            logger,
            coordinator,
            settings,
            state: RunStateHandle::new(),
        };
        runner.validate()?;
        Ok(runner)
    }

    fn validate(&self) -> Result<()> {
        for stage in Stage::ALL {
            self.context.set_current_stage(stage);
            for step in self.test_case.steps(stage) {
                if let Err(e) = step.validate(&self.context) {
                    let error = StagehandError::Validation {
                        test: self.test_case.name.clone(),
                        stage,
                        step: step.name().to_string(),
                        message: format!("{:#}", e),
                    };
                    self.logger.log(LogLevel::Error, &error.to_string());
                    return Err(error);
                }
            }
        }
        debug!(
            "Validated {} step(s) of '{}'",
            self.test_case.step_count(),
            self.test_case.name
        );
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state.get()
    }

    /// A handle that keeps reporting the state once the runner is consumed.
    pub fn state_handle(&self) -> RunStateHandle {
        self.state.clone()
    }

    /// The run's shared context.
    ///
    /// Values added before [`TestRunner::run`] are visible to every step.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The test case being run.
    pub fn test_case(&self) -> &TestCase {
        &self.test_case
    }

    /// Run every stage and return the single terminal error, if any.
    pub fn run(self) -> Result<()> {
        self.run_to_outcome().into_result()
    }

    /// Run every stage and return the outcome.
    ///
    /// Cleanup always runs. When both an earlier stage and Cleanup fail,
    /// the Cleanup error is returned with the earlier one attached.
    pub fn run_to_outcome(mut self) -> TestOutcome {
        let start = Instant::now();
        let name = self.test_case.name.clone();
        self.logger.test_start(&name);

        let mut failure = None;
        for stage in [Stage::Setup, Stage::Execution] {
            if let Err(error) = self.run_stage(stage) {
                failure = Some(error);
                break;
            }
        }

        let cleanup = self.run_stage(Stage::Cleanup);

        if self.settings.settle_on_finish {
            self.coordinator.settle();
        }

        let outcome = match (failure, cleanup) {
            (None, Ok(())) => TestOutcome::Passed,
            (Some(error), Ok(())) => TestOutcome::Failed(error),
            (None, Err(cleanup)) => TestOutcome::Failed(cleanup),
            (Some(original), Err(cleanup)) => TestOutcome::Failed(StagehandError::CleanupFailed {
                cleanup: Box::new(cleanup),
                original: Box::new(original),
            }),
        };

        let elapsed = start.elapsed();
        match &outcome {
            TestOutcome::Passed => {
                self.state.set(RunState::Passed);
                self.logger.log(
                    LogLevel::Info,
                    &format!("Test '{}' PASSED in {:.2?}", name, elapsed),
                );
            }
            TestOutcome::Failed(error) => {
                self.state.set(RunState::Failed);
                self.logger.log(
                    LogLevel::Error,
                    &format!("Test '{}' FAILED in {:.2?}: {}", name, elapsed, error),
                );
            }
        }
        self.logger.test_end(&name, outcome.is_passed());
        outcome
    }

    /// Run one stage's steps, then drain its concurrent steps.
    fn run_stage(&mut self, stage: Stage) -> Result<()> {
        self.state.set(stage.into());
        self.logger.stage_start(stage);

        let mut stage_error = None;
        for step in self.test_case.steps(stage) {
            self.context.set_current_stage(stage);

            if step.run_concurrently {
                if let Err(error) = self.coordinator.dispatch(stage, step, &self.context) {
                    stage_error = Some(error);
                    break;
                }
                continue;
            }

            self.logger.step_start(step.name(), false);
            let result = run_guarded(step, &self.context);
            self.logger.step_end(step.name(), false, result.is_err());

            if let Err(error) = result {
                let failed = FailedStep {
                    test: &self.test_case.name,
                    stage,
                    step: step.name(),
                    fail_on_error: step.fail_on_error,
                    concurrent: false,
                };
                if let Some(fatal) = classify(failed, error, self.logger.as_ref()) {
                    stage_error = Some(fatal);
                    break;
                }
            }
        }

        if let Err(error) = self.coordinator.drain(stage, DrainMode::Blocking) {
            if stage_error.is_none() {
                stage_error = Some(error);
            } else {
                self.logger.log(
                    LogLevel::Error,
                    &format!("Additional concurrent failure in {} stage: {}", stage, error),
                );
            }
        }

        self.logger.stage_end(stage);
        match stage_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
