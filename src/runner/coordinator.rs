//! Dispatch and drain of concurrently-run steps.
//!
//! [`Coordinator::dispatch`] hands a step to its own worker thread and
//! returns immediately. Each worker writes to a private [`BufferedLogger`]
//! and reports a [`Completion`] over a channel whether it succeeded or not.
//! [`Coordinator::drain`] consumes those completions, splices the buffered
//! logs into the main logger in completion order and raises the first
//! fatal failure belonging to the stage being drained.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::{DrainPolicy, RunSettings};
use crate::context::Context;
use crate::error::{Result, StagehandError};
use crate::logging::{BufferedLogger, LogLevel, Logger};
use crate::steps::TestStep;
use crate::testcase::Stage;

use super::failure::{classify, run_guarded, FailedStep};

/// Whether a drain waits for outstanding steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainMode {
    /// Process only completions that are already available.
    NonBlocking,
    /// Wait until every step dispatched in the stage has completed.
    Blocking,
}

/// Outcome of one concurrently-run step.
#[derive(Debug)]
pub struct Completion {
    /// Stage the step was dispatched in.
    pub stage: Stage,
    /// Step identity.
    pub step: String,
    /// The step's error, if it failed.
    pub failure: Option<anyhow::Error>,
    /// Everything the step logged.
    pub logs: Arc<BufferedLogger>,
    /// Whether a failure is fatal to the stage.
    pub fail_on_error: bool,
}

/// Tracks in-flight concurrent steps and drains their results.
pub struct Coordinator {
    test_name: String,
    logger: Arc<dyn Logger>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    in_flight: HashMap<Stage, usize>,
    policy: DrainPolicy,
    timeout: Option<Duration>,
}

impl Coordinator {
    /// Create a coordinator that splices step logs into `logger`.
    pub fn new(test_name: &str, logger: Arc<dyn Logger>, settings: &RunSettings) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            test_name: test_name.to_string(),
            logger,
            sender,
            receiver,
            in_flight: HashMap::new(),
            policy: settings.drain_policy,
            timeout: settings.drain_timeout(),
        }
    }

    /// Steps dispatched in `stage` that have not been drained yet.
    pub fn pending(&self, stage: Stage) -> usize {
        self.in_flight.get(&stage).copied().unwrap_or(0)
    }

    /// Steps not yet drained, across all stages.
    pub fn total_pending(&self) -> usize {
        self.in_flight.values().sum()
    }

    /// Start `step` on a worker thread and return without waiting.
    ///
    /// The worker gets a context sharing `ctx`'s store but logging into a
    /// private buffer.
    pub fn dispatch(&mut self, stage: Stage, step: &TestStep, ctx: &Context) -> Result<()> {
        let logs = Arc::new(BufferedLogger::new());
        let worker_ctx = ctx.clone_for_concurrent_use(logs.clone());
        let worker_step = step.clone();
        let sender = self.sender.clone();
        let name = step.name().to_string();

        debug!("Dispatching '{}' in {} stage", name, stage);
        self.logger.log(
            LogLevel::Info,
            &format!("Dispatching step '{}' concurrently", name),
        );

        thread::Builder::new()
            .name(format!("stagehand-{}", name))
            .spawn(move || {
                worker_ctx.logger().step_start(&name, true);
                let result = run_guarded(&worker_step, &worker_ctx);
                worker_ctx.logger().step_end(&name, true, result.is_err());

                // The receiver is gone if the run finished without settling.
                let _ = sender.send(Completion {
                    stage,
                    step: name,
                    failure: result.err(),
                    logs,
                    fail_on_error: worker_step.fail_on_error,
                });
            })
            .map_err(|e| StagehandError::StepExecution {
                test: self.test_name.clone(),
                stage,
                step: step.name().to_string(),
                source: anyhow::Error::new(e).context("failed to start worker thread"),
            })?;

        *self.in_flight.entry(stage).or_insert(0) += 1;
        Ok(())
    }

    /// Process completions for `stage`.
    ///
    /// A non-blocking drain returns on the first fatal failure whatever the
    /// drain policy; later completions stay queued for the next drain. The
    /// policy only governs blocking drains.
    ///
    /// Completions from other stages are spliced and logged but never
    /// raised here; they belong to steps whose stage already ended.
    pub fn drain(&mut self, stage: Stage, mode: DrainMode) -> Result<()> {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let mut first_failure: Option<StagehandError> = None;

        loop {
            let completion = match mode {
                DrainMode::NonBlocking => match self.receiver.try_recv() {
                    Ok(completion) => completion,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                },
                DrainMode::Blocking => {
                    if self.pending(stage) == 0 {
                        break;
                    }
                    match self.next_completion(deadline) {
                        Some(completion) => completion,
                        None => {
                            let pending = self.pending(stage);
                            self.logger.log(
                                LogLevel::Error,
                                &format!(
                                    "Gave up waiting for {} concurrent step(s) in {} stage",
                                    pending, stage
                                ),
                            );
                            return Err(first_failure
                                .unwrap_or(StagehandError::DrainTimeout { stage, pending }));
                        }
                    }
                }
            };

            if let Some(error) = self.process(Some(stage), completion) {
                match (mode, self.policy) {
                    (DrainMode::NonBlocking, _) => return Err(error),
                    (DrainMode::Blocking, DrainPolicy::AbortOnFirstFailure) => {
                        if self.pending(stage) > 0 {
                            self.logger.log(
                                LogLevel::Warning,
                                &format!(
                                    "Abandoning {} concurrent step(s) still running in {} stage",
                                    self.pending(stage),
                                    stage
                                ),
                            );
                        }
                        return Err(error);
                    }
                    (DrainMode::Blocking, DrainPolicy::WaitForAll) => {
                        first_failure.get_or_insert(error);
                    }
                }
            }
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Wait for every outstanding step, logging results without raising.
    ///
    /// Returns the number of steps still running if the drain timeout
    /// expired first.
    pub fn settle(&mut self) -> usize {
        let deadline = self.timeout.map(|t| Instant::now() + t);
        while self.total_pending() > 0 {
            match self.next_completion(deadline) {
                Some(completion) => {
                    self.process(None, completion);
                }
                None => {
                    let pending = self.total_pending();
                    self.logger.log(
                        LogLevel::Warning,
                        &format!("{} abandoned concurrent step(s) never finished", pending),
                    );
                    return pending;
                }
            }
        }
        0
    }

    fn next_completion(&self, deadline: Option<Instant>) -> Option<Completion> {
        match deadline {
            None => self.receiver.recv().ok(),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                match self.receiver.recv_timeout(remaining) {
                    Ok(completion) => Some(completion),
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
                }
            }
        }
    }

    /// Splice a completion into the main log and classify its failure.
    ///
    /// Only failures of `raising_stage` are returned.
    fn process(&mut self, raising_stage: Option<Stage>, completion: Completion) -> Option<StagehandError> {
        let Completion {
            stage,
            step,
            failure,
            logs,
            fail_on_error,
        } = completion;

        logs.replay_into(self.logger.as_ref());
        if let Some(count) = self.in_flight.get_mut(&stage) {
            *count = count.saturating_sub(1);
        }
        debug!("Drained '{}' from {} stage", step, stage);

        let error = failure?;
        let failed = FailedStep {
            test: &self.test_name,
            stage,
            step: &step,
            fail_on_error,
            concurrent: true,
        };
        let fatal = classify(failed, error, self.logger.as_ref())?;

        if raising_stage == Some(stage) {
            Some(fatal)
        } else {
            self.logger.log(
                LogLevel::Error,
                &format!(
                    "Abandoned step '{}' from {} stage failed after its stage ended: {}",
                    step, stage, fatal
                ),
            );
            None
        }
    }
}
