//! The `run` command.

use std::sync::Arc;

use crate::cli::args::RunArgs;
use crate::config::{load_test_case, DrainPolicy};
use crate::error::Result;
use crate::logging::Logger;
use crate::runner::{TestOutcome, TestRunner};
use crate::steps::StepRegistry;

use super::dispatcher::{Command, CommandResult};

/// Loads a test case file and runs it.
pub struct RunCommand {
    args: RunArgs,
    registry: Arc<StepRegistry>,
    logger: Arc<dyn Logger>,
}

impl RunCommand {
    /// Create the command.
    pub fn new(args: RunArgs, registry: Arc<StepRegistry>, logger: Arc<dyn Logger>) -> Self {
        Self {
            args,
            registry,
            logger,
        }
    }
}

impl Command for RunCommand {
    fn execute(&self) -> Result<CommandResult> {
        let loaded = load_test_case(&self.args.file, &self.registry)?;

        let mut settings = loaded.settings;
        if let Some(timeout) = self.args.drain_timeout_ms {
            settings.drain_timeout_ms = Some(timeout);
        }
        if self.args.wait_for_all {
            settings.drain_policy = DrainPolicy::WaitForAll;
        }

        let runner = TestRunner::new(loaded.test_case, settings, self.logger.clone())?;
        match runner.run_to_outcome() {
            TestOutcome::Passed => Ok(CommandResult::success()),
            TestOutcome::Failed(error) => {
                tracing::debug!("Run failed: {:?}", error);
                Ok(CommandResult::failure(1))
            }
        }
    }
}
