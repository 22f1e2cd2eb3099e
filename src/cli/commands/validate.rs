//! The `validate` command.

use std::sync::Arc;

use crate::cli::args::ValidateArgs;
use crate::config::load_test_case;
use crate::error::Result;
use crate::logging::{LogLevel, Logger};
use crate::runner::TestRunner;
use crate::steps::StepRegistry;

use super::dispatcher::{Command, CommandResult};

/// Loads a test case file and validates every step without running any.
pub struct ValidateCommand {
    args: ValidateArgs,
    registry: Arc<StepRegistry>,
    logger: Arc<dyn Logger>,
}

impl ValidateCommand {
    /// Create the command.
    pub fn new(args: ValidateArgs, registry: Arc<StepRegistry>, logger: Arc<dyn Logger>) -> Self {
        Self {
            args,
            registry,
            logger,
        }
    }
}

impl Command for ValidateCommand {
    fn execute(&self) -> Result<CommandResult> {
        let loaded = load_test_case(&self.args.file, &self.registry)?;
        let name = loaded.test_case.name.clone();
        let steps = loaded.test_case.step_count();

        match TestRunner::new(loaded.test_case, loaded.settings, self.logger.clone()) {
            Ok(_) => {
                self.logger.log(
                    LogLevel::Info,
                    &format!("Test '{}' is valid ({} steps)", name, steps),
                );
                Ok(CommandResult::success())
            }
            Err(error) if error.is_validation() => Ok(CommandResult::failure(1)),
            Err(error) => Err(error),
        }
    }
}
