//! Command dispatching.

use std::sync::Arc;

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::logging::{Logger, TracingLogger};
use crate::steps::StepRegistry;

use super::{ListStepsCommand, RunCommand, ValidateCommand};

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    registry: Arc<StepRegistry>,
    logger: Arc<dyn Logger>,
}

impl CommandDispatcher {
    /// Dispatcher with the built-in registry, logging through `tracing`.
    pub fn new() -> Self {
        Self::with_registry(StepRegistry::with_builtins(), Arc::new(TracingLogger::new()))
    }

    /// Dispatcher with a custom registry and logger.
    pub fn with_registry(registry: StepRegistry, logger: Arc<dyn Logger>) -> Self {
        Self {
            registry: Arc::new(registry),
            logger,
        }
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        match &cli.command {
            Commands::Run(args) => RunCommand::new(
                args.clone(),
                self.registry.clone(),
                self.logger.clone(),
            )
            .execute(),
            Commands::Validate(args) => ValidateCommand::new(
                args.clone(),
                self.registry.clone(),
                self.logger.clone(),
            )
            .execute(),
            Commands::ListSteps => ListStepsCommand::new(self.registry.clone()).execute(),
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }
}
