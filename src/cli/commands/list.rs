//! The `list-steps` command.

use std::sync::Arc;

use crate::error::Result;
use crate::steps::StepRegistry;

use super::dispatcher::{Command, CommandResult};

/// Prints every registered step, validator and context loader.
pub struct ListStepsCommand {
    registry: Arc<StepRegistry>,
}

impl ListStepsCommand {
    /// Create the command.
    pub fn new(registry: Arc<StepRegistry>) -> Self {
        Self { registry }
    }

    /// The listing, one section per component kind.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (title, names) in [
            ("Steps", self.registry.steps.names().collect::<Vec<_>>()),
            ("Validators", self.registry.validators.names().collect()),
            ("Context loaders", self.registry.loaders.names().collect()),
        ] {
            out.push_str(title);
            out.push_str(":\n");
            for name in names {
                out.push_str("  ");
                out.push_str(name);
                out.push('\n');
            }
        }
        out
    }
}

impl Command for ListStepsCommand {
    fn execute(&self) -> Result<CommandResult> {
        print!("{}", self.render());
        Ok(CommandResult::success())
    }
}
