//! Run a shell command.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, ensure};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::shell::{execute, CommandOptions};
use crate::steps::{Step, StepOutput};

/// Runs a command through the platform shell.
///
/// Stdout becomes the step's response data, so validators and context
/// loaders can inspect it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellStep {
    /// Command line; wildcards and `takeFromCtx:` are resolved at run time.
    pub command: String,
    /// Working directory.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables; values are resolved like `command`.
    pub env: HashMap<String, String>,
    /// Exit code that counts as success.
    pub expected_exit_code: i32,
}

impl ShellStep {
    /// Run `command`, expecting exit code 0.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }
}

impl Step for ShellStep {
    fn type_name(&self) -> &str {
        "shell"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        let command = ctx.read_argument(&self.command)?;
        let mut env = HashMap::new();
        for (key, value) in &self.env {
            env.insert(key.clone(), ctx.read_argument(value)?);
        }
        let options = CommandOptions {
            cwd: self.cwd.clone(),
            env,
        };

        ctx.log_info(&format!("Running: {}", command));
        let result = execute(&command, &options)?;

        if !result.stdout.is_empty() {
            ctx.log_data("stdout", &result.stdout);
        }
        if !result.stderr.is_empty() {
            ctx.log_data("stderr", &result.stderr);
        }

        if !result.exited_with(self.expected_exit_code) {
            bail!(
                "command '{}' exited with {:?}, expected {}",
                command,
                result.exit_code,
                self.expected_exit_code
            );
        }

        Ok(StepOutput::data(result.stdout))
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.command.trim().is_empty(), "command must not be empty");
        if let Some(cwd) = &self.cwd {
            ensure!(cwd.is_dir(), "cwd '{}' is not a directory", cwd.display());
        }
        Ok(())
    }
}
