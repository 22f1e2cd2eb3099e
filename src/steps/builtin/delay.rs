//! Sleep for a fixed time.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::steps::{Step, StepOutput};

/// Blocks the running thread for `delay_ms` milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayStep {
    /// Milliseconds to sleep.
    pub delay_ms: u64,
}

impl DelayStep {
    /// Sleep for `delay_ms` milliseconds.
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Step for DelayStep {
    fn type_name(&self) -> &str {
        "delay"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        ctx.log_info(&format!("Sleeping for {}ms", self.delay_ms));
        thread::sleep(Duration::from_millis(self.delay_ms));
        Ok(StepOutput::none())
    }
}
