//! The step capability and its optional sub-capabilities.

use crate::context::Context;

/// Data a step produced, e.g. a command's stdout or a response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    /// Response data, if the step produced any.
    pub data: Option<String>,
}

impl StepOutput {
    /// No response data.
    pub fn none() -> Self {
        Self::default()
    }

    /// Response data for validators and context loaders.
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }
}

/// A unit of work in a test case.
///
/// Implementations perform one action (write a file, run a command, call
/// a service) against the shared [`Context`]. A step may be run from a
/// worker thread, so it must be `Send + Sync`.
pub trait Step: Send + Sync {
    /// Identity used in logs and errors.
    fn type_name(&self) -> &str;

    /// Perform the action.
    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput>;

    /// Check configuration before any stage runs.
    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Checks the data a step produced.
///
/// A failure here is a content mismatch, reported as
/// [`StagehandError::ValidationStepExecution`](crate::StagehandError::ValidationStepExecution)
/// and always fatal.
pub trait DataValidator: Send + Sync {
    /// Identity used in logs and errors.
    fn type_name(&self) -> &str;

    /// Compare `data` against expectations.
    fn validate(&self, ctx: &Context, data: &str) -> anyhow::Result<()>;

    /// Check configuration before any stage runs.
    fn check_config(&self, _ctx: &Context) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Extracts values from the data a step produced into the context.
pub trait ContextLoader: Send + Sync {
    /// Identity used in logs and errors.
    fn type_name(&self) -> &str;

    /// Load values from `data` into `ctx`.
    fn load(&self, ctx: &Context, data: &str) -> anyhow::Result<()>;

    /// Check configuration before any stage runs.
    fn check_config(&self, _ctx: &Context) -> anyhow::Result<()> {
        Ok(())
    }
}
