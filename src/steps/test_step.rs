//! A step together with its scheduling flags and sub-capabilities.

use std::sync::Arc;

use crate::context::Context;
use crate::error::StagehandError;

use super::step::{ContextLoader, DataValidator, Step};

/// A step as scheduled inside a stage.
#[derive(Clone)]
pub struct TestStep {
    step: Arc<dyn Step>,

    /// Dispatch to a worker instead of running inline.
    pub run_concurrently: bool,

    /// Whether a failure ends the stage.
    pub fail_on_error: bool,

    validator: Option<Arc<dyn DataValidator>>,
    context_loader: Option<Arc<dyn ContextLoader>>,
}

impl TestStep {
    /// Wrap a step with default flags: sequential, fail on error.
    pub fn new(step: impl Step + 'static) -> Self {
        Self::from_arc(Arc::new(step))
    }

    /// Wrap a shared step.
    pub fn from_arc(step: Arc<dyn Step>) -> Self {
        Self {
            step,
            run_concurrently: false,
            fail_on_error: true,
            validator: None,
            context_loader: None,
        }
    }

    /// Run this step concurrently with the rest of its stage.
    pub fn concurrent(mut self) -> Self {
        self.run_concurrently = true;
        self
    }

    /// Set whether a failure ends the stage.
    pub fn fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }

    /// Validate the step's response data.
    pub fn with_validator(mut self, validator: Arc<dyn DataValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Load values from the step's response data into the context.
    pub fn with_context_loader(mut self, loader: Arc<dyn ContextLoader>) -> Self {
        self.context_loader = Some(loader);
        self
    }

    /// Step identity.
    pub fn name(&self) -> &str {
        self.step.type_name()
    }

    /// The wrapped step.
    pub fn step(&self) -> &Arc<dyn Step> {
        &self.step
    }

    /// Check the step and its sub-capabilities.
    pub fn validate(&self, ctx: &Context) -> anyhow::Result<()> {
        self.step.validate(ctx)?;
        if let Some(validator) = &self.validator {
            validator.check_config(ctx)?;
        }
        if let Some(loader) = &self.context_loader {
            loader.check_config(ctx)?;
        }
        Ok(())
    }

    /// Execute the step, then validate and load its response data.
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        let output = self.step.execute(ctx)?;

        if let Some(validator) = &self.validator {
            let data = output.data.as_deref().ok_or_else(|| {
                StagehandError::ValidationStepExecution {
                    step: validator.type_name().to_string(),
                    message: format!("step '{}' produced no data to validate", self.name()),
                }
            })?;
            validator.validate(ctx, data).map_err(|e| {
                if is_validation_step_error(&e) {
                    e
                } else {
                    StagehandError::ValidationStepExecution {
                        step: validator.type_name().to_string(),
                        message: format!("{:#}", e),
                    }
                    .into()
                }
            })?;
            ctx.log_info(&format!("Validator '{}' passed", validator.type_name()));
        }

        if let Some(loader) = &self.context_loader {
            if let Some(data) = output.data.as_deref() {
                loader.load(ctx, data)?;
            } else {
                ctx.log_warning(&format!(
                    "Context loader '{}' skipped: step '{}' produced no data",
                    loader.type_name(),
                    self.name()
                ));
            }
        }

        Ok(())
    }
}

/// Whether an error is a content-validation failure reported by a step.
pub fn is_validation_step_error(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<StagehandError>(),
        Some(StagehandError::ValidationStepExecution { .. })
    )
}

impl std::fmt::Debug for TestStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestStep")
            .field("step", &self.name())
            .field("run_concurrently", &self.run_concurrently)
            .field("fail_on_error", &self.fail_on_error)
            .field("validator", &self.validator.as_ref().map(|v| v.type_name()))
            .field(
                "context_loader",
                &self.context_loader.as_ref().map(|l| l.type_name()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::BufferedLogger;
    use crate::steps::StepOutput;

    struct Echo(&'static str);

    impl Step for Echo {
        fn type_name(&self) -> &str {
            "echo"
        }

        fn execute(&self, _ctx: &Context) -> anyhow::Result<StepOutput> {
            Ok(StepOutput::data(self.0))
        }
    }

    struct Silent;

    impl Step for Silent {
        fn type_name(&self) -> &str {
            "silent"
        }

        fn execute(&self, _ctx: &Context) -> anyhow::Result<StepOutput> {
            Ok(StepOutput::none())
        }
    }

    struct MustContain(&'static str);

    impl DataValidator for MustContain {
        fn type_name(&self) -> &str {
            "must_contain"
        }

        fn validate(&self, _ctx: &Context, data: &str) -> anyhow::Result<()> {
            anyhow::ensure!(data.contains(self.0), "missing '{}'", self.0);
            Ok(())
        }
    }

    struct StoreAll;

    impl ContextLoader for StoreAll {
        fn type_name(&self) -> &str {
            "store_all"
        }

        fn load(&self, ctx: &Context, data: &str) -> anyhow::Result<()> {
            ctx.add("loaded", data.to_string())?;
            Ok(())
        }
    }

    fn ctx() -> Context {
        Context::new("unit", Arc::new(BufferedLogger::new()))
    }

    #[test]
    fn defaults_are_sequential_and_fatal() {
        let step = TestStep::new(Silent);
        assert!(!step.run_concurrently);
        assert!(step.fail_on_error);
        assert_eq!(step.name(), "silent");
    }

    #[test]
    fn builder_flags() {
        let step = TestStep::new(Silent).concurrent().fail_on_error(false);
        assert!(step.run_concurrently);
        assert!(!step.fail_on_error);
    }

    #[test]
    fn validator_failure_becomes_validation_step_error() {
        let step = TestStep::new(Echo("hello")).with_validator(Arc::new(MustContain("bye")));
        let err = step.run(&ctx()).unwrap_err();
        assert!(is_validation_step_error(&err));
        assert!(err.to_string().contains("missing 'bye'"));
    }

    #[test]
    fn validator_without_data_fails() {
        let step = TestStep::new(Silent).with_validator(Arc::new(MustContain("x")));
        let err = step.run(&ctx()).unwrap_err();
        assert!(is_validation_step_error(&err));
    }

    #[test]
    fn loader_stores_data() {
        let ctx = ctx();
        let step = TestStep::new(Echo("payload"))
            .with_validator(Arc::new(MustContain("pay")))
            .with_context_loader(Arc::new(StoreAll));
        step.run(&ctx).unwrap();
        assert_eq!(ctx.get_string("loaded").as_deref(), Some("payload"));
    }

    #[test]
    fn plain_errors_are_not_validation_step_errors() {
        assert!(!is_validation_step_error(&anyhow::anyhow!("nope")));
    }
}
