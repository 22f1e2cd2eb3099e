//! Running a step and classifying its failure.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::context::Context;
use crate::error::StagehandError;
use crate::logging::{LogLevel, Logger};
use crate::steps::{is_validation_step_error, TestStep};
use crate::testcase::Stage;

/// Run a step, turning a panic into an error.
pub(crate) fn run_guarded(step: &TestStep, ctx: &Context) -> anyhow::Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(|| step.run(ctx))) {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!(
            "step panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Identity of a failed step.
pub(crate) struct FailedStep<'a> {
    pub test: &'a str,
    pub stage: Stage,
    pub step: &'a str,
    pub fail_on_error: bool,
    pub concurrent: bool,
}

/// Log a step failure and decide whether it ends the stage.
///
/// Content-validation failures are returned verbatim whatever
/// `fail_on_error` says. Other failures are wrapped with stage, test and
/// step identity when `fail_on_error` is set and swallowed otherwise.
pub(crate) fn classify(
    failed: FailedStep<'_>,
    error: anyhow::Error,
    logger: &dyn Logger,
) -> Option<StagehandError> {
    let label = if failed.concurrent {
        "Concurrent step"
    } else {
        "Step"
    };
    logger.log(
        LogLevel::Error,
        &format!(
            "{} '{}' failed in {} stage: {:?}",
            label,
            failed.step,
            failed.stage,
            error
        ),
    );

    if is_validation_step_error(&error) {
        return match error.downcast::<StagehandError>() {
            Ok(validation) => Some(validation),
            Err(other) => Some(StagehandError::Other(other)),
        };
    }

    if failed.fail_on_error {
        return Some(StagehandError::StepExecution {
            test: failed.test.to_string(),
            stage: failed.stage,
            step: failed.step.to_string(),
            source: error,
        });
    }

    logger.log(
        LogLevel::Warning,
        &format!(
            "Step '{}' has fail_on_error disabled; continuing",
            failed.step
        ),
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::BufferedLogger;
    use crate::steps::{Step, StepOutput};
    use std::sync::Arc;

    struct Panics;

    impl Step for Panics {
        fn type_name(&self) -> &str {
            "panics"
        }

        fn execute(&self, _ctx: &Context) -> anyhow::Result<StepOutput> {
            panic!("kaboom");
        }
    }

    fn failed(fail_on_error: bool) -> FailedStep<'static> {
        FailedStep {
            test: "t",
            stage: Stage::Execution,
            step: "s",
            fail_on_error,
            concurrent: false,
        }
    }

    #[test]
    fn panics_become_errors() {
        let ctx = Context::new("t", Arc::new(BufferedLogger::new()));
        let err = run_guarded(&TestStep::new(Panics), &ctx).unwrap_err();
        assert!(err.to_string().contains("kaboom"));
    }

    #[test]
    fn fatal_failure_is_wrapped() {
        let logger = BufferedLogger::new();
        let err = classify(failed(true), anyhow::anyhow!("down"), &logger).unwrap();
        assert!(matches!(
            err,
            StagehandError::StepExecution {
                stage: Stage::Execution,
                ..
            }
        ));
        assert!(logger.contains_text("Step 's' failed in Execution stage"));
    }

    #[test]
    fn non_fatal_failure_is_swallowed_but_logged() {
        let logger = BufferedLogger::new();
        assert!(classify(failed(false), anyhow::anyhow!("down"), &logger).is_none());
        assert!(logger.contains_text("down"));
        assert!(logger.contains_text("continuing"));
    }

    #[test]
    fn validation_step_failure_ignores_fail_on_error() {
        let logger = BufferedLogger::new();
        let error = anyhow::Error::new(StagehandError::ValidationStepExecution {
            step: "contains".into(),
            message: "mismatch".into(),
        });
        let err = classify(failed(false), error, &logger).unwrap();
        assert!(matches!(err, StagehandError::ValidationStepExecution { .. }));
    }
}
