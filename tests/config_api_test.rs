//! Integration tests for loading test case files and the step registry.

use std::fs;
use std::sync::Arc;

use serde::Deserialize;
use stagehand::config::{load_test_case, parse_test_case, DrainPolicy};
use stagehand::logging::BufferedLogger;
use stagehand::steps::StepRegistry;
use stagehand::{Context, Stage, StagehandError, Step, StepOutput, TestRunner};
use tempfile::TempDir;

/// Counts characters of a context value into another key.
#[derive(Debug, Deserialize)]
struct MeasureStep {
    source: String,
    target: String,
}

impl Step for MeasureStep {
    fn type_name(&self) -> &str {
        "measure"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        let text = ctx.read_argument(&self.source)?;
        ctx.add(&self.target, text.len() as i64)?;
        Ok(StepOutput::data(text))
    }
}

#[test]
fn full_file_workflow() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("orders.yml");
    fs::write(
        &path,
        r#"
description: order flow
settings:
  drain_policy: wait_for_all
  drain_timeout_ms: 5000
setup:
  - type: context_set
    key: order
    value: "A-%Guid%"
execution:
  - type: delay
    run_concurrently: true
    delay_ms: 5
  - type: context_assert
    key: order
    expected: takeFromCtx:order
cleanup:
  - type: context_remove
    key: order
"#,
    )
    .unwrap();

    let loaded = load_test_case(&path, &StepRegistry::with_builtins()).unwrap();

    assert_eq!(loaded.test_case.name, "orders");
    assert_eq!(loaded.settings.drain_policy, DrainPolicy::WaitForAll);
    assert_eq!(loaded.settings.drain_timeout_ms, Some(5000));
    assert_eq!(loaded.test_case.steps(Stage::Execution).len(), 2);
    assert!(loaded.test_case.steps(Stage::Execution)[0].run_concurrently);

    let logger = Arc::new(BufferedLogger::new());
    let runner = TestRunner::new(loaded.test_case, loaded.settings, logger.clone()).unwrap();
    let ctx = runner.context().clone();
    runner.run().unwrap();

    assert!(!ctx.contains("order"));
    assert!(logger.contains_text("Test 'orders' PASSED"));
}

#[test]
fn custom_step_registration() {
    let mut registry = StepRegistry::with_builtins();
    registry.register_step::<MeasureStep>("measure");

    let loaded = parse_test_case(
        r#"
name: custom
setup:
  - type: context_set
    key: word
    value: stagehand
execution:
  - type: measure
    source: takeFromCtx:word
    target: length
    validator: { type: regex, pattern: "^stage" }
    context_loader: { type: regex, pattern: "^(\\w{5})", key: prefix }
"#,
        "custom.yml".as_ref(),
        &registry,
    )
    .unwrap();

    let logger = Arc::new(BufferedLogger::new());
    let runner = TestRunner::new(loaded.test_case, loaded.settings, logger).unwrap();
    let ctx = runner.context().clone();
    runner.run().unwrap();

    assert_eq!(ctx.get_as::<i64>("length").unwrap(), 9);
    assert_eq!(ctx.get_string("prefix").as_deref(), Some("stage"));
}

#[test]
fn validator_mismatch_fails_the_run() {
    let registry = StepRegistry::with_builtins();
    let loaded = parse_test_case(
        r#"
name: mismatch
execution:
  - type: shell
    command: "echo pong"
    fail_on_error: false
    validator: { type: contains, text: ping }
"#,
        "mismatch.yml".as_ref(),
        &registry,
    )
    .unwrap();

    let runner =
        TestRunner::new(loaded.test_case, loaded.settings, Arc::new(BufferedLogger::new()))
            .unwrap();

    match runner.run().unwrap_err() {
        StagehandError::ValidationStepExecution { step, .. } => assert_eq!(step, "contains"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_validator_is_rejected() {
    let err = parse_test_case(
        "name: x\nexecution:\n  - type: delay\n    validator: { type: xpath }\n",
        "x.yml".as_ref(),
        &StepRegistry::with_builtins(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        StagehandError::UnknownStepType { kind: "validator", ref name } if name == "xpath"
    ));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = parse_test_case(
        "name: [unterminated",
        "bad.yml".as_ref(),
        &StepRegistry::with_builtins(),
    )
    .unwrap_err();

    assert!(matches!(err, StagehandError::ConfigParseError { .. }));
}

#[test]
fn mistyped_step_field_is_invalid_config() {
    let err = parse_test_case(
        "name: x\nsetup:\n  - type: delay\n    delay_ms: soon\n",
        "x.yml".as_ref(),
        &StepRegistry::with_builtins(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        StagehandError::InvalidStepConfig { kind: "step", .. }
    ));
}
