//! Test case file loading.
//!
//! Reads a YAML test case file, resolves every step, validator and context
//! loader through a [`StepRegistry`] and returns a ready-to-run
//! [`TestCase`] with its [`RunSettings`].

use std::fs;
use std::path::Path;

use crate::config::schema::{RunSettings, StepDefinition, TestCaseFile};
use crate::error::{Result, StagehandError};
use crate::steps::{StepRegistry, TestStep};
use crate::testcase::{Stage, TestCase};

/// A test case built from a file, plus the settings it declared.
#[derive(Debug)]
pub struct LoadedTestCase {
    /// The runnable test case.
    pub test_case: TestCase,
    /// Engine settings from the file.
    pub settings: RunSettings,
}

/// Load a test case file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
/// Returns `UnknownStepType` or `InvalidStepConfig` if a step can't be built.
pub fn load_test_case(path: &Path, registry: &StepRegistry) -> Result<LoadedTestCase> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StagehandError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StagehandError::Io(e)
        }
    })?;

    let mut loaded = parse_test_case(&content, path, registry)?;
    if loaded.test_case.name.is_empty() {
        loaded.test_case.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    Ok(loaded)
}

/// Parse YAML content into a test case.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
/// * `registry` - Factories for the step types the file names
pub fn parse_test_case(
    content: &str,
    source_path: &Path,
    registry: &StepRegistry,
) -> Result<LoadedTestCase> {
    let file: TestCaseFile =
        serde_yaml::from_str(content).map_err(|e| StagehandError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;

    build_test_case(file, registry)
}

/// Turn a parsed file into a test case.
pub fn build_test_case(file: TestCaseFile, registry: &StepRegistry) -> Result<LoadedTestCase> {
    let mut test_case = TestCase::new(file.name);
    test_case.description = file.description;

    for (stage, definitions) in [
        (Stage::Setup, &file.setup),
        (Stage::Execution, &file.execution),
        (Stage::Cleanup, &file.cleanup),
    ] {
        for definition in definitions {
            test_case.add_step(stage, build_step(definition, registry)?);
        }
    }

    Ok(LoadedTestCase {
        test_case,
        settings: file.settings,
    })
}

fn build_step(definition: &StepDefinition, registry: &StepRegistry) -> Result<TestStep> {
    let step = registry.create_step(&definition.step_type, definition.config_value())?;
    let mut test_step = TestStep::from_arc(step).fail_on_error(definition.fail_on_error);
    if definition.run_concurrently {
        test_step = test_step.concurrent();
    }

    if let Some(validator) = &definition.validator {
        test_step = test_step.with_validator(
            registry.create_validator(&validator.component_type, validator.config_value())?,
        );
    }

    if let Some(loader) = &definition.context_loader {
        test_step = test_step.with_context_loader(
            registry.create_loader(&loader.component_type, loader.config_value())?,
        );
    }

    Ok(test_step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DrainPolicy;
    use tempfile::TempDir;

    const CASE: &str = r#"
name: orders
description: create and verify an order
settings:
  drain_policy: wait_for_all
setup:
  - type: context_set
    key: order
    value: A-1
execution:
  - type: delay
    run_concurrently: true
    fail_on_error: false
    delay_ms: 10
  - type: context_assert
    key: order
    expected: A-1
cleanup:
  - type: context_remove
    key: order
"#;

    #[test]
    fn parses_all_stages() {
        let registry = StepRegistry::with_builtins();
        let loaded = parse_test_case(CASE, Path::new("orders.yml"), &registry).unwrap();
        let case = loaded.test_case;

        assert_eq!(case.name, "orders");
        assert_eq!(case.description.as_deref(), Some("create and verify an order"));
        assert_eq!(case.setup.len(), 1);
        assert_eq!(case.execution.len(), 2);
        assert_eq!(case.cleanup.len(), 1);
        assert!(case.execution[0].run_concurrently);
        assert!(!case.execution[0].fail_on_error);
        assert!(case.execution[1].fail_on_error);
        assert_eq!(loaded.settings.drain_policy, DrainPolicy::WaitForAll);
    }

    #[test]
    fn unknown_step_type_fails() {
        let registry = StepRegistry::with_builtins();
        let yaml = "name: t\nsetup:\n  - type: soap\n";
        let err = parse_test_case(yaml, Path::new("t.yml"), &registry).unwrap_err();
        assert!(matches!(err, StagehandError::UnknownStepType { .. }));
    }

    #[test]
    fn unknown_validator_type_fails() {
        let registry = StepRegistry::with_builtins();
        let yaml = "name: t\nsetup:\n  - type: delay\n    validator: { type: xml_schema }\n";
        let err = parse_test_case(yaml, Path::new("t.yml"), &registry).unwrap_err();
        assert!(matches!(
            err,
            StagehandError::UnknownStepType {
                kind: "validator",
                ..
            }
        ));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let registry = StepRegistry::with_builtins();
        let err = parse_test_case("setup: [", Path::new("bad.yml"), &registry).unwrap_err();
        assert!(matches!(err, StagehandError::ConfigParseError { .. }));
        assert!(err.to_string().contains("bad.yml"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let registry = StepRegistry::with_builtins();
        let err = load_test_case(Path::new("/no/such/case.yml"), &registry).unwrap_err();
        assert!(matches!(err, StagehandError::ConfigNotFound { .. }));
    }

    #[test]
    fn name_defaults_to_file_stem() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("smoke.yml");
        fs::write(&path, "execution:\n  - type: delay\n").unwrap();

        let registry = StepRegistry::with_builtins();
        let loaded = load_test_case(&path, &registry).unwrap();
        assert_eq!(loaded.test_case.name, "smoke");
    }
}
