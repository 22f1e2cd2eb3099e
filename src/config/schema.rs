//! Test case file schema.
//!
//! ```yaml
//! name: order-roundtrip
//! settings:
//!   drain_timeout_ms: 30000
//! setup:
//!   - type: context_set
//!     key: order_id
//!     value: "%Guid%"
//! execution:
//!   - type: shell
//!     run_concurrently: true
//!     command: "echo created takeFromCtx:order_id"
//!     validator: { type: contains, text: created }
//! cleanup:
//!   - type: context_remove
//!     key: order_id
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root of a test case file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCaseFile {
    /// Test case name.
    pub name: String,

    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Engine settings for this run.
    pub settings: RunSettings,

    /// Setup stage steps.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<StepDefinition>,

    /// Execution stage steps.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub execution: Vec<StepDefinition>,

    /// Cleanup stage steps.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cleanup: Vec<StepDefinition>,
}

/// One step entry in a stage list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Registry name of the step.
    #[serde(rename = "type")]
    pub step_type: String,

    /// Dispatch to a worker instead of running inline.
    #[serde(default, skip_serializing_if = "is_false")]
    pub run_concurrently: bool,

    /// Whether a failure ends the stage.
    #[serde(default = "default_true")]
    pub fail_on_error: bool,

    /// Validator applied to the step's response data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<ComponentDefinition>,

    /// Context loader applied to the step's response data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_loader: Option<ComponentDefinition>,

    /// Remaining fields, handed to the step factory.
    #[serde(flatten)]
    pub config: BTreeMap<String, serde_yaml::Value>,
}

/// A validator or context loader entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDefinition {
    /// Registry name.
    #[serde(rename = "type")]
    pub component_type: String,

    /// Remaining fields, handed to the factory.
    #[serde(flatten)]
    pub config: BTreeMap<String, serde_yaml::Value>,
}

/// What a blocking drain does after the first fatal concurrent failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainPolicy {
    /// Raise immediately; steps still running are abandoned.
    #[default]
    AbortOnFirstFailure,
    /// Keep waiting for every step of the stage, then raise the first failure.
    WaitForAll,
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Behavior after the first fatal concurrent failure.
    pub drain_policy: DrainPolicy,

    /// Upper bound on a blocking drain; unset waits forever.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drain_timeout_ms: Option<u64>,

    /// Wait (log-only) for abandoned concurrent steps before `run` returns.
    pub settle_on_finish: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            drain_policy: DrainPolicy::default(),
            drain_timeout_ms: None,
            settle_on_finish: true,
        }
    }
}

impl RunSettings {
    /// Drain deadline as a duration.
    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }
}

impl StepDefinition {
    /// Step-specific fields as a YAML mapping.
    pub fn config_value(&self) -> serde_yaml::Value {
        to_mapping(&self.config)
    }
}

impl ComponentDefinition {
    /// Component-specific fields as a YAML mapping.
    pub fn config_value(&self) -> serde_yaml::Value {
        to_mapping(&self.config)
    }
}

fn to_mapping(config: &BTreeMap<String, serde_yaml::Value>) -> serde_yaml::Value {
    serde_yaml::Value::Mapping(
        config
            .iter()
            .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.clone()))
            .collect(),
    )
}

fn default_true() -> bool {
    true
}

fn is_false(b: &bool) -> bool {
    !*b
}
