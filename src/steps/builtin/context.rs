//! Steps that read and write the shared context.

use anyhow::{bail, ensure, Context as _};
use serde::{Deserialize, Serialize};

use crate::context::{Context, ContextValue};
use crate::error::StagehandError;
use crate::steps::{Step, StepOutput};

/// Stores a text value under a key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSetStep {
    /// Key to write.
    pub key: String,
    /// Value; wildcards and `takeFromCtx:` are resolved at run time.
    pub value: String,
    /// Overwrite an existing key instead of failing.
    pub update_if_exists: bool,
}

impl ContextSetStep {
    /// Set `key` to `value`, failing if the key exists.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            update_if_exists: false,
        }
    }
}

impl Step for ContextSetStep {
    fn type_name(&self) -> &str {
        "context_set"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        let value = ctx.read_argument(&self.value)?;
        ctx.log_info(&format!("Setting context '{}' = '{}'", self.key, value));
        ctx.add_with(&self.key, ContextValue::from(value), self.update_if_exists)?;
        Ok(StepOutput::none())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.key.trim().is_empty(), "key must not be empty");
        Ok(())
    }
}

/// Removes a key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextRemoveStep {
    /// Key to remove.
    pub key: String,
    /// Fail when the key is absent.
    pub fail_if_missing: bool,
}

impl ContextRemoveStep {
    /// Remove `key`, ignoring a missing key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fail_if_missing: false,
        }
    }
}

impl Step for ContextRemoveStep {
    fn type_name(&self) -> &str {
        "context_remove"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        if ctx.remove(&self.key).is_none() {
            if self.fail_if_missing {
                return Err(StagehandError::KeyNotFound {
                    key: self.key.clone(),
                }
                .into());
            }
            ctx.log_warning(&format!("Context key '{}' was not present", self.key));
        }
        Ok(StepOutput::none())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.key.trim().is_empty(), "key must not be empty");
        Ok(())
    }
}

/// Adds to an integer counter under the context lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextIncrementStep {
    /// Counter key; starts from zero when absent.
    pub key: String,
    /// Amount to add.
    pub by: i64,
}

impl Default for ContextIncrementStep {
    fn default() -> Self {
        Self {
            key: String::new(),
            by: 1,
        }
    }
}

impl ContextIncrementStep {
    /// Add one to `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }
}

impl Step for ContextIncrementStep {
    fn type_name(&self) -> &str {
        "context_increment"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        let by = self.by;
        let value = ctx.try_update(&self.key, 0_i64, |n: i64| {
            n.checked_add(by)
                .with_context(|| format!("counter '{}' overflows adding {} to {}", self.key, by, n))
        })?;
        ctx.log_info(&format!("Counter '{}' is now {}", self.key, value));
        Ok(StepOutput::none())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.key.trim().is_empty(), "key must not be empty");
        Ok(())
    }
}

/// Compares a context value against an expected text.
///
/// A mismatch is a content-validation failure and is always fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextAssertStep {
    /// Key to read.
    pub key: String,
    /// Expected text; wildcards and `takeFromCtx:` are resolved at run time.
    pub expected: String,
}

impl ContextAssertStep {
    /// Assert that `key` renders as `expected`.
    pub fn new(key: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expected: expected.into(),
        }
    }
}

impl Step for ContextAssertStep {
    fn type_name(&self) -> &str {
        "context_assert"
    }

    fn execute(&self, ctx: &Context) -> anyhow::Result<StepOutput> {
        let expected = ctx.read_argument(&self.expected)?;
        let Some(actual) = ctx.get_string(&self.key) else {
            bail!(StagehandError::ValidationStepExecution {
                step: self.type_name().to_string(),
                message: format!("context key '{}' is missing or not text", self.key),
            });
        };
        if actual != expected {
            bail!(StagehandError::ValidationStepExecution {
                step: self.type_name().to_string(),
                message: format!(
                    "context key '{}' is '{}', expected '{}'",
                    self.key, actual, expected
                ),
            });
        }
        ctx.log_info(&format!("Context '{}' matches '{}'", self.key, expected));
        Ok(StepOutput::none())
    }

    fn validate(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.key.trim().is_empty(), "key must not be empty");
        Ok(())
    }
}
