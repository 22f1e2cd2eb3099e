//! Built-in data validators and context loaders.

use anyhow::{ensure, Context as _};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::{Context, ContextValue};

use super::step::{ContextLoader, DataValidator};

/// Passes when the data contains a substring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainsValidator {
    /// Expected substring; wildcards and `takeFromCtx:` are resolved at run time.
    pub text: String,
}

impl ContainsValidator {
    /// Expect `text` somewhere in the data.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DataValidator for ContainsValidator {
    fn type_name(&self) -> &str {
        "contains"
    }

    fn validate(&self, ctx: &Context, data: &str) -> anyhow::Result<()> {
        let expected = ctx.read_argument(&self.text)?;
        ensure!(data.contains(&expected), "data does not contain '{}'", expected);
        Ok(())
    }

    fn check_config(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.text.is_empty(), "text must not be empty");
        Ok(())
    }
}

/// Passes when the data matches a regular expression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexValidator {
    /// Pattern to search for.
    pub pattern: String,
}

impl RegexValidator {
    /// Expect `pattern` to match somewhere in the data.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl DataValidator for RegexValidator {
    fn type_name(&self) -> &str {
        "regex"
    }

    fn validate(&self, _ctx: &Context, data: &str) -> anyhow::Result<()> {
        let re = compile(&self.pattern)?;
        ensure!(re.is_match(data), "data does not match /{}/", self.pattern);
        Ok(())
    }

    fn check_config(&self, _ctx: &Context) -> anyhow::Result<()> {
        compile(&self.pattern).map(|_| ())
    }
}

/// Stores the first capture group of a regex match under a context key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexContextLoader {
    /// Pattern with at least one capture group.
    pub pattern: String,
    /// Key that receives the captured text.
    pub key: String,
    /// Overwrite an existing key instead of failing.
    pub update_if_exists: bool,
}

impl RegexContextLoader {
    /// Capture group 1 of `pattern` into `key`.
    pub fn new(pattern: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            key: key.into(),
            update_if_exists: false,
        }
    }
}

impl ContextLoader for RegexContextLoader {
    fn type_name(&self) -> &str {
        "regex"
    }

    fn load(&self, ctx: &Context, data: &str) -> anyhow::Result<()> {
        let re = compile(&self.pattern)?;
        let captured = re
            .captures(data)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .with_context(|| format!("/{}/ captured nothing", self.pattern))?;

        ctx.log_info(&format!("Loaded '{}' = '{}'", self.key, captured));
        ctx.add_with(&self.key, ContextValue::from(captured), self.update_if_exists)?;
        Ok(())
    }

    fn check_config(&self, _ctx: &Context) -> anyhow::Result<()> {
        ensure!(!self.key.trim().is_empty(), "key must not be empty");
        let re = compile(&self.pattern)?;
        ensure!(
            re.captures_len() > 1,
            "pattern /{}/ has no capture group",
            self.pattern
        );
        Ok(())
    }
}

fn compile(pattern: &str) -> anyhow::Result<Regex> {
    Regex::new(pattern).with_context(|| format!("invalid pattern /{}/", pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::BufferedLogger;
    use std::sync::Arc;

    fn ctx() -> Context {
        Context::new("unit", Arc::new(BufferedLogger::new()))
    }

    #[test]
    fn contains_validator() {
        let ctx = ctx();
        let v = ContainsValidator::new("ok");
        assert!(v.validate(&ctx, "status: ok").is_ok());
        assert!(v.validate(&ctx, "status: bad").is_err());
        assert!(ContainsValidator::default().check_config(&ctx).is_err());
    }

    #[test]
    fn regex_validator() {
        let ctx = ctx();
        let v = RegexValidator::new(r"id=\d+");
        assert!(v.validate(&ctx, "id=42").is_ok());
        assert!(v.validate(&ctx, "id=x").is_err());
        assert!(RegexValidator::new("(").check_config(&ctx).is_err());
    }

    #[test]
    fn regex_loader_captures_group() {
        let ctx = ctx();
        let loader = RegexContextLoader::new(r"order=(\w+)", "order");
        loader.load(&ctx, "created order=A17 ok").unwrap();
        assert_eq!(ctx.get_string("order").as_deref(), Some("A17"));
    }

    #[test]
    fn regex_loader_requires_capture_group() {
        let ctx = ctx();
        assert!(RegexContextLoader::new(r"\d+", "n").check_config(&ctx).is_err());
        assert!(RegexContextLoader::new(r"(\d+)", "").check_config(&ctx).is_err());
        assert!(RegexContextLoader::new(r"(\d+)", "n").check_config(&ctx).is_ok());
    }

    #[test]
    fn regex_loader_fails_without_match() {
        let ctx = ctx();
        let loader = RegexContextLoader::new(r"order=(\w+)", "order");
        assert!(loader.load(&ctx, "nothing here").is_err());
    }
}
