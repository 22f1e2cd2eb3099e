//! Registry mapping type names to step factories.
//!
//! Test case files name steps, validators and context loaders by a string
//! such as `shell` or `regex`. The [`StepRegistry`] turns that name plus
//! the remaining YAML fields into a typed instance.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{Result, StagehandError};

use super::builtin::{
    ContextAssertStep, ContextIncrementStep, ContextRemoveStep, ContextSetStep, DelayStep,
    FileDeleteStep, FileWriteStep, ShellStep,
};
use super::step::{ContextLoader, DataValidator, Step};
use super::validators::{ContainsValidator, RegexContextLoader, RegexValidator};

/// Builds an instance from its YAML configuration.
pub type Factory<T> = Box<dyn Fn(serde_yaml::Value) -> anyhow::Result<Arc<T>> + Send + Sync>;

/// Factories for one kind of component.
pub struct FactoryTable<T: ?Sized> {
    kind: &'static str,
    factories: BTreeMap<String, Factory<T>>,
}

impl<T: ?Sized> FactoryTable<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            factories: BTreeMap::new(),
        }
    }

    /// Register a factory, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, factory: Factory<T>) {
        self.factories.insert(name.into(), factory);
    }

    /// Build an instance.
    pub fn create(&self, name: &str, config: serde_yaml::Value) -> Result<Arc<T>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| StagehandError::UnknownStepType {
                kind: self.kind,
                name: name.to_string(),
            })?;

        let config = match config {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other,
        };

        factory(config).map_err(|e| StagehandError::InvalidStepConfig {
            kind: self.kind,
            name: name.to_string(),
            message: format!("{:#}", e),
        })
    }

    /// Whether a factory is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Registry of steps, data validators and context loaders.
pub struct StepRegistry {
    /// Step factories.
    pub steps: FactoryTable<dyn Step>,
    /// Data validator factories.
    pub validators: FactoryTable<dyn DataValidator>,
    /// Context loader factories.
    pub loaders: FactoryTable<dyn ContextLoader>,
}

impl StepRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            steps: FactoryTable::new("step"),
            validators: FactoryTable::new("validator"),
            loaders: FactoryTable::new("context loader"),
        }
    }

    /// Create a registry with all built-in components.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_step::<DelayStep>("delay");
        registry.register_step::<ContextSetStep>("context_set");
        registry.register_step::<ContextRemoveStep>("context_remove");
        registry.register_step::<ContextIncrementStep>("context_increment");
        registry.register_step::<ContextAssertStep>("context_assert");
        registry.register_step::<ShellStep>("shell");
        registry.register_step::<FileWriteStep>("file_write");
        registry.register_step::<FileDeleteStep>("file_delete");
        registry.register_validator::<ContainsValidator>("contains");
        registry.register_validator::<RegexValidator>("regex");
        registry.register_loader::<RegexContextLoader>("regex");
        registry
    }

    /// Register a step whose fields deserialize straight from YAML.
    pub fn register_step<S>(&mut self, name: &str)
    where
        S: Step + DeserializeOwned + 'static,
    {
        self.steps.register(
            name,
            Box::new(|config: serde_yaml::Value| -> anyhow::Result<Arc<dyn Step>> {
                let step: S = serde_yaml::from_value(config)?;
                Ok(Arc::new(step) as Arc<dyn Step>)
            }),
        );
    }

    /// Register a data validator whose fields deserialize straight from YAML.
    pub fn register_validator<V>(&mut self, name: &str)
    where
        V: DataValidator + DeserializeOwned + 'static,
    {
        self.validators.register(
            name,
            Box::new(|config: serde_yaml::Value| -> anyhow::Result<Arc<dyn DataValidator>> {
                let validator: V = serde_yaml::from_value(config)?;
                Ok(Arc::new(validator) as Arc<dyn DataValidator>)
            }),
        );
    }

    /// Register a context loader whose fields deserialize straight from YAML.
    pub fn register_loader<L>(&mut self, name: &str)
    where
        L: ContextLoader + DeserializeOwned + 'static,
    {
        self.loaders.register(
            name,
            Box::new(|config: serde_yaml::Value| -> anyhow::Result<Arc<dyn ContextLoader>> {
                let loader: L = serde_yaml::from_value(config)?;
                Ok(Arc::new(loader) as Arc<dyn ContextLoader>)
            }),
        );
    }

    /// Build a step.
    pub fn create_step(&self, name: &str, config: serde_yaml::Value) -> Result<Arc<dyn Step>> {
        self.steps.create(name, config)
    }

    /// Build a data validator.
    pub fn create_validator(
        &self,
        name: &str,
        config: serde_yaml::Value,
    ) -> Result<Arc<dyn DataValidator>> {
        self.validators.create(name, config)
    }

    /// Build a context loader.
    pub fn create_loader(
        &self,
        name: &str,
        config: serde_yaml::Value,
    ) -> Result<Arc<dyn ContextLoader>> {
        self.loaders.create(name, config)
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
