//! Shared state passed to every step.
//!
//! A [`Context`] is created once per test run and handed to every step in
//! every stage. Clones share the same key/value store and the same lock;
//! [`Context::clone_for_concurrent_use`] additionally swaps in a private
//! logger so concurrently running steps do not interleave their output.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stagehand::context::Context;
//! use stagehand::logging::BufferedLogger;
//!
//! let ctx = Context::new("orders", Arc::new(BufferedLogger::new()));
//! ctx.add("order_id", "A-17".to_string()).unwrap();
//! assert_eq!(ctx.get_string("order_id").as_deref(), Some("A-17"));
//! ```

pub mod value;
pub mod wildcards;

pub use value::ContextValue;
pub use wildcards::{substitute, Wildcard};

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

use crate::error::{Result, StagehandError};
use crate::logging::{LogLevel, Logger};
use crate::testcase::Stage;

/// Prefix that makes [`Context::read_argument`] read a context key.
pub const TAKE_FROM_CONTEXT: &str = "takeFromCtx:";

type Store = HashMap<String, ContextValue>;

/// Shared key/value state, logging facade and wildcard expansion.
#[derive(Clone)]
pub struct Context {
    store: Arc<Mutex<Store>>,
    stage: Arc<Mutex<Option<Stage>>>,
    test_name: Arc<str>,
    test_start: DateTime<Local>,
    logger: Arc<dyn Logger>,
}

impl Context {
    /// Create a context for a new run, stamping the start time now.
    pub fn new(test_name: &str, logger: Arc<dyn Logger>) -> Self {
        Self {
            store: Arc::new(Mutex::new(HashMap::new())),
            stage: Arc::new(Mutex::new(None)),
            test_name: Arc::from(test_name),
            test_start: Local::now(),
            logger,
        }
    }

    /// A context sharing this one's store, lock and start time, but
    /// writing to `logger`.
    ///
    /// The clone keeps the stage current at the time of the call, so a step
    /// still running after its stage ended reports the stage it ran in.
    pub fn clone_for_concurrent_use(&self, logger: Arc<dyn Logger>) -> Self {
        Self {
            stage: Arc::new(Mutex::new(self.current_stage())),
            logger,
            ..self.clone()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a value; fails if the key is already present.
    pub fn add(&self, key: &str, value: impl Any + Send + Sync) -> Result<()> {
        self.add_with(key, ContextValue::new(value), false)
    }

    /// Insert or overwrite a value.
    pub fn add_or_update(&self, key: &str, value: impl Any + Send + Sync) {
        self.lock().insert(key.to_string(), ContextValue::new(value));
    }

    /// Insert a prepared value, overwriting only if `update_if_exists`.
    pub fn add_with(&self, key: &str, value: ContextValue, update_if_exists: bool) -> Result<()> {
        let mut store = self.lock();
        if !update_if_exists && store.contains_key(key) {
            return Err(StagehandError::DuplicateKey {
                key: key.to_string(),
            });
        }
        store.insert(key.to_string(), value);
        Ok(())
    }

    /// Remove a key, returning its value.
    pub fn remove(&self, key: &str) -> Option<ContextValue> {
        self.lock().remove(key)
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<ContextValue> {
        self.lock().get(key).cloned()
    }

    /// Typed copy of the value stored under `key`.
    pub fn get_as<T: Any + Clone>(&self, key: &str) -> Result<T> {
        let value = self.get(key).ok_or_else(|| StagehandError::KeyNotFound {
            key: key.to_string(),
        })?;
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| StagehandError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Value under `key` rendered as text.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.to_text())
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-modify-write a typed value while holding the lock.
    ///
    /// Missing keys start from `init`. Fails with `TypeMismatch` if the key
    /// holds another type.
    pub fn update<T, F>(&self, key: &str, init: T, f: F) -> Result<T>
    where
        T: Any + Send + Sync + Clone,
        F: FnOnce(T) -> T,
    {
        self.try_update(key, init, |current| Ok(f(current)))
    }

    /// Like [`Context::update`], but `f` may refuse the change.
    ///
    /// When `f` fails the stored value is left untouched.
    pub fn try_update<T, E, F>(&self, key: &str, init: T, f: F) -> std::result::Result<T, E>
    where
        T: Any + Send + Sync + Clone,
        E: From<StagehandError>,
        F: FnOnce(T) -> std::result::Result<T, E>,
    {
        let mut store = self.lock();
        let current = match store.get(key) {
            Some(value) => {
                value
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or_else(|| StagehandError::TypeMismatch {
                        key: key.to_string(),
                        expected: std::any::type_name::<T>(),
                    })?
            }
            None => init,
        };
        let next = f(current)?;
        store.insert(key.to_string(), ContextValue::new(next.clone()));
        Ok(next)
    }

    /// Expand wildcard tokens in `input`.
    pub fn substitute_wildcards(&self, input: &str) -> String {
        substitute(input, &self.test_start)
    }

    /// Resolve a configured string argument.
    ///
    /// `takeFromCtx:<key>` reads the key's text value; anything else has its
    /// wildcards expanded.
    pub fn read_argument(&self, input: &str) -> Result<String> {
        match input.strip_prefix(TAKE_FROM_CONTEXT) {
            Some(key) => {
                let key = key.trim();
                let value = self.get(key).ok_or_else(|| StagehandError::KeyNotFound {
                    key: key.to_string(),
                })?;
                value.to_text().ok_or(StagehandError::TypeMismatch {
                    key: key.to_string(),
                    expected: "text",
                })
            }
            None => Ok(self.substitute_wildcards(input)),
        }
    }

    /// When the run started.
    pub fn test_case_start(&self) -> DateTime<Local> {
        self.test_start
    }

    /// Name of the running test case.
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Stage currently being run.
    pub fn current_stage(&self) -> Option<Stage> {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_current_stage(&self, stage: Stage) {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner) = Some(stage);
    }

    /// The attached logger.
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Log at info level.
    pub fn log_info(&self, text: &str) {
        self.logger.log(LogLevel::Info, text);
    }

    /// Log at warning level.
    pub fn log_warning(&self, text: &str) {
        self.logger.log(LogLevel::Warning, text);
    }

    /// Log at error level.
    pub fn log_error(&self, text: &str) {
        self.logger.log(LogLevel::Error, text);
    }

    /// Log a block of data.
    pub fn log_data(&self, description: &str, data: &str) {
        self.logger.log_data(description, data);
    }

    /// Log an error with its cause chain.
    pub fn log_exception(&self, error: &(dyn std::error::Error + 'static)) {
        self.logger.log_exception(error);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("test_name", &self.test_name)
            .field("test_start", &self.test_start)
            .field("keys", &self.len())
            .finish()
    }
}
