//! Error types for Stagehand operations.
//!
//! This module defines [`StagehandError`], the error type returned by the
//! engine, the context and the test-case loader, and a [`Result`] type alias
//! for convenience.
//!
//! # Error Handling Strategy
//!
//! - Steps return `anyhow::Result`; the engine wraps their failures in
//!   [`StagehandError::StepExecution`] with stage, test and step identity
//! - A step that reports [`StagehandError::ValidationStepExecution`] is
//!   rethrown verbatim, regardless of `fail_on_error`
//! - Validation of the test case happens before any step runs and is
//!   reported as [`StagehandError::Validation`]

use std::path::PathBuf;
use thiserror::Error;

use crate::testcase::Stage;

/// Core error type for Stagehand operations.
#[derive(Debug, Error)]
pub enum StagehandError {
    /// A step rejected its configuration before the run started.
    #[error("Validation of step '{step}' in {stage} stage of test '{test}' failed: {message}")]
    Validation {
        test: String,
        stage: Stage,
        step: String,
        message: String,
    },

    /// A step failed while executing.
    #[error("Step '{step}' failed in {stage} stage of test '{test}': {source:#}")]
    StepExecution {
        test: String,
        stage: Stage,
        step: String,
        #[source]
        source: anyhow::Error,
    },

    /// Step output did not match what a validation step expected.
    #[error("Validation step '{step}' failed: {message}")]
    ValidationStepExecution { step: String, message: String },

    /// Concurrent steps did not finish before the drain deadline.
    #[error("Timed out draining {stage} stage with {pending} concurrent step(s) still running")]
    DrainTimeout { stage: Stage, pending: usize },

    /// Cleanup failed after an earlier stage had already failed.
    #[error("{cleanup} (earlier failure: {original})")]
    CleanupFailed {
        #[source]
        cleanup: Box<StagehandError>,
        original: Box<StagehandError>,
    },

    /// Key already present in the context.
    #[error("Context already contains key '{key}'")]
    DuplicateKey { key: String },

    /// Key missing from the context.
    #[error("Context key '{key}' not found")]
    KeyNotFound { key: String },

    /// Context value is not of the requested type.
    #[error("Context key '{key}' does not hold a value of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// No factory registered under this step, validator or loader name.
    #[error("Unknown {kind} type: {name}")]
    UnknownStepType { kind: &'static str, name: String },

    /// Step definition could not be turned into a step.
    #[error("Invalid configuration for {kind} '{name}': {message}")]
    InvalidStepConfig {
        kind: &'static str,
        name: String,
        message: String,
    },

    /// Test case file not found at expected location.
    #[error("Test case not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse test case file.
    #[error("Failed to parse test case at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StagehandError {
    /// Stage the error is attributed to, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            StagehandError::Validation { stage, .. }
            | StagehandError::StepExecution { stage, .. }
            | StagehandError::DrainTimeout { stage, .. } => Some(*stage),
            StagehandError::CleanupFailed { cleanup, .. } => cleanup.stage(),
            _ => None,
        }
    }

    /// Name of the failing step, if any.
    pub fn step(&self) -> Option<&str> {
        match self {
            StagehandError::Validation { step, .. }
            | StagehandError::StepExecution { step, .. }
            | StagehandError::ValidationStepExecution { step, .. } => Some(step),
            StagehandError::CleanupFailed { cleanup, .. } => cleanup.step(),
            _ => None,
        }
    }

    /// Whether this is a pre-run validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, StagehandError::Validation { .. })
    }
}

/// Result type alias for Stagehand operations.
pub type Result<T> = std::result::Result<T, StagehandError>;
