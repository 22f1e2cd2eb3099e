//! Stagehand - staged integration test orchestration.
//!
//! A test case is three ordered lists of steps: setup, execution and
//! cleanup. Steps share a thread-safe [`Context`], may run concurrently
//! with their neighbours, and cleanup always runs.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - YAML test case files and run settings
//! - [`context`] - Shared key/value store and wildcard substitution
//! - [`error`] - Error types and result aliases
//! - [`logging`] - Structured run events and logger sinks
//! - [`runner`] - Test execution engine and concurrency coordinator
//! - [`shell`] - Shell command execution
//! - [`steps`] - Step capability, built-in steps and the registry
//! - [`testcase`] - Test case and stage definitions
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stagehand::config::RunSettings;
//! use stagehand::logging::BufferedLogger;
//! use stagehand::steps::builtin::{ContextAssertStep, ContextSetStep};
//! use stagehand::{Stage, TestCase, TestRunner, TestStep};
//!
//! let case = TestCase::new("greeting")
//!     .with_step(Stage::Setup, TestStep::new(ContextSetStep::new("who", "world")))
//!     .with_step(Stage::Execution, TestStep::new(ContextAssertStep::new("who", "world")));
//!
//! let logger = Arc::new(BufferedLogger::new());
//! let runner = TestRunner::new(case, RunSettings::default(), logger.clone()).unwrap();
//! runner.run().unwrap();
//! assert!(logger.contains_text("PASSED"));
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod testcase;

pub use context::{Context, ContextValue};
pub use error::{Result, StagehandError};
pub use runner::{TestOutcome, TestRunner};
pub use steps::{Step, StepOutput, TestStep};
pub use testcase::{Stage, TestCase};
