//! Test case files and engine settings.
//!
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use stagehand::config::parse_test_case;
//! use stagehand::steps::StepRegistry;
//!
//! let yaml = "name: smoke\nexecution:\n  - type: delay\n    delay_ms: 1\n";
//! let loaded = parse_test_case(yaml, Path::new("smoke.yml"), &StepRegistry::with_builtins()).unwrap();
//! assert_eq!(loaded.test_case.execution.len(), 1);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{build_test_case, load_test_case, parse_test_case, LoadedTestCase};
pub use schema::{ComponentDefinition, DrainPolicy, RunSettings, StepDefinition, TestCaseFile};
