//! Steps and the capabilities the engine consumes.
//!
//! - [`Step`] - the capability every step implements
//! - [`TestStep`] - a step plus its scheduling flags and optional
//!   [`DataValidator`] / [`ContextLoader`]
//! - [`StepRegistry`] - builds steps from type names and YAML fields
//! - [`builtin`] - steps that ship with Stagehand
//!
//! # Example
//!
//! ```
//! use stagehand::steps::{builtin::ContextSetStep, TestStep};
//!
//! let step = TestStep::new(ContextSetStep::new("user", "alice"))
//!     .concurrent()
//!     .fail_on_error(false);
//! assert_eq!(step.name(), "context_set");
//! assert!(step.run_concurrently);
//! ```

pub mod builtin;
pub mod registry;
pub mod step;
pub mod test_step;
pub mod validators;

pub use registry::{Factory, FactoryTable, StepRegistry};
pub use step::{ContextLoader, DataValidator, Step, StepOutput};
pub use test_step::{is_validation_step_error, TestStep};
pub use validators::{ContainsValidator, RegexContextLoader, RegexValidator};
