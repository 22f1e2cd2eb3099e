//! Test case orchestration.
//!
//! - [`TestRunner`] - runs Setup, Execution and Cleanup against one
//!   [`TestCase`](crate::TestCase)
//! - [`Coordinator`] - dispatches concurrent steps and drains their results

pub mod coordinator;
pub mod engine;
mod failure;

pub use coordinator::{Completion, Coordinator, DrainMode};
pub use engine::{RunState, RunStateHandle, TestOutcome, TestRunner};
