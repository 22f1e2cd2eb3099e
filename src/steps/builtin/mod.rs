//! Built-in steps.

pub mod context;
pub mod delay;
pub mod file;
pub mod shell;

pub use context::{ContextAssertStep, ContextIncrementStep, ContextRemoveStep, ContextSetStep};
pub use delay::DelayStep;
pub use file::{FileDeleteStep, FileWriteStep};
pub use shell::ShellStep;
