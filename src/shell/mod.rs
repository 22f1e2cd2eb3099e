//! Shell command execution for process steps.

pub mod command;

pub use command::{execute, CommandOptions, CommandResult};
