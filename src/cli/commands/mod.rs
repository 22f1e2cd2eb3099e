//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`].

pub mod dispatcher;
pub mod list;
pub mod run;
pub mod validate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use list::ListStepsCommand;
pub use run::RunCommand;
pub use validate::ValidateCommand;
