//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Stagehand - staged integration test runner.
#[derive(Debug, Parser)]
#[command(name = "stagehand")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a test case file
    Run(RunArgs),

    /// Load and validate a test case file without running it
    Validate(ValidateArgs),

    /// List registered steps, validators and context loaders
    ListSteps,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Test case file (YAML)
    pub file: PathBuf,

    /// Give up on concurrent steps after this many milliseconds
    #[arg(long, env = "STAGEHAND_DRAIN_TIMEOUT_MS")]
    pub drain_timeout_ms: Option<u64>,

    /// Wait for every concurrent step even after one fails
    #[arg(long)]
    pub wait_for_all: bool,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ValidateArgs {
    /// Test case file (YAML)
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_overrides() {
        let cli = Cli::parse_from([
            "stagehand",
            "run",
            "case.yml",
            "--drain-timeout-ms",
            "500",
            "--wait-for-all",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.file, PathBuf::from("case.yml"));
                assert_eq!(args.drain_timeout_ms, Some(500));
                assert!(args.wait_for_all);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["stagehand", "validate", "case.yml", "--debug"]);
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Validate(_)));
    }

    #[test]
    fn parses_list_steps() {
        let cli = Cli::parse_from(["stagehand", "list-steps"]);
        assert!(matches!(cli.command, Commands::ListSteps));
    }

    #[test]
    fn run_requires_file() {
        assert!(Cli::try_parse_from(["stagehand", "run"]).is_err());
    }
}
