//! Pagewright CLI library
//!
//! Argument parsing, console output and the check sequences behind the
//! `pagewright` binary. The sequences take any [`pagewright::Session`], so
//! they run against the mock driver in tests and chromium in the binary.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;
pub mod runner;

pub use commands::{Cli, ColorArg, Commands, ComplianceArgs, LogFormatArg};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult, StepExt};
pub use output::Reporter;
