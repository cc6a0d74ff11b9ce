//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pagewright: run the dashboard page checks against a real browser
#[derive(Parser, Debug)]
#[command(name = "pagewright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headed: bool,

    /// Disable the chromium sandbox (containers/CI)
    #[arg(long, global = true)]
    pub no_sandbox: bool,

    /// Path to the chromium binary
    #[arg(long, global = true, value_name = "PATH")]
    pub chromium: Option<PathBuf>,

    /// Application base URL [default: $PAGEWRIGHT_BASE_URL or the hosted dashboard]
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Wait timeout in milliseconds [default: $PAGEWRIGHT_TIMEOUT_MS or 30000]
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with $TEST_EMAIL / $TEST_PASSWORD
    Login,

    /// Log in, open the compliance reports and verify them
    Compliance(ComplianceArgs),

    /// Print the resolved configuration (password omitted)
    Config,
}

/// Arguments for the compliance command
#[derive(Parser, Debug, Default)]
pub struct ComplianceArgs {
    /// Write a screenshot of the reports page to this file
    #[arg(long, value_name = "FILE")]
    pub screenshot: Option<PathBuf>,

    /// Also open and close the disclaimer modal
    #[arg(long)]
    pub disclaimer: bool,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Log format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}
