//! Pagewright CLI: dashboard checks in a real browser
//!
//! ## Usage
//!
//! ```bash
//! pagewright login                                  # Log in only
//! pagewright compliance --screenshot reports.png    # Full reports check
//! pagewright config                                 # Show resolved settings
//! ```

use clap::Parser;
use pagewright_cli::{
    runner, Cli, CliConfig, CliResult, ColorChoice, Commands, Reporter, Verbosity,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(&config);

    let session_config = runner::session_config(cli.base_url.as_deref(), cli.timeout_ms, |key| {
        std::env::var(key).ok()
    })?;
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match cli.command {
        Commands::Config => {
            reporter.raw(&runner::render_config(&session_config)?);
            Ok(())
        }
        Commands::Login | Commands::Compliance(_) => run_in_browser(&cli, session_config, &reporter),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(ColorChoice::from(cli.color))
        .with_log_format(cli.log_format)
}

/// Log to stderr. `RUST_LOG` wins over `-v`/`-q`.
fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.with_ansi(config.color.should_color()).init();
    }
}

#[cfg(feature = "browser")]
fn run_in_browser(
    cli: &Cli,
    session_config: pagewright::SessionConfig,
    reporter: &Reporter,
) -> CliResult<()> {
    use pagewright::{ChromiumDriver, Driver, Session};
    use pagewright_cli::CliError;
    use std::sync::Arc;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create runtime: {e}")))?;

    rt.block_on(async {
        let driver = Arc::new(ChromiumDriver::launch(&runner::browser_config(cli)).await?);
        let session = Session::new(Arc::clone(&driver) as Arc<dyn Driver>, session_config)?;

        let outcome = match &cli.command {
            Commands::Login => runner::run_login(&session, reporter).await.map(|_| ()),
            Commands::Compliance(args) => runner::run_compliance(&session, args, reporter).await,
            Commands::Config => Ok(()),
        };

        drop(session);
        match Arc::try_unwrap(driver) {
            Ok(driver) => {
                if let Err(e) = driver.close().await {
                    tracing::warn!(error = %e, "browser did not close cleanly");
                }
            }
            Err(_) => tracing::warn!("browser still referenced at shutdown"),
        }
        outcome
    })
}

#[cfg(not(feature = "browser"))]
fn run_in_browser(
    _cli: &Cli,
    _session_config: pagewright::SessionConfig,
    _reporter: &Reporter,
) -> CliResult<()> {
    Err(pagewright_cli::CliError::config(
        "browser support not enabled. Rebuild with --features browser",
    ))
}
