//! CLI configuration

use crate::commands::{ColorArg, LogFormatArg};

/// How much the CLI prints, from `-q` and `-v`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Failures only
    Quiet,
    /// Step results
    #[default]
    Normal,
    /// Library debug events
    Verbose,
    /// Everything down to trace
    Debug,
}

impl Verbosity {
    /// From the `-q` flag and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Whether step output is suppressed
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn,pagewright=info",
            Self::Verbose => "info,pagewright=debug",
            Self::Debug => "debug,pagewright=trace",
        }
    }
}

/// When to color step output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Force colors
    Always,
    /// Color when stdout supports it
    #[default]
    Auto,
    /// Plain text
    Never,
}

impl ColorChoice {
    /// Resolve against the terminal
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Output settings resolved from the global flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CliConfig {
    /// Step output and log level
    pub verbosity: Verbosity,
    /// Step output coloring
    pub color: ColorChoice,
    /// Emit log events as JSON
    pub json_logs: bool,
}

impl CliConfig {
    /// Normal verbosity, automatic color, text logs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set the log format
    #[must_use]
    pub const fn with_log_format(mut self, format: LogFormatArg) -> Self {
        self.json_logs = matches!(format, LogFormatArg::Json);
        self
    }
}
