//! Step-by-step console output

use console::{style, StyledObject, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Pass,
    Fail,
    Info,
}

impl Mark {
    const fn plain(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Info => "INFO",
        }
    }

    fn styled(self) -> StyledObject<&'static str> {
        match self {
            Self::Pass => style("✓").green().bold(),
            Self::Fail => style("✗").red().bold(),
            Self::Info => style("ℹ").blue().bold(),
        }
    }
}

/// Prints one line per check to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Only failures and raw output are printed
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a reporter writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    fn mark(&self, mark: Mark, message: &str) {
        if self.quiet && mark != Mark::Fail {
            return;
        }
        let prefix = if self.use_color {
            mark.styled().to_string()
        } else {
            mark.plain().to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// A check passed
    pub fn success(&self, message: &str) {
        self.mark(Mark::Pass, message);
    }

    /// A check failed; printed even when quiet
    pub fn failure(&self, message: &str) {
        self.mark(Mark::Fail, message);
    }

    /// Extra detail about a passing run
    pub fn info(&self, message: &str) {
        self.mark(Mark::Info, message);
    }

    /// Section title
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let line = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        let _ = self.term.write_line(&line);
    }

    /// Unprefixed output, e.g. JSON for `pagewright config`
    pub fn raw(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}
