//! URL patterns for navigation waits and page identification.
//!
//! Page identity is decided on the path: `https://dashboard.example.com/login`
//! is a login page even though its host contains "dashboard". The `Path*`
//! variants only look at what follows the authority.

use crate::result::{PageError, PageResult};
use std::fmt;

/// Pattern a page URL is matched against
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match against the whole URL (compiled once)
    Regex(regex::Regex),
    /// Regex match against the path, query and fragment only
    Path(regex::Regex),
    /// Path equal to this one or below it
    PathPrefix(String),
    /// Glob pattern over the whole URL, `*` matching any run of characters
    Glob(String),
    /// Match any URL
    Any,
}

fn compile(pattern: &str) -> PageResult<regex::Regex> {
    regex::Regex::new(pattern).map_err(|e| PageError::Config {
        message: format!("invalid URL regex {pattern:?}: {e}"),
    })
}

impl UrlPattern {
    /// Compile a regex matched against the whole URL
    pub fn regex(pattern: &str) -> PageResult<Self> {
        compile(pattern).map(Self::Regex)
    }

    /// Compile a regex matched against the URL path (see [`url_path`])
    pub fn path_regex(pattern: &str) -> PageResult<Self> {
        compile(pattern).map(Self::Path)
    }

    /// Pattern for `path` and anything below it
    #[must_use]
    pub fn path_prefix(path: impl Into<String>) -> Self {
        Self::PathPrefix(path.into())
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern.as_str()),
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(re) => re.is_match(url),
            Self::Path(re) => re.is_match(url_path(url)),
            Self::PathPrefix(prefix) => path_under(url_path(url), prefix),
            Self::Glob(pattern) => glob_matches(pattern, url),
            Self::Any => true,
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "{p}"),
            Self::Prefix(p) => write!(f, "{p}*"),
            Self::Contains(p) => write!(f, "*{p}*"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Path(re) => write!(f, "path /{}/", re.as_str()),
            Self::PathPrefix(p) => write!(f, "path {p}"),
            Self::Glob(p) => write!(f, "{p}"),
            Self::Any => f.write_str("*"),
        }
    }
}

/// Everything after the authority: path, query and fragment.
///
/// `https://host.test/a?b` gives `/a?b`, a bare origin gives `/`. A string
/// without a scheme separator is taken to be a path already.
#[must_use]
pub fn url_path(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return url;
    };
    rest.find(['/', '?', '#']).map_or("/", |at| &rest[at..])
}

fn path_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix).is_some_and(|rest| {
        prefix.ends_with('/') || rest.is_empty() || rest.starts_with(['/', '?', '#'])
    })
}

fn glob_matches(pattern: &str, url: &str) -> bool {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    regex::Regex::new(&format!("^{body}$")).is_ok_and(|re| re.is_match(url))
}
