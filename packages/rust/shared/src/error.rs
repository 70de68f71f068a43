//! Error types for champscout.
//!
//! Library crates use [`ScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all champscout operations.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// The input could not be read as an HTML document at all.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A configured CSS selector failed to compile.
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed user input (e.g. a Riot ID without a tag).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a selector error for the given selector source.
    pub fn selector(selector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the page itself was unreadable.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ScoutError::parse("empty document");
        assert_eq!(err.to_string(), "parse error: empty document");
        assert!(err.is_parse());

        let err = ScoutError::selector("div[", "unexpected end of input");
        assert!(err.to_string().contains("`div[`"));
        assert!(!err.is_parse());
    }
}
