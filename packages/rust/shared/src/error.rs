//! Error types for JobCrawl.
//!
//! Library crates use [`JobCrawlError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all JobCrawl operations.
#[derive(Debug, thiserror::Error)]
pub enum JobCrawlError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while loading a page.
    #[error("network error: {0}")]
    Network(String),

    /// A page or detail load did not complete in time.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failure while serializing results for export.
    #[error("export error: {0}")]
    Export(String),

    /// Invalid user input, such as a run with nothing to search.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JobCrawlError>;

impl JobCrawlError {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = JobCrawlError::config("results_per_query must be at least 1");
        assert_eq!(
            err.to_string(),
            "config error: results_per_query must be at least 1"
        );

        let err = JobCrawlError::validation("no search queries configured");
        assert_eq!(err.to_string(), "validation error: no search queries configured");

        let err = JobCrawlError::Timeout("https://www.indeed.com/jobs?q=x".into());
        assert!(err.to_string().starts_with("timeout:"));
    }
}
