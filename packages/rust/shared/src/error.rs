//! Error types for pepsum.
//!
//! Library crates use [`PepsumError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Failure policy per external call site:
//! - LLM completion calls: transport and parse failures are fatal, no retry.
//! - PEP page fetches: a non-2xx status is a soft failure (empty content),
//!   but network-level failures are fatal.

use std::path::PathBuf;

/// Top-level error type for all pepsum operations.
#[derive(Debug, thiserror::Error)]
pub enum PepsumError {
    /// Required API key environment variable is absent or empty.
    /// Detected before any network activity.
    #[error("missing credential: set the {var} environment variable with your OpenAI API key")]
    Credential { var: String },

    /// Configuration loading, validation, or input parsing error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network-layer failure (DNS, connect, timeout, non-2xx from the LLM
    /// endpoint) during an outbound request.
    #[error("transport error: {0}")]
    Transport(String),

    /// The LLM response body is not valid JSON, or is valid JSON of the
    /// wrong top-level shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PepsumError>;

impl PepsumError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a credential error naming the missing env var.
    pub fn credential(var: impl Into<String>) -> Self {
        Self::Credential { var: var.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
