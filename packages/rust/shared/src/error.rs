//! Error types for sitefetch.
//!
//! Library crates use [`SiteFetchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all sitefetch operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteFetchError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP transport error during crawl or sitemap discovery.
    #[error("network error: {0}")]
    Network(String),

    /// A response was received but the fetch policy refused it.
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    /// HTML, selector, or XML parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (malformed seed URL and the like).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// HTML-to-Markdown conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Output serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Why the fetch policy abandoned a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The server answered with a non-2xx status.
    #[error("{url}: HTTP {status} {status_text}")]
    Status {
        url: String,
        status: u16,
        status_text: String,
    },

    /// The response is not an HTML document.
    #[error("{url}: not a HTML page (content-type: {content_type:?})")]
    NotHtml {
        url: String,
        content_type: Option<String>,
    },

    /// Redirected to another host while cross-domain redirects are disabled.
    #[error("redirected from {from} to {to}")]
    CrossDomainRedirect { from: String, to: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteFetchError>;

impl SiteFetchError {
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
