//! Error types for the harvester.
//!
//! Uses the dual-error pattern: `HarvesterError` for library consumers
//! with detailed error context.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// A document is not well-formed XML. Fatal for the whole run.
    #[error("XML error: {message} at line {line}")]
    MalformedDocument { message: String, line: u64 },

    /// The control document did not name any usable mirror.
    #[error("No catalog mirror could be resolved from {control_url}")]
    NoMirrorResolved { control_url: String },

    /// Location is empty or uses an unsupported scheme.
    #[error("Invalid document location: '{0}'. Expected an http(s) URL or a file path")]
    InvalidLocation(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to download the control document.
    #[error("Failed to download control document {url}: {source}")]
    ControlDownload {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Failed to download the catalog document.
    #[error("Failed to download catalog {url}: {source}")]
    CatalogDownload {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// All retry attempts for a transient failure were used up.
    #[error("Giving up after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
