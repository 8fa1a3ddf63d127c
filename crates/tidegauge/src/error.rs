//! Error types for the tidegauge library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tidegauge operations.
#[derive(Debug, Error)]
pub enum TideError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raw bytes could not be decoded under any attempted encoding.
    #[error("Could not decode input as any of: {}", encodings.join(", "))]
    Decode { encodings: Vec<String> },

    /// Empty input or no data rows.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Every measurement rule was exhausted.
    #[error("No measurement column among [{}]", columns.join(", "))]
    NoMeasurementColumn { columns: Vec<String> },

    /// Columns were resolved but no row survived filtering.
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// Synthesis parameters out of their valid domain.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Remote dataset retrieval failed.
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(#[from] RemoteFetchError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TideError {
    /// Whether the loader may recover from this error by synthesizing a series.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TideError::Csv(_)
                | TideError::Decode { .. }
                | TideError::EmptyData(_)
                | TideError::NoMeasurementColumn { .. }
                | TideError::EmptySeries(_)
                | TideError::RemoteFetch(_)
        )
    }
}

/// Failure at the remote fetch boundary.
#[derive(Debug, Clone, Error)]
pub enum RemoteFetchError {
    #[error("request to '{url}' timed out")]
    Timeout { url: String },

    #[error("'{url}' answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("'{url}' returned an empty body")]
    EmptyBody { url: String },

    #[error("request to '{url}' failed: {message}")]
    Transport { url: String, message: String },

    #[error("no candidate URLs configured")]
    NoCandidates,

    #[error("all {} candidate URLs failed", .0.len())]
    AllCandidatesFailed(Vec<RemoteFetchError>),
}

/// Result type alias for tidegauge operations.
pub type Result<T> = std::result::Result<T, TideError>;
