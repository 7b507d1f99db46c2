//! Custom error types for rustscival.
//!
//! This module defines all error types used throughout the crate.
//! All functions return `Result<T, ScivalError>` instead of using `unwrap()`.

use crate::endpoint::EndpointKind;
use thiserror::Error;

/// Main error type for rustscival operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum ScivalError {
    /// Unknown export endpoint name
    #[error("Invalid endpoint: {0} (expected 'search' or 'related_topics')")]
    InvalidEndpoint(String),

    /// Network/HTTP request error, including timeouts and non-2xx statuses
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The export call succeeded but did not return a file attachment
    #[error(
        "Unexpected response (HTTP {status}): expected a CSV attachment, got Content-Disposition {content_disposition:?}; the session cookie may have expired"
    )]
    UnexpectedResponse {
        /// HTTP status of the response
        status: u16,
        /// Raw Content-Disposition header, if any
        content_disposition: Option<String>,
    },

    /// Assembled table does not hold the expected number of rows
    #[error("Row count mismatch for {endpoint}: expected {expected} rows, got {actual}")]
    RowCountMismatch {
        endpoint: EndpointKind,
        expected: usize,
        actual: usize,
    },

    /// A metadata field needed to drive the retrieval was not found
    #[error("Missing metadata for {endpoint}: {field}")]
    MissingMetadata {
        endpoint: EndpointKind,
        field: &'static str,
    },

    /// Pattern construction or text parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Response body is not valid UTF-8
    #[error("Decode error: {0}")]
    Decode(String),

    /// CSV deserialization/serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `ScivalError`
pub type Result<T> = std::result::Result<T, ScivalError>;

/// Extension trait for turning absent metadata fields into errors
pub trait OptionExt<T> {
    /// Convert Option to Result with a missing-metadata error
    fn ok_or_missing(self, endpoint: EndpointKind, field: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing(self, endpoint: EndpointKind, field: &'static str) -> Result<T> {
        self.ok_or(ScivalError::MissingMetadata { endpoint, field })
    }
}
