//! Error types for record store and artifact storage access.

use thiserror::Error;

/// Errors from the external store clients.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store API answered with a non-success status
    #[error("store API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Artifact upload failed; the artifact is not retried with stale bytes
    #[error("artifact upload failed: {0}")]
    Upload(String),

    /// No record row matched any variant of the queried address
    #[error("no record matched address: {address}")]
    NoMatch {
        /// The raw address that failed to match
        address: String,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured store URL is not a valid URL
    #[error("invalid store URL: {0}")]
    InvalidUrl(String),

    /// Generic internal errors
    #[error("internal store error: {0}")]
    Internal(String),
}

/// Result type alias using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
