//! Error types for completion detection.

use thiserror::Error;

/// Errors from the completion detector.
#[derive(Error, Debug)]
pub enum DetectError {
    /// No signal source was satisfied within the detection window
    #[error("no completion signal within {waited_secs}s")]
    Timeout {
        /// Seconds waited before giving up
        waited_secs: u64,
    },

    /// A signal source failed in a way that cannot recover
    #[error("signal source failed: {0}")]
    Source(String),

    /// Browser-backed source failure
    #[error(transparent)]
    Browser(#[from] hearth_browser::BrowserError),

    /// Filesystem source failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `DetectError`.
pub type Result<T> = std::result::Result<T, DetectError>;
