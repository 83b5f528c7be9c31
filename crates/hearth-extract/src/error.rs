//! Error types for text recognition and extraction.

use thiserror::Error;

/// Errors from the text-recognition capability.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The recognition engine failed or produced no output
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// The recognition engine binary is unavailable
    #[error("recognition engine not available: {0}")]
    EngineUnavailable(String),

    /// I/O error reading the source image
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `ExtractError`.
pub type Result<T> = std::result::Result<T, ExtractError>;
