//! Error types for enrichment tasks.
//!
//! Every variant here is caught at the worker boundary and converted into a
//! structured failure report; nothing propagates past a task's `run`.

use thiserror::Error;

/// Errors a task can hit while executing its flow.
#[derive(Error, Debug)]
pub enum EnrichError {
    /// Session driving failure (element not found, navigation timeout)
    #[error(transparent)]
    Browser(#[from] hearth_browser::BrowserError),

    /// Completion detection failure (usually a detection timeout)
    #[error(transparent)]
    Detect(#[from] hearth_detect::DetectError),

    /// Record store or artifact storage failure
    #[error(transparent)]
    Store(#[from] hearth_store::StoreError),

    /// Text recognition failure
    #[error(transparent)]
    Extract(#[from] hearth_extract::ExtractError),

    /// A task-specific setting the flow cannot run without
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    /// Local file staging failure (request sheets, screenshots, downloads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using `EnrichError`.
pub type Result<T> = std::result::Result<T, EnrichError>;
