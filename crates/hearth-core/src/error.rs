//! Core error types shared across the Hearth workspace.
//!
//! Subsystem crates define their own error enums; this module holds the
//! configuration error (the only error class that aborts a run before any
//! task starts) and the small central error used by core types.

use thiserror::Error;

/// Central error type for core operations.
#[derive(Error, Debug)]
pub enum HearthError {
    /// Configuration errors (file loading, parsing, missing secrets)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
///
/// Any of these raised at startup is fatal: the orchestrator refuses to
/// launch tasks against a partially configured environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// A required secret is absent from both config file and environment
    #[error("missing required setting `{name}` (set it in config.toml or via {env_var})")]
    MissingSecret {
        /// Setting name as it appears in the config file
        name: String,
        /// Environment variable that can supply it
        env_var: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `HearthError`.
pub type Result<T> = std::result::Result<T, HearthError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
