//! Hearth Core - Foundation crate for the Hearth enrichment orchestrator.
//!
//! This crate provides shared types, error handling, and configuration
//! management that all other Hearth crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes and enums (`RecordId`, `DataDomain`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use hearth_core::{AppConfig, DataDomain};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! assert_eq!(DataDomain::FloodFactor.data_column(), "flood_factor_data");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, DetectorConfig, OrchestratorConfig, PortalConfig, PortalsConfig,
    StoreConfig, ValuationPortalConfig,
};
pub use error::{ConfigError, ConfigResult, HearthError, Result};
pub use types::{CollectionStatus, DataDomain, PropertyRow, RecordId, Timestamp};
