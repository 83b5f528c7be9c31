//! Configuration management for Hearth.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Secrets (store service key, portal
//! credentials) are normally supplied through the environment so the config
//! file can be committed without them.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// Loaded from `~/.config/hearth/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Record store connection settings
    pub store: StoreConfig,
    /// Per-portal endpoints and credentials
    pub portals: PortalsConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Completion detector settings
    pub detector: DetectorConfig,
    /// Orchestrator retry/concurrency settings
    pub orchestrator: OrchestratorConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides applied.
    ///
    /// Supported variables:
    /// - `HEARTH_STORE_URL`: record store base URL
    /// - `HEARTH_STORE_SERVICE_KEY`: record store service key
    /// - `HEARTH_PORTAL_EMAIL` / `HEARTH_PORTAL_PASSWORD`: valuation portal login
    /// - `HEARTH_HEADLESS`: browser headless mode (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides to an already-loaded configuration.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("HEARTH_STORE_URL") {
            self.store.url = val;
            tracing::debug!("Override store.url from env");
        }
        if let Ok(val) = std::env::var("HEARTH_STORE_SERVICE_KEY") {
            self.store.service_key = val;
            tracing::debug!("Override store.service_key from env");
        }
        if let Ok(val) = std::env::var("HEARTH_PORTAL_EMAIL") {
            self.portals.valuation.email = val;
            tracing::debug!("Override portals.valuation.email from env");
        }
        if let Ok(val) = std::env::var("HEARTH_PORTAL_PASSWORD") {
            self.portals.valuation.password = val;
            tracing::debug!("Override portals.valuation.password from env");
        }
        if let Ok(val) = std::env::var("HEARTH_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }
    }

    /// Validate that every setting required before task launch is present.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingSecret` for the first absent required
    /// setting. A failure here aborts the run before any task starts.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.url.is_empty() {
            return Err(ConfigError::MissingSecret {
                name: "store.url".to_string(),
                env_var: "HEARTH_STORE_URL".to_string(),
            });
        }
        if self.store.service_key.is_empty() {
            return Err(ConfigError::MissingSecret {
                name: "store.service_key".to_string(),
                env_var: "HEARTH_STORE_SERVICE_KEY".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "hearth", "hearth").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path (download staging, screenshots).
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "hearth", "hearth").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Record store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the record store API
    pub url: String,
    /// Service key used for both apikey and bearer auth
    #[serde(skip_serializing)]
    pub service_key: String,
    /// Table holding property records
    pub records_table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            records_table: "property_detail".to_string(),
        }
    }
}

/// Per-portal endpoints and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalsConfig {
    /// Registered-offender map portal
    pub offender_map: PortalConfig,
    /// School district boundary map portal
    pub school_district: PortalConfig,
    /// Valuation report portal (credentialed)
    pub valuation: ValuationPortalConfig,
    /// Climate risk portal
    pub climate_risk: PortalConfig,
}

impl Default for PortalsConfig {
    fn default() -> Self {
        Self {
            offender_map: PortalConfig {
                url: String::new(),
                bucket: "offender-maps".to_string(),
            },
            school_district: PortalConfig {
                url: String::new(),
                bucket: "school-district-maps".to_string(),
            },
            valuation: ValuationPortalConfig::default(),
            climate_risk: PortalConfig {
                url: String::new(),
                bucket: "climate-risk-shots".to_string(),
            },
        }
    }
}

/// A simple portal: one entry URL and one artifact bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Portal entry URL
    pub url: String,
    /// Artifact storage bucket for this portal's outputs
    pub bucket: String,
}

/// Valuation portal settings: credentialed login plus download detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationPortalConfig {
    /// Portal entry URL
    pub url: String,
    /// Artifact storage bucket for generated reports
    pub bucket: String,
    /// Login email
    #[serde(skip_serializing)]
    pub email: String,
    /// Login password
    #[serde(skip_serializing)]
    pub password: String,
    /// Filename prefix the portal gives generated reports
    pub report_prefix: String,
}

impl Default for ValuationPortalConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            bucket: "valuation-reports".to_string(),
            email: String::new(),
            password: String::new(),
            report_prefix: "Report-".to_string(),
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// Per-step timeout in seconds (locate, type, click)
    pub step_timeout_secs: u64,
    /// Directory downloads land in
    pub download_dir: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 60,
            step_timeout_secs: 30,
            download_dir: None,
        }
    }
}

/// Completion detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Polling cadence in milliseconds
    pub poll_interval_ms: u64,
    /// Overall detection timeout in seconds
    pub timeout_secs: u64,
    /// Settle grace after a detected signal, in milliseconds
    pub settle_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
            timeout_secs: 300,
            settle_ms: 3000,
        }
    }
}

/// Orchestrator retry and concurrency settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Total attempts per task (first try included)
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Maximum tasks driven concurrently
    pub max_concurrent_tasks: usize,
    /// Resource sampler cadence in milliseconds
    pub sample_interval_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_ms: 2000,
            max_concurrent_tasks: 4,
            sample_interval_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.store.records_table, "property_detail");
        assert_eq!(config.orchestrator.max_attempts, 5);
        assert_eq!(config.orchestrator.retry_delay_ms, 2000);
        assert_eq!(config.detector.poll_interval_ms, 5000);
        assert!(config.browser.headless);
        assert_eq!(config.portals.offender_map.bucket, "offender-maps");
        assert_eq!(config.portals.valuation.bucket, "valuation-reports");
    }

    #[test]
    fn test_validate_missing_secrets() {
        let config = AppConfig::default();
        let err = config.validate().expect_err("empty store url must fail");
        assert!(matches!(err, ConfigError::MissingSecret { .. }));

        let mut config = AppConfig::default();
        config.store.url = "https://store.example.com".to_string();
        let err = config.validate().expect_err("empty service key must fail");
        assert!(err.to_string().contains("service_key"));

        config.store.service_key = "key".to_string();
        config.validate().expect("complete store config validates");
    }

    #[test]
    fn test_config_serialization_skips_secrets() {
        let mut config = AppConfig::default();
        config.store.service_key = "super-secret".to_string();
        config.portals.valuation.password = "hunter2".to_string();

        let toml_str = toml::to_string_pretty(&config).expect("serialize config");
        assert!(!toml_str.contains("super-secret"));
        assert!(!toml_str.contains("hunter2"));
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[orchestrator]"));
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.store.url = "https://store.example.com".to_string();
        config.portals.climate_risk.url = "https://risk.example.com".to_string();

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: AppConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.store.url, "https://store.example.com");
        assert_eq!(loaded.portals.climate_risk.url, "https://risk.example.com");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[store]
url = "https://store.example.com"

[orchestrator]
max_attempts = 3
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.store.url, "https://store.example.com");
        assert_eq!(config.orchestrator.max_attempts, 3);
        // These should be defaults
        assert_eq!(config.orchestrator.retry_delay_ms, 2000);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        std::env::set_var("HEARTH_STORE_URL", "https://env.example.com");
        std::env::set_var("HEARTH_HEADLESS", "false");

        config.apply_env();
        assert_eq!(config.store.url, "https://env.example.com");
        assert!(!config.browser.headless);

        std::env::remove_var("HEARTH_STORE_URL");
        std::env::remove_var("HEARTH_HEADLESS");
    }
}
