use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Store locations (SQLite files)
    #[serde(default)]
    pub stores: StoresConfig,

    /// Weather provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Sync pipeline settings
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Paths of the two persistent stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoresConfig {
    /// SQLite file holding the canonical location rows
    #[serde(default = "default_locations_db")]
    pub locations_db: String,

    /// SQLite file holding the append-only observation log
    #[serde(default = "default_observations_db")]
    pub observations_db: String,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("geoweather")
}

fn default_locations_db() -> String {
    default_data_dir()
        .join("locations.db")
        .to_string_lossy()
        .into_owned()
}

fn default_observations_db() -> String {
    default_data_dir()
        .join("observations.db")
        .to_string_lossy()
        .into_owned()
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            locations_db: default_locations_db(),
            observations_db: default_observations_db(),
        }
    }
}

/// External weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// API key (can also be set via the GEOWEATHER_API_KEY environment variable)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Unit system requested from the provider
    #[serde(default = "default_units")]
    pub units: String,
}

fn default_provider_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            api_key: std::env::var("GEOWEATHER_API_KEY").ok(),
            units: default_units(),
        }
    }
}

impl ProviderConfig {
    /// Returns the effective API key, preferring the config file over the environment.
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("GEOWEATHER_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

/// Sync pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum number of locations processed per run (respects provider rate limits)
    #[serde(default = "default_batch_cap")]
    pub batch_cap: u32,

    /// Worker pool size for concurrent fetches
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Overall deadline for a single run, in seconds (0 disables the deadline)
    #[serde(default = "default_run_deadline_secs")]
    pub run_deadline_secs: u64,

    /// Refresh interval in minutes for scheduled runs
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,
}

fn default_batch_cap() -> u32 {
    100
}

fn default_workers() -> usize {
    5
}

fn default_run_deadline_secs() -> u64 {
    120
}

fn default_refresh_minutes() -> u32 {
    15
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_cap: default_batch_cap(),
            workers: default_workers(),
            run_deadline_secs: default_run_deadline_secs(),
            refresh_minutes: default_refresh_minutes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geoweather");

        Self {
            config_dir,
            stores: StoresConfig::default(),
            provider: ProviderConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating default if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.stores.locations_db.is_empty() {
            result.add_error("stores.locations_db", "Location store path must not be empty");
        }
        if self.stores.observations_db.is_empty() {
            result.add_error(
                "stores.observations_db",
                "Observation store path must not be empty",
            );
        }

        if self.provider.base_url.is_empty() {
            result.add_error("provider.base_url", "Provider base URL must not be empty");
        }
        if self.provider.effective_api_key().is_none() {
            result.add_warning(
                "provider.api_key",
                "No API key configured - weather fetches will fail",
            );
        }

        if self.sync.batch_cap == 0 {
            result.add_error("sync.batch_cap", "Batch cap must be greater than 0");
        }
        if self.sync.workers == 0 {
            result.add_error("sync.workers", "Worker pool size must be greater than 0");
        } else if self.sync.workers > 32 {
            result.add_warning(
                "sync.workers",
                "Worker pool is unusually large (>32) - check provider rate limits",
            );
        }

        if self.sync.run_deadline_secs == 0 {
            result.add_warning("sync.run_deadline_secs", "Run deadline disabled (0 seconds)");
        }

        if self.sync.refresh_minutes == 0 {
            result.add_warning("sync.refresh_minutes", "Scheduled sync disabled (0 minutes)");
        } else if self.sync.refresh_minutes > 1440 {
            result.add_warning(
                "sync.refresh_minutes",
                "Refresh interval is more than 24 hours",
            );
        }

        result
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path, creating parent directories as needed
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("geoweather");

        Ok(config_dir.join("config.toml"))
    }
}
