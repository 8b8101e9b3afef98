//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `thingkitd.toml` in the working directory, or at the path in
//! `THINGKIT_CONFIG`. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use serde::Deserialize;

const DEFAULT_PATH: &str = "thingkitd.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Which device types to bring online.
    pub devices: DevicesConfig,
    /// Console hub settings.
    pub hub: HubConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Device selection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    /// Registered device type names to instantiate at startup, in order.
    pub enabled: Vec<String>,
}

/// Console hub behaviour.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Handle requests concurrently. Invocations on the same thing are still
    /// serialized; this only lets different things, and reads, overlap.
    pub concurrent: bool,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("THINGKIT_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(val) = var("THINGKIT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("THINGKIT_DEVICES") {
            self.devices.enabled = val.split(',').map(|name| name.trim().to_string()).collect();
        }
        if let Some(val) = var("THINGKIT_HUB_CONCURRENT") {
            self.hub.concurrent = match val.trim() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(ConfigError::Validation(format!(
                        "THINGKIT_HUB_CONCURRENT must be a boolean, got {other:?}"
                    )));
                }
            };
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.enabled.is_empty() {
            return Err(ConfigError::Validation(
                "at least one device type must be enabled".to_string(),
            ));
        }
        if self.devices.enabled.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "device type names must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "thingkitd=info,thingkit=info".to_string(),
        }
    }
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["Tank".to_string()],
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { concurrent: true }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
