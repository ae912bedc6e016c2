//! Main application configuration
//!
//! This module defines the configuration structures for the elo-ladder,
//! including environment variable loading, TOML files and validation.

use crate::rating::elo::EloConfig;
use crate::types::INITIAL_RATING;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub rating: EloConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Rating store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON document holding all player records
    pub data_file: PathBuf,
    /// Rating given to players on first reference
    pub initial_rating: f64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "elo-ladder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("elo.json"),
            initial_rating: INITIAL_RATING,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still win
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Storage settings
        if let Ok(data_file) = env::var("ELO_DATA_FILE") {
            self.storage.data_file = PathBuf::from(data_file);
        }
        if let Ok(rating) = env::var("ELO_INITIAL_RATING") {
            self.storage.initial_rating = parse_env("ELO_INITIAL_RATING", &rating)?;
        }

        // Rating settings
        if let Ok(exponent) = env::var("ELO_WIN_EXPONENT") {
            self.rating.win_exponent = parse_env("ELO_WIN_EXPONENT", &exponent)?;
        }
        if let Ok(constant) = env::var("ELO_CHANGE_CONSTANT") {
            self.rating.change_constant = parse_env("ELO_CHANGE_CONSTANT", &constant)?;
        }
        if let Ok(divisor) = env::var("ELO_INCENTIVE_DIVISOR") {
            self.rating.incentive_divisor = parse_env("ELO_INCENTIVE_DIVISOR", &divisor)?;
        }
        if let Ok(threshold) = env::var("ELO_UPSET_THRESHOLD") {
            self.rating.upset_threshold = parse_env("ELO_UPSET_THRESHOLD", &threshold)?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate storage settings
    if config.storage.data_file.as_os_str().is_empty() {
        return Err(anyhow!("Data file path cannot be empty"));
    }
    if !config.storage.initial_rating.is_finite() {
        return Err(anyhow!("Initial rating must be a finite number"));
    }

    config.rating.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.storage.data_file, PathBuf::from("elo.json"));
        assert_eq!(config.storage.initial_rating, 5000.0);
        assert_eq!(config.rating, EloConfig::default());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_rating_settings() {
        let mut config = AppConfig::default();
        config.rating.incentive_divisor = 0.0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.storage.initial_rating = f64::INFINITY;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [storage]
            data_file = "/var/lib/ladder/elo.json"

            [rating]
            upset_threshold = 400.0
            "#,
        )
        .unwrap();

        assert_eq!(
            config.storage.data_file,
            PathBuf::from("/var/lib/ladder/elo.json")
        );
        assert_eq!(config.storage.initial_rating, 5000.0);
        assert_eq!(config.rating.upset_threshold, 400.0);
        assert_eq!(config.rating.change_constant, 0.192);
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
