//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! weather-engine.toml file. Every value has a default reproducing the
//! engine's standard heuristics, so a missing or broken file never stops
//! normalization.

use crate::forecast::DaytimeWindow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "weather-engine.toml";

/// Errors from reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialization: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Engine configuration loaded from weather-engine.toml
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Daily aggregation settings
    pub forecast: ForecastConfig,
    /// Moon calendar settings
    pub moon: MoonConfig,
}

/// Daily aggregation settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// First hour of the daytime window used to pick a day's icon
    pub daytime_start_hour: usize,
    /// Last hour (inclusive) of the daytime window
    pub daytime_end_hour: usize,
    /// Number of daily records in the outlook
    pub forecast_days: usize,
    /// Whether today opens the outlook; it is normally shown separately
    pub include_today: bool,
}

/// Moon calendar settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MoonConfig {
    /// How many upcoming major phases to list
    pub upcoming_phases: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            daytime_start_hour: 7,
            daytime_end_hour: 18,
            forecast_days: 6,
            include_today: false,
        }
    }
}

impl Default for MoonConfig {
    fn default() -> Self {
        MoonConfig { upcoming_phases: 4 }
    }
}

impl ForecastConfig {
    pub fn daytime_window(&self) -> DaytimeWindow {
        DaytimeWindow {
            start_hour: self.daytime_start_hour,
            end_hour: self.daytime_end_hour,
        }
    }
}

impl EngineConfig {
    /// Load configuration from weather-engine.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => {
                info!(path = %path.as_ref().display(), "loaded configuration");
                config
            }
            Err(ConfigError::Io(_)) => {
                info!(path = %path.as_ref().display(), "no config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %e,
                    "ignoring config file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Strict variant of [`EngineConfig::load_from_path`].
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str::<EngineConfig>(&contents)?)
    }

    /// Save current configuration as pretty TOML
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}
