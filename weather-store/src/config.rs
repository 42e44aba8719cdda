use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    model::Coordinates,
    provider::openweather::{DEFAULT_BASE_URL, DEFAULT_UNITS, OpenWeatherProvider},
    refresh::DEFAULT_REFRESH_INTERVAL,
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Fixed position used in place of a device location fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<HomeLocation> for Coordinates {
    fn from(home: HomeLocation) -> Self {
        Coordinates::new(home.latitude, home.longitude)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// refresh_interval_secs = 300
///
/// [home]
/// latitude = 6.5244
/// longitude = 3.3792
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub units: String,
    pub timeout_secs: u64,
    pub refresh_interval_secs: u64,
    pub home: Option<HomeLocation>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: DEFAULT_UNITS.to_string(),
            timeout_secs: 30,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            home: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// The API key from the environment takes precedence over the stored one.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_override(std::env::var(API_KEY_ENV).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-store", "weather-watch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn apply_env_override(&mut self, env_key: Option<String>) {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(home) = self.home {
            if !Coordinates::from(home).is_valid() {
                return Err(anyhow!(
                    "Invalid home location ({}, {}): latitude must be -90..=90, longitude -180..=180",
                    home.latitude,
                    home.longitude
                ));
            }
        }

        if self.refresh_interval_secs == 0 {
            return Err(anyhow!("refresh_interval_secs must be greater than zero"));
        }

        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }

        Ok(())
    }

    /// Returns the API key or an error with a hint on how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather-watch configure` or set {API_KEY_ENV}."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn home_coordinates(&self) -> Option<Coordinates> {
        self.home.map(Coordinates::from)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Construct the OpenWeather client described by this config.
    pub fn provider(&self) -> Result<OpenWeatherProvider> {
        let api_key = self.api_key()?;

        OpenWeatherProvider::with_settings(
            api_key.to_owned(),
            self.base_url.as_str(),
            self.units.as_str(),
            self.timeout(),
        )
        .context("Failed to build OpenWeather client")
    }
}
