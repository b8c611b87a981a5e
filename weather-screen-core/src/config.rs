use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::PathBuf, sync::Arc};
use tracing::{debug, info};

use crate::{
    OpenWeatherClient, ScreenLoader, Units,
    api::{DEFAULT_BASE_URL, DEFAULT_FORECAST_DAYS},
    loader::ReactivationPolicy,
};

pub const DEFAULT_LOCATION: &str = "Kochi";
/// Upper bound the daily forecast endpoint accepts for `cnt`.
pub const MAX_FORECAST_DAYS: u8 = 16;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// location = "Kochi"
/// units = "metric"
/// reactivation = "cancel-previous"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub location: String,
    pub units: Units,
    pub forecast_days: u8,
    pub base_url: String,
    pub reactivation: ReactivationPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            location: DEFAULT_LOCATION.to_string(),
            units: Units::default(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            base_url: DEFAULT_BASE_URL.to_string(),
            reactivation: ReactivationPolicy::default(),
        }
    }
}

impl Config {
    /// Reads the stored settings. A missing file is a first run and yields the
    /// defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Could not read screen settings at {}", path.display())
                });
            }
        };

        Self::from_toml(&contents)
            .with_context(|| format!("Screen settings at {} are unusable", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .context("Settings are not valid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks what the field types alone do not: the day count the forecast
    /// endpoint accepts and a non-blank location.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast_days) {
            bail!(
                "forecast_days must be between 1 and {MAX_FORECAST_DAYS}, got {}",
                self.forecast_days
            );
        }
        if self.location.trim().is_empty() {
            bail!("location must name a city, e.g. \"{DEFAULT_LOCATION}\"");
        }
        Ok(())
    }

    /// Writes the settings after validating them. Returns where they went.
    pub fn save(&self) -> Result<PathBuf> {
        self.validate()?;

        let path = Self::config_file_path()?;
        let text = toml::to_string_pretty(self)
            .context("Settings could not be encoded")?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Could not create {}", dir.display()))?;
        }
        fs::write(&path, text)
            .with_context(|| format!("Could not store screen settings at {}", path.display()))?;

        info!(
            path = %path.display(),
            units = %self.units,
            reactivation = ?self.reactivation,
            "screen settings saved"
        );
        Ok(path)
    }

    /// `config.toml` in the per-user settings directory of the platform.
    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "weather-screen", "weather-screen")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .context("No home directory to keep screen settings in")
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather-screen configure` and enter your API key."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    /// Build the API client described by this config.
    pub fn client(&self) -> Result<OpenWeatherClient> {
        Ok(OpenWeatherClient::new(self.api_key()?.to_owned())
            .with_base_url(self.base_url.as_str())
            .with_units(self.units)
            .with_days(self.forecast_days))
    }

    /// Build a screen loader backed by the configured client.
    pub fn screen_loader(&self) -> Result<ScreenLoader> {
        let client = self.client()?;
        Ok(ScreenLoader::new(Arc::new(client), self.reactivation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_kochi() {
        let cfg = Config::default();

        assert_eq!(cfg.location, "Kochi");
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.forecast_days, 7);
        assert_eq!(cfg.reactivation, ReactivationPolicy::CancelPrevious);
    }

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `weather-screen configure`"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());

        assert!(cfg.api_key().is_err());
        assert!(cfg.client().is_err());
    }

    #[test]
    fn set_api_key_trims_input() {
        let mut cfg = Config::default();
        cfg.set_api_key("  OPEN_KEY\n".into());

        assert_eq!(cfg.api_key().expect("key must exist"), "OPEN_KEY");
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"
            units = "imperial"
            reactivation = "keep-previous"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.api_key().expect("key must exist"), "KEY");
        assert_eq!(cfg.units, Units::Imperial);
        assert_eq!(cfg.reactivation, ReactivationPolicy::KeepPrevious);
        assert_eq!(cfg.location, DEFAULT_LOCATION);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn unknown_units_are_rejected() {
        assert!(Config::from_toml(r#"units = "kelvin""#).is_err());
    }

    #[test]
    fn zero_forecast_days_are_rejected() {
        let err = Config::from_toml("forecast_days = 0").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("forecast_days must be between 1 and 16"));
    }

    #[test]
    fn forecast_days_above_endpoint_limit_are_rejected() {
        assert!(Config::from_toml("forecast_days = 17").is_err());
        assert!(Config::from_toml("forecast_days = 16").is_ok());
    }

    #[test]
    fn blank_location_is_rejected() {
        let err = Config::from_toml(r#"location = "  ""#).unwrap_err();
        assert!(err.to_string().contains("location must name a city"));
    }

    #[test]
    fn invalid_settings_are_not_saved() {
        let cfg = Config {
            forecast_days: 30,
            ..Config::default()
        };

        let err = cfg.save().unwrap_err();
        assert!(err.to_string().contains("forecast_days"));
    }

    #[test]
    fn screen_loader_uses_configured_policy() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.reactivation = ReactivationPolicy::KeepPrevious;

        let loader = cfg.screen_loader().expect("key is configured");
        assert_eq!(loader.policy(), ReactivationPolicy::KeepPrevious);
    }
}
