//! Application-level configuration loading: period lengths, default team names and
//! startup behaviour.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::scoreboard::{DEFAULT_OVERTIME_SECS, DEFAULT_PERIOD_SECS};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "COURTSIDE_BACK_CONFIG_PATH";
const DEFAULT_HOME_NAME: &str = "Equipo A";
const DEFAULT_AWAY_NAME: &str = "Equipo B";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Length of a regulation period, in seconds.
    pub period_duration_secs: u32,
    /// Length of an overtime period, in seconds.
    pub overtime_duration_secs: u32,
    /// Home team name used when no scoreboard was ever persisted.
    pub home_team_name: String,
    /// Away team name used when no scoreboard was ever persisted.
    pub away_team_name: String,
    /// Run a hard reset of the scoreboard once it is loaded at startup.
    pub reset_on_startup: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        period_secs = app_config.period_duration_secs,
                        overtime_secs = app_config.overtime_duration_secs,
                        "loaded scoreboard settings from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            period_duration_secs: DEFAULT_PERIOD_SECS,
            overtime_duration_secs: DEFAULT_OVERTIME_SECS,
            home_team_name: DEFAULT_HOME_NAME.into(),
            away_team_name: DEFAULT_AWAY_NAME.into(),
            reset_on_startup: true,
        }
    }
}

/// JSON representation of the configuration file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    period_duration_secs: Option<u32>,
    overtime_duration_secs: Option<u32>,
    home_team_name: Option<String>,
    away_team_name: Option<String>,
    reset_on_startup: Option<bool>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            period_duration_secs: positive_or(value.period_duration_secs, defaults.period_duration_secs),
            overtime_duration_secs: positive_or(
                value.overtime_duration_secs,
                defaults.overtime_duration_secs,
            ),
            home_team_name: name_or(value.home_team_name, defaults.home_team_name),
            away_team_name: name_or(value.away_team_name, defaults.away_team_name),
            reset_on_startup: value.reset_on_startup.unwrap_or(defaults.reset_on_startup),
        }
    }
}

fn positive_or(value: Option<u32>, fallback: u32) -> u32 {
    match value {
        Some(0) => {
            warn!(fallback, "ignoring zero period length in config");
            fallback
        }
        Some(secs) => secs,
        None => fallback,
    }
}

fn name_or(value: Option<String>, fallback: String) -> String {
    value
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_given_keys() {
        let config = AppConfig::from_json(
            r#"{"period_duration_secs": 720, "home_team_name": "Toros", "reset_on_startup": false}"#,
        )
        .unwrap();

        assert_eq!(config.period_duration_secs, 720);
        assert_eq!(config.overtime_duration_secs, DEFAULT_OVERTIME_SECS);
        assert_eq!(config.home_team_name, "Toros");
        assert_eq!(config.away_team_name, DEFAULT_AWAY_NAME);
        assert!(!config.reset_on_startup);
    }

    #[test]
    fn startup_reset_is_on_unless_disabled() {
        assert!(AppConfig::default().reset_on_startup);
        assert!(AppConfig::from_json("{}").unwrap().reset_on_startup);
    }

    #[test]
    fn zero_durations_and_blank_names_fall_back() {
        let config = AppConfig::from_json(
            r#"{"period_duration_secs": 0, "away_team_name": "   "}"#,
        )
        .unwrap();

        assert_eq!(config.period_duration_secs, DEFAULT_PERIOD_SECS);
        assert_eq!(config.away_team_name, DEFAULT_AWAY_NAME);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("[1, 2").is_err());
    }
}
