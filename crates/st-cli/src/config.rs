//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use st_core::{Goal, TimerConfig, ValidationError, default_goals};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Length of a pomodoro in minutes.
    pub pomodoro_minutes: u32,

    /// Goals shown by `st goals`.
    pub goals: Vec<Goal>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("st.db"),
            pomodoro_minutes: 25,
            goals: default_goals(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ST_*)
        figment = figment.merge(Env::prefixed("ST_"));

        figment.extract()
    }

    pub fn timer_config(&self) -> Result<TimerConfig, ValidationError> {
        TimerConfig::from_minutes(self.pomodoro_minutes)
    }
}

/// Returns the platform-specific config directory for st.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("st"))
}

/// Returns the platform-specific data directory for st.
///
/// On Linux: `~/.local/share/st`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("st"))
}
