//! Runtime configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Everything tunable about the core. All fields have defaults, so a
/// config file only states what it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between scheduler passes over the active games.
    pub tick_interval_secs: u64,
    /// How close a deadline must be before the reminder goes out.
    pub reminder_threshold_secs: u64,
    /// Deadline applied to each new phase, for games that don't carry
    /// their own. `None` means phases wait for a manual trigger.
    pub default_turn_deadline_secs: Option<i64>,
    /// Sweep for deadlines that expired while the process was down, before
    /// the first periodic tick.
    pub startup_process_missed_deadlines: bool,
    /// Tracing filter, e.g. `info` or `entente=debug,sqlx=warn`.
    pub log_level: String,
    /// SQLite connection string.
    pub store_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tick_interval_secs: 30,
            reminder_threshold_secs: 600,
            default_turn_deadline_secs: None,
            startup_process_missed_deadlines: true,
            log_level: "info".to_string(),
            store_url: "sqlite::memory:".to_string(),
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn reminder_threshold(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.reminder_threshold_secs as i64)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
