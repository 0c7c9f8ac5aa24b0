use std::path::Path;
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use upcheck_core::{DEFAULT_COOLDOWN_HOURS, DEFAULT_VERSION_ENDPOINT, ReminderConfig};
use upcheck_platform::AppPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_true")]
    pub check_for_updates: bool,

    #[serde(default = "default_version_endpoint")]
    pub version_endpoint: String,

    /// Version compared against the endpoint. Unset means this build's own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_help_url")]
    pub help_url: String,

    #[serde(default = "default_cooldown_hours")]
    pub reminder_cooldown_hours: u64,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_connectivity_timeout")]
    pub connectivity_timeout_secs: u64,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_true() -> bool {
    true
}

fn default_version_endpoint() -> String {
    DEFAULT_VERSION_ENDPOINT.to_string()
}

fn default_app_name() -> String {
    ReminderConfig::default().app_name
}

fn default_help_url() -> String {
    ReminderConfig::default().help_url
}

fn default_cooldown_hours() -> u64 {
    DEFAULT_COOLDOWN_HOURS.unsigned_abs()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_connectivity_timeout() -> u64 {
    3
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            check_for_updates: true,
            version_endpoint: default_version_endpoint(),
            current_version: None,
            app_name: default_app_name(),
            help_url: default_help_url(),
            reminder_cooldown_hours: default_cooldown_hours(),
            http_timeout_secs: default_http_timeout(),
            connectivity_timeout_secs: default_connectivity_timeout(),
            debug_logging: false,
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        let Ok(paths) = AppPaths::new() else {
            return Self::default();
        };
        Self::load_from_path(&paths.settings_file())
    }

    fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        let paths = AppPaths::new().map_err(std::io::Error::other)?;
        paths.ensure_dirs()?;
        self.save_to_path(&paths.settings_file())
    }

    fn save_to_path(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
    }

    pub fn current_version(&self) -> String {
        self.current_version
            .clone()
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string())
    }

    pub fn reminder_config(&self) -> ReminderConfig {
        let hours = i64::try_from(self.reminder_cooldown_hours).unwrap_or(i64::MAX);
        ReminderConfig {
            cooldown: TimeDelta::try_hours(hours).unwrap_or(TimeDelta::MAX),
            app_name: self.app_name.clone(),
            help_url: self.help_url.clone(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn connectivity_timeout(&self) -> Duration {
        Duration::from_secs(self.connectivity_timeout_secs)
    }
}
