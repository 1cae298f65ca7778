//! TOML-based application configuration.
//!
//! Stores reminder cadence and worker settings plus the notification
//! sink (SMTP relay or webhook endpoint) configuration.
//!
//! Configuration is stored at `~/.config/daybook/config.toml`.

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::reminder::ReminderConfig;

/// Reminder engine configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Minutes between scheduler ticks.
    #[serde(default = "default_cadence_minutes")]
    pub cadence_minutes: u64,
    /// Upper bound on users processed concurrently within one tick.
    #[serde(default = "default_max_concurrent_users")]
    pub max_concurrent_users: usize,
    /// Timeout for one user's store reads (seconds).
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
    /// Timeout for one notification dispatch (seconds).
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl ReminderSettings {
    /// Convert to the engine's runtime configuration.
    pub fn to_engine_config(&self) -> ReminderConfig {
        ReminderConfig {
            cadence_minutes: self.cadence_minutes,
            max_concurrent_users: self.max_concurrent_users,
            store_timeout_secs: self.store_timeout_secs,
            send_timeout_secs: self.send_timeout_secs,
        }
    }
}

/// Which notification sink to dispatch through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Smtp,
    Webhook,
}

/// Notification sink configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub sink: SinkKind,
    /// SMTP relay host.
    #[serde(default = "default_mail_host")]
    pub host: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Sender address on outgoing mail.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Endpoint for the webhook sink.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/daybook/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub reminder: ReminderSettings,
    #[serde(default)]
    pub mail: MailConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_cadence_minutes() -> u64 {
    60
}
fn default_max_concurrent_users() -> usize {
    8
}
fn default_store_timeout_secs() -> u64 {
    10
}
fn default_send_timeout_secs() -> u64 {
    30
}
fn default_mail_host() -> String {
    "localhost".into()
}
fn default_mail_port() -> u16 {
    587
}
fn default_from_address() -> String {
    "daybook@localhost".into()
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cadence_minutes: default_cadence_minutes(),
            max_concurrent_users: default_max_concurrent_users(),
            store_timeout_secs: default_store_timeout_secs(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::Smtp,
            host: default_mail_host(),
            port: default_mail_port(),
            username: None,
            password: None,
            from_address: default_from_address(),
            webhook_url: None,
        }
    }
}

impl Config {
    fn path() -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
