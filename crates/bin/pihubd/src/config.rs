//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `pihub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values. The loaded [`Config`] is built once at start
//! and handed to constructors; nothing else reads the environment.
//!
//! A malformed override or an out-of-range value is recorded against its
//! [`Section`] instead of failing the load. Each binary checks only the
//! sections it uses, so a bad `CPU_TEMP_MAX` does not stop `irrigate`.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use pihub_adapter_host::SensorConfig;
use pihub_adapter_telegram::TelegramConfig;
use pihub_app::services::irrigation_service::DEFAULT_IO_TIMEOUT;
use pihub_app::services::watchdog::DEFAULT_CEILING;
use pihub_domain::chat::ChatId;
use pihub_domain::device::DeviceSettings;
use pihub_domain::error::ConfigurationError;
use pihub_domain::power::PowerState;

/// Default configuration file name.
pub const DEFAULT_PATH: &str = "pihub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram bot settings.
    pub telegram: TelegramConfig,
    /// Smart plug settings.
    pub device: DeviceConfig,
    /// Temperature alert settings.
    pub watchdog: WatchdogConfig,
    /// Host sensor sources.
    pub sensor: SensorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    #[serde(skip)]
    rejected: Vec<(Section, ConfigurationError)>,
}

/// Groups of settings that fail independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Telegram,
    Device,
    Watchdog,
}

/// Smart plug configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Address, model and credentials. May be incomplete; a cycle reports
    /// what is missing.
    #[serde(flatten)]
    pub settings: DeviceSettings,
    /// Bound on each connect, read and write, in seconds.
    pub io_timeout_secs: u64,
    /// Starting state of the simulated plug (`virtual` model only).
    pub virtual_initial_state: PowerState,
}

/// Temperature alert configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Alert when the CPU temperature reaches this many degrees Celsius.
    pub ceiling: f64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but cannot be read or
    /// parsed. Unusable values are kept per section, see [`Config::check`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path.as_ref())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("TELEGRAM_BOT_TOKEN") {
            self.telegram.token = Some(val);
        }
        if let Some(val) = var("TELEGRAM_CHAT_ID") {
            match parse_setting("TELEGRAM_CHAT_ID", &val) {
                Ok(id) => self.telegram.chat_id = Some(id),
                Err(err) => self.reject(Section::Telegram, err),
            }
        }
        if let Some(val) = var("TAPO_IP") {
            self.device.settings.address = Some(val);
        }
        if let Some(val) = var("TAPO_MODEL") {
            self.device.settings.model = Some(val);
        }
        if let Some(val) = var("TAPO_EMAIL").or_else(|| var("TAPO_USERNAME")) {
            self.device.settings.username = Some(val);
        }
        if let Some(val) = var("TAPO_PASSWORD") {
            self.device.settings.password = Some(val);
        }
        if let Some(val) = var("PIHUB_DEVICE_TIMEOUT") {
            match parse_setting("PIHUB_DEVICE_TIMEOUT", &val) {
                Ok(secs) => self.device.io_timeout_secs = secs,
                Err(err) => self.reject(Section::Device, err),
            }
        }
        if let Some(val) = var("CPU_TEMP_MAX") {
            match parse_setting("CPU_TEMP_MAX", &val) {
                Ok(ceiling) => self.watchdog.ceiling = ceiling,
                Err(err) => self.reject(Section::Watchdog, err),
            }
        }
        if let Some(val) = var("PIHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&mut self) {
        if !self.watchdog.ceiling.is_finite() {
            self.reject(
                Section::Watchdog,
                invalid("watchdog.ceiling", "must be a finite number"),
            );
        }
        if self.device.io_timeout_secs == 0 {
            self.reject(
                Section::Device,
                invalid("device.io_timeout_secs", "must be non-zero"),
            );
        }
        if self.telegram.poll_timeout_secs == 0 {
            self.reject(
                Section::Telegram,
                invalid("telegram.poll_timeout_secs", "must be non-zero"),
            );
        }
    }

    fn reject(&mut self, section: Section, error: ConfigurationError) {
        self.rejected.push((section, error));
    }

    /// Whether every value of `section` was usable.
    ///
    /// # Errors
    ///
    /// Returns the first problem recorded for `section`.
    pub fn check(&self, section: Section) -> Result<(), ConfigurationError> {
        match self.rejected.iter().find(|(s, _)| *s == section) {
            Some((_, err)) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// The chat the bot serves and alerts.
    ///
    /// # Errors
    ///
    /// Returns the first rejected Telegram value, or
    /// [`ConfigurationError::Missing`] naming the bot token and/or chat id
    /// when either is absent.
    pub fn recipient(&self) -> Result<ChatId, ConfigurationError> {
        self.check(Section::Telegram)?;
        let token = self
            .telegram
            .token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty());
        let mut missing = Vec::new();
        if !token {
            missing.push("TELEGRAM_BOT_TOKEN");
        }
        if self.telegram.chat_id.is_none() {
            missing.push("TELEGRAM_CHAT_ID");
        }
        match self.telegram.chat_id {
            Some(id) if missing.is_empty() => Ok(ChatId(id)),
            _ => Err(ConfigurationError::Missing { settings: missing }),
        }
    }

    /// Temperature ceiling for the watchdog.
    ///
    /// # Errors
    ///
    /// Returns the first rejected watchdog value.
    pub fn ceiling(&self) -> Result<f64, ConfigurationError> {
        self.check(Section::Watchdog)?;
        Ok(self.watchdog.ceiling)
    }

    /// Bound on each device operation. Falls back to the default when the
    /// configured value was rejected.
    #[must_use]
    pub fn io_timeout(&self) -> Duration {
        match self.device.io_timeout_secs {
            0 => DEFAULT_IO_TIMEOUT,
            secs => Duration::from_secs(secs),
        }
    }
}

fn parse_setting<T>(setting: &'static str, raw: &str) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err: T::Err| invalid(setting, &err.to_string()))
}

fn invalid(setting: &'static str, reason: &str) -> ConfigurationError {
    ConfigurationError::Invalid {
        setting,
        reason: reason.to_string(),
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            settings: DeviceSettings::default(),
            io_timeout_secs: 30,
            virtual_initial_state: PowerState::Off,
        }
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_CEILING,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pihubd=info,pihub=info".to_string(),
        }
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
}

impl From<ConfigError> for ConfigurationError {
    fn from(err: ConfigError) -> Self {
        let reason = match &err {
            ConfigError::Parse(source) => source.message().to_string(),
            ConfigError::Io(source) => source.to_string(),
        };
        invalid("config file", &reason)
    }
}
