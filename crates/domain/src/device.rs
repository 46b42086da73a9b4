//! Device — one remote power outlet, identified by address and model.
//!
//! Connection parameters arrive as loosely-typed [`DeviceSettings`] (every
//! field optional, straight from configuration) and are resolved into a
//! [`DeviceTarget`] only when an orchestration actually needs them. That way a
//! missing setting fails the operation that depends on it, not the process.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigurationError;

/// Supported outlet models. Selected once, when the adapter is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Tapo P100 smart plug.
    P100,
    /// Tapo P110 smart plug with energy monitoring.
    P110,
    /// In-memory simulated plug.
    Virtual,
}

impl DeviceKind {
    /// Whether this kind talks to real hardware and needs credentials.
    #[must_use]
    pub fn requires_credentials(self) -> bool {
        !matches!(self, Self::Virtual)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P100 => f.write_str("p100"),
            Self::P110 => f.write_str("p110"),
            Self::Virtual => f.write_str("virtual"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p100" => Ok(Self::P100),
            "p110" => Ok(Self::P110),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigurationError::Invalid {
                setting: MODEL,
                reason: format!("unknown model {other:?}, expected p100, p110 or virtual"),
            }),
        }
    }
}

/// Identity of a physical device: where it is and what it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub address: String,
    pub kind: DeviceKind,
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.address)
    }
}

/// Account credentials used to open an authenticated device session.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DeviceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Fully resolved connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    pub identity: DeviceIdentity,
    pub credentials: DeviceCredentials,
}

const ADDRESS: &str = "TAPO_IP";
const MODEL: &str = "TAPO_MODEL";
const USERNAME: &str = "TAPO_EMAIL/TAPO_USERNAME";
const PASSWORD: &str = "TAPO_PASSWORD";

/// Device connection settings as configured. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Network address of the outlet (e.g. `192.168.1.55`).
    pub address: Option<String>,
    /// Model string (`p100`, `p110` or `virtual`).
    pub model: Option<String>,
    /// Account e-mail or user name.
    pub username: Option<String>,
    /// Account password.
    pub password: Option<String>,
}

impl DeviceSettings {
    /// Resolve into a [`DeviceTarget`], reporting every missing setting at once.
    ///
    /// Empty strings count as missing. The `virtual` model needs no
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Missing`] listing each absent setting, or
    /// [`ConfigurationError::Invalid`] for an unknown model.
    pub fn resolve(&self) -> Result<DeviceTarget, ConfigurationError> {
        let address = present(self.address.as_deref());
        let model = present(self.model.as_deref());
        let username = present(self.username.as_deref());
        let password = present(self.password.as_deref());

        let kind = model.map(DeviceKind::from_str).transpose()?;
        let needs_credentials = kind.is_none_or(DeviceKind::requires_credentials);

        let mut missing = Vec::new();
        if address.is_none() {
            missing.push(ADDRESS);
        }
        if kind.is_none() {
            missing.push(MODEL);
        }
        if needs_credentials && username.is_none() {
            missing.push(USERNAME);
        }
        if needs_credentials && password.is_none() {
            missing.push(PASSWORD);
        }

        match (address, kind) {
            (Some(address), Some(kind)) if missing.is_empty() => Ok(DeviceTarget {
                identity: DeviceIdentity {
                    address: address.to_string(),
                    kind,
                },
                credentials: DeviceCredentials {
                    username: username.unwrap_or_default().to_string(),
                    password: password.unwrap_or_default().to_string(),
                },
            }),
            _ => Err(ConfigurationError::Missing { settings: missing }),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
