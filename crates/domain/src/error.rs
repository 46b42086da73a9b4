//! Error taxonomy shared across the workspace.
//!
//! Each failure class the system can report is a typed `thiserror` enum.
//! Adapters define their own error types and convert into these via `From`,
//! so the application layer only ever sees domain errors.

use std::fmt;
use std::time::Duration;

/// A required setting is absent or malformed. Raised before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// One or more required settings are not configured.
    #[error("missing {}", .settings.join(", "))]
    Missing {
        /// Names of the missing settings, as the operator configures them.
        settings: Vec<&'static str>,
    },
    /// A setting is present but its value cannot be used.
    #[error("invalid {setting}: {reason}")]
    Invalid {
        /// Name of the offending setting.
        setting: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// The device step during which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOperation {
    Connect,
    ReadState,
    SetState,
}

impl fmt::Display for DeviceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connect"),
            Self::ReadState => f.write_str("read state"),
            Self::SetState => f.write_str("set state"),
        }
    }
}

/// A failure talking to a remote power-outlet device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// No session could be established (unreachable, bad credentials, …).
    #[error("cannot connect to {device}: {message}")]
    Connection {
        /// Human-readable device identity.
        device: String,
        /// Reason reported by the adapter.
        message: String,
    },
    /// A read or write on an established session failed.
    #[error("{operation} failed: {message}")]
    Command {
        operation: DeviceOperation,
        message: String,
    },
    /// The operation did not complete within the configured bound.
    #[error("{operation} timed out after {}s", .timeout.as_secs())]
    Timeout {
        operation: DeviceOperation,
        timeout: Duration,
    },
    /// The adapter cannot drive this kind of device.
    #[error("unsupported device kind {0}")]
    Unsupported(String),
}

impl DeviceError {
    /// Build a [`DeviceError::Command`] from any displayable cause.
    pub fn command(operation: DeviceOperation, cause: impl fmt::Display) -> Self {
        Self::Command {
            operation,
            message: cause.to_string(),
        }
    }
}

/// A sensor could not be read. Never fatal: callers substitute a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// The underlying source (file, command, …) is unavailable.
    #[error("{sensor} sensor unavailable: {reason}")]
    Unavailable {
        sensor: &'static str,
        reason: String,
    },
    /// The source was readable but its output could not be understood.
    #[error("cannot parse {sensor} reading {raw:?}")]
    Parse { sensor: &'static str, raw: String },
}

/// An outbound notification could not be delivered. Logged, never propagated
/// as fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The chat transport rejected or failed the request.
    #[error("notification transport error: {0}")]
    Transport(String),
    /// The transport did not answer in time.
    #[error("notification timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Domain invariant violations on user-supplied values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A hold duration must be a positive whole number of seconds.
    #[error("duration must be a positive whole number of seconds, got {0:?}")]
    InvalidDuration(String),
}
