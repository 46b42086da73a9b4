//! Irrigation cycle values — the requested hold duration and the single
//! terminal outcome every cycle produces.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigurationError, DeviceError, ValidationError};
use crate::power::PowerState;

/// How long the outlet stays inverted. Always a positive number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HoldDuration(NonZeroU64);

impl HoldDuration {
    /// Build a duration from whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDuration`] when `seconds` is zero.
    pub fn from_secs(seconds: u64) -> Result<Self, ValidationError> {
        NonZeroU64::new(seconds)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDuration(seconds.to_string()))
    }

    /// Number of whole seconds.
    #[must_use]
    pub fn as_secs(self) -> u64 {
        self.0.get()
    }

    /// Convert into a [`Duration`] for timers.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0.get())
    }
}

impl FromStr for HoldDuration {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u64>()
            .ok()
            .and_then(NonZeroU64::new)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDuration(trimmed.to_string()))
    }
}

impl fmt::Display for HoldDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Terminal result of one orchestration cycle.
///
/// Exactly one outcome is produced per invocation, whichever step failed.
/// [`Display`](fmt::Display) renders the message relayed to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrrigationOutcome {
    /// The outlet was inverted, held for the full duration and restored.
    Completed { held: HoldDuration },
    /// A shutdown ended the hold early; the outlet was still restored.
    CutShort {
        requested: HoldDuration,
        held: Duration,
        original: PowerState,
    },
    /// Connection parameters are missing or invalid. No device I/O happened.
    Misconfigured(ConfigurationError),
    /// Shutdown was already under way when the cycle would have inverted the
    /// outlet. The device was not switched.
    ShuttingDown,
    /// No session could be opened. The device was not touched.
    ConnectionFailed(DeviceError),
    /// The initial state read failed. The device was not touched.
    ReadFailed(DeviceError),
    /// Switching to `target` failed; the device should still be in its
    /// original state and no restore was attempted.
    InvertFailed {
        target: PowerState,
        error: DeviceError,
    },
    /// Switching back to `original` failed; the device may be left inverted.
    RestoreFailed {
        original: PowerState,
        error: DeviceError,
    },
}

impl IrrigationOutcome {
    /// Whether the cycle ended with the outlet back in its original state.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::CutShort { .. })
    }
}

impl fmt::Display for IrrigationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed { held } => write!(f, "🌱 Irrigation ran for {held}."),
            Self::CutShort {
                requested,
                held,
                original,
            } => write!(
                f,
                "🌱 Irrigation stopped after {}s of {requested} because pihub is shutting down; outlet restored to {original}.",
                held.as_secs()
            ),
            Self::Misconfigured(err) => write!(f, "❌ Irrigation not started, configuration error: {err}"),
            Self::ShuttingDown => {
                f.write_str("⏹ Irrigation not started because pihub is shutting down; the outlet was not switched.")
            }
            Self::ConnectionFailed(err) => write!(f, "❌ Error talking to the outlet: {err}"),
            Self::ReadFailed(err) => {
                write!(f, "❌ Could not read the outlet state, nothing was changed: {err}")
            }
            Self::InvertFailed { target, error } => write!(
                f,
                "❌ Could not switch the outlet {target}, it should still be {}: {error}",
                target.inverted()
            ),
            Self::RestoreFailed { original, error } => write!(
                f,
                "⚠️ Irrigation ran but restoring the outlet to {original} failed: {error}. The outlet may be left {}!",
                original.inverted()
            ),
        }
    }
}
