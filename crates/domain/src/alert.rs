//! Threshold alert — raised when a CPU temperature reading reaches the ceiling.

use std::fmt;

use crate::time::Timestamp;

/// A temperature reading that met or exceeded the configured ceiling.
///
/// Consumed immediately by the notification dispatcher and then dropped;
/// nothing remembers previous alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdAlert {
    /// Measured temperature, in degrees Celsius.
    pub measured: f64,
    /// Configured ceiling, in degrees Celsius.
    pub ceiling: f64,
    pub timestamp: Timestamp,
}

impl ThresholdAlert {
    /// Compare a reading against the ceiling. The boundary is inclusive.
    #[must_use]
    pub fn check(measured: f64, ceiling: f64, timestamp: Timestamp) -> Option<Self> {
        (measured >= ceiling).then_some(Self {
            measured,
            ceiling,
            timestamp,
        })
    }
}

impl fmt::Display for ThresholdAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "⚠️ CPU temperature too high: {:.1}°C (max {:.1}°C)",
            self.measured, self.ceiling
        )
    }
}
