//! Threshold watchdog — one temperature check per invocation.
//!
//! The watchdog keeps no state between calls: a sustained over-temperature
//! condition raises one alert per invocation. Scheduling is left to an
//! external trigger (cron, systemd timer, …).

use pihub_domain::alert::ThresholdAlert;
use pihub_domain::chat::ChatId;
use pihub_domain::time::now;

use crate::ports::{CpuSensor, Notifier};
use crate::services::notification_dispatcher::NotificationDispatcher;

/// Default temperature ceiling, in degrees Celsius.
pub const DEFAULT_CEILING: f64 = 70.0;

/// Compares a single temperature reading against a ceiling.
pub struct ThresholdWatchdog<S> {
    sensor: S,
    ceiling: f64,
}

impl<S: CpuSensor> ThresholdWatchdog<S> {
    /// Create a watchdog alerting at or above `ceiling` degrees Celsius.
    pub fn new(sensor: S, ceiling: f64) -> Self {
        Self { sensor, ceiling }
    }

    /// Read the temperature once and compare it to the ceiling.
    ///
    /// A sensor failure is logged and yields `None`.
    #[tracing::instrument(skip(self), fields(ceiling = self.ceiling))]
    pub async fn check_once(&self) -> Option<ThresholdAlert> {
        let measured = match self.sensor.read_temperature().await {
            Ok(celsius) => celsius,
            Err(err) => {
                tracing::warn!(error = %err, "temperature unavailable, skipping check");
                return None;
            }
        };
        let alert = ThresholdAlert::check(measured, self.ceiling, now());
        if alert.is_some() {
            tracing::warn!(measured, "temperature at or above ceiling");
        } else {
            tracing::debug!(measured, "temperature below ceiling");
        }
        alert
    }

    /// Check once and, when the ceiling is reached, notify `recipient`.
    ///
    /// Delivery is best-effort; the alert is returned whether or not it
    /// reached the recipient.
    pub async fn run_once<N: Notifier>(
        &self,
        dispatcher: &NotificationDispatcher<N>,
        recipient: ChatId,
    ) -> Option<ThresholdAlert> {
        let alert = self.check_once().await?;
        let _ = dispatcher.send(recipient, &alert.to_string()).await;
        Some(alert)
    }
}
