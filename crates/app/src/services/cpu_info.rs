//! CPU info — gathers one [`CpuReport`] from the host sensor.

use pihub_domain::cpu::CpuReport;

use crate::ports::CpuSensor;

/// Builds CPU reports, substituting a placeholder for any unreadable field.
pub struct CpuInfoService<S> {
    sensor: S,
}

impl<S: CpuSensor> CpuInfoService<S> {
    pub fn new(sensor: S) -> Self {
        Self { sensor }
    }

    /// Read temperature, frequency and usage. Each read is independent.
    #[tracing::instrument(skip(self))]
    pub async fn report(&self) -> CpuReport {
        let (temperature, frequency, usage) = tokio::join!(
            self.sensor.read_temperature(),
            self.sensor.read_frequency(),
            self.sensor.read_usage(),
        );
        CpuReport {
            temperature: temperature
                .inspect_err(|err| tracing::debug!(error = %err, "temperature unavailable"))
                .ok(),
            frequency: frequency
                .inspect_err(|err| tracing::debug!(error = %err, "frequency unavailable"))
                .ok(),
            usage: usage
                .inspect_err(|err| tracing::debug!(error = %err, "usage unavailable"))
                .ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubSensor;

    #[tokio::test]
    async fn should_report_every_field_when_sensors_work() {
        let report = CpuInfoService::new(StubSensor::healthy(49.4)).report().await;
        assert_eq!(
            report.to_string(),
            "🌡 | 49.4'C\n⏱ | 1500MHz (1800)\n📊 | [2.0, 4.0] %"
        );
    }

    #[tokio::test]
    async fn should_show_placeholder_only_for_failing_sensor() {
        let sensor = StubSensor {
            temperature: Err(StubSensor::unavailable("temperature")),
            ..StubSensor::healthy(0.0)
        };

        let report = CpuInfoService::new(sensor).report().await;

        assert!(report.temperature.is_none());
        assert!(report.frequency.is_some());
        assert_eq!(
            report.to_string(),
            "🌡 | N/A\n⏱ | 1500MHz (1800)\n📊 | [2.0, 4.0] %"
        );
    }
}
