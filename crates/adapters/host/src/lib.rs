//! # pihub-adapter-host
//!
//! CPU sensor for the machine pihub runs on.
//!
//! | Reading | Source |
//! |---------|--------|
//! | Temperature | `vcgencmd measure_temp`, else the thermal-zone file |
//! | Frequency | `scaling_cur_freq` / `cpuinfo_max_freq` under cpufreq |
//! | Usage | two `/proc/stat` samples taken `usage_interval_ms` apart |
//!
//! ## Dependency rule
//!
//! Depends on `pihub-app` (port traits) and `pihub-domain` only.

mod config;
mod error;
mod parse;

pub use config::SensorConfig;
pub use error::HostSensorError;

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;

use pihub_app::ports::CpuSensor;
use pihub_domain::cpu::CpuFrequency;
use pihub_domain::error::SensorError;

const TEMPERATURE: &str = "temperature";
const FREQUENCY: &str = "frequency";
const USAGE: &str = "usage";
const VCGENCMD: &str = "vcgencmd";

/// Reads CPU health from firmware tools and kernel interfaces.
#[derive(Debug, Clone)]
pub struct HostCpuSensor {
    config: SensorConfig,
}

impl HostCpuSensor {
    #[must_use]
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }

    async fn vcgencmd_temperature(&self) -> Result<f64, HostSensorError> {
        let mut command = Command::new(VCGENCMD);
        command.arg("measure_temp");
        let timeout = Duration::from_millis(self.config.vcgencmd_timeout_ms);
        let output = run_bounded(TEMPERATURE, VCGENCMD, command, timeout).await?;
        if !output.status.success() {
            return Err(HostSensorError::Exit {
                sensor: TEMPERATURE,
                program: VCGENCMD,
                status: output.status,
            });
        }
        let raw = String::from_utf8_lossy(&output.stdout);
        parse::vcgencmd_temperature(&raw).ok_or_else(|| HostSensorError::Parse {
            sensor: TEMPERATURE,
            raw: raw.trim().to_string(),
        })
    }

    async fn thermal_zone_temperature(&self) -> Result<f64, HostSensorError> {
        let raw = read(TEMPERATURE, &self.config.thermal_zone).await?;
        parse::millidegrees(&raw).ok_or_else(|| HostSensorError::Parse {
            sensor: TEMPERATURE,
            raw: raw.trim().to_string(),
        })
    }

    async fn frequency_file(&self, name: &str) -> Result<f64, HostSensorError> {
        let raw = read(FREQUENCY, &self.config.cpufreq_dir.join(name)).await?;
        parse::khz_to_mhz(&raw).ok_or_else(|| HostSensorError::Parse {
            sensor: FREQUENCY,
            raw: raw.trim().to_string(),
        })
    }

    async fn core_times(&self) -> Result<Vec<parse::CoreTimes>, HostSensorError> {
        let raw = read(USAGE, &self.config.proc_stat).await?;
        parse::per_core_times(&raw).ok_or_else(|| HostSensorError::Parse {
            sensor: USAGE,
            raw: raw.lines().next().unwrap_or_default().to_string(),
        })
    }
}

/// Run a helper program, killing it if it outlives `timeout`.
async fn run_bounded(
    sensor: &'static str,
    program: &'static str,
    mut command: Command,
    timeout: Duration,
) -> Result<Output, HostSensorError> {
    command.kill_on_drop(true);
    match tokio::time::timeout(timeout, command.output()).await {
        Ok(output) => output.map_err(|source| HostSensorError::Spawn {
            sensor,
            program,
            source,
        }),
        Err(_) => Err(HostSensorError::Timeout {
            sensor,
            program,
            timeout,
        }),
    }
}

async fn read(sensor: &'static str, path: &Path) -> Result<String, HostSensorError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| HostSensorError::Read {
            sensor,
            path: path.to_path_buf(),
            source,
        })
}

impl CpuSensor for HostCpuSensor {
    async fn read_temperature(&self) -> Result<f64, SensorError> {
        if self.config.use_vcgencmd {
            match self.vcgencmd_temperature().await {
                Ok(celsius) => return Ok(celsius),
                Err(err) => {
                    tracing::debug!(error = %err, "vcgencmd unavailable, trying thermal zone");
                }
            }
        }
        Ok(self.thermal_zone_temperature().await?)
    }

    async fn read_frequency(&self) -> Result<CpuFrequency, SensorError> {
        let current_mhz = self.frequency_file("scaling_cur_freq").await?;
        let max_mhz = self.frequency_file("cpuinfo_max_freq").await?;
        Ok(CpuFrequency {
            current_mhz,
            max_mhz,
        })
    }

    async fn read_usage(&self) -> Result<Vec<f32>, SensorError> {
        let before = self.core_times().await?;
        tokio::time::sleep(Duration::from_millis(self.config.usage_interval_ms)).await;
        let after = self.core_times().await?;
        Ok(parse::usage_between(&before, &after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sensor_in(dir: &TempDir) -> HostCpuSensor {
        HostCpuSensor::new(SensorConfig {
            use_vcgencmd: false,
            vcgencmd_timeout_ms: 0,
            thermal_zone: dir.path().join("temp"),
            cpufreq_dir: dir.path().to_path_buf(),
            proc_stat: dir.path().join("stat"),
            usage_interval_ms: 0,
        })
    }

    #[tokio::test]
    async fn should_read_thermal_zone_in_millidegrees() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("temp"), "49400\n").unwrap();

        let celsius = sensor_in(&dir).read_temperature().await.unwrap();

        assert!((celsius - 49.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn should_report_missing_thermal_zone_as_unavailable() {
        let dir = TempDir::new().unwrap();

        let err = sensor_in(&dir).read_temperature().await.unwrap_err();

        assert!(matches!(
            err,
            SensorError::Unavailable {
                sensor: "temperature",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn should_report_garbage_temperature_as_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("temp"), "hot\n").unwrap();

        let err = sensor_in(&dir).read_temperature().await.unwrap_err();

        assert_eq!(
            err,
            SensorError::Parse {
                sensor: "temperature",
                raw: "hot".to_string(),
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn should_give_up_on_helper_that_hangs() {
        let mut command = Command::new("sleep");
        command.arg("30");
        let started = std::time::Instant::now();

        let err = run_bounded(TEMPERATURE, VCGENCMD, command, Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, HostSensorError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn should_read_frequency_in_mhz() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("scaling_cur_freq"), "600000\n").unwrap();
        fs::write(dir.path().join("cpuinfo_max_freq"), "1800000\n").unwrap();

        let freq = sensor_in(&dir).read_frequency().await.unwrap();

        assert_eq!(freq.to_string(), "600MHz (1800)");
    }

    #[tokio::test]
    async fn should_fail_frequency_when_max_is_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("scaling_cur_freq"), "600000\n").unwrap();

        assert!(sensor_in(&dir).read_frequency().await.is_err());
    }

    #[tokio::test]
    async fn should_read_usage_per_core() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("stat"),
            "cpu  10 0 10 80 0 0 0 0\ncpu0 5 0 5 40 0 0 0 0\ncpu1 5 0 5 40 0 0 0 0\n",
        )
        .unwrap();

        let usage = sensor_in(&dir).read_usage().await.unwrap();

        assert_eq!(usage, [0.0, 0.0]);
    }
}
