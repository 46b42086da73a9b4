//! Host sensor configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Where the host sensor reads its values from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Ask `vcgencmd measure_temp` first (Raspberry Pi firmware tool).
    pub use_vcgencmd: bool,
    /// How long `vcgencmd` may run before the thermal zone is used instead.
    pub vcgencmd_timeout_ms: u64,
    /// Thermal zone file holding the temperature in millidegrees Celsius.
    pub thermal_zone: PathBuf,
    /// cpufreq directory holding `scaling_cur_freq` and `cpuinfo_max_freq`.
    pub cpufreq_dir: PathBuf,
    /// Kernel CPU time accounting.
    pub proc_stat: PathBuf,
    /// Gap between the two `proc_stat` samples, in milliseconds.
    pub usage_interval_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            use_vcgencmd: true,
            vcgencmd_timeout_ms: 5000,
            thermal_zone: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            cpufreq_dir: PathBuf::from("/sys/devices/system/cpu/cpu0/cpufreq"),
            proc_stat: PathBuf::from("/proc/stat"),
            usage_interval_ms: 1000,
        }
    }
}
