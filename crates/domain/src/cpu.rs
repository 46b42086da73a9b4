//! CPU health snapshot shown to the operator.

use std::fmt;

/// Placeholder rendered for a field whose sensor could not be read.
pub const UNAVAILABLE: &str = "N/A";

/// Current and maximum clock frequency, in MHz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuFrequency {
    pub current_mhz: f64,
    pub max_mhz: f64,
}

impl fmt::Display for CpuFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}MHz ({:.0})", self.current_mhz, self.max_mhz)
    }
}

/// One reading of each CPU sensor. A `None` field failed to read and is
/// rendered as [`UNAVAILABLE`] without affecting the other fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuReport {
    /// Temperature in degrees Celsius.
    pub temperature: Option<f64>,
    pub frequency: Option<CpuFrequency>,
    /// Per-core utilisation, in percent.
    pub usage: Option<Vec<f32>>,
}

impl fmt::Display for CpuReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.temperature {
            Some(celsius) => writeln!(f, "🌡 | {celsius:.1}'C")?,
            None => writeln!(f, "🌡 | {UNAVAILABLE}")?,
        }
        match &self.frequency {
            Some(freq) => writeln!(f, "⏱ | {freq}")?,
            None => writeln!(f, "⏱ | {UNAVAILABLE}")?,
        }
        match &self.usage {
            Some(cores) => {
                let cores: Vec<String> = cores.iter().map(|c| format!("{c:.1}")).collect();
                write!(f, "📊 | [{}] %", cores.join(", "))
            }
            None => write!(f, "📊 | {UNAVAILABLE}"),
        }
    }
}
