//! CPU sensor port.

use std::future::Future;
use std::sync::Arc;

use pihub_domain::cpu::CpuFrequency;
use pihub_domain::error::SensorError;

/// Reads host CPU sensors. Each reading is independent; one failing must not
/// prevent the others.
pub trait CpuSensor: Send + Sync {
    /// Temperature in degrees Celsius.
    fn read_temperature(&self) -> impl Future<Output = Result<f64, SensorError>> + Send;

    /// Current and maximum clock frequency.
    fn read_frequency(&self) -> impl Future<Output = Result<CpuFrequency, SensorError>> + Send;

    /// Per-core utilisation in percent, sampled over a short interval.
    fn read_usage(&self) -> impl Future<Output = Result<Vec<f32>, SensorError>> + Send;
}

impl<T: CpuSensor> CpuSensor for Arc<T> {
    fn read_temperature(&self) -> impl Future<Output = Result<f64, SensorError>> + Send {
        (**self).read_temperature()
    }

    fn read_frequency(&self) -> impl Future<Output = Result<CpuFrequency, SensorError>> + Send {
        (**self).read_frequency()
    }

    fn read_usage(&self) -> impl Future<Output = Result<Vec<f32>, SensorError>> + Send {
        (**self).read_usage()
    }
}
