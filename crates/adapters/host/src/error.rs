//! Host sensor error types.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use pihub_domain::error::SensorError;

/// Errors specific to reading host sensors.
#[derive(Debug, thiserror::Error)]
pub enum HostSensorError {
    /// A sysfs or procfs file could not be read.
    #[error("cannot read {}", .path.display())]
    Read {
        sensor: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A helper program could not be started.
    #[error("cannot run {program}")]
    Spawn {
        sensor: &'static str,
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A helper program did not finish in time and was killed.
    #[error("{program} did not answer within {}ms", .timeout.as_millis())]
    Timeout {
        sensor: &'static str,
        program: &'static str,
        timeout: Duration,
    },

    /// A helper program exited unsuccessfully.
    #[error("{program} exited with {status}")]
    Exit {
        sensor: &'static str,
        program: &'static str,
        status: ExitStatus,
    },

    /// The raw value could not be understood.
    #[error("unexpected {sensor} reading {raw:?}")]
    Parse { sensor: &'static str, raw: String },
}

impl From<HostSensorError> for SensorError {
    fn from(err: HostSensorError) -> Self {
        match err {
            HostSensorError::Parse { sensor, raw } => SensorError::Parse { sensor, raw },
            HostSensorError::Read { sensor, .. }
            | HostSensorError::Spawn { sensor, .. }
            | HostSensorError::Timeout { sensor, .. }
            | HostSensorError::Exit { sensor, .. } => SensorError::Unavailable {
                sensor,
                reason: error_chain(&err),
            },
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
