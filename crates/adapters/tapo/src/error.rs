//! Tapo adapter error types.

use pihub_domain::device::DeviceKind;
use pihub_domain::error::{DeviceError, DeviceOperation};

/// Errors specific to the Tapo adapter.
#[derive(Debug, thiserror::Error)]
pub enum TapoError {
    /// The handshake or login with the plug failed.
    #[error("cannot open tapo session with {device}")]
    Connect {
        device: String,
        #[source]
        source: tapo::Error,
    },

    /// A request on an open session failed.
    #[error("tapo {operation} request failed")]
    Request {
        operation: DeviceOperation,
        #[source]
        source: tapo::Error,
    },

    /// The configured model is not a Tapo plug.
    #[error("{0} is not a tapo plug model")]
    UnsupportedKind(DeviceKind),
}

impl From<TapoError> for DeviceError {
    fn from(err: TapoError) -> Self {
        match err {
            TapoError::Connect { device, source } => DeviceError::Connection {
                device,
                message: source.to_string(),
            },
            TapoError::Request { operation, source } => DeviceError::command(operation, source),
            TapoError::UnsupportedKind(kind) => DeviceError::Unsupported(kind.to_string()),
        }
    }
}
