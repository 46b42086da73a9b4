//! Device port — open a session to a power outlet, read and set its state.
//!
//! Implementations live in adapter crates (`adapter-tapo`, `adapter-virtual`).
//! The orchestrator drives them in a fixed order and owns every timeout, so
//! implementations only need to report failures faithfully.

use std::future::Future;
use std::sync::Arc;

use pihub_domain::device::DeviceTarget;
use pihub_domain::error::DeviceError;
use pihub_domain::power::PowerState;

/// Opens authenticated sessions to one kind of device.
pub trait DeviceConnector: Send + Sync {
    /// Session type produced by [`connect`](Self::connect).
    type Session: DeviceSession;

    /// Establish a session with the device described by `target`.
    ///
    /// Must not change the device's power state.
    fn connect(
        &self,
        target: &DeviceTarget,
    ) -> impl Future<Output = Result<Self::Session, DeviceError>> + Send;
}

/// An open session to a single device.
pub trait DeviceSession: Send + Sync {
    /// Read the current relay state.
    ///
    /// `Ok(None)` means the device answered but its state was neither on nor
    /// off; callers decide how to treat such a degraded read.
    fn read_power_state(
        &self,
    ) -> impl Future<Output = Result<Option<PowerState>, DeviceError>> + Send;

    /// Switch the relay to `state`.
    fn set_power_state(
        &self,
        state: PowerState,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

impl<T: DeviceConnector> DeviceConnector for Arc<T> {
    type Session = T::Session;

    fn connect(
        &self,
        target: &DeviceTarget,
    ) -> impl Future<Output = Result<Self::Session, DeviceError>> + Send {
        (**self).connect(target)
    }
}
