//! # pihub-adapter-virtual
//!
//! Simulated power outlet implementing the device ports.
//!
//! The plug keeps its state in memory and accepts any [`DeviceTarget`], so
//! the full irrigation flow can run without hardware. Every connection to
//! the same [`VirtualPlug`] shares one state.
//!
//! ## Dependency rule
//!
//! Depends on `pihub-app` (port traits) and `pihub-domain` only.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pihub_app::ports::{DeviceConnector, DeviceSession};
use pihub_domain::device::DeviceTarget;
use pihub_domain::error::DeviceError;
use pihub_domain::power::PowerState;

#[derive(Debug, Default)]
struct PlugState {
    power: PowerState,
    switches: usize,
}

/// A simulated outlet that can be switched on and off.
#[derive(Debug, Clone, Default)]
pub struct VirtualPlug {
    state: Arc<Mutex<PlugState>>,
}

impl VirtualPlug {
    /// Create a plug in the given state.
    #[must_use]
    pub fn new(initial: PowerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(PlugState {
                power: initial,
                switches: 0,
            })),
        }
    }

    /// Current power state.
    #[must_use]
    pub fn power_state(&self) -> PowerState {
        self.lock().power
    }

    /// Number of state changes requested so far.
    #[must_use]
    pub fn switch_count(&self) -> usize {
        self.lock().switches
    }

    fn lock(&self) -> MutexGuard<'_, PlugState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceConnector for VirtualPlug {
    type Session = VirtualPlug;

    async fn connect(&self, target: &DeviceTarget) -> Result<Self::Session, DeviceError> {
        tracing::info!(device = %target.identity, "virtual plug standing in for device");
        Ok(self.clone())
    }
}

impl DeviceSession for VirtualPlug {
    async fn read_power_state(&self) -> Result<Option<PowerState>, DeviceError> {
        Ok(Some(self.power_state()))
    }

    async fn set_power_state(&self, state: PowerState) -> Result<(), DeviceError> {
        let mut plug = self.lock();
        plug.power = state;
        plug.switches += 1;
        tracing::debug!(%state, "virtual plug switched");
        Ok(())
    }
}
