//! Per-device mutual exclusion for orchestration cycles.
//!
//! At most one cycle may drive a physical outlet at a time. Locks are keyed
//! by [`DeviceIdentity`] and created on first use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

use pihub_domain::device::DeviceIdentity;

/// Registry of one async mutex per device.
#[derive(Clone, Default)]
pub struct DeviceLocks {
    inner: Arc<Mutex<HashMap<DeviceIdentity, Arc<tokio::sync::Mutex<()>>>>>,
}

impl DeviceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, device: &DeviceIdentity) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(device.clone()).or_default())
    }

    /// Wait until `device` is free and take it.
    pub async fn lock(&self, device: &DeviceIdentity) -> OwnedMutexGuard<()> {
        self.entry(device).lock_owned().await
    }

    /// Take `device` only if nobody holds it.
    #[must_use]
    pub fn try_lock(&self, device: &DeviceIdentity) -> Option<OwnedMutexGuard<()>> {
        self.entry(device).try_lock_owned().ok()
    }
}
