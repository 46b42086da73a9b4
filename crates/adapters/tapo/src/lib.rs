//! # pihub-adapter-tapo
//!
//! Device adapter for TP-Link Tapo P100 and P110 smart plugs, built on the
//! [`tapo`] crate.
//!
//! [`TapoConnector`] performs the authenticated handshake for a
//! [`DeviceTarget`] and hands back a [`TapoSession`] able to read and set the
//! relay state. Both models expose the same on/off surface; the P110's energy
//! monitoring is not used.
//!
//! ## Dependency rule
//!
//! Depends on `pihub-app` (port traits) and `pihub-domain` only.

mod error;

pub use error::TapoError;

use std::time::Duration;

use tapo::{ApiClient, PlugEnergyMonitoringHandler, PlugHandler};

use pihub_app::ports::{DeviceConnector, DeviceSession};
use pihub_domain::device::{DeviceKind, DeviceTarget};
use pihub_domain::error::{DeviceError, DeviceOperation};
use pihub_domain::power::PowerState;

/// Opens sessions with Tapo plugs.
#[derive(Debug, Clone)]
pub struct TapoConnector {
    request_timeout: Duration,
}

impl TapoConnector {
    /// Create a connector whose HTTP requests give up after `request_timeout`.
    #[must_use]
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    async fn open(&self, target: &DeviceTarget) -> Result<TapoSession, TapoError> {
        let identity = &target.identity;
        let client = ApiClient::new(
            target.credentials.username.clone(),
            target.credentials.password.clone(),
        )
        .with_timeout(self.request_timeout);
        let connect_error = |source| TapoError::Connect {
            device: identity.to_string(),
            source,
        };
        match identity.kind {
            DeviceKind::P100 => client
                .p100(identity.address.clone())
                .await
                .map(TapoSession::P100)
                .map_err(connect_error),
            DeviceKind::P110 => client
                .p110(identity.address.clone())
                .await
                .map(TapoSession::P110)
                .map_err(connect_error),
            DeviceKind::Virtual => Err(TapoError::UnsupportedKind(identity.kind)),
        }
    }
}

impl DeviceConnector for TapoConnector {
    type Session = TapoSession;

    #[tracing::instrument(skip_all, fields(device = %target.identity))]
    async fn connect(&self, target: &DeviceTarget) -> Result<TapoSession, DeviceError> {
        let session = self.open(target).await?;
        tracing::debug!("tapo session established");
        Ok(session)
    }
}

/// An authenticated session with one plug.
pub enum TapoSession {
    P100(PlugHandler),
    P110(PlugEnergyMonitoringHandler),
}

impl TapoSession {
    async fn device_on(&self) -> Result<bool, tapo::Error> {
        match self {
            Self::P100(handler) => handler.get_device_info().await.map(|info| info.device_on),
            Self::P110(handler) => handler.get_device_info().await.map(|info| info.device_on),
        }
    }

    async fn switch(&self, state: PowerState) -> Result<(), tapo::Error> {
        match (self, state) {
            (Self::P100(handler), PowerState::On) => handler.on().await,
            (Self::P100(handler), PowerState::Off) => handler.off().await,
            (Self::P110(handler), PowerState::On) => handler.on().await,
            (Self::P110(handler), PowerState::Off) => handler.off().await,
        }
    }
}

impl DeviceSession for TapoSession {
    async fn read_power_state(&self) -> Result<Option<PowerState>, DeviceError> {
        let on = self.device_on().await.map_err(|source| TapoError::Request {
            operation: DeviceOperation::ReadState,
            source,
        })?;
        Ok(Some(PowerState::from(on)))
    }

    async fn set_power_state(&self, state: PowerState) -> Result<(), DeviceError> {
        self.switch(state).await.map_err(|source| TapoError::Request {
            operation: DeviceOperation::SetState,
            source,
        })?;
        Ok(())
    }
}
