//! Device backend chosen once, at startup, from the configured model.

use pihub_adapter_tapo::{TapoConnector, TapoSession};
use pihub_adapter_virtual::VirtualPlug;
use pihub_app::ports::{DeviceConnector, DeviceSession};
use pihub_domain::device::{DeviceKind, DeviceTarget};
use pihub_domain::error::DeviceError;
use pihub_domain::power::PowerState;

use crate::config::Config;

/// The device adapter in use.
pub enum DeviceBackend {
    Tapo(TapoConnector),
    Virtual(VirtualPlug),
}

impl DeviceBackend {
    /// Pick the adapter matching the configured model.
    ///
    /// An unknown or missing model selects Tapo; the cycle then reports the
    /// configuration error before touching any device.
    #[must_use]
    pub fn select(config: &Config) -> Self {
        let kind = config
            .device
            .settings
            .model
            .as_deref()
            .and_then(|model| model.parse::<DeviceKind>().ok());
        match kind {
            Some(DeviceKind::Virtual) => {
                Self::Virtual(VirtualPlug::new(config.device.virtual_initial_state))
            }
            _ => Self::Tapo(TapoConnector::new(config.io_timeout())),
        }
    }
}

/// Session opened by a [`DeviceBackend`].
pub enum BackendSession {
    Tapo(TapoSession),
    Virtual(VirtualPlug),
}

impl DeviceConnector for DeviceBackend {
    type Session = BackendSession;

    async fn connect(&self, target: &DeviceTarget) -> Result<BackendSession, DeviceError> {
        match self {
            Self::Tapo(connector) => connector.connect(target).await.map(BackendSession::Tapo),
            Self::Virtual(plug) => plug.connect(target).await.map(BackendSession::Virtual),
        }
    }
}

impl DeviceSession for BackendSession {
    async fn read_power_state(&self) -> Result<Option<PowerState>, DeviceError> {
        match self {
            Self::Tapo(session) => session.read_power_state().await,
            Self::Virtual(session) => session.read_power_state().await,
        }
    }

    async fn set_power_state(&self, state: PowerState) -> Result<(), DeviceError> {
        match self {
            Self::Tapo(session) => session.set_power_state(state).await,
            Self::Virtual(session) => session.set_power_state(state).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_model(model: Option<&str>) -> Config {
        let mut config = Config::default();
        config.device.settings.model = model.map(str::to_string);
        config.device.virtual_initial_state = PowerState::On;
        config
    }

    #[test]
    fn should_select_virtual_plug_for_virtual_model() {
        match DeviceBackend::select(&config_with_model(Some("Virtual"))) {
            DeviceBackend::Virtual(plug) => assert_eq!(plug.power_state(), PowerState::On),
            DeviceBackend::Tapo(_) => panic!("expected the virtual backend"),
        }
    }

    #[test]
    fn should_select_tapo_for_plug_models() {
        for model in [Some("p100"), Some("P110"), None, Some("toaster")] {
            assert!(matches!(
                DeviceBackend::select(&config_with_model(model)),
                DeviceBackend::Tapo(_)
            ));
        }
    }
}
