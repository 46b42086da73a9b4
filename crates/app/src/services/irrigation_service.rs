//! Irrigation service — the toggle, hold and restore protocol.
//!
//! One call to [`IrrigationService::run_irrigation_cycle`] runs strictly in
//! this order:
//!
//! 1. resolve the device settings (no I/O on failure)
//! 2. connect
//! 3. read the current state once; it becomes the session's original state
//! 4. switch to the inverted state
//! 5. hold for the requested duration
//! 6. switch back to the original state
//!
//! Every device call is bounded by the I/O timeout, nothing is retried, and
//! the call always ends with exactly one [`IrrigationOutcome`]. A shutdown
//! request shortens the hold but never skips the restore, and a cycle that
//! has not inverted the outlet yet when shutdown begins stops without
//! switching it.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use pihub_domain::device::{DeviceIdentity, DeviceSettings, DeviceTarget};
use pihub_domain::error::{ConfigurationError, DeviceError, DeviceOperation};
use pihub_domain::irrigation::{HoldDuration, IrrigationOutcome};
use pihub_domain::power::PowerState;

use crate::ports::{DeviceConnector, DeviceSession};

/// Default bound on each connect, read and write.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs irrigation cycles against the configured outlet.
pub struct IrrigationService<C> {
    connector: C,
    settings: DeviceSettings,
    rejected: Option<ConfigurationError>,
    io_timeout: Duration,
    shutdown: CancellationToken,
}

/// State captured for one cycle. The original state is read once and never
/// re-read.
struct IrrigationSession {
    requested: HoldDuration,
    original: PowerState,
}

enum Hold {
    Full,
    Interrupted(Duration),
}

impl IrrigationSession {
    /// Wait for the requested duration, or until `shutdown` fires.
    async fn hold(&self, shutdown: &CancellationToken) -> Hold {
        let started = Instant::now();
        tokio::select! {
            () = tokio::time::sleep(self.requested.as_duration()) => Hold::Full,
            () = shutdown.cancelled() => Hold::Interrupted(started.elapsed()),
        }
    }
}

impl<C: DeviceConnector> IrrigationService<C> {
    /// Create a new service.
    ///
    /// Settings are only resolved when a cycle runs, so missing values fail
    /// that cycle rather than construction.
    pub fn new(
        connector: C,
        settings: DeviceSettings,
        io_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            connector,
            settings,
            rejected: None,
            io_timeout,
            shutdown,
        }
    }

    /// Mark the device settings as unusable. Every cycle then ends with
    /// [`IrrigationOutcome::Misconfigured`] carrying `error`, before any I/O.
    #[must_use]
    pub fn with_rejected_settings(mut self, error: ConfigurationError) -> Self {
        self.rejected = Some(error);
        self
    }

    /// Identity of the configured device, if the settings resolve.
    #[must_use]
    pub fn identity(&self) -> Option<DeviceIdentity> {
        self.resolve().ok().map(|target| target.identity)
    }

    fn resolve(&self) -> Result<DeviceTarget, ConfigurationError> {
        match &self.rejected {
            Some(err) => Err(err.clone()),
            None => self.settings.resolve(),
        }
    }

    /// Run one full read → invert → hold → restore cycle.
    #[tracing::instrument(skip(self), fields(duration_secs = duration.as_secs()))]
    pub async fn run_irrigation_cycle(&self, duration: HoldDuration) -> IrrigationOutcome {
        let target = match self.resolve() {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(error = %err, "irrigation not started: device misconfigured");
                return IrrigationOutcome::Misconfigured(err);
            }
        };
        let device = &target.identity;
        if self.shutdown.is_cancelled() {
            tracing::warn!(%device, "irrigation not started: shutting down");
            return IrrigationOutcome::ShuttingDown;
        }

        let session = match self
            .bounded(DeviceOperation::Connect, self.connector.connect(&target))
            .await
        {
            Ok(session) => session,
            Err(err) => {
                tracing::error!(%device, error = %err, "cannot open device session");
                return IrrigationOutcome::ConnectionFailed(err);
            }
        };

        let original = match self
            .bounded(DeviceOperation::ReadState, session.read_power_state())
            .await
        {
            Ok(Some(state)) => state,
            Ok(None) => {
                tracing::warn!(%device, "degraded state read, assuming off");
                PowerState::Off
            }
            Err(err) => {
                tracing::error!(%device, error = %err, "cannot read device state");
                return IrrigationOutcome::ReadFailed(err);
            }
        };
        let cycle = IrrigationSession {
            requested: duration,
            original,
        };

        // shutdown may have begun while connecting or reading
        if self.shutdown.is_cancelled() {
            tracing::warn!(%device, state = %cycle.original, "shutting down before invert, leaving device as is");
            return IrrigationOutcome::ShuttingDown;
        }
        let inverted = cycle.original.inverted();
        if let Err(err) = self
            .bounded(DeviceOperation::SetState, session.set_power_state(inverted))
            .await
        {
            tracing::error!(%device, to = %inverted, error = %err, "cannot invert device state");
            return IrrigationOutcome::InvertFailed {
                target: inverted,
                error: err,
            };
        }
        tracing::info!(%device, from = %cycle.original, to = %inverted, "device inverted, holding");

        let hold = cycle.hold(&self.shutdown).await;
        if let Hold::Interrupted(held) = &hold {
            tracing::warn!(%device, held_secs = held.as_secs(), "hold interrupted by shutdown, restoring now");
        }

        if let Err(err) = self
            .bounded(
                DeviceOperation::SetState,
                session.set_power_state(cycle.original),
            )
            .await
        {
            tracing::error!(%device, to = %cycle.original, error = %err, "restore failed, device may be left inverted");
            return IrrigationOutcome::RestoreFailed {
                original: cycle.original,
                error: err,
            };
        }
        tracing::info!(%device, state = %cycle.original, "device restored");

        match hold {
            Hold::Full => IrrigationOutcome::Completed { held: duration },
            Hold::Interrupted(held) => IrrigationOutcome::CutShort {
                requested: duration,
                held,
                original: cycle.original,
            },
        }
    }

    /// Apply the I/O timeout to one device operation.
    async fn bounded<T>(
        &self,
        operation: DeviceOperation,
        call: impl Future<Output = Result<T, DeviceError>>,
    ) -> Result<T, DeviceError> {
        tokio::time::timeout(self.io_timeout, call)
            .await
            .unwrap_or(Err(DeviceError::Timeout {
                operation,
                timeout: self.io_timeout,
            }))
    }
}
