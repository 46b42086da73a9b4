//! # pihubd — pihub composition root
//!
//! Wires the adapters into the application services for three binaries:
//!
//! - `pihubd`: Telegram bot serving one authorized chat
//! - `irrigate <seconds>`: one irrigation cycle from the shell
//! - `cpu-watchdog`: one temperature check, alerting over Telegram
//!
//! ## Responsibilities
//! - Load configuration (`pihub.toml`, environment overrides)
//! - Install logging
//! - Select the device backend from the configured model
//! - Construct application services, injecting adapters via port traits
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

pub mod backend;
pub mod cli;
pub mod config;
pub mod shutdown;
pub mod telemetry;

use tokio_util::sync::CancellationToken;

use pihub_app::services::irrigation_service::IrrigationService;

use crate::backend::DeviceBackend;
use crate::config::{Config, Section};

/// Build the orchestrator for the configured device. Rejected device
/// values make every cycle report a configuration error.
#[must_use]
pub fn irrigation_service(
    config: &Config,
    shutdown: CancellationToken,
) -> IrrigationService<DeviceBackend> {
    let service = IrrigationService::new(
        DeviceBackend::select(config),
        config.device.settings.clone(),
        config.io_timeout(),
        shutdown,
    );
    match config.check(Section::Device) {
        Ok(()) => service,
        Err(err) => service.with_rejected_settings(err),
    }
}

/// Build a single-threaded runtime, as used by every binary.
///
/// # Errors
///
/// Returns the I/O error raised if the runtime cannot start.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
