//! # pihub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `DeviceConnector` / `DeviceSession` — drive one power outlet
//!   - `Notifier` — deliver a text message to a recipient
//!   - `ChatTransport` — reply, edit menus, acknowledge button presses
//!   - `CpuSensor` — read temperature, frequency and usage
//! - Provide the use-cases built on those ports:
//!   - `IrrigationService` — invert, hold and restore an outlet
//!   - `ThresholdWatchdog` — one temperature check against a ceiling
//!   - `NotificationDispatcher` — best-effort message delivery
//!   - `CpuInfoService` — CPU health report
//!   - `CommandRouter` — authorized chat commands and menus
//! - Serialise cycles per outlet (`DeviceLocks`)
//!
//! ## Dependency rule
//! Depends on `pihub-domain` only (plus `tokio` for timers and locks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod device_locks;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
