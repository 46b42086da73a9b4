//! # pihub-domain
//!
//! Pure domain model for pihub, a chat-driven controller for a
//! home-automation host.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy, timestamps
//! - **Power states** of a remote outlet and the device settings needed to reach it
//! - **Irrigation** values: hold durations and the terminal cycle outcome
//! - **Alerts** raised when the CPU temperature reaches its ceiling
//! - **CPU reports** rendered for the operator
//! - **Chat** vocabulary: senders, commands, callback payloads, inline menus
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod alert;
pub mod chat;
pub mod cpu;
pub mod device;
pub mod irrigation;
pub mod power;
