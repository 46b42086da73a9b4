//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command_router;
pub mod cpu_info;
pub mod irrigation_service;
pub mod notification_dispatcher;
pub mod watchdog;
