//! # pihub-adapter-telegram
//!
//! Telegram Bot API adapter.
//!
//! [`TelegramClient`] is both sides of the chat boundary:
//!
//! - **inbound**: [`TelegramClient::poll`] long-polls `getUpdates` and maps
//!   commands and inline-keyboard presses onto
//!   [`InboundEvent`](pihub_domain::chat::InboundEvent)s;
//! - **outbound**: it implements the `ChatTransport` and `Notifier` ports
//!   with `sendMessage`, `editMessageText` and `answerCallbackQuery`.
//!
//! Authorization is not decided here; every mapped event is handed on.
//!
//! ## Dependency rule
//!
//! Depends on `pihub-app` (port traits) and `pihub-domain` only.

mod client;
mod config;
mod error;
mod wire;

pub use client::TelegramClient;
pub use config::TelegramConfig;
pub use error::TelegramError;
