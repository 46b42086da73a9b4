//! Telegram adapter error types.

use pihub_domain::error::DispatchError;

/// Errors specific to the Telegram adapter.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// No bot token was configured.
    #[error("telegram bot token is missing")]
    MissingToken,

    /// The HTTP client could not be built.
    #[error("cannot build telegram HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request never produced a usable HTTP response.
    #[error("telegram {method} request failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The Bot API answered with `ok = false`.
    #[error("telegram {method} rejected: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

impl From<TelegramError> for DispatchError {
    fn from(err: TelegramError) -> Self {
        DispatchError::Transport(err.to_string())
    }
}
