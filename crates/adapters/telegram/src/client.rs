//! Bot API client: long polling plus the outbound chat ports.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use pihub_app::ports::{ChatTransport, Notifier};
use pihub_domain::chat::{ChatId, InboundEvent, Keyboard, MessageId};
use pihub_domain::error::DispatchError;

use crate::config::TelegramConfig;
use crate::error::TelegramError;
use crate::wire::{
    AnswerCallbackQuery, ApiResponse, EditMessageText, GetUpdates, SendMessage, Update, truncate,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Slack on top of the long-poll duration before a request is abandoned.
const REQUEST_MARGIN: Duration = Duration::from_secs(10);
const RETRY_DELAY: Duration = Duration::from_secs(2);
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Telegram Bot API client.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::MissingToken`] when no token is configured,
    /// or [`TelegramError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(TelegramError::MissingToken)?;
        let poll_timeout = Duration::from_secs(config.poll_timeout_secs);
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(poll_timeout + REQUEST_MARGIN)
            .build()
            .map_err(TelegramError::Client)?;
        Ok(Self {
            http,
            base_url: format!("{}/bot{token}", config.api_base.trim_end_matches('/')),
            poll_timeout,
        })
    }

    /// Receive updates until `shutdown` fires, handing each mapped event to
    /// `on_event`.
    ///
    /// Updates queued while the bot was offline are discarded first. Poll
    /// failures are logged and retried after a short pause.
    pub async fn poll(&self, shutdown: &CancellationToken, mut on_event: impl FnMut(InboundEvent)) {
        let mut offset = match self.skip_pending().await {
            Ok(offset) => offset,
            Err(err) => {
                tracing::warn!(error = %err, "cannot discard pending updates");
                None
            }
        };
        tracing::info!("telegram polling started");

        loop {
            let batch = tokio::select! {
                () = shutdown.cancelled() => break,
                batch = self.get_updates(offset, self.poll_timeout.as_secs()) => batch,
            };
            match batch {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let update_id = update.update_id;
                        match update.into_event() {
                            Some(event) => on_event(event),
                            None => tracing::debug!(update_id, "ignoring update"),
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "telegram poll failed");
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }

        tracing::info!("telegram polling stopped");
    }

    /// Acknowledge everything queued so far. Returns the offset to resume at.
    async fn skip_pending(&self) -> Result<Option<i64>, TelegramError> {
        let pending = self.get_updates(Some(-1), 0).await?;
        let offset = pending.last().map(|update| update.update_id + 1);
        if offset.is_some() {
            tracing::info!("discarded updates received while offline");
        }
        Ok(offset)
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout,
                allowed_updates: ALLOWED_UPDATES,
            },
        )
        .await
    }

    async fn call<B, R>(&self, method: &'static str, body: &B) -> Result<R, TelegramError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        // Strip the URL from errors: it embeds the bot token.
        let http_error = |source: reqwest::Error| TelegramError::Http {
            method,
            source: source.without_url(),
        };
        let response: ApiResponse<R> = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(http_error)?
            .json()
            .await
            .map_err(http_error)?;
        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api {
                method,
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

impl ChatTransport for TelegramClient {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DispatchError> {
        let body = SendMessage {
            chat_id: chat.0,
            text: truncate(text),
            reply_markup: keyboard.map(Into::into),
        };
        self.call::<_, serde_json::Value>("sendMessage", &body)
            .await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DispatchError> {
        let body = EditMessageText {
            chat_id: chat.0,
            message_id: message.0,
            text: truncate(text),
            reply_markup: keyboard.map(Into::into),
        };
        self.call::<_, serde_json::Value>("editMessageText", &body)
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str) -> Result<(), DispatchError> {
        let body = AnswerCallbackQuery {
            callback_query_id: query_id,
        };
        self.call::<_, serde_json::Value>("answerCallbackQuery", &body)
            .await?;
        Ok(())
    }
}

impl Notifier for TelegramClient {
    async fn notify(&self, recipient: ChatId, text: &str) -> Result<(), DispatchError> {
        self.send_message(recipient, text, None).await
    }
}
