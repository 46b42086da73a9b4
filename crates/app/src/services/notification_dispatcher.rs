//! Notification dispatcher — best-effort delivery of one text message.

use std::time::Duration;

use pihub_domain::chat::ChatId;
use pihub_domain::error::DispatchError;

use crate::ports::Notifier;

/// Default bound on a single outbound notification.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends notifications through a [`Notifier`], logging failures.
///
/// A failed notification is returned as a value and logged; it never panics
/// or aborts the caller.
pub struct NotificationDispatcher<N> {
    notifier: N,
    timeout: Duration,
}

impl<N: Notifier> NotificationDispatcher<N> {
    /// Create a dispatcher with the given per-message timeout.
    pub fn new(notifier: N, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// The underlying notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Send exactly one message to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the transport fails or times out. The
    /// error has already been logged.
    #[tracing::instrument(skip(self, text))]
    pub async fn send(&self, recipient: ChatId, text: &str) -> Result<(), DispatchError> {
        let result = tokio::time::timeout(self.timeout, self.notifier.notify(recipient, text))
            .await
            .unwrap_or(Err(DispatchError::Timeout(self.timeout)));
        match &result {
            Ok(()) => tracing::debug!("notification delivered"),
            Err(err) => tracing::warn!(error = %err, "notification not delivered"),
        }
        result
    }
}
