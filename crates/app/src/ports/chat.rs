//! Chat ports — outbound messages to the operator.
//!
//! [`Notifier`] is the narrow capability used by the notification dispatcher
//! (plain text to one recipient). [`ChatTransport`] adds the interactive
//! pieces the command router needs: inline menus, message edits and callback
//! acknowledgements.

use std::future::Future;
use std::sync::Arc;

use pihub_domain::chat::{ChatId, Keyboard, MessageId};
use pihub_domain::error::DispatchError;

/// Delivers a plain text message to a recipient.
pub trait Notifier: Send + Sync {
    /// Send exactly one message. No retry, no batching.
    fn notify(
        &self,
        recipient: ChatId,
        text: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

/// Interactive chat operations used while answering commands.
pub trait ChatTransport: Send + Sync {
    /// Post a new message, optionally with an inline keyboard.
    fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;

    /// Replace the text (and keyboard) of a message the bot sent earlier.
    fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;

    /// Acknowledge a button press so the client stops its loading indicator.
    fn answer_callback(
        &self,
        query_id: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

impl<T: Notifier> Notifier for Arc<T> {
    fn notify(
        &self,
        recipient: ChatId,
        text: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        (**self).notify(recipient, text)
    }
}

impl<T: ChatTransport> ChatTransport for Arc<T> {
    fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        (**self).send_message(chat, text, keyboard)
    }

    fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        (**self).edit_message(chat, message, text, keyboard)
    }

    fn answer_callback(
        &self,
        query_id: &str,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send {
        (**self).answer_callback(query_id)
    }
}
