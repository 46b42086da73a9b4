//! Bot API payloads and their mapping onto the chat vocabulary.

use serde::{Deserialize, Serialize};

use pihub_domain::chat::{ChatId, InboundEvent, InboundKind, Keyboard, MessageId};

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackQuery {
    pub id: String,
    pub message: Option<Message>,
    pub data: Option<String>,
}

impl Update {
    /// Map to an [`InboundEvent`]. Plain text and unsupported update kinds
    /// yield `None`.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            // Callbacks are attributed to the chat of the message carrying the
            // keyboard, so the authorization check sees the same id.
            let message = query.message?;
            return Some(InboundEvent {
                sender: ChatId(message.chat.id),
                kind: InboundKind::Callback {
                    query_id: query.id,
                    message_id: MessageId(message.message_id),
                    payload: query.data.unwrap_or_default(),
                },
            });
        }
        let message = self.message?;
        let kind = InboundKind::command_from_text(message.text.as_deref()?)?;
        Some(InboundEvent {
            sender: ChatId(message.chat.id),
            kind,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditMessageText<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineKeyboardMarkup<'a> {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton<'a>>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineKeyboardButton<'a> {
    pub text: &'a str,
    pub callback_data: &'a str,
}

impl<'a> From<&'a Keyboard> for InlineKeyboardMarkup<'a> {
    fn from(keyboard: &'a Keyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| InlineKeyboardButton {
                            text: &button.label,
                            callback_data: &button.payload,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

const MAX_MESSAGE_CHARS: usize = 4096;

/// Cut `text` to the Bot API message limit.
pub(crate) fn truncate(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
