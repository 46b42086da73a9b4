//! Chat vocabulary — who is talking, what they sent, and the inline menus
//! offered back.
//!
//! These types are transport-agnostic: the Telegram adapter maps its wire
//! format onto them, and the command router only ever sees these.

use std::fmt;

use crate::error::ValidationError;
use crate::irrigation::HoldDuration;

/// Identity of a chat (private chat, group or channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a message within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

/// One inline-keyboard button: a label and the payload sent back when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    fn new(label: &str, action: &CallbackAction) -> Self {
        Self {
            label: label.to_string(),
            payload: action.payload(),
        }
    }
}

/// Inline keyboard, as rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

/// Hold durations offered in the irrigation menu, in seconds.
pub const IRRIGATION_PRESETS: [u64; 4] = [5, 20, 30, 60];

impl Keyboard {
    /// Top-level menu: irrigation or cancel.
    #[must_use]
    pub fn home() -> Self {
        Self {
            rows: vec![
                vec![Button::new("💧 Irrigation", &CallbackAction::ShowDurations)],
                vec![Button::new("❌ Cancel", &CallbackAction::Cancel)],
            ],
        }
    }

    /// Duration picker, two presets per row, then cancel.
    #[must_use]
    pub fn irrigation_durations() -> Self {
        let mut rows: Vec<Vec<Button>> = IRRIGATION_PRESETS
            .chunks(2)
            .map(|pair| {
                pair.iter()
                    .filter_map(|secs| HoldDuration::from_secs(*secs).ok())
                    .map(|d| Button::new(&d.to_string(), &CallbackAction::Irrigate(d)))
                    .collect()
            })
            .collect();
        rows.push(vec![Button::new("❌ Cancel", &CallbackAction::Cancel)]);
        Self { rows }
    }
}

/// Something the operator did in the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat the event came from; checked against the authorized recipient.
    pub sender: ChatId,
    pub kind: InboundKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    /// A slash command such as `/home` or `/irrigate 30`.
    Command { name: String, args: String },
    /// An inline-keyboard button press on a message the bot sent.
    Callback {
        query_id: String,
        message_id: MessageId,
        payload: String,
    },
}

impl InboundKind {
    /// Parse message text into a command. Returns `None` for plain text.
    ///
    /// The command name is lower-cased and stripped of its leading `/` and
    /// any `@botname` suffix.
    #[must_use]
    pub fn command_from_text(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let rest = trimmed.strip_prefix('/')?;
        let (raw, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let name = raw.split('@').next().unwrap_or(raw).to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }
        Some(Self::Command {
            name,
            args: args.trim().to_string(),
        })
    }
}

/// Structured meaning of a callback payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// `irrigation` — show the duration picker.
    ShowDurations,
    /// `irrigation:<seconds>` — run a cycle.
    Irrigate(HoldDuration),
    /// `cancel` — dismiss the menu.
    Cancel,
}

const IRRIGATION: &str = "irrigation";
const CANCEL: &str = "cancel";

impl CallbackAction {
    /// Parse a callback payload.
    ///
    /// Returns `Ok(None)` for payloads that belong to no known action.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDuration`] for an `irrigation:`
    /// payload whose duration is not a positive integer.
    pub fn parse(payload: &str) -> Result<Option<Self>, ValidationError> {
        match payload {
            IRRIGATION => Ok(Some(Self::ShowDurations)),
            CANCEL => Ok(Some(Self::Cancel)),
            other => match other.strip_prefix("irrigation:") {
                Some(secs) => secs.parse().map(|d| Some(Self::Irrigate(d))),
                None => Ok(None),
            },
        }
    }

    /// Encode into the payload carried by a button.
    #[must_use]
    pub fn payload(&self) -> String {
        match self {
            Self::ShowDurations => IRRIGATION.to_string(),
            Self::Irrigate(d) => format!("{IRRIGATION}:{}", d.as_secs()),
            Self::Cancel => CANCEL.to_string(),
        }
    }
}
