//! Message types for AIPanel conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the panel.
    User,
    /// The assistant (delegated or simulated).
    Ai,
}

/// A single message in the panel conversation.
///
/// Messages are immutable once created; the conversation only ever
/// appends. The serialized form is the `{text, sender, timestamp}`
/// record used by the storage adapter, with the timestamp as wall-clock
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message content.
    pub text: String,
    /// Who authored the message.
    pub sender: Sender,
    /// When the message was created.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    /// Create a new AI message.
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Ai,
            timestamp: Utc::now(),
        }
    }
}
