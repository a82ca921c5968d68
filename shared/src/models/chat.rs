//! Chat transcript entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry in a chat transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}
