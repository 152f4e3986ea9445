use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::components::id::{MessageId, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ChatChannel {
    Global,
    Private { recipient: PlayerId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("message is {length} characters long, the limit is {max}")]
    TooLong { length: usize, max: usize },
    #[error("you are banned from chat")]
    Banned,
    #[error("cannot send a private message to yourself")]
    SelfMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: PlayerId,
    pub channel: ChatChannel,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: PlayerId, channel: ChatChannel, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            channel,
            body: body.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.channel == ChatChannel::Global
    }

    /// Whether this is a private message exchanged between `a` and `b`, in
    /// either direction.
    pub fn is_between(&self, a: PlayerId, b: PlayerId) -> bool {
        match self.channel {
            ChatChannel::Global => false,
            ChatChannel::Private { recipient } => {
                (self.sender == a && recipient == b) || (self.sender == b && recipient == a)
            }
        }
    }
}

/// Trims `body` and checks it against the length limit, counted in
/// characters.
pub fn validate_body(body: &str, max_len: usize) -> Result<&str, ChatError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    let length = body.chars().count();
    if length > max_len {
        return Err(ChatError::TooLong {
            length,
            max: max_len,
        });
    }
    Ok(body)
}
