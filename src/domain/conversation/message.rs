//! Message value object for support chat transcripts.
//!
//! Messages are immutable once ingested. The serde shape accepts the column
//! names produced by the export tooling (`id`, `user_type`, `message`) as
//! aliases of the canonical ones.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Identifier of a message: either a running number or an externally supplied key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Number(u64),
    Key(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{}", n),
            MessageId::Key(k) => f.write_str(k),
        }
    }
}

impl From<u64> for MessageId {
    fn from(n: u64) -> Self {
        MessageId::Number(n)
    }
}

impl From<&str> for MessageId {
    fn from(key: &str) -> Self {
        MessageId::Key(key.to_string())
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    Customer,
    Support,
}

impl Role {
    /// Speaker prefix used when a window is rendered into a prompt.
    pub fn speaker_label(&self) -> &'static str {
        match self {
            Role::Customer => "Müşteri",
            Role::Support => "Destek",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Support => "support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "müşteri" | "musteri" => Ok(Role::Customer),
            "support" | "destek" | "agent" => Ok(Role::Support),
            "" => Err(ValidationError::empty_field("role")),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One chat message. `text` may be empty; `timestamp` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "message_id", alias = "id")]
    pub id: MessageId,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub sender: String,
    #[serde(alias = "user_type")]
    pub role: Role,
    #[serde(default, alias = "message")]
    pub text: String,
}

impl Message {
    pub fn new(id: impl Into<MessageId>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: String::new(),
            sender: String::new(),
            role,
            text: text.into(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// True when the text has no visible content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
