//! Chat message records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sender id used for system notices
pub const SYSTEM_SENDER: &str = "system";

/// A message stored in a conversation
///
/// Messages are only created after they pass screening and are never edited
/// once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: String,
    /// Sender user ID
    pub sender_id: String,
    /// Message text as the user typed it
    pub text: String,
    /// When the message was accepted
    pub timestamp: DateTime<Utc>,
    /// Automated notice rather than user text
    #[serde(default)]
    pub is_system_message: bool,
}

impl Message {
    /// Create a user message with a fresh ID and the current time
    pub fn new(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), sender_id, text, Utc::now())
    }

    /// Create a message with an explicit ID and timestamp
    pub fn with_id(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sender_id: sender_id.into(),
            text: text.into(),
            timestamp,
            is_system_message: false,
        }
    }

    /// Create a system notice
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            is_system_message: true,
            ..Self::new(SYSTEM_SENDER, text)
        }
    }
}
