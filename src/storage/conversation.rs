//! Conversation management

use crate::storage::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message history between two participants about one listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation ID
    pub id: String,
    /// Listing the conversation is about
    pub listing_id: String,
    /// Listing title, for conversation lists
    pub listing_title: String,
    /// User IDs of both participants
    pub participants: Vec<String>,
    /// Display name of the other participant
    pub other_user_name: String,
    /// Text of the latest message
    #[serde(default)]
    pub last_message: String,
    /// Time of the latest message
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    /// Unread counter (display only)
    #[serde(default)]
    pub unread_count: u32,
    /// Messages in insertion order
    #[serde(default)]
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new(
        listing_id: impl Into<String>,
        listing_title: impl Into<String>,
        participants: [String; 2],
        other_user_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            listing_id: listing_id.into(),
            listing_title: listing_title.into(),
            participants: participants.into(),
            other_user_name: other_user_name.into(),
            last_message: String::new(),
            last_message_at: None,
            unread_count: 0,
            messages: Vec::new(),
        }
    }

    /// Append a message and refresh the summary fields
    pub fn append_message(&mut self, msg: Message) {
        self.last_message = msg.text.clone();
        self.last_message_at = Some(msg.timestamp);
        self.messages.push(msg);
    }

    /// Messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether `user_id` takes part in this conversation
    pub fn involves(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// Append an automated notice and count it as unread
    pub fn post_notice(&mut self, text: impl Into<String>) -> Message {
        let notice = Message::system(text);
        self.append_message(notice.clone());
        self.unread_count += 1;
        notice
    }

    /// Reset the unread counter
    pub fn mark_read(&mut self) {
        self.unread_count = 0;
    }
}
