//! High-level messaging module
//!
//! `ChatSession` is the only path by which user messages enter a
//! conversation. Each send is screened by the [`SafetyFilter`]; rejected
//! messages are dropped (not queued) and the user has to edit and resend.

use crate::{
    marketplace::Listing,
    safety::SafetyFilter,
    storage::{AppState, Conversation, Message},
    Error, Result,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Outcome of a send attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Message passed screening and was appended
    Delivered(Message),
    /// Message was blocked; nothing was appended
    Rejected {
        /// Reason to show the user
        reason: String,
    },
}

impl SendOutcome {
    /// Whether the message was appended
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered(_))
    }
}

/// Screens and records chat messages
#[derive(Debug, Clone)]
pub struct ChatSession {
    filter: SafetyFilter,
}

impl ChatSession {
    /// Create a chat session using `filter` for screening
    pub fn new(filter: SafetyFilter) -> Self {
        Self { filter }
    }

    /// The filter messages are screened with
    pub fn filter(&self) -> &SafetyFilter {
        &self.filter
    }

    /// Send a message into a conversation
    ///
    /// # Arguments
    /// * `state` - Application state owning the conversation
    /// * `conversation_id` - Target conversation
    /// * `sender_id` - Sending user; must be a participant
    /// * `text` - Message text, stored as typed
    ///
    /// # Returns
    /// * `Ok(SendOutcome::Delivered)` - Message appended
    /// * `Ok(SendOutcome::Rejected)` - Blocked by the safety filter
    ///
    /// # Errors
    /// * `Error::Validation` - Blank text or sender not in the conversation
    /// * `Error::NotFound` - Unknown conversation
    pub async fn send(
        &self,
        state: &mut AppState,
        conversation_id: &str,
        sender_id: &str,
        text: &str,
    ) -> Result<SendOutcome> {
        self.send_with_cancel(state, conversation_id, sender_id, text, &CancellationToken::new())
            .await
    }

    /// Send a message, abandoning remote screening if `cancel` fires
    ///
    /// See [`ChatSession::send`].
    pub async fn send_with_cancel(
        &self,
        state: &mut AppState,
        conversation_id: &str,
        sender_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<SendOutcome> {
        if text.trim().is_empty() {
            return Err(Error::Validation("message is empty".to_string()));
        }

        let conversation = state
            .get_conversation(conversation_id)
            .ok_or_else(|| Error::NotFound(format!("conversation {}", conversation_id)))?;
        if !conversation.involves(sender_id) {
            return Err(Error::Validation(format!(
                "{} is not a participant in conversation {}",
                sender_id, conversation_id
            )));
        }

        let verdict = self.filter.screen_with_cancel(text, cancel).await;
        if !verdict.is_safe {
            info!("Message to {} rejected", conversation_id);
            return Ok(SendOutcome::Rejected {
                reason: verdict.reason_or_default(),
            });
        }

        let conversation = state
            .get_conversation_mut(conversation_id)
            .ok_or_else(|| Error::NotFound(format!("conversation {}", conversation_id)))?;

        let message = Message::new(sender_id, text);
        conversation.append_message(message.clone());
        info!("Message {} delivered to {}", message.id, conversation_id);

        Ok(SendOutcome::Delivered(message))
    }
}

/// Get or create the conversation between `user_id` and a listing's seller
///
/// Reopening an existing conversation clears its unread counter.
///
/// # Returns
/// The conversation ID
pub fn open_conversation(state: &mut AppState, listing: &Listing, user_id: &str) -> String {
    if let Some(existing) = state.find_conversation_mut(&listing.id, user_id) {
        existing.mark_read();
        return existing.id.clone();
    }

    let conversation = Conversation::new(
        listing.id.clone(),
        listing.title.clone(),
        [user_id.to_string(), listing.seller_id.clone()],
        listing.seller_name.clone(),
    );
    info!(
        "Opened conversation {} on listing {}",
        conversation.id, listing.id
    );
    state.add_conversation(conversation)
}
