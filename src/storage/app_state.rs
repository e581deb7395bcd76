//! Application state persistence and management

use crate::{
    marketplace::{Listing, ListingReport, Notification},
    storage::{conversation::Conversation, settings::Settings, user::UserProfile},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot of everything the app keeps locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// Signed-in user, if any
    pub user: Option<UserProfile>,
    /// Listings, newest first
    pub listings: Vec<Listing>,
    /// Chat conversations
    pub conversations: Vec<Conversation>,
    /// Notifications, newest first
    pub notifications: Vec<Notification>,
    /// Listing reports awaiting review
    #[serde(default)]
    pub reports: Vec<ListingReport>,
    /// Application settings
    #[serde(default)]
    pub settings: Settings,
}

impl AppState {
    /// Create a new empty application state
    pub fn new() -> Self {
        Self {
            user: None,
            listings: Vec::new(),
            conversations: Vec::new(),
            notifications: Vec::new(),
            reports: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Save the application state to a file
    ///
    /// # Arguments
    /// * `path` - Path to the state file (e.g., "campustrade_state.json")
    ///
    /// # Errors
    /// Returns an error if file operations or serialization fail
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("Failed to create state directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| Error::Storage(format!("Failed to write state file: {}", e)))?;
        Ok(())
    }

    /// Load the application state from a file
    ///
    /// # Returns
    /// A loaded `AppState` or a new empty state if the file doesn't exist
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or deserialized
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Ok(Self::new());
        }

        let json = std::fs::read_to_string(path_ref)
            .map_err(|e| Error::Storage(format!("Failed to read state file: {}", e)))?;

        let state: AppState = serde_json::from_str(&json)?;
        Ok(state)
    }

    /// Sign in, replacing any current user
    pub fn sign_in(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> &mut UserProfile {
        self.user.insert(UserProfile::new(name, email))
    }

    /// Sign out
    pub fn sign_out(&mut self) {
        self.user = None;
    }

    /// The signed-in user
    ///
    /// # Errors
    /// `Error::NotSignedIn` if nobody is signed in
    pub fn current_user(&self) -> Result<&UserProfile> {
        self.user.as_ref().ok_or(Error::NotSignedIn)
    }

    /// The signed-in user, mutably
    pub fn current_user_mut(&mut self) -> Result<&mut UserProfile> {
        self.user.as_mut().ok_or(Error::NotSignedIn)
    }

    /// Get a listing by ID
    pub fn get_listing(&self, listing_id: &str) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == listing_id)
    }

    /// Get a mutable reference to a listing by ID
    pub fn get_listing_mut(&mut self, listing_id: &str) -> Option<&mut Listing> {
        self.listings.iter_mut().find(|l| l.id == listing_id)
    }

    /// Get a conversation by ID
    pub fn get_conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    /// Get a mutable reference to a conversation by ID
    pub fn get_conversation_mut(&mut self, conversation_id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == conversation_id)
    }

    /// Find the conversation `user_id` has about a listing
    pub fn find_conversation_mut(
        &mut self,
        listing_id: &str,
        user_id: &str,
    ) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| c.listing_id == listing_id && c.involves(user_id))
    }

    /// Add a conversation, returning its ID
    pub fn add_conversation(&mut self, conversation: Conversation) -> String {
        let id = conversation.id.clone();
        self.conversations.push(conversation);
        id
    }

    /// Push a notification to the front of the list
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    /// Number of unread notifications
    pub fn unread_notifications(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
