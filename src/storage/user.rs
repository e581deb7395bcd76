//! Signed-in user profile

use crate::verification::Verification;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The local user's profile and verification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Institutional email
    pub email: String,
    /// Faculty, once known
    #[serde(default)]
    pub faculty: Option<String>,
    /// Wishlist
    #[serde(default)]
    pub saved_listing_ids: Vec<String>,
    /// Identity verification progress
    #[serde(default)]
    pub verification: Verification,
}

impl UserProfile {
    /// Create an unverified user
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            faculty: None,
            saved_listing_ids: Vec::new(),
            verification: Verification::new(),
        }
    }

    /// Toggle a listing on the wishlist, returning whether it is now saved
    pub fn toggle_saved(&mut self, listing_id: &str) -> bool {
        if let Some(pos) = self.saved_listing_ids.iter().position(|id| id == listing_id) {
            self.saved_listing_ids.remove(pos);
            false
        } else {
            self.saved_listing_ids.push(listing_id.to_string());
            true
        }
    }
}
