//! Local storage module
//!
//! This module holds the records the app keeps locally:
//! - `user` - Signed-in user profile and its verification record
//! - `message` - Chat message records
//! - `conversation` - Conversation history per listing
//! - `settings` - Application settings and configuration
//! - `app_state` - JSON snapshot of the whole local state

pub mod app_state;
pub mod conversation;
pub mod message;
pub mod settings;
pub mod user;

pub use app_state::AppState;
pub use conversation::Conversation;
pub use message::Message;
pub use settings::Settings;
pub use user::UserProfile;
