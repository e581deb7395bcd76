//! CampusTrade - trust & safety core for a student marketplace
//!
//! This library provides the parts of the CampusTrade marketplace that carry
//! real rules: identity verification, the action gate that keeps unverified
//! users out of privileged actions, and the moderation filter every chat
//! message passes through before it is stored.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod gate;
pub mod marketplace;
pub mod messaging;
pub mod safety;
pub mod session;
pub mod storage;
pub mod verification;

/// Result type alias for CampusTrade operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for CampusTrade operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input failed validation (blank verification fields, empty message, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Verification transition not allowed from the current state
    #[error("Invalid transition: cannot {action} while {from}")]
    InvalidTransition {
        /// State the machine was in
        from: String,
        /// Transition that was attempted
        action: String,
    },

    /// Operation needs a signed-in user
    #[error("No user is signed in")]
    NotSignedIn,

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Text model / classifier error
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Storage operation error
    #[error("Storage error: {0}")]
    Storage(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Initialize the CampusTrade library with logging
pub fn init() {
    tracing_subscriber::fmt::init();
}

#[cfg(test)]
mod tests;
