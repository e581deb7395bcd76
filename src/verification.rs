//! Identity verification
//!
//! Tracks a user's progress through institutional identity verification:
//!
//! ```text
//! Unverified --submit--> Pending --complete--> Verified
//!                          |  ^
//!                   reject |  | submit
//!                          v  |
//!                        Rejected
//! ```
//!
//! `Verified` is terminal. The biometric / roster check itself is simulated by
//! [`VerificationCheck`].

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Steps reported while the simulated check runs
pub const CHECK_STEPS: &[&str] = &[
    "Scanning facial features...",
    "Accessing School Database...",
    "Matching Biometric Data...",
];

/// Step reported when the check succeeds
pub const CHECK_SUCCESS: &str = "Identity Verified.";

/// Step reported when the check finds a mismatch
pub const CHECK_MISMATCH: &str = "Identity Mismatch.";

/// Default pause between simulated check steps
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(2);

/// Where a user is in the verification flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationState {
    /// Nothing submitted yet
    Unverified,
    /// Identity submitted, awaiting the check
    Pending,
    /// Check passed; privileged actions unlocked
    Verified,
    /// Check failed; the user may resubmit
    Rejected {
        /// Why the check failed
        reason: String,
    },
}

impl VerificationState {
    /// Whether privileged actions are allowed
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationState::Verified)
    }
}

impl Default for VerificationState {
    fn default() -> Self {
        Self::Unverified
    }
}

impl fmt::Display for VerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationState::Unverified => write!(f, "unverified"),
            VerificationState::Pending => write!(f, "pending"),
            VerificationState::Verified => write!(f, "verified"),
            VerificationState::Rejected { .. } => write!(f, "rejected"),
        }
    }
}

/// Identity details a user submits for verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInfo {
    /// Full legal name
    pub full_name: String,
    /// Institutional ID / matric number
    pub id_number: String,
    /// Faculty or department
    pub faculty: String,
}

impl IdentityInfo {
    /// Create identity info
    pub fn new(
        full_name: impl Into<String>,
        id_number: impl Into<String>,
        faculty: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            id_number: id_number.into(),
            faculty: faculty.into(),
        }
    }

    /// Check that every required field is non-blank
    ///
    /// # Errors
    /// Returns `Error::Validation` naming the first blank field
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("full name", &self.full_name),
            ("ID number", &self.id_number),
            ("faculty", &self.faculty),
        ];

        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!("{} is required", label)));
            }
        }
        Ok(())
    }
}

/// Per-user verification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    /// Current state
    state: VerificationState,
    /// Last submitted identity
    #[serde(default)]
    identity: Option<IdentityInfo>,
    /// When the state last changed
    updated_at: DateTime<Utc>,
}

impl Verification {
    /// Create a new record in `Unverified`
    pub fn new() -> Self {
        Self {
            state: VerificationState::Unverified,
            identity: None,
            updated_at: Utc::now(),
        }
    }

    /// Current state
    pub fn status(&self) -> &VerificationState {
        &self.state
    }

    /// Last submitted identity, if any
    pub fn identity(&self) -> Option<&IdentityInfo> {
        self.identity.as_ref()
    }

    /// Whether the user is verified
    pub fn is_verified(&self) -> bool {
        self.state.is_verified()
    }

    /// Submit identity details
    ///
    /// Moves `Unverified` or `Rejected` to `Pending`. Submitting again while
    /// `Pending` replaces the stored details.
    ///
    /// # Errors
    /// * `Error::Validation` if a field is blank (state unchanged)
    /// * `Error::InvalidTransition` if already verified
    pub fn submit(&mut self, identity: IdentityInfo) -> Result<VerificationState> {
        if self.state.is_verified() {
            return Err(self.invalid("submit identity"));
        }
        identity.validate()?;

        info!(
            "Verification submitted for {} ({})",
            identity.full_name, identity.id_number
        );
        self.identity = Some(identity);
        self.transition(VerificationState::Pending);
        Ok(self.state.clone())
    }

    /// Mark a pending verification as successful
    ///
    /// # Errors
    /// `Error::InvalidTransition` unless the state is `Pending`
    pub fn complete(&mut self) -> Result<VerificationState> {
        if self.state != VerificationState::Pending {
            return Err(self.invalid("complete verification"));
        }
        self.transition(VerificationState::Verified);
        Ok(self.state.clone())
    }

    /// Mark a pending verification as failed
    ///
    /// # Errors
    /// `Error::InvalidTransition` unless the state is `Pending`
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<VerificationState> {
        if self.state != VerificationState::Pending {
            return Err(self.invalid("reject verification"));
        }
        self.transition(VerificationState::Rejected {
            reason: reason.into(),
        });
        Ok(self.state.clone())
    }

    fn transition(&mut self, next: VerificationState) {
        info!("Verification state: {} -> {}", self.state, next);
        self.state = next;
        self.updated_at = Utc::now();
    }

    fn invalid(&self, action: &str) -> Error {
        Error::InvalidTransition {
            from: self.state.to_string(),
            action: action.to_string(),
        }
    }
}

impl Default for Verification {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides whether submitted details match the institutional roster
///
/// Returns `Some(reason)` on a mismatch.
pub type RosterMatcher = Box<dyn Fn(&IdentityInfo) -> Option<String> + Send + Sync>;

/// Simulated multi-step identity check
///
/// Always succeeds unless a [`RosterMatcher`] reports a mismatch.
pub struct VerificationCheck {
    step_delay: Duration,
    matcher: Option<RosterMatcher>,
}

impl VerificationCheck {
    /// Create a check with the given pause between steps
    pub fn new(step_delay: Duration) -> Self {
        Self {
            step_delay,
            matcher: None,
        }
    }

    /// Install a roster matcher
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&IdentityInfo) -> Option<String> + Send + Sync + 'static,
    {
        self.matcher = Some(Box::new(matcher));
        self
    }

    /// Run the check against a pending verification
    ///
    /// Each step is passed to `on_step` as it starts. Ends in `Verified`, or in
    /// `Rejected` if the matcher reports a mismatch.
    ///
    /// # Errors
    /// `Error::InvalidTransition` unless the state is `Pending`
    pub async fn run<F>(
        &self,
        verification: &mut Verification,
        mut on_step: F,
    ) -> Result<VerificationState>
    where
        F: FnMut(&str),
    {
        if verification.status() != &VerificationState::Pending {
            return Err(verification.invalid("run verification check"));
        }

        for step in CHECK_STEPS {
            info!("Verification check: {}", step);
            on_step(step);
            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }
        }

        let mismatch = match (&self.matcher, verification.identity()) {
            (Some(matcher), Some(identity)) => matcher(identity),
            _ => None,
        };

        match mismatch {
            Some(reason) => {
                on_step(CHECK_MISMATCH);
                verification.reject(reason)
            }
            None => {
                on_step(CHECK_SUCCESS);
                verification.complete()
            }
        }
    }
}

impl Default for VerificationCheck {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_DELAY)
    }
}

impl fmt::Debug for VerificationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationCheck")
            .field("step_delay", &self.step_delay)
            .field("matcher", &self.matcher.is_some())
            .finish()
    }
}
