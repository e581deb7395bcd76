//! Action gate
//!
//! Single choke point for privileged marketplace actions. An action proceeds
//! only when the user is verified; otherwise the caller is told to show the
//! verification flow instead.
//!
//! Denied actions are remembered but never replayed. Once verification
//! succeeds, [`ActionGate::on_verification_changed`] hands the pending action
//! back so the UI can offer it again. The user re-initiates it, and it goes
//! through [`ActionGate::attempt`] a second time.

use crate::verification::VerificationState;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Privileged actions that require a verified account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatedAction {
    /// Post a new listing
    CreateListing,
    /// Start (or reopen) a chat with a seller about a listing
    OpenChat {
        /// Listing the chat is about
        listing_id: String,
    },
    /// Pay for, or rent, a listing
    Payment {
        /// Listing being paid for
        listing_id: String,
    },
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatedAction::CreateListing => write!(f, "create listing"),
            GatedAction::OpenChat { listing_id } => write!(f, "open chat on {}", listing_id),
            GatedAction::Payment { listing_id } => write!(f, "pay for {}", listing_id),
        }
    }
}

/// Where a denied caller should send the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// The identity verification flow
    Verification,
}

/// Result of consulting the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Go ahead with the action
    Proceed,
    /// Do not perform the action; show `redirect` instead
    Denied {
        /// The action that was refused
        action: GatedAction,
        /// What to present instead
        redirect: Redirect,
    },
}

impl GateDecision {
    /// Whether the action may proceed
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateDecision::Proceed)
    }
}

/// Stateless gate rule: proceed iff verified
pub fn attempt(action: &GatedAction, state: &VerificationState) -> GateDecision {
    if state.is_verified() {
        GateDecision::Proceed
    } else {
        GateDecision::Denied {
            action: action.clone(),
            redirect: Redirect::Verification,
        }
    }
}

/// Gate that remembers the last denied action
#[derive(Debug, Default, Clone)]
pub struct ActionGate {
    pending: Option<GatedAction>,
}

impl ActionGate {
    /// Create a gate with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult the gate for an action
    ///
    /// A denial records the action as pending; a successful attempt clears it.
    pub fn attempt(&mut self, action: GatedAction, state: &VerificationState) -> GateDecision {
        let decision = attempt(&action, state);
        match decision {
            GateDecision::Proceed => {
                self.pending = None;
            }
            GateDecision::Denied { .. } => {
                info!("Gate denied '{}' while {}", action, state);
                self.pending = Some(action);
            }
        }
        decision
    }

    /// The action waiting on verification, if any
    pub fn pending(&self) -> Option<&GatedAction> {
        self.pending.as_ref()
    }

    /// Re-evaluate the pending action after a verification state change
    ///
    /// Returns the pending action if the new state now permits it. The action
    /// is not executed; the caller must attempt it again.
    pub fn on_verification_changed(&mut self, state: &VerificationState) -> Option<GatedAction> {
        let action = self.pending.as_ref()?;
        if !attempt(action, state).is_proceed() {
            return None;
        }
        info!("'{}' is now permitted", action);
        self.pending.take()
    }

    /// Forget the pending action (e.g. the user closed the verification flow)
    pub fn clear_pending(&mut self) {
        self.pending = None;
    }
}
