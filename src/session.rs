//! Application session
//!
//! `Session` is the explicit application context: it owns the local
//! [`AppState`] and routes every privileged action through the
//! [`ActionGate`], every verification step through the user's
//! [`Verification`](crate::verification::Verification) record, and every
//! chat message through the [`ChatSession`].

use crate::{
    classifier::{GeminiClient, TextModel},
    gate::{ActionGate, GateDecision, GatedAction, Redirect},
    marketplace::{
        self, Category, Condition, Listing, ListingDraft, ListingKind, ListingReport,
        Notification, NotificationKind, ReportReason, DESCRIPTION_ERROR_FALLBACK,
    },
    messaging::{self, ChatSession, SendOutcome},
    safety::SafetyFilter,
    storage::{AppState, UserProfile},
    verification::{IdentityInfo, VerificationCheck, VerificationState},
    Error, Result,
};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Result of a gated operation
#[derive(Debug, Clone, PartialEq)]
pub enum Gated<T> {
    /// The gate allowed the action and it ran
    Done(T),
    /// The gate refused; present `redirect` instead
    Denied {
        /// The refused action (now pending on the gate)
        action: GatedAction,
        /// What to present instead
        redirect: Redirect,
    },
}

impl<T> Gated<T> {
    /// Whether the action ran
    pub fn is_done(&self) -> bool {
        matches!(self, Gated::Done(_))
    }

    /// The action's result, if it ran
    pub fn done(self) -> Option<T> {
        match self {
            Gated::Done(value) => Some(value),
            Gated::Denied { .. } => None,
        }
    }
}

/// Verification state after a transition, plus any action it unblocked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationUpdate {
    /// New state
    pub state: VerificationState,
    /// Previously denied action that may now be re-initiated
    pub resumable: Option<GatedAction>,
}

/// Application context for one signed-in user
pub struct Session {
    state: AppState,
    gate: ActionGate,
    chat: ChatSession,
    model: Option<Arc<dyn TextModel>>,
}

impl Session {
    /// Create a session over existing state
    ///
    /// `model` backs both the remote screening stage and the listing
    /// assistant; pass `None` to run with local rules only.
    pub fn new(state: AppState, model: Option<Arc<dyn TextModel>>) -> Self {
        let filter = SafetyFilter::from_settings(&state.settings, model.clone());
        Self {
            state,
            gate: ActionGate::new(),
            chat: ChatSession::new(filter),
            model,
        }
    }

    /// Create a session using the HTTP model client configured by the
    /// state's settings and the API key in the environment
    pub fn with_env_model(state: AppState) -> Result<Self> {
        let model = GeminiClient::from_settings(&state.settings)?
            .map(|client| Arc::new(client) as Arc<dyn TextModel>);
        if model.is_none() {
            info!("No model API key configured; remote screening disabled");
        }
        Ok(Self::new(state, model))
    }

    /// Load state from `path` and create a session over it
    pub fn load<P: AsRef<Path>>(path: P, model: Option<Arc<dyn TextModel>>) -> Result<Self> {
        Ok(Self::new(AppState::load(path)?, model))
    }

    /// Save the state snapshot to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.state.save(path)
    }

    /// Save the state snapshot to the configured `state_path`
    pub fn save_default(&self) -> Result<()> {
        self.state.save(&self.state.settings.state_path)
    }

    /// Current application state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Consume the session, returning its state
    pub fn into_state(self) -> AppState {
        self.state
    }

    /// The action gate
    pub fn gate(&self) -> &ActionGate {
        &self.gate
    }

    /// Sign in as a new, unverified user
    pub fn sign_in(&mut self, name: impl Into<String>, email: impl Into<String>) -> &UserProfile {
        self.gate.clear_pending();
        self.state.sign_in(name, email)
    }

    /// Sign out
    pub fn sign_out(&mut self) {
        self.gate.clear_pending();
        self.state.sign_out();
    }

    /// The signed-in user
    pub fn user(&self) -> Result<&UserProfile> {
        self.state.current_user()
    }

    /// Verification state of the signed-in user
    pub fn verification_status(&self) -> Result<VerificationState> {
        Ok(self.user()?.verification.status().clone())
    }

    fn consult(&mut self, action: GatedAction) -> Result<GateDecision> {
        let status = self.verification_status()?;
        Ok(self.gate.attempt(action, &status))
    }

    // ========== Gated actions ==========

    /// Post a new listing
    ///
    /// # Returns
    /// The new listing's ID, or a denial if the user is not verified
    ///
    /// # Errors
    /// `Error::Validation` if the draft is incomplete
    pub fn create_listing(&mut self, draft: ListingDraft) -> Result<Gated<String>> {
        if let GateDecision::Denied { action, redirect } =
            self.consult(GatedAction::CreateListing)?
        {
            return Ok(Gated::Denied { action, redirect });
        }
        draft.validate()?;

        let user = self.state.current_user()?;
        let listing = Listing::from_draft(draft, user.id.clone(), user.name.clone());
        let id = listing.id.clone();
        let title = listing.title.clone();

        self.state.listings.insert(0, listing);
        self.state.notify(Notification::new(
            NotificationKind::Success,
            "Listing Created",
            format!("Your listing \"{}\" is now live.", title),
        ));
        info!("Listing {} created", id);

        Ok(Gated::Done(id))
    }

    /// Open (or reopen) a chat with a listing's seller
    ///
    /// # Returns
    /// The conversation ID, or a denial if the user is not verified
    ///
    /// # Errors
    /// * `Error::NotFound` - Unknown listing
    /// * `Error::Validation` - The user is the seller
    pub fn open_chat(&mut self, listing_id: &str) -> Result<Gated<String>> {
        let listing = self.listing(listing_id)?.clone();
        let user_id = self.user()?.id.clone();
        if listing.seller_id == user_id {
            return Err(Error::Validation("cannot chat about your own listing".to_string()));
        }

        let action = GatedAction::OpenChat {
            listing_id: listing_id.to_string(),
        };
        if let GateDecision::Denied { action, redirect } = self.consult(action)? {
            return Ok(Gated::Denied { action, redirect });
        }

        Ok(Gated::Done(messaging::open_conversation(
            &mut self.state,
            &listing,
            &user_id,
        )))
    }

    /// Pay for (or rent) a listing
    ///
    /// No funds move; the listing is marked sold or rented and the user is
    /// told the payment is held in escrow.
    ///
    /// # Errors
    /// * `Error::NotFound` - Unknown listing
    /// * `Error::Validation` - Own listing, or no longer available
    pub fn request_payment(&mut self, listing_id: &str) -> Result<Gated<()>> {
        let listing = self.listing(listing_id)?;
        if !listing.is_available() {
            return Err(Error::Validation(format!(
                "listing {} is no longer available",
                listing_id
            )));
        }
        if listing.seller_id == self.user()?.id {
            return Err(Error::Validation("cannot pay for your own listing".to_string()));
        }

        let action = GatedAction::Payment {
            listing_id: listing_id.to_string(),
        };
        if let GateDecision::Denied { action, redirect } = self.consult(action)? {
            return Ok(Gated::Denied { action, redirect });
        }

        let listing = self.listing_mut(listing_id)?;
        listing.status = listing.status_after_payment();
        let notice = format!(
            "Payment for \"{}\" is held in escrow until you receive the item.",
            listing.title
        );

        let user_id = self.user()?.id.clone();
        if let Some(conversation) = self.state.find_conversation_mut(listing_id, &user_id) {
            conversation.post_notice(notice.clone());
        }
        self.state.notify(Notification::new(
            NotificationKind::Success,
            "Secure Escrow Payment",
            notice,
        ));
        info!("Payment recorded for listing {}", listing_id);

        Ok(Gated::Done(()))
    }

    // ========== Verification ==========

    /// Submit identity details
    ///
    /// # Errors
    /// * `Error::Validation` - A required field is blank (state unchanged)
    /// * `Error::InvalidTransition` - Already verified
    pub fn submit_verification(&mut self, identity: IdentityInfo) -> Result<VerificationState> {
        let user = self.state.current_user_mut()?;
        let faculty = identity.faculty.trim().to_string();
        let state = user.verification.submit(identity)?;
        user.faculty = Some(faculty);
        Ok(state)
    }

    /// Mark the pending verification as successful
    ///
    /// # Errors
    /// `Error::InvalidTransition` unless verification is pending
    pub fn complete_verification(&mut self) -> Result<VerificationUpdate> {
        let state = self.state.current_user_mut()?.verification.complete()?;
        Ok(self.after_verification(state))
    }

    /// Run the simulated identity check against the pending verification
    ///
    /// # Errors
    /// `Error::InvalidTransition` unless verification is pending
    pub async fn run_verification<F>(
        &mut self,
        check: &VerificationCheck,
        on_step: F,
    ) -> Result<VerificationUpdate>
    where
        F: FnMut(&str),
    {
        let user = self.state.current_user_mut()?;
        let state = check.run(&mut user.verification, on_step).await?;
        Ok(self.after_verification(state))
    }

    /// A check configured with the settings' step delay
    pub fn verification_check(&self) -> VerificationCheck {
        VerificationCheck::new(self.state.settings.verification_step_delay())
    }

    fn after_verification(&mut self, state: VerificationState) -> VerificationUpdate {
        let resumable = self.gate.on_verification_changed(&state);
        if let VerificationState::Rejected { reason } = &state {
            self.state.notify(Notification::new(
                NotificationKind::Alert,
                "Verification Failed",
                reason.clone(),
            ));
        }
        VerificationUpdate { state, resumable }
    }

    // ========== Chat ==========

    /// Send a message as the signed-in user
    ///
    /// See [`ChatSession::send`].
    pub async fn send_message(&mut self, conversation_id: &str, text: &str) -> Result<SendOutcome> {
        self.send_message_with_cancel(conversation_id, text, &CancellationToken::new())
            .await
    }

    /// Send a message, abandoning remote screening if `cancel` fires
    pub async fn send_message_with_cancel(
        &mut self,
        conversation_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<SendOutcome> {
        let sender_id = self.user()?.id.clone();
        self.chat
            .send_with_cancel(&mut self.state, conversation_id, &sender_id, text, cancel)
            .await
    }

    // ========== Dashboard ==========

    /// Mark one of the user's listings as sold
    pub fn mark_sold(&mut self, listing_id: &str) -> Result<()> {
        self.ensure_owner(listing_id)?;
        self.listing_mut(listing_id)?.status = marketplace::ListingStatus::Sold;
        Ok(())
    }

    /// Delete one of the user's listings
    pub fn delete_listing(&mut self, listing_id: &str) -> Result<()> {
        self.ensure_owner(listing_id)?;
        self.state.listings.retain(|l| l.id != listing_id);
        info!("Listing {} deleted", listing_id);
        Ok(())
    }

    /// Add or remove a listing from the wishlist
    ///
    /// # Returns
    /// Whether the listing is now saved
    pub fn toggle_saved(&mut self, listing_id: &str) -> Result<bool> {
        self.listing(listing_id)?;
        Ok(self.state.current_user_mut()?.toggle_saved(listing_id))
    }

    /// Report a listing for moderator review
    ///
    /// Reporting is open to every signed-in user, verified or not.
    ///
    /// # Returns
    /// The report ID
    ///
    /// # Errors
    /// * `Error::NotFound` - Unknown listing
    /// * `Error::Validation` - The user is the seller
    pub fn report_listing(
        &mut self,
        listing_id: &str,
        reason: ReportReason,
        details: &str,
    ) -> Result<String> {
        let listing = self.listing(listing_id)?;
        let reporter_id = self.user()?.id.clone();
        if listing.seller_id == reporter_id {
            return Err(Error::Validation("cannot report your own listing".to_string()));
        }

        let report = ListingReport::new(listing_id, reporter_id, reason, details);
        let id = report.id.clone();
        info!(
            "Listing {} reported by {}: {}",
            listing_id, report.reporter_id, reason
        );
        self.state.reports.push(report);
        self.state.notify(Notification::new(
            NotificationKind::Success,
            "Report Submitted",
            "Thanks for keeping CampusTrade safe. Our team will review this listing.",
        ));

        Ok(id)
    }

    /// Mark every notification as read
    pub fn mark_notifications_read(&mut self) {
        for notification in &mut self.state.notifications {
            notification.is_read = true;
        }
    }

    /// Draft a listing description with the text model
    ///
    /// Without a model this returns the error fallback text.
    pub async fn describe_listing(
        &self,
        title: &str,
        category: Category,
        condition: Condition,
        kind: &ListingKind,
    ) -> String {
        match &self.model {
            Some(model) => {
                marketplace::describe_listing(model.as_ref(), title, category, condition, kind)
                    .await
            }
            None => DESCRIPTION_ERROR_FALLBACK.to_string(),
        }
    }

    fn listing(&self, listing_id: &str) -> Result<&Listing> {
        self.state
            .get_listing(listing_id)
            .ok_or_else(|| Error::NotFound(format!("listing {}", listing_id)))
    }

    fn listing_mut(&mut self, listing_id: &str) -> Result<&mut Listing> {
        self.state
            .get_listing_mut(listing_id)
            .ok_or_else(|| Error::NotFound(format!("listing {}", listing_id)))
    }

    fn ensure_owner(&self, listing_id: &str) -> Result<()> {
        if self.listing(listing_id)?.seller_id != self.user()?.id {
            return Err(Error::Validation(format!(
                "listing {} belongs to another seller",
                listing_id
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("gate", &self.gate)
            .field("chat", &self.chat)
            .field("model", &self.model.is_some())
            .finish()
    }
}
