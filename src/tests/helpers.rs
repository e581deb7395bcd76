// Shared test helpers: a scripted text model and session fixtures

use crate::classifier::{GenerateRequest, TextModel};
use crate::marketplace::{Category, Condition, Listing, ListingDraft, ListingKind};
use crate::session::Session;
use crate::storage::AppState;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What the stub model does when called
pub enum StubReply {
    /// Return this text
    Text(String),
    /// Return an error
    Fail,
    /// Never complete
    Hang,
}

/// Text model that replays a fixed reply and counts calls
pub struct StubModel {
    reply: StubReply,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl StubModel {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(StubReply::Text(text.to_string()))
    }

    pub fn safe() -> Arc<Self> {
        Self::replying(r#"{"isSafe": true}"#)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextModel for StubModel {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            StubReply::Text(text) => Ok(text.clone()),
            StubReply::Fail => Err(Error::Classifier("stub failure".to_string())),
            StubReply::Hang => Ok(std::future::pending::<String>().await),
        }
    }
}

pub fn sample_draft() -> ListingDraft {
    ListingDraft {
        title: "Scientific Calculator fx-991ES".to_string(),
        description: "Works perfectly, used for one semester.".to_string(),
        kind: ListingKind::Sell { price: 12000.0 },
        category: Category::Electronics,
        condition: Condition::Good,
    }
}

/// A session with one listing owned by another seller
///
/// Returns the session (no user signed in yet) and the listing ID.
pub fn session_with_listing(model: Option<Arc<StubModel>>) -> (Session, String) {
    let mut state = AppState::new();
    let listing = Listing::from_draft(sample_draft(), "seller-1", "Tunde Bakare");
    let listing_id = listing.id.clone();
    state.listings.push(listing);

    let model = model.map(|m| m as Arc<dyn TextModel>);
    (Session::new(state, model), listing_id)
}
