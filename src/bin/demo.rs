//! CampusTrade headless demo
//!
//! Walks one user through the gated flow: denied chat, verification, then a
//! clean message and a blocked one. Uses the remote model when
//! `CAMPUSTRADE_API_KEY` (or `API_KEY`) is set, local rules otherwise.

use campustrade::{
    marketplace::{Category, Condition, Listing, ListingDraft, ListingKind},
    messaging::SendOutcome,
    session::{Gated, Session},
    storage::{AppState, Settings},
    verification::IdentityInfo,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    campustrade::init();

    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "campustrade_settings.json".to_string());
    let mut state = AppState::new();
    state.settings = Settings::load(&settings_path)?;

    // A listing from another seller to chat about
    state.listings.push(Listing::from_draft(
        ListingDraft {
            title: "Engineering Mathematics (Stroud)".to_string(),
            description: "Clean copy, no highlights.".to_string(),
            kind: ListingKind::Sell { price: 8500.0 },
            category: Category::Textbooks,
            condition: Condition::LikeNew,
        },
        "seller-1",
        "Tunde Bakare",
    ));
    let listing_id = state.listings[0].id.clone();

    let mut session = Session::with_env_model(state)?;
    session.sign_in("Jane Doe", "jane.doe@student.unilag.edu.ng");

    if let Gated::Denied { action, .. } = session.open_chat(&listing_id)? {
        println!("Denied '{}': verification required", action);
    }

    session.submit_verification(IdentityInfo::new("Jane Doe", "190407022", "Science"))?;
    let check = session.verification_check();
    let update = session
        .run_verification(&check, |step| println!("  {}", step))
        .await?;
    println!("Verification: {}", update.state);
    if let Some(action) = update.resumable {
        println!("You can now {}", action);
    }

    let Gated::Done(conversation_id) = session.open_chat(&listing_id)? else {
        anyhow::bail!("chat still gated after verification");
    };

    for text in ["Hi, is this available?", "call me on 08031234567"] {
        match session.send_message(&conversation_id, text).await? {
            SendOutcome::Delivered(message) => println!("Sent: {}", message.text),
            SendOutcome::Rejected { reason } => println!("Blocked: {}", reason),
        }
    }

    session.save_default()?;
    Ok(())
}
