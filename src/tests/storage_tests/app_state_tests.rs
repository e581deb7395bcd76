// AppState Tests - Testing AppState struct and its methods

use crate::marketplace::{Listing, ListingReport, Notification, NotificationKind, ReportReason};
use crate::storage::{AppState, Conversation, Message};
use crate::tests::helpers::sample_draft;
use crate::verification::{IdentityInfo, VerificationState};
use crate::Error;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_app_state_creation() {
    let state = AppState::new();

    assert!(state.user.is_none());
    assert!(state.listings.is_empty());
    assert!(state.conversations.is_empty());
    assert!(state.notifications.is_empty());
    assert!(state.reports.is_empty());
    assert!(state.settings.remote_screening_enabled);
}

#[test]
fn test_sign_in_and_out() {
    let mut state = AppState::new();
    assert!(matches!(state.current_user(), Err(Error::NotSignedIn)));

    let user_id = state.sign_in("Jane Doe", "jane@student.unilag.edu.ng").id.clone();
    let user = state.current_user().unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.verification.status(), &VerificationState::Unverified);

    state.sign_out();
    assert!(state.user.is_none());
}

#[test]
fn test_app_state_save_load_json() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let path = temp_file.path();

    let mut state = AppState::new();
    let user = state.sign_in("Jane Doe", "jane@student.unilag.edu.ng");
    user.verification
        .submit(IdentityInfo::new("Jane Doe", "190407022", "Science"))
        .unwrap();
    state
        .listings
        .push(Listing::from_draft(sample_draft(), "seller-1", "Tunde Bakare"));
    let mut conversation = Conversation::new(
        "listing-1",
        "Calculator",
        ["u1".to_string(), "u2".to_string()],
        "Tunde",
    );
    conversation.append_message(Message::new("u1", "hello"));
    state.add_conversation(conversation);
    state.notify(Notification::new(NotificationKind::Alert, "Heads up", "body"));
    state.settings.remote_screening_enabled = false;
    state
        .reports
        .push(ListingReport::new("listing-1", "u1", ReportReason::Duplicate, ""));

    state.save(path).expect("Failed to save state");
    let loaded = AppState::load(path).expect("Failed to load state");

    let user = loaded.current_user().unwrap();
    assert_eq!(user.name, "Jane Doe");
    assert_eq!(user.verification.status(), &VerificationState::Pending);
    assert_eq!(user.verification.identity().unwrap().id_number, "190407022");
    assert_eq!(loaded.listings.len(), 1);
    assert_eq!(loaded.listings[0].title, "Scientific Calculator fx-991ES");
    assert_eq!(loaded.conversations.len(), 1);
    assert_eq!(loaded.conversations[0].messages().len(), 1);
    assert_eq!(loaded.notifications.len(), 1);
    assert_eq!(loaded.reports, state.reports);
    assert!(!loaded.settings.remote_screening_enabled);
}

#[test]
fn test_app_state_load_without_reports() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    std::fs::write(
        temp_file.path(),
        r#"{"user":null,"listings":[],"conversations":[],"notifications":[]}"#,
    )
    .expect("Failed to write state");

    let state = AppState::load(temp_file.path()).expect("Failed to load state");
    assert!(state.reports.is_empty());
}

#[test]
fn test_app_state_load_missing_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let state = AppState::load(dir.path().join("missing.json")).expect("Failed to load");
    assert!(state.user.is_none());
}

#[test]
fn test_app_state_save_creates_directories() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("state.json");

    AppState::new().save(&path).expect("Failed to save");
    assert!(path.exists());
}

#[test]
fn test_app_state_load_corrupt_file() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    std::fs::write(temp_file.path(), "{not json").unwrap();

    let result = AppState::load(temp_file.path());
    assert!(matches!(result, Err(Error::JsonSerialization(_))));
}

#[test]
fn test_conversation_lookup() {
    let mut state = AppState::new();
    let id = state.add_conversation(Conversation::new(
        "listing-1",
        "Calculator",
        ["u1".to_string(), "u2".to_string()],
        "Tunde",
    ));

    assert!(state.get_conversation(&id).is_some());
    assert!(state.get_conversation_mut(&id).is_some());
    assert_eq!(state.find_conversation_mut("listing-1", "u2").unwrap().id, id);
    assert!(state.find_conversation_mut("listing-1", "u3").is_none());
    assert!(state.find_conversation_mut("listing-2", "u1").is_none());
}

#[test]
fn test_notifications_newest_first() {
    let mut state = AppState::new();
    state.notify(Notification::new(NotificationKind::Message, "first", ""));
    state.notify(Notification::new(NotificationKind::Success, "second", ""));

    assert_eq!(state.notifications[0].title, "second");
    assert_eq!(state.unread_notifications(), 2);

    state.notifications[0].is_read = true;
    assert_eq!(state.unread_notifications(), 1);
}
