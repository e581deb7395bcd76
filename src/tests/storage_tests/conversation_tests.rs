// Conversation Tests - Testing Conversation and Message structs

use crate::storage::{message::SYSTEM_SENDER, Conversation, Message};
use chrono::{TimeZone, Utc};

fn conversation() -> Conversation {
    Conversation::new(
        "listing-1",
        "Scientific Calculator",
        ["buyer-1".to_string(), "seller-1".to_string()],
        "Tunde Bakare",
    )
}

#[test]
fn test_conversation_creation() {
    let conversation = conversation();

    assert_eq!(conversation.listing_id, "listing-1");
    assert_eq!(conversation.participants, vec!["buyer-1", "seller-1"]);
    assert!(conversation.messages().is_empty());
    assert!(conversation.last_message.is_empty());
    assert_eq!(conversation.last_message_at, None);
    assert_eq!(conversation.unread_count, 0);
}

#[test]
fn test_append_updates_summary() {
    let mut conversation = conversation();
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

    conversation.append_message(Message::with_id("m1", "buyer-1", "Hello", at));
    conversation.append_message(Message::with_id(
        "m2",
        "seller-1",
        "Hi! Yes it is.",
        at + chrono::Duration::minutes(1),
    ));

    assert_eq!(conversation.messages().len(), 2);
    assert_eq!(conversation.messages()[0].id, "m1");
    assert_eq!(conversation.messages()[1].id, "m2");
    assert_eq!(conversation.last_message, "Hi! Yes it is.");
    assert_eq!(
        conversation.last_message_at,
        Some(at + chrono::Duration::minutes(1))
    );
}

#[test]
fn test_notice_counts_as_unread() {
    let mut conversation = conversation();

    let notice = conversation.post_notice("Payment is held in escrow.");
    conversation.post_notice("Seller marked the item as shipped.");
    assert!(notice.is_system_message);
    assert_eq!(notice.sender_id, SYSTEM_SENDER);
    assert_eq!(conversation.unread_count, 2);
    assert_eq!(conversation.messages()[0], notice);
    assert_eq!(conversation.last_message, "Seller marked the item as shipped.");

    conversation.mark_read();
    assert_eq!(conversation.unread_count, 0);
}

#[test]
fn test_involves() {
    let conversation = conversation();

    assert!(conversation.involves("buyer-1"));
    assert!(conversation.involves("seller-1"));
    assert!(!conversation.involves("someone-else"));
}

#[test]
fn test_message_new_has_fresh_id() {
    let a = Message::new("buyer-1", "hello");
    let b = Message::new("buyer-1", "hello");

    assert_ne!(a.id, b.id);
    assert!(!a.is_system_message);
}

#[test]
fn test_conversation_serialization() {
    let mut conversation = conversation();
    conversation.post_notice("Payment is held in escrow.");
    conversation.append_message(Message::new("buyer-1", "Is it still available?"));

    let json = serde_json::to_string(&conversation).expect("Failed to serialize");
    let loaded: Conversation = serde_json::from_str(&json).expect("Failed to deserialize");

    assert_eq!(loaded.id, conversation.id);
    assert_eq!(loaded.messages(), conversation.messages());
    assert_eq!(loaded.unread_count, 1);
    assert_eq!(loaded.last_message, "Is it still available?");
}

#[test]
fn test_message_defaults_system_flag() {
    let json = r#"{"id":"m1","sender_id":"u1","text":"hi","timestamp":"2024-03-01T10:00:00Z"}"#;
    let message: Message = serde_json::from_str(json).expect("Failed to deserialize");

    assert!(!message.is_system_message);
    assert_eq!(message.text, "hi");
}
