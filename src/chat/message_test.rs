use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

// =============================================================
// ChatMessage wire shape
// =============================================================

#[test]
fn chat_message_serializes_lowercase_role() {
    let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
    assert_eq!(json, serde_json::json!({ "role": "user", "content": "hi" }));
}

#[test]
fn chat_message_deserializes_assistant() {
    let msg: ChatMessage = serde_json::from_str(r#"{"role":"assistant","content":"Hello!"}"#).unwrap();
    assert_eq!(msg, ChatMessage::assistant("Hello!"));
}

// =============================================================
// MessageList notifications
// =============================================================

#[test]
fn every_mutation_notifies_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut list = MessageList::new();
    let seen = calls.clone();
    list.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let idx = list.push(ChatMessage::assistant("a"));
    assert!(list.set_last_content(idx, "ab"));
    assert!(list.pop_if_last(idx).is_some());
    list.replace(vec![ChatMessage::user("x")]);

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(list.revision(), 4);
}

#[test]
fn observer_sees_updated_list() {
    let latest = Arc::new(Mutex::new(Vec::new()));
    let mut list = MessageList::new();
    let sink = latest.clone();
    list.subscribe(move |messages| {
        *sink.lock().unwrap() = messages.to_vec();
    });

    let idx = list.push(ChatMessage::assistant("Hel"));
    list.set_last_content(idx, "Hello");
    assert_eq!(*latest.lock().unwrap(), vec![ChatMessage::assistant("Hello")]);
}

#[test]
fn set_last_content_refuses_stale_index() {
    let mut list = MessageList::new();
    let first = list.push(ChatMessage::assistant("old"));
    list.push(ChatMessage::user("new"));
    let before = list.revision();

    assert!(!list.set_last_content(first, "changed"));
    assert_eq!(list.messages()[0].content, "old");
    assert_eq!(list.revision(), before);
}

#[test]
fn pop_if_last_refuses_stale_index() {
    let mut list = MessageList::new();
    let first = list.push(ChatMessage::user("a"));
    list.push(ChatMessage::assistant("b"));
    assert!(list.pop_if_last(first).is_none());
    assert_eq!(list.len(), 2);
}

#[test]
fn shared_lock_round_trip() {
    let shared = MessageList::shared();
    lock(&shared).push(ChatMessage::user("hi"));
    assert_eq!(lock(&shared).last(), Some(&ChatMessage::user("hi")));
    assert!(!lock(&shared).is_empty());
}
