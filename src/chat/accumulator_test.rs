use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::chat::message::{MessageList, Role};

fn counted_list() -> (SharedMessages, Arc<AtomicUsize>) {
    let shared = MessageList::shared();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    lock(&shared).subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (shared, calls)
}

#[test]
fn append_user_turn_returns_history_with_new_message() {
    let shared = MessageList::shared();
    lock(&shared).push(ChatMessage::assistant("Hello, how can I help you?"));
    let mut acc = MessageAccumulator::new(shared.clone());

    let history = acc.append_user_turn("hi");
    assert_eq!(history, vec![ChatMessage::assistant("Hello, how can I help you?"), ChatMessage::user("hi")]);
    assert_eq!(lock(&shared).len(), 2);
}

#[test]
fn fragments_concatenate_in_order() {
    let fragments = ["Hel", "lo", ", ", "Raj", "put", "!"];
    let shared = MessageList::shared();
    let mut acc = MessageAccumulator::new(shared.clone());
    acc.append_user_turn("hi");
    acc.begin_assistant_turn();
    for f in fragments {
        acc.apply_fragment(f);
    }

    let list = lock(&shared);
    assert_eq!(list.len(), 2);
    assert_eq!(list.messages()[1], ChatMessage::assistant(fragments.concat()));
    assert_eq!(acc.text(), "Hello, Rajput!");
}

#[test]
fn one_notification_per_fragment() {
    let (shared, calls) = counted_list();
    let mut acc = MessageAccumulator::new(shared);
    acc.append_user_turn("hi");
    let after_user = calls.load(Ordering::SeqCst);

    acc.begin_assistant_turn();
    acc.apply_fragment("a");
    acc.apply_fragment("b");
    acc.apply_fragment("c");

    assert_eq!(calls.load(Ordering::SeqCst) - after_user, 3);
}

#[test]
fn first_fragment_creates_assistant_entry_even_after_greeting() {
    let shared = MessageList::shared();
    lock(&shared).push(ChatMessage::assistant("greeting"));
    let mut acc = MessageAccumulator::new(shared.clone());
    acc.begin_assistant_turn();
    acc.apply_fragment("reply");

    let list = lock(&shared);
    assert_eq!(list.len(), 2);
    assert_eq!(list.messages()[0].content, "greeting");
    assert_eq!(list.messages()[1].content, "reply");
}

#[test]
fn new_turn_starts_fresh_text() {
    let shared = MessageList::shared();
    let mut acc = MessageAccumulator::new(shared.clone());
    acc.begin_assistant_turn();
    acc.apply_fragment("first");
    assert_eq!(acc.end_turn(), "first");

    acc.append_user_turn("again");
    acc.begin_assistant_turn();
    acc.apply_fragment("second");

    let list = lock(&shared);
    let roles: Vec<Role> = list.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(list.messages()[0].content, "first");
    assert_eq!(list.messages()[2].content, "second");
}

#[test]
fn fragments_after_end_turn_are_ignored() {
    let (shared, calls) = counted_list();
    let mut acc = MessageAccumulator::new(shared.clone());
    acc.begin_assistant_turn();
    acc.apply_fragment("done");
    acc.end_turn();
    let before = calls.load(Ordering::SeqCst);

    acc.apply_fragment("late");
    assert_eq!(calls.load(Ordering::SeqCst), before);
    assert_eq!(lock(&shared).messages()[0].content, "done");
    assert!(!acc.is_active());
}

#[test]
fn rollback_removes_user_message() {
    let shared = MessageList::shared();
    let mut acc = MessageAccumulator::new(shared.clone());
    acc.append_user_turn("hi");
    assert!(acc.rollback_user_turn());
    assert!(lock(&shared).is_empty());
    assert!(!acc.rollback_user_turn());
}

#[test]
fn rollback_leaves_list_alone_when_user_message_not_last() {
    let shared = MessageList::shared();
    let mut acc = MessageAccumulator::new(shared.clone());
    acc.append_user_turn("hi");
    lock(&shared).push(ChatMessage::assistant("someone else"));
    assert!(!acc.rollback_user_turn());
    assert_eq!(lock(&shared).len(), 2);
}

#[test]
fn dropping_before_reply_starts_rolls_back_user_message() {
    let shared = MessageList::shared();
    lock(&shared).push(ChatMessage::assistant("greeting"));
    {
        let mut acc = MessageAccumulator::new(shared.clone());
        acc.append_user_turn("hi");
        assert_eq!(lock(&shared).len(), 2);
    }
    assert_eq!(lock(&shared).messages(), &[ChatMessage::assistant("greeting")]);
}

#[test]
fn dropping_after_reply_starts_keeps_everything() {
    let shared = MessageList::shared();
    {
        let mut acc = MessageAccumulator::new(shared.clone());
        acc.append_user_turn("hi");
        acc.begin_assistant_turn();
        acc.apply_fragment("partial");
    }
    assert_eq!(lock(&shared).messages(), &[ChatMessage::user("hi"), ChatMessage::assistant("partial")]);
}
