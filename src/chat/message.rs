use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single conversation message, in the wire shape the chat endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Callback invoked with the full list after every mutation.
pub type MessageObserver = Box<dyn Fn(&[ChatMessage]) + Send + Sync>;

/// Observable ordered message list.
///
/// Every mutating call notifies each observer exactly once and bumps
/// `revision`. Observers run while the list is locked and must not touch it.
#[derive(Default)]
pub struct MessageList {
    messages: Vec<ChatMessage>,
    observers: Vec<MessageObserver>,
    revision: u64,
}

/// Shared handle given to the engine; the caller keeps ownership.
pub type SharedMessages = Arc<Mutex<MessageList>>;

/// Lock a shared list, recovering from a poisoned observer panic.
pub fn lock(shared: &SharedMessages) -> MutexGuard<'_, MessageList> {
    shared.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl std::fmt::Debug for MessageList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageList")
            .field("messages", &self.messages)
            .field("observers", &self.observers.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl MessageList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> SharedMessages {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn subscribe(&mut self, observer: impl Fn(&[ChatMessage]) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of mutations so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append a message. Returns its index.
    pub fn push(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.notify();
        self.messages.len() - 1
    }

    /// Overwrite the content of the message at `index` if it is the last one.
    pub fn set_last_content(&mut self, index: usize, content: &str) -> bool {
        if index + 1 != self.messages.len() {
            return false;
        }
        let last = &mut self.messages[index];
        content.clone_into(&mut last.content);
        self.notify();
        true
    }

    /// Remove the message at `index` if it is the last one.
    pub fn pop_if_last(&mut self, index: usize) -> Option<ChatMessage> {
        if index + 1 != self.messages.len() {
            return None;
        }
        let removed = self.messages.pop();
        self.notify();
        removed
    }

    pub fn replace(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
        self.notify();
    }

    fn notify(&mut self) {
        self.revision += 1;
        for observer in &self.observers {
            observer(&self.messages);
        }
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
