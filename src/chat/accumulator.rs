//! Message accumulator — folds streamed fragments into the message list.
//!
//! DESIGN
//! ======
//! The accumulator owns the turn bookkeeping (where the user message went,
//! which list entry is the in-progress reply, the cumulative reply text) and
//! borrows the list through a shared handle. It is the only writer to that
//! list while a turn is active.
//!
//! A user message stays uncommitted until `begin_assistant_turn`. Dropping
//! the accumulator before that point rolls it back, so an abandoned request
//! never leaves an unanswered user message in the list.

use tracing::{debug, warn};

use super::message::{ChatMessage, SharedMessages, lock};
use crate::stream::FragmentSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Idle,
    /// Reply in progress. `index` is the list entry once the first fragment landed.
    Active { index: Option<usize> },
    Ended,
}

#[derive(Debug)]
pub struct MessageAccumulator {
    messages: SharedMessages,
    user_index: Option<usize>,
    pending: String,
    state: TurnState,
}

impl MessageAccumulator {
    #[must_use]
    pub fn new(messages: SharedMessages) -> Self {
        Self { messages, user_index: None, pending: String::new(), state: TurnState::Idle }
    }

    /// Push the user's message and return the history to send upstream,
    /// which includes it.
    pub fn append_user_turn(&mut self, text: &str) -> Vec<ChatMessage> {
        let mut list = lock(&self.messages);
        self.user_index = Some(list.push(ChatMessage::user(text)));
        list.messages().to_vec()
    }

    /// Undo [`MessageAccumulator::append_user_turn`] after the request failed
    /// to start. Only removes the message if it is still the last entry.
    pub fn rollback_user_turn(&mut self) -> bool {
        let Some(index) = self.user_index.take() else {
            return false;
        };
        lock(&self.messages).pop_if_last(index).is_some()
    }

    /// Commit the user message and start collecting the reply.
    pub fn begin_assistant_turn(&mut self) {
        self.user_index = None;
        self.pending.clear();
        self.state = TurnState::Active { index: None };
    }

    /// Finalize the reply and return its text. Later fragments are ignored.
    pub fn end_turn(&mut self) -> String {
        self.state = TurnState::Ended;
        std::mem::take(&mut self.pending)
    }

    /// Cumulative reply text so far.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.pending
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, TurnState::Active { .. })
    }
}

impl FragmentSink for MessageAccumulator {
    fn apply_fragment(&mut self, fragment: &str) {
        let TurnState::Active { index } = self.state else {
            warn!(len = fragment.len(), "accumulator: fragment outside an active turn ignored");
            return;
        };
        self.pending.push_str(fragment);

        let mut list = lock(&self.messages);
        let updated = index.is_some_and(|i| list.set_last_content(i, &self.pending));
        if !updated {
            let i = list.push(ChatMessage::assistant(self.pending.clone()));
            self.state = TurnState::Active { index: Some(i) };
        }
    }
}

impl Drop for MessageAccumulator {
    fn drop(&mut self) {
        if self.user_index.is_some() && self.rollback_user_turn() {
            debug!("accumulator: uncommitted user message rolled back on drop");
        }
    }
}

#[cfg(test)]
#[path = "accumulator_test.rs"]
mod tests;
