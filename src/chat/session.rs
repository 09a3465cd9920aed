//! Chat session — one conversation driven turn by turn.
//!
//! DESIGN
//! ======
//! `send_message` runs the whole pipeline for one turn: push the user
//! message, open the upstream stream, fold fragments into the list, and
//! clear the loading flag on every exit path. A failure to start the stream
//! rolls the user message back; a failure after it started keeps whatever
//! reply text already arrived. The same split applies to `abort()` and to
//! dropping the `send_message` future: before the stream opens the user
//! message goes away, after it opens the partial reply stays.
//!
//! Only one turn runs at a time per session. A second `send_message` while
//! loading is refused rather than interleaved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::accumulator::MessageAccumulator;
use super::message::{ChatMessage, MessageList, SharedMessages, lock};
use super::transport::{ChatRequest, ChatTransport};
use crate::config::Language;
use crate::error::{ChatError, ErrorCode};
use crate::stream::{StreamEnd, read_stream};

/// Result of a completed (or cleanly cancelled) turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: String,
    pub end: StreamEnd,
    pub fragments: usize,
    pub discarded: usize,
}

pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    messages: SharedMessages,
    language: Language,
    user_name: Option<String>,
    loading: AtomicBool,
    greeted: AtomicBool,
    cancel: Mutex<CancellationToken>,
}

/// Clears the loading flag when the turn future finishes or is dropped.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>, language: Language) -> Self {
        Self {
            transport,
            messages: MessageList::shared(),
            language,
            user_name: None,
            loading: AtomicBool::new(false),
            greeted: AtomicBool::new(false),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    #[must_use]
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// `true` while a turn is streaming.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn has_greeted(&self) -> bool {
        self.greeted.load(Ordering::SeqCst)
    }

    /// Snapshot of the conversation.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.messages).messages().to_vec()
    }

    /// Observe every list mutation. See [`MessageList::subscribe`].
    ///
    /// The observer runs while the list is locked. Calling back into this
    /// session's list accessors (`messages`, `replace_messages`, ...) from
    /// inside it deadlocks; use the slice it is given.
    pub fn subscribe(&self, observer: impl Fn(&[ChatMessage]) + Send + Sync + 'static) {
        lock(&self.messages).subscribe(observer);
    }

    /// Replace the whole conversation, e.g. when switching to a stored one.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::TurnInProgress`] while a reply is streaming.
    pub fn replace_messages(&self, messages: Vec<ChatMessage>) -> Result<(), ChatError> {
        if self.is_loading() {
            return Err(ChatError::TurnInProgress);
        }
        lock(&self.messages).replace(messages);
        Ok(())
    }

    /// Open the conversation with a single assistant greeting. Only the
    /// first call has any effect; returns whether it greeted.
    pub fn send_greeting(&self) -> bool {
        if self.is_loading() || self.greeted.swap(true, Ordering::SeqCst) {
            return false;
        }
        let greeting = match &self.user_name {
            Some(name) => format!("Hello {name}, how can I help you?"),
            None => "Hello, how can I help you?".to_string(),
        };
        lock(&self.messages).replace(vec![ChatMessage::assistant(greeting)]);
        true
    }

    /// Stop the in-flight turn. While the request is still opening, the user
    /// message is rolled back; once replying, text already shown stays.
    pub fn abort(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .cancel();
    }

    /// Send `text` and stream the reply into the message list. An
    /// [`ChatSession::abort`] ends the turn with [`StreamEnd::Cancelled`].
    ///
    /// # Errors
    ///
    /// - [`ChatError::TurnInProgress`] if a reply is already streaming.
    /// - [`ChatError::StreamUnavailable`] / [`ChatError::UpstreamRejected`] if
    ///   the stream never started; the user message is removed again.
    /// - [`ChatError::StreamInterrupted`] if a read failed mid-reply; the
    ///   partial reply stays in the list.
    pub async fn send_message(&self, text: &str) -> Result<TurnOutcome, ChatError> {
        if self.loading.swap(true, Ordering::SeqCst) {
            return Err(ChatError::TurnInProgress);
        }
        let _loading = LoadingGuard(&self.loading);
        let cancel = self.fresh_cancel_token();

        let mut acc = MessageAccumulator::new(self.messages.clone());
        let history = acc.append_user_turn(text);
        info!(history = history.len(), len = text.len(), language = self.language.as_str(), "chat: turn started");

        let request = ChatRequest { messages: history, language: self.language };
        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            opened = self.transport.open_stream(&request) => Some(opened),
        };
        let body = match opened {
            None => {
                acc.rollback_user_turn();
                info!("chat: turn aborted before the stream opened; user message rolled back");
                return Ok(TurnOutcome { reply: String::new(), end: StreamEnd::Cancelled, fragments: 0, discarded: 0 });
            }
            Some(Ok(body)) => body,
            Some(Err(e)) => {
                acc.rollback_user_turn();
                warn!(code = e.error_code(), error = %e, "chat: stream failed to start; user message rolled back");
                return Err(e);
            }
        };

        acc.begin_assistant_turn();
        let read = read_stream(body, &mut acc, &cancel).await;
        let reply = acc.end_turn();

        match read {
            Ok(outcome) => {
                info!(
                    end = ?outcome.end,
                    fragments = outcome.fragments,
                    discarded = outcome.discarded,
                    reply_len = reply.len(),
                    "chat: turn finished"
                );
                Ok(TurnOutcome { reply, end: outcome.end, fragments: outcome.fragments, discarded: outcome.discarded })
            }
            Err(e) => {
                warn!(code = e.error_code(), error = %e, partial_len = reply.len(), "chat: turn interrupted; keeping partial reply");
                Err(e)
            }
        }
    }

    fn fresh_cancel_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self
            .cancel
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = token.clone();
        token
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
