//! Event decoder — classifies framed lines and holds malformed payloads.
//!
//! DESIGN
//! ======
//! `decode_line` applies the event-stream rules in order: blank, comment,
//! non-data, then `data: ` with the `[DONE]` terminator checked before the
//! payload is handed on. The decoder itself never parses JSON.
//!
//! `RetryBuffer` is the per-stream home for a data payload that failed to
//! parse. It lives inside one `StreamParser` and is dropped with it, so a
//! held fragment can never leak into another conversation.

/// Prefix that marks a data record.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that ends the stream gracefully.
pub const TERMINATOR: &str = "[DONE]";

/// Largest payload the retry buffer will hold before giving up on it.
pub const MAX_PENDING_BYTES: usize = 64 * 1024;

/// Classification of one framed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    Data(String),
    Terminator,
    Ignore,
}

/// Classify `line` (already stripped of its newline and trailing CR).
#[must_use]
pub fn decode_line(line: &str) -> DecodedEvent {
    if line.trim().is_empty() || line.starts_with(':') {
        return DecodedEvent::Ignore;
    }
    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return DecodedEvent::Ignore;
    };
    let payload = rest.trim();
    if payload == TERMINATOR {
        DecodedEvent::Terminator
    } else {
        DecodedEvent::Data(payload.to_string())
    }
}

/// `true` when `line` can only be the tail of a record broken by a stray
/// newline: not blank, not a comment, not an event-stream field of its own
/// (`data:`, `event:`, `id:`, `retry:`, ...).
#[must_use]
pub fn is_continuation(line: &str) -> bool {
    !line.trim().is_empty() && !line.starts_with(':') && !is_field_line(line)
}

/// `name:` with an ASCII-alphabetic field name.
fn is_field_line(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(name, _)| !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphabetic()))
}

// =============================================================================
// RETRY BUFFER
// =============================================================================

#[derive(Debug)]
pub struct RetryBuffer {
    pending: Option<String>,
    limit: usize,
}

impl Default for RetryBuffer {
    fn default() -> Self {
        Self::with_limit(MAX_PENDING_BYTES)
    }
}

impl RetryBuffer {
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self { pending: None, limit }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Hold `payload` for another attempt. Returns `false` (and holds
    /// nothing) when it exceeds the limit.
    pub fn hold(&mut self, payload: String) -> bool {
        if payload.len() > self.limit {
            self.pending = None;
            return false;
        }
        self.pending = Some(payload);
        true
    }

    /// Take the held payload joined with `continuation`.
    pub fn join(&mut self, continuation: &str) -> Option<String> {
        self.pending.take().map(|mut held| {
            held.push_str(continuation);
            held
        })
    }

    pub fn take(&mut self) -> Option<String> {
        self.pending.take()
    }
}

#[cfg(test)]
#[path = "decoder_test.rs"]
mod tests;
