//! Stream parser — the synchronous part of the pipeline between two reads.
//!
//! DESIGN
//! ======
//! bytes → `Utf8Decoder` → `LineFramer` → `decode_line` → `extract_fragment`
//! → `FragmentSink`. Everything here runs without suspending, so fragment
//! order is exactly byte arrival order.
//!
//! A payload that fails to parse goes to the `RetryBuffer`. The next
//! continuation line is joined to it and retried; a fresh data record, the
//! terminator, or the end of the stream ends its chance.

use tracing::{debug, warn};

use super::decoder::{DecodedEvent, RetryBuffer, decode_line, is_continuation};
use super::delta::extract_fragment;
use super::framer::LineFramer;
use super::utf8::Utf8Decoder;

/// Downstream consumer of extracted text fragments.
pub trait FragmentSink {
    fn apply_fragment(&mut self, fragment: &str);
}

impl FragmentSink for Vec<String> {
    fn apply_fragment(&mut self, fragment: &str) {
        self.push(fragment.to_string());
    }
}

/// Whether the caller should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Counters for one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub fragments: usize,
    pub discarded: usize,
}

#[derive(Debug, Default)]
pub struct StreamParser {
    utf8: Utf8Decoder,
    framer: LineFramer,
    retry: RetryBuffer,
    stats: ParseStats,
    terminated: bool,
}

impl StreamParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Feed one network chunk. Returns [`Flow::Stop`] once the terminator
    /// has been seen; lines after it are not decoded.
    pub fn feed(&mut self, bytes: &[u8], sink: &mut impl FragmentSink) -> Flow {
        if self.terminated {
            return Flow::Stop;
        }
        let text = self.utf8.decode(bytes);
        self.process_text(&text, sink)
    }

    /// End of stream: flush the decoder and framer residue, give the held
    /// payload one last attempt, and drop whatever still does not parse.
    pub fn finish(mut self, sink: &mut impl FragmentSink) -> ParseStats {
        if self.terminated {
            return self.stats;
        }
        let tail = self.utf8.finish();
        if self.process_text(&tail, sink) == Flow::Stop {
            return self.stats;
        }
        if let Some(last) = self.framer.finish() {
            debug!(len = last.len(), "stream: decoding unterminated last record");
            if self.handle_line(&last, sink) == Flow::Stop {
                return self.stats;
            }
        }
        if let Some(held) = self.retry.take() {
            self.final_attempt(&held, sink);
        }
        self.stats
    }

    fn process_text(&mut self, text: &str, sink: &mut impl FragmentSink) -> Flow {
        if text.is_empty() {
            return Flow::Continue;
        }
        for line in self.framer.push(text) {
            if self.handle_line(&line, sink) == Flow::Stop {
                self.terminated = true;
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn handle_line(&mut self, line: &str, sink: &mut impl FragmentSink) -> Flow {
        if self.retry.is_pending() && is_continuation(line) {
            if let Some(joined) = self.retry.join(line) {
                self.try_payload(joined, sink);
            }
            return Flow::Continue;
        }

        match decode_line(line) {
            DecodedEvent::Ignore => Flow::Continue,
            DecodedEvent::Terminator => {
                self.discard_held("terminator reached");
                Flow::Stop
            }
            DecodedEvent::Data(payload) => {
                self.discard_held("superseded by a new data record");
                self.try_payload(payload, sink);
                Flow::Continue
            }
        }
    }

    fn try_payload(&mut self, payload: String, sink: &mut impl FragmentSink) {
        match extract_fragment(&payload) {
            Ok(Some(fragment)) => self.emit(&fragment, sink),
            Ok(None) => {}
            Err(e) => {
                debug!(error = %e, len = payload.len(), "stream: holding malformed record for retry");
                if !self.retry.hold(payload) {
                    self.stats.discarded += 1;
                    warn!("stream: malformed record exceeded retry limit; discarding");
                }
            }
        }
    }

    fn final_attempt(&mut self, held: &str, sink: &mut impl FragmentSink) {
        match extract_fragment(held) {
            Ok(Some(fragment)) => self.emit(&fragment, sink),
            Ok(None) => {}
            Err(e) => {
                self.stats.discarded += 1;
                warn!(error = %e, len = held.len(), "stream: discarding malformed record at end of stream");
            }
        }
    }

    fn discard_held(&mut self, reason: &'static str) {
        if let Some(held) = self.retry.take() {
            self.stats.discarded += 1;
            warn!(len = held.len(), reason, "stream: discarding malformed record");
        }
    }

    fn emit(&mut self, fragment: &str, sink: &mut impl FragmentSink) {
        self.stats.fragments += 1;
        sink.apply_fragment(fragment);
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
