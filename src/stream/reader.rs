//! Stream reader — the async driver of the parsing pipeline.
//!
//! Awaits one chunk at a time, hands it to the [`StreamParser`], and stops
//! on the terminator, on transport close, on a read error, or when the
//! cancellation token fires. Nothing already applied to the sink is undone
//! on any of those exits.

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::parser::{FragmentSink, Flow, StreamParser};
use crate::error::ChatError;

/// How a stream came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// `data: [DONE]` was received.
    Terminated,
    /// The transport closed the body.
    Closed,
    /// The caller aborted the read.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOutcome {
    pub end: StreamEnd,
    pub fragments: usize,
    pub discarded: usize,
}

/// Drive `body` to completion, folding every fragment into `sink`.
///
/// # Errors
///
/// Returns [`ChatError::StreamInterrupted`] when a read fails after the
/// stream started. Fragments applied before the failure stay applied.
pub async fn read_stream<S, B>(
    mut body: S,
    sink: &mut impl FragmentSink,
    cancel: &CancellationToken,
) -> Result<StreamOutcome, ChatError>
where
    S: Stream<Item = Result<B, ChatError>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut parser = StreamParser::new();
    let mut chunks: usize = 0;

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let stats = parser.stats();
                info!(chunks, fragments = stats.fragments, "stream: cancelled by caller");
                return Ok(StreamOutcome { end: StreamEnd::Cancelled, fragments: stats.fragments, discarded: stats.discarded });
            }
            next = body.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                chunks += 1;
                let bytes = chunk.as_ref();
                debug!(chunk = chunks, len = bytes.len(), "stream: chunk received");
                if parser.feed(bytes, sink) == Flow::Stop {
                    let stats = parser.stats();
                    debug!(chunks, fragments = stats.fragments, "stream: terminator received");
                    return Ok(StreamOutcome {
                        end: StreamEnd::Terminated,
                        fragments: stats.fragments,
                        discarded: stats.discarded,
                    });
                }
            }
            Some(Err(e)) => {
                let stats = parser.stats();
                warn!(error = %e, chunks, fragments = stats.fragments, "stream: read failed mid-stream");
                return Err(match e {
                    ChatError::StreamInterrupted(_) => e,
                    other => ChatError::StreamInterrupted(other.to_string()),
                });
            }
            None => {
                let stats = parser.finish(sink);
                debug!(chunks, fragments = stats.fragments, "stream: transport closed");
                return Ok(StreamOutcome { end: StreamEnd::Closed, fragments: stats.fragments, discarded: stats.discarded });
            }
        }
    }
}

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;
