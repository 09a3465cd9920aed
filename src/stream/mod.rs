//! Stream — incremental decoding of a chat-completions event stream.
//!
//! DESIGN
//! ======
//! One pipeline, strictly downstream:
//!
//! reader → utf8 → framer → decoder → delta → [`FragmentSink`]
//!
//! The reader is the only async stage. Each chunk is pushed through the rest
//! synchronously, so fragments reach the sink in byte-arrival order. All
//! buffers (partial code points, partial lines, held malformed records)
//! belong to one `StreamParser` and die with it.

pub mod decoder;
pub mod delta;
pub mod framer;
pub mod parser;
pub mod reader;
pub mod utf8;

pub use parser::{FragmentSink, ParseStats, StreamParser};
pub use reader::{StreamEnd, StreamOutcome, read_stream};
