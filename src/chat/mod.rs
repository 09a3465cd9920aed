//! Chat — conversation state and the turn loop on top of the stream pipeline.
//!
//! DESIGN
//! ======
//! `message` is the observable list the UI renders. `accumulator` is the
//! sink that folds fragments into it. `transport` opens upstream streams.
//! `session` ties them together, one turn at a time.

pub mod accumulator;
pub mod message;
pub mod session;
pub mod transport;

pub use accumulator::MessageAccumulator;
pub use message::{ChatMessage, MessageList, MessageObserver, Role, SharedMessages};
pub use session::{ChatSession, TurnOutcome};
pub use transport::{ByteStream, ChatRequest, ChatTransport, HttpTransport};
