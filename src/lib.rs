//! kittu-chat — streaming chat-response assembly.
//!
//! Bytes from a chat-completions event stream go in; an observable,
//! incrementally updated conversation comes out.

pub mod chat;
pub mod config;
pub mod error;
pub mod stream;

pub use chat::{ChatMessage, ChatSession, HttpTransport, MessageList, Role};
pub use config::{ChatConfig, Language};
pub use error::{ChatError, ErrorCode};
