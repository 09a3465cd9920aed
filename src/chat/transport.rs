//! Chat transport — opens the upstream event stream.
//!
//! DESIGN
//! ======
//! `ChatTransport` is the seam between the session and the network, so
//! sessions can be driven by scripted streams in tests. `HttpTransport` is
//! the real implementation: one JSON POST per turn, body returned as a byte
//! stream without buffering.
//!
//! Start-up failures are classified here, before any stream processing:
//! a structured `{"error": ...}` body becomes `UpstreamRejected` with the
//! message intact, anything else is `StreamUnavailable`.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::message::ChatMessage;
use crate::config::{ChatConfig, Language};
use crate::error::ChatError;

/// Response body as a stream of raw chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// Request body for one turn: full history plus the language hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub language: Language,
}

/// Source of upstream event streams.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Start a streaming completion for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::StreamUnavailable`] or [`ChatError::UpstreamRejected`]
    /// when no stream could be opened.
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ChatError>;
}

// =============================================================================
// HTTP TRANSPORT
// =============================================================================

pub struct HttpTransport {
    http: reqwest::Client,
    endpoint_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ChatError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint_url: config.endpoint_url.clone(), api_key: config.api_key.clone() })
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpTransport {
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
        let mut req = self.http.post(&self.endpoint_url).json(request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| ChatError::StreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_rejection(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %err, "transport: upstream refused stream");
            return Err(err);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.starts_with("text/event-stream") {
            debug!(content_type, "transport: unexpected content type; parsing as event stream anyway");
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ChatError::StreamInterrupted(e.to_string())));
        Ok(Box::pin(body))
    }
}

/// Turn a non-success response into the matching start-up error.
#[must_use]
pub fn classify_rejection(status: u16, body: &str) -> ChatError {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|root| {
        let error = root.get("error")?;
        error
            .as_str()
            .or_else(|| error.get("message").and_then(Value::as_str))
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
    });
    match message {
        Some(message) => ChatError::UpstreamRejected { status, message },
        None => ChatError::StreamUnavailable(format!("upstream returned status {status}")),
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
