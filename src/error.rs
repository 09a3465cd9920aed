//! Chat errors — one taxonomy for config, transport, and stream failures.
//!
//! DESIGN
//! ======
//! Only `StreamUnavailable` and `UpstreamRejected` are meant for the end
//! user. Everything else degrades to "best partial result": an interrupted
//! stream keeps what it already delivered, and a malformed record never
//! leaves the parser.

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The env var that should hold the API key is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The initial request failed or did not yield a usable body.
    #[error("stream unavailable: {0}")]
    StreamUnavailable(String),

    /// Upstream refused the request with a structured error body.
    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },

    /// A read failed after the stream had started.
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),

    /// A data record did not parse as JSON. Recoverable.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A reply is still streaming for this session.
    #[error("a reply is already in progress")]
    TurnInProgress,
}

impl ChatError {
    /// `true` for the failures the end user should see as an explicit error.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::StreamUnavailable(_) | Self::UpstreamRejected { .. })
    }
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::StreamUnavailable(_) => "E_STREAM_UNAVAILABLE",
            Self::UpstreamRejected { .. } => "E_UPSTREAM_REJECTED",
            Self::StreamInterrupted(_) => "E_STREAM_INTERRUPTED",
            Self::MalformedRecord(_) => "E_MALFORMED_RECORD",
            Self::TurnInProgress => "E_TURN_IN_PROGRESS",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::StreamUnavailable(_) | Self::StreamInterrupted(_) | Self::UpstreamRejected { status: 429 | 500..=599, .. }
        )
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
