//! Chat configuration parsed from environment variables.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Reply language hint sent with every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "hinglish")]
    Hinglish,
}

impl Language {
    /// Wire value of the hint (`en`, `hi`, `hinglish`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Hinglish => "hinglish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTimeouts {
    pub connect_secs: u64,
    /// Total request timeout. `None` leaves long streams alone.
    pub request_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub endpoint_url: String,
    pub api_key: Option<String>,
    pub language: Language,
    pub user_name: Option<String>,
    pub timeouts: ChatTimeouts,
}

impl ChatConfig {
    /// Build typed chat config from environment variables.
    ///
    /// Required:
    /// - `CHAT_ENDPOINT_URL`
    ///
    /// Optional:
    /// - `CHAT_API_KEY_ENV`: names the env var containing the bearer key
    /// - `CHAT_LANGUAGE`: `en` (default), `hi` or `hinglish`
    /// - `CHAT_USER_NAME`: used in the greeting
    /// - `CHAT_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CHAT_REQUEST_TIMEOUT_SECS`: unset means no total timeout
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ChatConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChatError> {
        let endpoint_url = lookup("CHAT_ENDPOINT_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ChatError::ConfigParse("CHAT_ENDPOINT_URL is required".into()))?;
        if !endpoint_url.starts_with("http://") && !endpoint_url.starts_with("https://") {
            return Err(ChatError::ConfigParse(format!("CHAT_ENDPOINT_URL must be http(s): {endpoint_url}")));
        }

        let api_key = match lookup("CHAT_API_KEY_ENV") {
            Some(key_var) => Some(lookup(&key_var).ok_or(ChatError::MissingApiKey { var: key_var })?),
            None => None,
        };

        let language = parse_language(lookup("CHAT_LANGUAGE").as_deref())?;
        let user_name = lookup("CHAT_USER_NAME")
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let timeouts = ChatTimeouts {
            connect_secs: parse_u64(&lookup, "CHAT_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_secs: parse_u64(&lookup, "CHAT_REQUEST_TIMEOUT_SECS")?,
        };

        Ok(Self { endpoint_url, api_key, language, user_name, timeouts })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>, ChatError> {
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ChatError::ConfigParse(format!("{key} must be a whole number of seconds, got '{raw}'")))
        })
        .transpose()
}

fn parse_language(raw: Option<&str>) -> Result<Language, ChatError> {
    match raw.unwrap_or("en") {
        "en" => Ok(Language::English),
        "hi" => Ok(Language::Hindi),
        "hinglish" => Ok(Language::Hinglish),
        other => Err(ChatError::ConfigParse(format!(
            "unsupported CHAT_LANGUAGE '{other}' (expected 'en', 'hi' or 'hinglish')"
        ))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
