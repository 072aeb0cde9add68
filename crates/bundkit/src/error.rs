//! Error types for bundkit

use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::types::ApiRequest;

/// Errors that can occur while querying an upstream API
///
/// Every variant renders to a single human-readable line; the CLI turns it
/// into the `{"error": ...}` document via [`ApiError::to_document`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input failed validation; no request was sent
    #[error("{0}")]
    Validation(String),

    /// Base URL override could not be parsed
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {seconds}s: {url}")]
    Timeout { url: String, seconds: u64 },

    /// DNS, connect or read failure
    #[error("Connection failed{}: {reason}", for_context(.context))]
    Connect {
        context: Option<String>,
        reason: String,
    },

    /// Upstream answered with a non-2xx status
    #[error("{message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    /// Upstream answered but did not contain the requested entry
    #[error("{0}")]
    NoData(String),

    /// Output document could not be encoded
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn for_context(context: &Option<String>) -> String {
    match context {
        Some(ctx) => format!(" for {}", ctx),
        None => String::new(),
    }
}

impl ApiError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Classify a reqwest error raised while sending `request` to `url`
    pub fn from_reqwest(err: reqwest::Error, request: &ApiRequest, url: &Url) -> Self {
        if err.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
                seconds: request.timeout().as_secs(),
            }
        } else {
            ApiError::Connect {
                context: request.context().map(str::to_string),
                reason: root_cause(&err),
            }
        }
    }

    /// True for failures that happened before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_) | ApiError::InvalidBaseUrl(_)
        )
    }

    /// True for network-level failures (DNS, connect, timeout)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout { .. } | ApiError::Connect { .. } | ApiError::ClientBuild(_)
        )
    }

    /// HTTP status for upstream errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `{"error": <message>}` document printed in place of a result
    pub fn to_document(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

/// Innermost source message, which names the actual network failure
/// rather than reqwest's generic "error sending request" wrapper.
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
