//! Core types for bundkit

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::ApiError;

/// Default number of items kept by list and map truncation
pub const DEFAULT_LIMIT: usize = 10;

/// How a non-2xx response is turned into an error message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorDetail {
    /// `HTTP <status> for <url>`
    #[default]
    StatusAndUrl,
    /// Prefer the upstream `msg` field, else `HTTP <status>: <body prefix>`
    UpstreamMessage,
}

/// Request to send to an upstream API
///
/// Path segments are percent-encoded when the URL is rendered, so
/// identifiers taken from the command line never change the path structure.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    base: String,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    timeout: Duration,
    error_detail: ErrorDetail,
    context: Option<String>,
}

impl ApiRequest {
    /// Create a request against `base` with the given timeout
    pub fn new(base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base: base.into(),
            segments: Vec::new(),
            query: Vec::new(),
            timeout,
            error_detail: ErrorDetail::default(),
            context: None,
        }
    }

    /// Append one path segment
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append several path segments
    pub fn segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segments.extend(segments.into_iter().map(Into::into));
        self
    }

    /// Set a query parameter, replacing an earlier value for the same key.
    /// `None` leaves the parameter out entirely.
    pub fn param<V: Into<String>>(mut self, key: &str, value: Option<V>) -> Self {
        self.query.retain(|(k, _)| k != key);
        if let Some(value) = value {
            self.query.push((key.to_string(), value.into()));
        }
        self
    }

    /// Emit `key=value` once per value, for multi-valued parameters
    pub fn repeated_param<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.query.retain(|(k, _)| k != key);
        for value in values {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// Use the upstream-provided message for HTTP errors
    pub fn upstream_error_messages(mut self) -> Self {
        self.error_detail = ErrorDetail::UpstreamMessage;
        self
    }

    /// Label included in connection error messages
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Replace the base URL, keeping path and query
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Replace the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn error_detail(&self) -> ErrorDetail {
        self.error_detail
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Render the final URL
    pub fn url(&self) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.base).map_err(|_| ApiError::InvalidBaseUrl(self.base.clone()))?;

        if !self.segments.is_empty() {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base.clone()))?;
            path.pop_if_empty();
            path.extend(self.segments.iter());
        }

        // query_pairs_mut leaves a bare '?' behind even when nothing is appended
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(url)
    }
}

/// Maximum number of items kept by the shaper; never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Limit(NonZeroUsize);

impl Limit {
    pub fn new(n: usize) -> Option<Self> {
        NonZeroUsize::new(n).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(NonZeroUsize::new(DEFAULT_LIMIT).unwrap_or(NonZeroUsize::MIN))
    }
}

impl FromStr for Limit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid limit '{}': must be a positive integer", s))?;
        Limit::new(n).ok_or_else(|| "Invalid limit '0': must be at least 1".to_string())
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
