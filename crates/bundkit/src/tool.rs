//! Tool builder and execution pipeline

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::client::{fetch, FetchOptions};
use crate::error::ApiError;
use crate::services::{Operation, Service};
use crate::shape::is_error_document;
use crate::TOOL_LLMTXT;

/// Builder for configuring the tool
#[derive(Debug, Clone, Default)]
pub struct ToolBuilder {
    /// Custom User-Agent
    user_agent: Option<String>,
    /// Base URL replacing every service's default
    base_url: Option<String>,
    /// Timeout replacing every service's default
    timeout: Option<Duration>,
}

impl ToolBuilder {
    /// Create a new tool builder with service defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Send requests to `base` instead of the service's upstream host
    pub fn base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = Some(base.into());
        self
    }

    /// Override the per-service request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the tool
    pub fn build(self) -> Tool {
        Tool {
            options: FetchOptions {
                user_agent: self.user_agent,
                base_url: self.base_url,
                timeout: self.timeout,
            },
        }
    }
}

/// Configured tool: runs one service operation end to end
#[derive(Debug, Clone, Default)]
pub struct Tool {
    options: FetchOptions,
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Fetch options in effect
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Validate, fetch and shape.
    ///
    /// Validation failures return before any request is sent. Payloads that
    /// are already error documents are returned as-is.
    pub async fn execute(&self, service: &Service) -> Result<Value, ApiError> {
        let request = self.options.apply(service.request()?);

        let payload = fetch(&request, &self.options).await?;

        if is_error_document(&payload) {
            debug!(service = service.name(), "Upstream returned an error document, not shaping");
            return Ok(payload);
        }

        service.shape(payload)
    }
}
