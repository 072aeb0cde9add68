//! HTTP client for bundkit
//!
//! Issues exactly one GET per call and decodes the body into a JSON value.
//! Undecodable bodies are not an error: they come back as `{"text": ...}`.

use std::borrow::Cow;
use std::io::Read;
use std::time::Duration;

use bytes::Bytes;
use flate2::read::GzDecoder;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::types::{ApiRequest, ErrorDetail};
use crate::DEFAULT_USER_AGENT;

/// First two bytes of every gzip stream
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Characters of a non-JSON error body quoted in the error message
const ERROR_BODY_PREVIEW: usize = 200;

/// Fetch options that can be configured via tool builder
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Replaces the service's base URL
    pub base_url: Option<String>,
    /// Replaces the service's request timeout
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    /// Apply base URL and timeout overrides to a request
    pub fn apply(&self, request: ApiRequest) -> ApiRequest {
        let request = match &self.base_url {
            Some(base) => request.with_base(base.trim_end_matches('/')),
            None => request,
        };
        match self.timeout {
            Some(timeout) => request.with_timeout(timeout),
            None => request,
        }
    }
}

/// Send `request` and decode the response body
///
/// Fails with a transport error for network problems and with
/// [`ApiError::Http`] for non-2xx statuses.
pub async fn fetch(request: &ApiRequest, options: &FetchOptions) -> Result<Value, ApiError> {
    let url = request.url()?;

    let mut headers = HeaderMap::new();
    let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(request.timeout())
        .timeout(request.timeout())
        .build()
        .map_err(ApiError::ClientBuild)?;

    debug!(url = %url, timeout_secs = request.timeout().as_secs(), "GET");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ApiError::from_reqwest(e, request, &url))?;

    let status = response.status();
    let body: Bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::from_reqwest(e, request, &url))?;

    debug!(status = status.as_u16(), size = body.len(), "Response received");

    if !status.is_success() {
        return Err(http_error(status.as_u16(), &url, &body, request.error_detail()));
    }

    Ok(decode_body(&body))
}

/// Decode a response body: gunzip if it carries the gzip magic, decode
/// UTF-8, then parse JSON or fall back to `{"text": <body>}`.
pub fn decode_body(raw: &[u8]) -> Value {
    let bytes = gunzip_if_framed(raw);
    let text = String::from_utf8_lossy(&bytes);

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Body is not JSON, wrapping as text");
            json!({ "text": text })
        }
    }
}

/// Some servers gzip the body without saying so in `Content-Encoding`
fn gunzip_if_framed(raw: &[u8]) -> Cow<'_, [u8]> {
    if !raw.starts_with(&GZIP_MAGIC) {
        return Cow::Borrowed(raw);
    }

    let mut decoded = Vec::new();
    match GzDecoder::new(raw).read_to_end(&mut decoded) {
        Ok(_) => Cow::Owned(decoded),
        Err(e) => {
            warn!(error = %e, "Body has gzip magic but failed to decompress");
            Cow::Borrowed(raw)
        }
    }
}

/// Build the error for a non-2xx response
fn http_error(status: u16, url: &Url, body: &[u8], detail: ErrorDetail) -> ApiError {
    let message = match detail {
        ErrorDetail::StatusAndUrl => format!("HTTP {} for {}", status, url),
        ErrorDetail::UpstreamMessage => upstream_message(status, body),
    };
    ApiError::Http {
        status,
        url: url.to_string(),
        message,
    }
}

/// `msg` from a JSON object error body, else a status line with a body
/// preview
fn upstream_message(status: u16, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(obj)) => obj
            .get("msg")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status)),
        _ => {
            let preview: String = text.chars().take(ERROR_BODY_PREVIEW).collect();
            format!("HTTP {}: {}", status, preview)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_json() {
        assert_eq!(
            decode_body(br#"{"warnings": []}"#),
            json!({ "warnings": [] })
        );
        assert_eq!(decode_body(b"[1,2]"), json!([1, 2]));
    }

    #[test]
    fn test_decode_gzip_magic() {
        let body = gzip(r#"{"time": 1, "warnings": [{"id": "a"}]}"#.as_bytes());
        assert_eq!(&body[..2], &GZIP_MAGIC);
        assert_eq!(
            decode_body(&body),
            json!({ "time": 1, "warnings": [{ "id": "a" }] })
        );
    }

    #[test]
    fn test_decode_non_json_is_text() {
        assert_eq!(
            decode_body("Seewetterbericht für die Nordsee".as_bytes()),
            json!({ "text": "Seewetterbericht für die Nordsee" })
        );
        assert_eq!(decode_body(b""), json!({ "text": "" }));
    }

    #[test]
    fn test_decode_corrupt_gzip_falls_back_to_text() {
        let body = [0x1f, 0x8b, b'x', b'y'];
        let value = decode_body(&body);
        assert!(value["text"].is_string());
    }

    #[test]
    fn test_upstream_message() {
        assert_eq!(
            upstream_message(404, br#"{"status": 404, "msg": "Station 'XYZ' not found"}"#),
            "Station 'XYZ' not found"
        );
        assert_eq!(upstream_message(500, br#"{"status": 500}"#), "HTTP 500");
        assert_eq!(
            upstream_message(500, br#"["unexpected"]"#),
            r#"HTTP 500: ["unexpected"]"#
        );
        assert_eq!(upstream_message(502, b"42"), "HTTP 502: 42");
        assert_eq!(
            upstream_message(502, b"Bad Gateway"),
            "HTTP 502: Bad Gateway"
        );
        let long = "x".repeat(500);
        assert_eq!(
            upstream_message(503, long.as_bytes()),
            format!("HTTP 503: {}", "x".repeat(200))
        );
    }

    #[test]
    fn test_http_error_status_and_url() {
        let url = Url::parse("https://warnung.bund.de/api31/warnings/x.json").unwrap();
        let err = http_error(404, &url, b"", ErrorDetail::StatusAndUrl);
        assert_eq!(
            err.to_string(),
            "HTTP 404 for https://warnung.bund.de/api31/warnings/x.json"
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_fetch_options_apply() {
        let options = FetchOptions {
            base_url: Some("http://127.0.0.1:9000/".to_string()),
            timeout: Some(Duration::from_secs(3)),
            ..Default::default()
        };
        let request = options.apply(
            ApiRequest::new("https://example.com/v1", Duration::from_secs(30)).segment("a.json"),
        );
        assert_eq!(request.base(), "http://127.0.0.1:9000");
        assert_eq!(request.timeout(), Duration::from_secs(3));
        assert_eq!(
            request.url().unwrap().as_str(),
            "http://127.0.0.1:9000/a.json"
        );
    }

    #[tokio::test]
    async fn test_fetch_invalid_base_fails_before_network() {
        let request = ApiRequest::new("no scheme", Duration::from_secs(1)).segment("x");
        let result = fetch(&request, &FetchOptions::default()).await;
        assert!(matches!(result, Err(ApiError::InvalidBaseUrl(_))));
    }
}
