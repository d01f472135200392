//! HTTP plumbing shared by the remote providers.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{MercatorError, Result};

use super::provider::ProviderError;

/// Body fragments that mark a quota, rate-limit or billing failure.
const QUOTA_MARKERS: [&str; 7] = [
    "quota",
    "rate limit",
    "rate_limit",
    "resource_exhausted",
    "resource exhausted",
    "insufficient_quota",
    "credit balance",
];

/// Build an async HTTP client with a request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MercatorError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Classify a non-success HTTP response.
pub(crate) fn classify_status(provider: &str, status: StatusCode, body: &str) -> ProviderError {
    let lowered = body.to_lowercase();
    let message = format!("{} returned {}: {}", provider, status, truncate(body, 300));

    if status == StatusCode::TOO_MANY_REQUESTS || QUOTA_MARKERS.iter().any(|m| lowered.contains(m)) {
        ProviderError::QuotaExceeded(message)
    } else if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        ProviderError::Transient(message)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ProviderError::Unavailable(message)
    } else {
        ProviderError::Transient(message)
    }
}

/// Classify a transport-level failure.
pub(crate) fn classify_transport(
    provider: &str,
    error: &reqwest::Error,
    timeout: Duration,
) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else if error.is_connect() {
        ProviderError::Unavailable(format!("failed to connect to {}: {}", provider, error))
    } else {
        ProviderError::Transient(format!("{} request failed: {}", provider, error))
    }
}

/// Parse JSON from a model response, handling markdown code blocks.
pub fn parse_json_response<T: DeserializeOwned>(response: &str) -> serde_json::Result<T> {
    let json_str = if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .unwrap_or(response)
    } else if response.contains("```") {
        response
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .unwrap_or(response)
    } else {
        response.trim()
    };

    serde_json::from_str(json_str)
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_429_is_quota() {
        let err = classify_status("anthropic", StatusCode::TOO_MANY_REQUESTS, "");
        assert!(err.is_quota_class());
    }

    #[test]
    fn test_quota_body_is_quota() {
        let body = r#"{"error": {"type": "invalid_request_error", "message": "Your credit balance is too low"}}"#;
        let err = classify_status("anthropic", StatusCode::BAD_REQUEST, body);
        assert!(err.is_quota_class());

        let body = r#"{"error": {"code": "insufficient_quota"}}"#;
        assert!(classify_status("openai", StatusCode::FORBIDDEN, body).is_quota_class());
    }

    #[test]
    fn test_server_error_is_transient() {
        let err = classify_status("openai", StatusCode::SERVICE_UNAVAILABLE, "overloaded");
        assert!(matches!(err, ProviderError::Transient(_)));
    }

    #[test]
    fn test_parse_json_response_strips_fences() {
        let value: Value = parse_json_response("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);

        let value: Value = parse_json_response("```\n{\"b\": 2}\n```").unwrap();
        assert_eq!(value["b"], 2);

        let value: Value = parse_json_response("  {\"c\": 3} ").unwrap();
        assert_eq!(value["c"], 3);
    }
}
