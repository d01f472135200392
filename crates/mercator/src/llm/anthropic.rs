//! Anthropic Claude API provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;

use super::http::{build_client, classify_status, classify_transport};
use super::prompts;
use super::provider::{
    ContentProvider, LlmConfig, LlmSettings, ProviderDescriptor, ProviderError, ProviderKind,
};
use super::task::GenerationTask;

/// Anthropic API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version.
const API_VERSION: &str = "2023-06-01";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic Claude provider.
pub struct AnthropicProvider {
    client: Client,
    api_key: Option<String>,
    descriptor: ProviderDescriptor,
    config: LlmConfig,
    timeout: Duration,
}

impl AnthropicProvider {
    /// Create a provider. Without an API key it is listed but never called.
    pub fn new(api_key: Option<String>, config: LlmConfig, timeout: Duration) -> Result<Self> {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Ok(Self {
            client: build_client(timeout)?,
            descriptor: ProviderDescriptor::new(
                ProviderKind::Anthropic.as_str(),
                ProviderKind::Anthropic,
                api_key.is_some(),
            ),
            api_key,
            config,
            timeout,
        })
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env(settings: &LlmSettings) -> Result<Self> {
        Self::new(
            std::env::var(API_KEY_ENV).ok(),
            settings.config_for(ProviderKind::Anthropic),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> std::result::Result<HeaderMap, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Unavailable(format!("{} not set", API_KEY_ENV)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| ProviderError::Unavailable(format!("Invalid API key: {}", e)))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Send a message to the Claude API.
    async fn send_message(&self, user_prompt: &str) -> std::result::Result<String, ProviderError> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": prompts::system_prompt(),
            "messages": [
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });

        let response = self
            .client
            .post(API_URL)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(self.name(), &e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_status(self.name(), status, &error_text));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse API response: {}", e))
        })?;

        api_response
            .content
            .into_iter()
            .find_map(|block| (block.content_type == "text").then_some(block.text))
            .ok_or_else(|| ProviderError::InvalidResponse("No text in API response".to_string()))
    }
}

#[async_trait]
impl ContentProvider for AnthropicProvider {
    async fn generate(&self, task: &GenerationTask) -> std::result::Result<String, ProviderError> {
        let prompt = prompts::task_prompt(task);
        self.send_message(&prompt).await
    }

    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }
}

// API response types

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_has_no_credentials() {
        let provider =
            AnthropicProvider::new(None, LlmConfig::default(), Duration::from_secs(5)).unwrap();
        assert!(!provider.descriptor().has_credentials);
        assert_eq!(provider.descriptor().priority, 0);
        assert!(provider.build_headers().is_err());
    }

    #[test]
    fn test_blank_key_has_no_credentials() {
        let provider = AnthropicProvider::new(
            Some("  ".into()),
            LlmConfig::default(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(!provider.descriptor().has_credentials);
    }

    #[test]
    fn test_parse_api_response() {
        let json = r#"{"content": [{"type": "text", "text": "Acme"}]}"#;
        let parsed: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.content[0].text, "Acme");
    }
}
