//! OpenAI GPT API provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;

use super::http::{build_client, classify_status, classify_transport};
use super::prompts;
use super::provider::{
    ContentProvider, LlmConfig, LlmSettings, ProviderDescriptor, ProviderError, ProviderKind,
};
use super::task::GenerationTask;

/// OpenAI API endpoint.
const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// OpenAI GPT provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: Option<String>,
    descriptor: ProviderDescriptor,
    config: LlmConfig,
    timeout: Duration,
}

impl OpenAIProvider {
    /// Create a provider. Without an API key it is listed but never called.
    pub fn new(api_key: Option<String>, config: LlmConfig, timeout: Duration) -> Result<Self> {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Ok(Self {
            client: build_client(timeout)?,
            descriptor: ProviderDescriptor::new(
                ProviderKind::OpenAI.as_str(),
                ProviderKind::OpenAI,
                api_key.is_some(),
            ),
            api_key,
            config,
            timeout,
        })
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env(settings: &LlmSettings) -> Result<Self> {
        Self::new(
            std::env::var(API_KEY_ENV).ok(),
            settings.config_for(ProviderKind::OpenAI),
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
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ProviderError::Unavailable(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    /// Send a message to the OpenAI API.
    async fn send_message(&self, user_prompt: &str) -> std::result::Result<String, ProviderError> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {
                    "role": "system",
                    "content": prompts::system_prompt()
                },
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

        let api_response: OpenAIResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse API response: {}", e))
        })?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("No response from OpenAI".to_string()))
    }
}

#[async_trait]
impl ContentProvider for OpenAIProvider {
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
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}
