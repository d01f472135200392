//! Ollama local LLM provider implementation.
//!
//! Ollama allows running LLMs locally without API keys.
//! Install from: https://ollama.ai

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;

use super::http::{build_client, classify_status, classify_transport};
use super::prompts;
use super::provider::{
    ContentProvider, LlmConfig, LlmSettings, ProviderDescriptor, ProviderError, ProviderKind,
};
use super::task::GenerationTask;

/// Default Ollama host.
const DEFAULT_HOST: &str = "http://localhost:11434";

/// Environment variable naming the Ollama host.
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Ollama local LLM provider.
pub struct OllamaProvider {
    client: Client,
    api_url: String,
    descriptor: ProviderDescriptor,
    config: LlmConfig,
    timeout: Duration,
}

impl OllamaProvider {
    /// Create a provider for a host.
    ///
    /// Ollama needs no key; it counts as credentialed only when a host was
    /// configured explicitly.
    pub fn new(host: Option<String>, config: LlmConfig, timeout: Duration) -> Result<Self> {
        let host = host.filter(|h| !h.trim().is_empty());
        let api_url = format!(
            "{}/api/chat",
            host.as_deref().unwrap_or(DEFAULT_HOST).trim_end_matches('/')
        );

        Ok(Self {
            client: build_client(timeout)?,
            api_url,
            descriptor: ProviderDescriptor::new(
                ProviderKind::Ollama.as_str(),
                ProviderKind::Ollama,
                host.is_some(),
            ),
            config,
            timeout,
        })
    }

    /// Create from the `OLLAMA_HOST` environment variable.
    pub fn from_env(settings: &LlmSettings) -> Result<Self> {
        Self::new(
            std::env::var(HOST_ENV).ok(),
            settings.config_for(ProviderKind::Ollama),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Send a message to Ollama.
    async fn send_message(&self, user_prompt: &str) -> std::result::Result<String, ProviderError> {
        let body = json!({
            "model": self.config.model,
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            },
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
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(self.name(), &e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if error_text.contains("not found") {
                return Err(ProviderError::Unavailable(format!(
                    "Model '{}' not found. Pull it with: ollama pull {}",
                    self.config.model, self.config.model
                )));
            }
            return Err(classify_status(self.name(), status, &error_text));
        }

        let api_response: OllamaResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Ollama response: {}", e))
        })?;

        Ok(api_response.message.content)
    }
}

#[async_trait]
impl ContentProvider for OllamaProvider {
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

/// Ollama API response structure.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}
