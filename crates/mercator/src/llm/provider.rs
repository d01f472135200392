//! Content provider trait and types.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task::GenerationTask;

/// The closed set of provider variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Ollama,
    Mock,
}

impl ProviderKind {
    /// Fixed priority rank; lower ranks are tried first.
    pub fn default_priority(self) -> u8 {
        match self {
            ProviderKind::Anthropic => 0,
            ProviderKind::OpenAI => 1,
            ProviderKind::Ollama => 2,
            ProviderKind::Mock => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Mock => "mock",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity, rank and credential availability of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub kind: ProviderKind,
    pub priority: u8,
    pub has_credentials: bool,
}

impl ProviderDescriptor {
    /// Descriptor with the kind's default priority.
    pub fn new(id: impl Into<String>, kind: ProviderKind, has_credentials: bool) -> Self {
        Self {
            id: id.into(),
            kind,
            priority: kind.default_priority(),
            has_credentials,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Quota, rate-limit or billing exhaustion. Sticky for the batch run.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Network, server or other retryable failure.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The call did not finish in time.
    #[error("timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The provider answered with something unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The provider cannot be called (missing credentials, bad client setup).
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Whether this failure suppresses the provider for the rest of the run.
    pub fn is_quota_class(&self) -> bool {
        matches!(self, ProviderError::QuotaExceeded(_))
    }
}

/// Model settings for a provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use (e.g., "claude-sonnet-4-20250514").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
            temperature: 0.3,
        }
    }
}

impl LlmConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Provider settings shared across a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    pub max_tokens: usize,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_model: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_tokens: 1024,
            temperature: 0.3,
            anthropic_model: None,
            openai_model: None,
            ollama_model: None,
        }
    }
}

impl LlmSettings {
    /// Model configuration for a provider kind, applying any override.
    pub fn config_for(&self, kind: ProviderKind) -> LlmConfig {
        let (default_model, override_model) = match kind {
            ProviderKind::Anthropic => ("claude-sonnet-4-20250514", self.anthropic_model.as_deref()),
            ProviderKind::OpenAI => ("gpt-4o", self.openai_model.as_deref()),
            ProviderKind::Ollama => ("llama3.2", self.ollama_model.as_deref()),
            ProviderKind::Mock => ("mock", None),
        };
        LlmConfig {
            model: override_model.unwrap_or(default_model).to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// A content-generation backend.
///
/// Implementations must be thread-safe (Send + Sync) so one instance can
/// serve every worker of a batch.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Produce raw text for a generation task.
    async fn generate(&self, task: &GenerationTask) -> Result<String, ProviderError>;

    /// Identity, priority and credential flag.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str {
        &self.descriptor().id
    }
}
