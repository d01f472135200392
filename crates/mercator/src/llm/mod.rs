//! Content-generation providers and the cascade that drives them.
//!
//! Every backend implements [`ContentProvider`]. The [`ProviderCascade`]
//! tries them in priority order, suppresses a provider for the rest of a
//! batch once it reports quota exhaustion, and falls back to the
//! [`LocalGenerator`] when nothing else answers.
//!
//! # Supported Providers
//!
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY`)
//! - **Ollama** - Local models, no API key needed (requires `OLLAMA_HOST`)
//! - **Mock** - Scripted responses for tests and offline runs
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use mercator::llm::{providers_from_env, LlmSettings, ProviderCascade};
//!
//! let providers = providers_from_env(&LlmSettings::default()).unwrap();
//! let cascade = ProviderCascade::new(providers, Duration::from_secs(30));
//! ```

mod anthropic;
mod cascade;
mod fallback;
mod http;
mod mock;
mod ollama;
mod openai;
mod prompts;
mod provider;
mod task;

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

pub use anthropic::AnthropicProvider;
pub use cascade::{LOCAL_FALLBACK_ID, ProviderCascade, Resolution, SuppressionState};
pub use fallback::{LocalGenerator, clamp_text};
pub use http::parse_json_response;
pub use mock::{MockProvider, MockResponse};
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use prompts::{system_prompt, task_prompt};
pub use provider::{
    ContentProvider, LlmConfig, LlmSettings, ProviderDescriptor, ProviderError, ProviderKind,
};
pub use task::{FieldConstraints, GenerationTask, TaskKind};

/// Build every remote provider from the environment, in priority order.
///
/// Providers whose credentials are missing are still returned, flagged
/// `has_credentials: false`, so the cascade can report them and skip them.
pub fn providers_from_env(settings: &LlmSettings) -> Result<Vec<Arc<dyn ContentProvider>>> {
    let providers: Vec<Arc<dyn ContentProvider>> = vec![
        Arc::new(AnthropicProvider::from_env(settings)?),
        Arc::new(OpenAIProvider::from_env(settings)?),
        Arc::new(OllamaProvider::from_env(settings)?),
    ];
    Ok(providers)
}

/// A single mock provider standing in for every remote backend.
pub fn mock_providers() -> Vec<Arc<dyn ContentProvider>> {
    vec![Arc::new(MockProvider::new("mock"))]
}

/// Per-call timeout from settings.
pub fn call_timeout(settings: &LlmSettings) -> Duration {
    Duration::from_secs(settings.timeout_secs.max(1))
}
