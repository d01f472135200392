//! Mock provider for testing and offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::schema::CanonicalField;

use super::provider::{ContentProvider, LlmConfig, ProviderDescriptor, ProviderError, ProviderKind};
use super::task::{GenerationTask, TaskKind};

/// One scripted reaction of the mock provider.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// Return this text verbatim.
    Text(String),
    /// Return a plausible value for the task.
    Generated,
    /// Fail with a quota-class error.
    QuotaExceeded,
    /// Fail with a transient error.
    Transient,
    /// Answer with an empty body.
    Invalid,
}

/// Mock provider that returns predictable responses for testing.
///
/// Scripted responses are consumed one per call; once the script runs out
/// every call gets the default response.
pub struct MockProvider {
    descriptor: ProviderDescriptor,
    config: LlmConfig,
    script: Mutex<VecDeque<MockResponse>>,
    default_response: MockResponse,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a credentialed mock at priority 0 that always generates.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            descriptor: ProviderDescriptor::new(id, ProviderKind::Mock, true).with_priority(0),
            config: LlmConfig::default().with_model("mock"),
            script: Mutex::new(VecDeque::new()),
            default_response: MockResponse::Generated,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.descriptor.priority = priority;
        self
    }

    pub fn with_credentials(mut self, has_credentials: bool) -> Self {
        self.descriptor.has_credentials = has_credentials;
        self
    }

    /// Responses for the first calls, in order.
    pub fn with_script(self, responses: impl IntoIterator<Item = MockResponse>) -> Self {
        let script = responses.into_iter().collect();
        Self {
            script: Mutex::new(script),
            ..self
        }
    }

    /// Response once the script is exhausted.
    pub fn with_default(mut self, response: MockResponse) -> Self {
        self.default_response = response;
        self
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `generate` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared handle to the invocation counter.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn next_response(&self) -> MockResponse {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone())
    }

    /// A deterministic, plausible value for a task.
    pub fn generated_value(task: &GenerationTask) -> String {
        let product = &task.product;
        let id = product.identifier.as_str();
        match task.kind {
            TaskKind::Research => json!({
                "category_guess": product.category.clone().unwrap_or_else(|| "Home & Kitchen".to_string()),
                "audience": "Everyday shoppers",
                "search_terms": [id, "best seller"],
            })
            .to_string(),
            TaskKind::Field(field) => match field {
                CanonicalField::Title => match product.brand.as_deref() {
                    Some(brand) => format!("{} Product {}", brand, id),
                    None => format!("Product {}", id),
                },
                CanonicalField::Description => format!(
                    "{} is built for daily use and ships ready to go.",
                    product.title.as_deref().unwrap_or(id)
                ),
                CanonicalField::Price => "19.99".to_string(),
                CanonicalField::Brand => "Acme".to_string(),
                CanonicalField::Category => task
                    .research
                    .as_ref()
                    .and_then(|r| r.category_guess.clone())
                    .unwrap_or_else(|| "Home & Kitchen".to_string()),
                CanonicalField::BulletPoints => {
                    "Durable construction\nEasy to clean\nBacked by a one-year warranty".to_string()
                }
                CanonicalField::Images => format!("https://example.com/images/{}.jpg", id),
                CanonicalField::Identifier => format!("MOCK-{}", id),
            },
        }
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    async fn generate(&self, task: &GenerationTask) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.next_response();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            MockResponse::Text(text) => Ok(text),
            MockResponse::Generated => Ok(Self::generated_value(task)),
            MockResponse::QuotaExceeded => Err(ProviderError::QuotaExceeded(format!(
                "{}: mock quota exhausted",
                self.descriptor.id
            ))),
            MockResponse::Transient => Err(ProviderError::Transient(format!(
                "{}: mock transient failure",
                self.descriptor.id
            ))),
            MockResponse::Invalid => Ok(String::new()),
        }
    }

    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CanonicalProduct;

    #[tokio::test]
    async fn test_script_then_default() {
        let provider = MockProvider::new("mock")
            .with_script([MockResponse::QuotaExceeded, MockResponse::Text("Acme".into())])
            .with_default(MockResponse::Transient);
        let task = GenerationTask::field(CanonicalField::Brand, &CanonicalProduct::new("X1"));

        assert!(provider.generate(&task).await.unwrap_err().is_quota_class());
        assert_eq!(provider.generate(&task).await.unwrap(), "Acme");
        assert!(matches!(
            provider.generate(&task).await,
            Err(ProviderError::Transient(_))
        ));
        assert_eq!(provider.calls(), 3);
    }

    #[test]
    fn test_generated_values_fit_fields() {
        let product = CanonicalProduct::new("X1").with_brand("Acme");
        let title = MockProvider::generated_value(&GenerationTask::field(CanonicalField::Title, &product));
        assert_eq!(title, "Acme Product X1");

        let research = MockProvider::generated_value(&GenerationTask::research(&product));
        assert!(serde_json::from_str::<serde_json::Value>(&research).is_ok());
    }
}
