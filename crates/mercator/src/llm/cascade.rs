//! Priority-ordered provider cascade with sticky quota suppression.

use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::enhance::{AttemptOutcome, AuditLog, EnhancementAttempt, ResearchContext};
use crate::mapping::{coerce_price, split_generated_list};
use crate::schema::CanonicalField;

use super::fallback::LocalGenerator;
use super::provider::{ContentProvider, ProviderError};
use super::task::{GenerationTask, TaskKind};

/// Provider id recorded for values from the local generator.
pub const LOCAL_FALLBACK_ID: &str = "local_fallback";

// =============================================================================
// SUPPRESSION STATE
// =============================================================================

/// Set-once quota suppression flags, one per provider, for one batch run.
///
/// Shared by every worker; a flag flipped by one worker is seen by all
/// others on their next check and is never cleared. Ids not seen before
/// are registered on first use.
#[derive(Debug, Default)]
pub struct SuppressionState {
    flags: RwLock<IndexMap<String, AtomicBool>>,
}

impl SuppressionState {
    /// State for a set of provider ids, all available.
    pub fn new<I, S>(provider_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = Self::default();
        state.register(provider_ids);
        state
    }

    /// State covering every provider of a list.
    pub fn for_providers(providers: &[Arc<dyn ContentProvider>]) -> Self {
        Self::new(providers.iter().map(|p| p.descriptor().id.clone()))
    }

    /// Add provider ids, leaving existing flags untouched.
    pub fn register<I, S>(&self, provider_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut flags = self.flags.write().unwrap_or_else(|e| e.into_inner());
        for id in provider_ids {
            flags.entry(id.into()).or_insert_with(|| AtomicBool::new(false));
        }
    }

    pub fn is_suppressed(&self, provider_id: &str) -> bool {
        self.flags
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(provider_id)
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Suppress a provider. Returns true only for the call that flipped it.
    pub fn suppress(&self, provider_id: &str) -> bool {
        {
            let flags = self.flags.read().unwrap_or_else(|e| e.into_inner());
            if let Some(flag) = flags.get(provider_id) {
                return !flag.swap(true, Ordering::SeqCst);
            }
        }
        let mut flags = self.flags.write().unwrap_or_else(|e| e.into_inner());
        !flags
            .entry(provider_id.to_string())
            .or_insert_with(|| AtomicBool::new(false))
            .swap(true, Ordering::SeqCst)
    }

    /// Ids of suppressed providers, in registration order.
    pub fn suppressed(&self) -> Vec<String> {
        self.flags
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, flag)| flag.load(Ordering::SeqCst))
            .map(|(id, _)| id.clone())
            .collect()
    }
}

// =============================================================================
// CASCADE
// =============================================================================

/// The value a cascade settled on.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: String,
    pub provider_id: String,
    /// Whether the value came from the local generator.
    pub fallback: bool,
}

/// Resolves generation tasks against providers in priority order.
///
/// Never fails: when every eligible provider is exhausted the local
/// generator answers.
pub struct ProviderCascade {
    providers: Vec<Arc<dyn ContentProvider>>,
    state: Arc<SuppressionState>,
    audit: AuditLog,
    fallback: LocalGenerator,
    timeout: Duration,
}

impl ProviderCascade {
    /// Create a cascade with fresh suppression state and audit log.
    pub fn new(mut providers: Vec<Arc<dyn ContentProvider>>, timeout: Duration) -> Self {
        providers.sort_by_key(|p| p.descriptor().priority);
        let state = Arc::new(SuppressionState::for_providers(&providers));
        Self {
            providers,
            state,
            audit: AuditLog::new(),
            fallback: LocalGenerator::new(),
            timeout,
        }
    }

    /// Use an externally owned suppression state. Every provider of this
    /// cascade is registered in it.
    pub fn with_state(mut self, state: Arc<SuppressionState>) -> Self {
        state.register(self.providers.iter().map(|p| p.descriptor().id.clone()));
        self.state = state;
        self
    }

    /// Record attempts into an existing log.
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    pub fn state(&self) -> &Arc<SuppressionState> {
        &self.state
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Providers in the order they are tried.
    pub fn providers(&self) -> &[Arc<dyn ContentProvider>] {
        &self.providers
    }

    /// Resolve one task to a value.
    pub async fn resolve(&self, task: &GenerationTask) -> Resolution {
        let identifier = task.identifier();

        for provider in &self.providers {
            let descriptor = provider.descriptor();
            if !descriptor.has_credentials {
                debug!(provider = %descriptor.id, "skipping provider without credentials");
                continue;
            }
            if self.state.is_suppressed(&descriptor.id) {
                debug!(provider = %descriptor.id, "skipping suppressed provider");
                continue;
            }

            let result = match tokio::time::timeout(self.timeout, provider.generate(task)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }),
            };

            match result.and_then(|raw| validate_response(task.kind, &raw)) {
                Ok(value) => {
                    debug!(provider = %descriptor.id, record = identifier, task = %task.kind, "provider succeeded");
                    self.audit.record(
                        EnhancementAttempt::new(
                            identifier,
                            task.kind,
                            &descriptor.id,
                            AttemptOutcome::Success,
                        )
                        .with_value(value.clone()),
                    );
                    return Resolution {
                        value,
                        provider_id: descriptor.id.clone(),
                        fallback: false,
                    };
                }
                Err(error) if error.is_quota_class() => {
                    if self.state.suppress(&descriptor.id) {
                        warn!(provider = %descriptor.id, error = %error, "provider quota exhausted, suppressing for this run");
                    }
                    self.audit.record(EnhancementAttempt::new(
                        identifier,
                        task.kind,
                        &descriptor.id,
                        AttemptOutcome::QuotaExceeded,
                    ));
                }
                Err(error) => {
                    debug!(provider = %descriptor.id, record = identifier, task = %task.kind, error = %error, "provider failed, trying next");
                    self.audit.record(EnhancementAttempt::new(
                        identifier,
                        task.kind,
                        &descriptor.id,
                        AttemptOutcome::TransientError,
                    ));
                }
            }
        }

        let value = self.fallback.generate(task);
        info!(record = identifier, task = %task.kind, "all providers exhausted, using local fallback");
        self.audit.record(
            EnhancementAttempt::new(
                identifier,
                task.kind,
                LOCAL_FALLBACK_ID,
                AttemptOutcome::InvalidResponse,
            )
            .with_value(value.clone())
            .as_fallback(),
        );

        Resolution {
            value,
            provider_id: LOCAL_FALLBACK_ID.to_string(),
            fallback: true,
        }
    }
}

/// Check a raw provider answer is usable for the task.
fn validate_response(kind: TaskKind, raw: &str) -> Result<String, ProviderError> {
    let value = raw.trim().trim_matches('"').trim();
    if value.is_empty() {
        return Err(ProviderError::InvalidResponse("empty response".to_string()));
    }

    match kind {
        TaskKind::Field(CanonicalField::Price) if coerce_price(value).is_none() => Err(
            ProviderError::InvalidResponse(format!("not a price: {}", value)),
        ),
        TaskKind::Research if ResearchContext::parse(raw).is_none() => Err(
            ProviderError::InvalidResponse("research response is not JSON".to_string()),
        ),
        TaskKind::Research => Ok(raw.trim().to_string()),
        TaskKind::Field(field) if field.is_list() && split_generated_list(value).is_empty() => Err(
            ProviderError::InvalidResponse(format!("no list items in: {}", value)),
        ),
        _ => Ok(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::{MockProvider, MockResponse};
    use crate::schema::CanonicalProduct;

    fn brand_task() -> GenerationTask {
        GenerationTask::field(CanonicalField::Brand, &CanonicalProduct::new("X1"))
    }

    #[test]
    fn test_suppression_is_set_once() {
        let state = SuppressionState::new(["a", "b"]);
        assert!(state.suppress("a"));
        assert!(!state.suppress("a"));
        assert!(state.is_suppressed("a"));
        assert!(!state.is_suppressed("b"));
        assert_eq!(state.suppressed(), vec!["a"]);

        assert!(state.suppress("late"));
        assert!(!state.suppress("late"));
        assert_eq!(state.suppressed(), vec!["a", "late"]);
    }

    #[test]
    fn test_with_state_registers_missing_providers() {
        let providers: Vec<Arc<dyn ContentProvider>> = vec![Arc::new(MockProvider::new("a"))];
        let state = Arc::new(SuppressionState::new(["b"]));
        let cascade = ProviderCascade::new(providers, Duration::from_secs(5)).with_state(state.clone());

        assert!(cascade.state().suppress("a"));
        assert_eq!(state.suppressed(), vec!["a"]);
    }

    #[test]
    fn test_validate_response() {
        let price = TaskKind::Field(CanonicalField::Price);
        assert!(validate_response(price, "about twenty").is_err());
        assert_eq!(validate_response(price, " $12.50 ").unwrap(), "$12.50");
        assert!(validate_response(TaskKind::Field(CanonicalField::Brand), "  \"\" ").is_err());
        assert!(validate_response(TaskKind::Research, "no json here").is_err());
        assert_eq!(
            validate_response(TaskKind::Field(CanonicalField::Brand), "\"Acme\"").unwrap(),
            "Acme"
        );

        let bullets = TaskKind::Field(CanonicalField::BulletPoints);
        assert!(validate_response(bullets, "-").is_err());
        assert!(validate_response(bullets, "- Durable\n- Light").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_answer_escalates() {
        let first = Arc::new(MockProvider::new("first").with_default(MockResponse::Invalid));
        let second = Arc::new(
            MockProvider::new("second")
                .with_priority(1)
                .with_default(MockResponse::Text("Acme".into())),
        );
        let providers: Vec<Arc<dyn ContentProvider>> = vec![first.clone(), second.clone()];
        let cascade = ProviderCascade::new(providers, Duration::from_secs(5));

        let resolution = cascade.resolve(&brand_task()).await;
        assert_eq!(resolution.value, "Acme");
        assert_eq!(resolution.provider_id, "second");

        let outcomes: Vec<_> = cascade.audit().snapshot().iter().map(|a| a.outcome).collect();
        assert_eq!(outcomes, vec![AttemptOutcome::TransientError, AttemptOutcome::Success]);
        assert!(!cascade.state().is_suppressed("first"));
    }

    #[tokio::test]
    async fn test_uncredentialed_providers_are_skipped() {
        let locked = Arc::new(MockProvider::new("locked").with_credentials(false));
        let providers: Vec<Arc<dyn ContentProvider>> = vec![locked.clone()];
        let cascade = ProviderCascade::new(providers, Duration::from_secs(5));

        let resolution = cascade.resolve(&brand_task()).await;
        assert!(resolution.fallback);
        assert_eq!(resolution.value, "Generic");
        assert_eq!(locked.calls(), 0);
    }
}
