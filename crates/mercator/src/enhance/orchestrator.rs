//! Batch enhancement: a bounded worker pool over products, strictly
//! sequential generation within each product.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::input::ContextHints;
use crate::llm::{
    ContentProvider, FieldConstraints, GenerationTask, LOCAL_FALLBACK_ID, LocalGenerator,
    ProviderCascade, SuppressionState, clamp_text,
};
use crate::mapping::{coerce_price, split_generated_list};
use crate::requirements::RequirementResolver;
use crate::schema::{
    CanonicalField, CanonicalProduct, EnhancementStatus, FieldRequirement, FieldValue,
    MarketplaceSchema,
};

use super::audit::{AttemptOutcome, AuditLog, EnhancementAttempt};
use super::research::ResearchContext;

/// Configuration for batch enhancement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Number of products processed in parallel.
    pub concurrency: usize,
    /// Run the research step for products missing title, description and category.
    pub research_enabled: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            research_enabled: true,
        }
    }
}

/// Per-status product counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub enhanced: usize,
    pub partial: usize,
    pub pending: usize,
    pub error: usize,
}

impl BatchSummary {
    pub fn from_products(products: &[CanonicalProduct]) -> Self {
        products
            .iter()
            .fold(Self::default(), |mut summary, product| {
                match product.enhancement_status {
                    EnhancementStatus::Enhanced => summary.enhanced += 1,
                    EnhancementStatus::Partial => summary.partial += 1,
                    EnhancementStatus::Pending => summary.pending += 1,
                    EnhancementStatus::Error => summary.error += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.enhanced + self.partial + self.pending + self.error
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Products in input order, with final status.
    pub products: Vec<CanonicalProduct>,
    /// Every generation attempt, in append order.
    pub attempts: Vec<EnhancementAttempt>,
    pub summary: BatchSummary,
    /// Providers suppressed for quota exhaustion during the run.
    pub suppressed_providers: Vec<String>,
}

/// Shared, read-only state every record task works from.
struct Pipeline {
    cascade: ProviderCascade,
    schema: MarketplaceSchema,
    hints: ContextHints,
    resolver: RequirementResolver,
    research_enabled: bool,
}

type Queue = Arc<Mutex<VecDeque<(usize, CanonicalProduct)>>>;

/// Drives requirement resolution and the provider cascade across a batch.
pub struct EnhancementOrchestrator {
    providers: Vec<Arc<dyn ContentProvider>>,
    config: OrchestratorConfig,
    hints: ContextHints,
    timeout: Duration,
}

impl EnhancementOrchestrator {
    /// Create an orchestrator over a set of providers.
    pub fn new(providers: Vec<Arc<dyn ContentProvider>>, timeout: Duration) -> Self {
        Self {
            providers,
            config: OrchestratorConfig::default(),
            hints: ContextHints::default(),
            timeout,
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_hints(mut self, hints: ContextHints) -> Self {
        self.hints = hints;
        self
    }

    /// Enhance a batch with fresh suppression state.
    pub async fn run(&self, products: Vec<CanonicalProduct>, schema: &MarketplaceSchema) -> BatchOutcome {
        let state = Arc::new(SuppressionState::for_providers(&self.providers));
        self.run_with_state(products, schema, state).await
    }

    /// Enhance a batch using an injected suppression state.
    pub async fn run_with_state(
        &self,
        products: Vec<CanonicalProduct>,
        schema: &MarketplaceSchema,
        state: Arc<SuppressionState>,
    ) -> BatchOutcome {
        let audit = AuditLog::new();
        let cascade = ProviderCascade::new(self.providers.clone(), self.timeout)
            .with_state(Arc::clone(&state))
            .with_audit(audit.clone());

        let pipeline = Arc::new(Pipeline {
            cascade,
            schema: schema.clone(),
            hints: self.hints.clone(),
            resolver: RequirementResolver::new(),
            research_enabled: self.config.research_enabled,
        });

        let total = products.len();
        let originals = products.clone();
        let queue: Queue = Arc::new(Mutex::new(products.into_iter().enumerate().collect()));
        let worker_count = self.config.concurrency.max(1).min(total.max(1));

        info!(products = total, workers = worker_count, marketplace = %schema.id, "starting enhancement batch");

        let workers: Vec<_> = (0..worker_count)
            .map(|worker| {
                let queue = Arc::clone(&queue);
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(run_worker(worker, queue, pipeline))
            })
            .collect();

        let mut slots: Vec<Option<CanonicalProduct>> = vec![None; total];
        for handle in workers {
            match handle.await {
                Ok(finished) => {
                    for (idx, product) in finished {
                        slots[idx] = Some(product);
                    }
                }
                Err(e) => error!(error = %e, "enhancement worker failed"),
            }
        }

        let products: Vec<CanonicalProduct> = slots
            .into_iter()
            .zip(originals)
            .map(|(slot, original)| slot.unwrap_or_else(|| failed(original)))
            .collect();

        let summary = BatchSummary::from_products(&products);
        let suppressed_providers = state.suppressed();
        info!(
            enhanced = summary.enhanced,
            partial = summary.partial,
            pending = summary.pending,
            error = summary.error,
            suppressed = ?suppressed_providers,
            "enhancement batch finished"
        );

        BatchOutcome {
            products,
            attempts: audit.snapshot(),
            summary,
            suppressed_providers,
        }
    }
}

/// Pull products off the shared queue until it is empty.
async fn run_worker(
    worker: usize,
    queue: Queue,
    pipeline: Arc<Pipeline>,
) -> Vec<(usize, CanonicalProduct)> {
    let mut finished = Vec::new();
    loop {
        let next = queue.lock().await.pop_front();
        let Some((idx, product)) = next else {
            break;
        };

        let original = product.clone();
        let job = tokio::spawn(enhance_product(Arc::clone(&pipeline), product));
        let result = match job.await {
            Ok(result) => result,
            Err(e) => {
                error!(worker, record = %original.identifier, error = %e, "record processing failed");
                failed(original)
            }
        };
        finished.push((idx, result));
    }
    debug!(worker, processed = finished.len(), "worker drained queue");
    finished
}

/// The original record, marked as failed.
fn failed(mut product: CanonicalProduct) -> CanonicalProduct {
    product.enhancement_status = EnhancementStatus::Error;
    product
}

/// Fill one product's missing required fields, in schema order.
async fn enhance_product(pipeline: Arc<Pipeline>, mut product: CanonicalProduct) -> CanonicalProduct {
    if let Err(e) = product.validate() {
        error!(record = %product.identifier, error = %e, "record processing failed");
        return failed(product);
    }

    let missing: Vec<FieldRequirement> = pipeline
        .resolver
        .missing_requirements(&product, &pipeline.schema)
        .into_iter()
        .cloned()
        .collect();

    if missing.is_empty() {
        product.enhancement_status = EnhancementStatus::Pending;
        return product;
    }

    let research = if pipeline.research_enabled && needs_research(&product) {
        let task = GenerationTask::research(&product).with_hints(pipeline.hints.clone());
        let resolution = pipeline.cascade.resolve(&task).await;
        Some(
            ResearchContext::parse(&resolution.value)
                .unwrap_or_else(|| ResearchContext::local(&product)),
        )
    } else {
        None
    };

    let mut used_fallback = false;
    for requirement in &missing {
        let field = requirement.field;
        let task = GenerationTask::field(field, &product)
            .with_research(research.clone())
            .with_hints(pipeline.hints.clone())
            .with_constraints(FieldConstraints::from(requirement));

        let resolution = pipeline.cascade.resolve(&task).await;
        let filled = to_field_value(field, &resolution.value, requirement)
            .is_some_and(|value| product.fill(field, value));

        if filled {
            used_fallback |= resolution.fallback;
        } else {
            warn!(record = %product.identifier, field = %field, "generated value did not fit the field, using local value");
            let local = LocalGenerator::new().generate(&task);
            pipeline.cascade.audit().record(
                EnhancementAttempt::new(
                    &product.identifier,
                    task.kind,
                    LOCAL_FALLBACK_ID,
                    AttemptOutcome::InvalidResponse,
                )
                .with_value(local.clone())
                .as_fallback(),
            );
            if let Some(value) = to_field_value(field, &local, requirement) {
                product.fill(field, value);
            }
            used_fallback = true;
        }
    }

    product.enhancement_status = if used_fallback {
        EnhancementStatus::Partial
    } else {
        EnhancementStatus::Enhanced
    };
    debug!(record = %product.identifier, status = ?product.enhancement_status, generated = missing.len(), "record finished");
    product
}

/// Research runs only for products missing all identity fields.
fn needs_research(product: &CanonicalProduct) -> bool {
    CanonicalField::PRIORITY
        .iter()
        .filter(|f| f.is_identity())
        .all(|&f| product.is_missing(f))
}

/// Convert generated text to a value fitting the field and its constraints.
fn to_field_value(field: CanonicalField, raw: &str, requirement: &FieldRequirement) -> Option<FieldValue> {
    match field {
        CanonicalField::Price => coerce_price(raw).map(FieldValue::Number),
        CanonicalField::BulletPoints | CanonicalField::Images => {
            let mut items = split_generated_list(raw);
            if let Some(max_len) = requirement.max_length {
                items = items.into_iter().map(|i| clamp_text(&i, max_len)).collect();
            }
            if let Some(max) = requirement.max_count {
                items.truncate(max);
            }
            (!items.is_empty()).then_some(FieldValue::List(items))
        }
        _ => {
            let text = match requirement.max_length {
                Some(max) => clamp_text(raw, max),
                None => raw.trim().to_string(),
            };
            (!text.is_empty()).then_some(FieldValue::Text(text))
        }
    }
}
