//! Main Mercator struct and public API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::enhance::{BatchOutcome, EnhancementOrchestrator, OrchestratorConfig};
use crate::error::{MercatorError, Result};
use crate::inference::{ClassifierConfig, ColumnClassifier};
use crate::input::{ContextHints, RawRow};
use crate::llm::{ContentProvider, LlmSettings, call_timeout};
use crate::mapping::{MapperConfig, MappingOutcome, MappingPlan, SchemaMapper};
use crate::schema::{
    CanonicalProduct, ColumnProfile, MarketplaceSchema, RequirementTable, StaticRequirementTable,
};

/// Configuration for a Mercator pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MercatorConfig {
    pub classifier: ClassifierConfig,
    pub mapper: MapperConfig,
    pub orchestrator: OrchestratorConfig,
    pub llm: LlmSettings,
    /// Context hints for content generation.
    pub context: ContextHints,
}

impl MercatorConfig {
    /// Parse a configuration from JSON; missing sections take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no batch can run with.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(MercatorError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )))
            }
        };

        unit("classifier.type_threshold", self.classifier.type_threshold)?;
        unit("mapper.min_confidence", self.mapper.min_confidence)?;
        unit("mapper.list_min_confidence", self.mapper.list_min_confidence)?;

        if self.classifier.sample_size == 0 {
            return Err(MercatorError::Config(
                "classifier.sample_size must be at least 1".to_string(),
            ));
        }
        if self.orchestrator.concurrency == 0 {
            return Err(MercatorError::Config(
                "orchestrator.concurrency must be at least 1".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(MercatorError::Config(
                "llm.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of mapping and enhancing a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    /// Column profiles, in source order.
    pub profiles: Vec<ColumnProfile>,
    /// The column-to-field mapping used.
    pub plan: MappingPlan,
    /// Enhanced products, attempts and counts.
    #[serde(flatten)]
    pub batch: BatchOutcome,
}

/// The main Mercator pipeline: schema mapping followed by enhancement.
pub struct Mercator {
    config: MercatorConfig,
    mapper: SchemaMapper,
    requirements: Arc<dyn RequirementTable>,
    providers: Vec<Arc<dyn ContentProvider>>,
}

impl Mercator {
    /// Create a new Mercator instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(MercatorConfig::default())
    }

    /// Create a Mercator instance with custom configuration.
    pub fn with_config(config: MercatorConfig) -> Self {
        let classifier = ColumnClassifier::with_config(config.classifier.clone());
        let mapper = SchemaMapper::with_config(classifier, config.mapper.clone());

        Self {
            config,
            mapper,
            requirements: Arc::new(StaticRequirementTable::new()),
            providers: Vec::new(),
        }
    }

    /// Add a content provider.
    pub fn with_provider(mut self, provider: impl ContentProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Add several shared content providers.
    pub fn with_providers(mut self, providers: Vec<Arc<dyn ContentProvider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Set the marketplace requirement table.
    pub fn with_requirements(mut self, table: impl RequirementTable + 'static) -> Self {
        self.requirements = Arc::new(table);
        self
    }

    /// Set context hints for content generation.
    pub fn with_context(mut self, context: ContextHints) -> Self {
        self.config.context = context;
        self
    }

    pub fn config(&self) -> &MercatorConfig {
        &self.config
    }

    /// Look up a marketplace schema.
    pub fn marketplace(&self, marketplace: &str) -> Result<MarketplaceSchema> {
        self.requirements
            .lookup(marketplace)
            .ok_or_else(|| MercatorError::UnknownMarketplace(marketplace.to_string()))
    }

    /// Classify columns and map rows onto canonical products.
    pub fn map(&self, rows: &[RawRow]) -> MappingOutcome {
        self.mapper.map_rows(rows)
    }

    /// Map rows, then fill missing fields for a marketplace.
    ///
    /// Only batch preconditions fail: an unknown marketplace or an invalid
    /// configuration. Everything below batch scope is contained per record.
    pub async fn process(&self, rows: &[RawRow], marketplace: &str) -> Result<ProcessResult> {
        self.config.validate()?;
        let schema = self.marketplace(marketplace)?;

        let MappingOutcome {
            profiles,
            plan,
            products,
        } = self.map(rows);
        let batch = self.run_batch(products, &schema).await;

        Ok(ProcessResult {
            profiles,
            plan,
            batch,
        })
    }

    /// Fill missing fields of already-canonical products.
    pub async fn enhance(
        &self,
        products: Vec<CanonicalProduct>,
        marketplace: &str,
    ) -> Result<BatchOutcome> {
        self.config.validate()?;
        let schema = self.marketplace(marketplace)?;
        Ok(self.run_batch(products, &schema).await)
    }

    async fn run_batch(
        &self,
        products: Vec<CanonicalProduct>,
        schema: &MarketplaceSchema,
    ) -> BatchOutcome {
        let mut hints = self.config.context.clone();
        if hints.marketplace.is_none() {
            hints.marketplace = Some(schema.display_name.clone().unwrap_or_else(|| schema.id.clone()));
        }

        EnhancementOrchestrator::new(self.providers.clone(), call_timeout(&self.config.llm))
            .with_config(self.config.orchestrator.clone())
            .with_hints(hints)
            .run(products, schema)
            .await
    }
}

impl Default for Mercator {
    fn default() -> Self {
        Self::new()
    }
}
