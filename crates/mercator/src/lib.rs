//! Mercator: schema mapping and multi-provider enhancement for product catalogs.
//!
//! Mercator takes tabular product records with arbitrary, unlabeled or
//! inconsistently named columns, maps them onto a canonical product schema,
//! works out which fields a target marketplace requires but the record lacks,
//! and fills those gaps through a priority-ordered cascade of content
//! providers that never aborts a batch.
//!
//! # Core Principles
//!
//! - **Never overwrite**: Fields populated from source data are never replaced
//! - **Contained failure**: A bad value, provider or record never stops the batch
//! - **Full provenance**: Every generation attempt is recorded
//!
//! # Example
//!
//! ```no_run
//! use mercator::{MarketplaceSchema, Mercator, MockProvider, RawRow, StaticRequirementTable};
//! use mercator::schema::CanonicalField;
//!
//! # async fn run() -> mercator::Result<()> {
//! let table = StaticRequirementTable::new().with_schema(MarketplaceSchema::requiring(
//!     "shop",
//!     &[CanonicalField::Title, CanonicalField::Price, CanonicalField::Brand],
//! ));
//! let mercator = Mercator::new()
//!     .with_requirements(table)
//!     .with_provider(MockProvider::new("mock"));
//!
//! let mut row = RawRow::new();
//! row.insert("Item Title".into(), "Widget".into());
//! row.insert("Cost".into(), "19.99".into());
//!
//! let result = mercator.process(&[row], "shop").await?;
//! println!("Enhanced: {}", result.batch.summary.enhanced);
//! # Ok(())
//! # }
//! ```

pub mod enhance;
pub mod error;
pub mod inference;
pub mod input;
pub mod llm;
pub mod mapping;
pub mod requirements;
pub mod schema;

mod mercator;

pub use crate::mercator::{Mercator, MercatorConfig, ProcessResult};
pub use enhance::{
    AttemptOutcome, BatchOutcome, BatchSummary, EnhancementAttempt, EnhancementOrchestrator,
    OrchestratorConfig,
};
pub use error::{MercatorError, Result};
pub use inference::{ClassifierConfig, ColumnClassifier};
pub use input::{ContextHints, DataTable, RawRow};
pub use llm::{
    AnthropicProvider, ContentProvider, MockProvider, OllamaProvider, OpenAIProvider,
    ProviderCascade, ProviderKind,
};
pub use mapping::{MapperConfig, MappingPlan, SchemaMapper};
pub use requirements::RequirementResolver;
pub use schema::{
    CanonicalField, CanonicalProduct, ColumnProfile, EnhancementStatus, MarketplaceSchema,
    RequirementTable, StaticRequirementTable,
};
