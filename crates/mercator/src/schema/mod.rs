//! Canonical product schema, column profiles and marketplace requirements.

mod column;
mod marketplace;
mod product;
mod types;

pub use column::{ColumnProfile, FieldCandidate};
pub use marketplace::{
    FieldRequirement, MarketplaceSchema, RequirementTable, StaticRequirementTable,
};
pub use product::{CanonicalProduct, EnhancementStatus};
pub use types::{CanonicalField, FieldValue, ValueType};
