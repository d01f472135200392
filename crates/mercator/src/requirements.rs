//! Missing-field resolution against a marketplace schema.

use crate::schema::{CanonicalField, CanonicalProduct, FieldRequirement, MarketplaceSchema};

/// Determines which required fields a product still lacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementResolver;

impl RequirementResolver {
    pub fn new() -> Self {
        Self
    }

    /// Required fields that are currently missing, in schema priority order.
    pub fn resolve(
        &self,
        product: &CanonicalProduct,
        schema: &MarketplaceSchema,
    ) -> Vec<CanonicalField> {
        self.missing_requirements(product, schema)
            .into_iter()
            .map(|r| r.field)
            .collect()
    }

    /// Like [`resolve`](Self::resolve), keeping each field's format constraints.
    ///
    /// A field listed twice in the schema is reported once, at its first
    /// position.
    pub fn missing_requirements<'a>(
        &self,
        product: &CanonicalProduct,
        schema: &'a MarketplaceSchema,
    ) -> Vec<&'a FieldRequirement> {
        let mut missing: Vec<&FieldRequirement> = Vec::new();
        for requirement in schema.required_fields() {
            if product.is_missing(requirement.field)
                && !missing.iter().any(|m| m.field == requirement.field)
            {
                missing.push(requirement);
            }
        }
        missing
    }
}
