//! Marketplace requirement schemas and rule-table lookup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::types::CanonicalField;

/// Requirement and format constraints for one canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRequirement {
    pub field: CanonicalField,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Maximum length in characters for text fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Minimum number of items for list fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<usize>,
    /// Maximum number of items for list fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,
}

fn default_required() -> bool {
    true
}

impl FieldRequirement {
    /// A required field with no format constraints.
    pub fn required(field: CanonicalField) -> Self {
        Self {
            field,
            required: true,
            max_length: None,
            min_count: None,
            max_count: None,
        }
    }

    /// An optional field.
    pub fn optional(field: CanonicalField) -> Self {
        Self {
            required: false,
            ..Self::required(field)
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_counts(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_count = min;
        self.max_count = max;
        self
    }
}

/// Field requirements of a target marketplace.
///
/// The order of `fields` is the generation priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceSchema {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub fields: Vec<FieldRequirement>,
}

impl MarketplaceSchema {
    /// Create an empty schema.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            fields: Vec::new(),
        }
    }

    /// Append a field requirement.
    pub fn with_field(mut self, requirement: FieldRequirement) -> Self {
        self.fields.push(requirement);
        self
    }

    /// Schema requiring the given fields, in order, without constraints.
    pub fn requiring(id: impl Into<String>, fields: &[CanonicalField]) -> Self {
        fields
            .iter()
            .fold(Self::new(id), |schema, &f| {
                schema.with_field(FieldRequirement::required(f))
            })
    }

    /// Required fields in declared priority order.
    pub fn required_fields(&self) -> impl Iterator<Item = &FieldRequirement> {
        self.fields.iter().filter(|r| r.required)
    }

    /// Constraints declared for a field.
    pub fn requirement_for(&self, field: CanonicalField) -> Option<&FieldRequirement> {
        self.fields.iter().find(|r| r.field == field)
    }
}

/// Lookup of marketplace schemas by identifier.
pub trait RequirementTable: Send + Sync {
    /// Find the schema for a marketplace.
    fn lookup(&self, marketplace: &str) -> Option<MarketplaceSchema>;

    /// Identifiers of all known marketplaces.
    fn marketplaces(&self) -> Vec<String>;
}

/// In-memory requirement table, typically loaded from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticRequirementTable {
    marketplaces: IndexMap<String, RuleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    fields: Vec<FieldRequirement>,
}

impl StaticRequirementTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from JSON of the form
    /// `{"marketplaces": {"amazon": {"fields": [{"field": "title", "max_length": 200}]}}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add or replace a schema.
    pub fn with_schema(mut self, schema: MarketplaceSchema) -> Self {
        self.insert(schema);
        self
    }

    /// Add or replace a schema.
    pub fn insert(&mut self, schema: MarketplaceSchema) {
        self.marketplaces.insert(
            schema.id.to_lowercase(),
            RuleEntry {
                display_name: schema.display_name,
                fields: schema.fields,
            },
        );
    }
}

impl RequirementTable for StaticRequirementTable {
    fn lookup(&self, marketplace: &str) -> Option<MarketplaceSchema> {
        let wanted = marketplace.trim();
        self.marketplaces
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(wanted))
            .map(|(id, entry)| MarketplaceSchema {
                id: id.to_lowercase(),
                display_name: entry.display_name.clone(),
                fields: entry.fields.clone(),
            })
    }

    fn marketplaces(&self) -> Vec<String> {
        self.marketplaces.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_json() {
        let json = r#"{
            "marketplaces": {
                "Amazon": {
                    "display_name": "Amazon",
                    "fields": [
                        {"field": "title", "max_length": 200},
                        {"field": "brand"},
                        {"field": "images", "required": false, "max_count": 7}
                    ]
                }
            }
        }"#;
        let table = StaticRequirementTable::from_json(json).unwrap();
        let schema = table.lookup("amazon").unwrap();

        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields[0].max_length, Some(200));
        assert!(schema.fields[1].required);
        assert_eq!(schema.required_fields().count(), 2);
    }

    #[test]
    fn test_unknown_marketplace() {
        let table = StaticRequirementTable::new()
            .with_schema(MarketplaceSchema::requiring("ebay", &[CanonicalField::Title]));
        assert!(table.lookup("etsy").is_none());
        assert!(table.lookup(" EBAY ").is_some());
    }
}
