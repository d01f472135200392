//! Dataset-wide column-to-field mapping and row replay.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::inference::ColumnClassifier;
use crate::input::{DataTable, RawRow};
use crate::schema::{CanonicalField, CanonicalProduct, ColumnProfile, FieldValue};

use super::coerce::coerce_value;

/// Confidence differences below this are treated as ties.
const TIE_EPSILON: f64 = 1e-9;

/// Configuration for the schema mapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Minimum confidence for a column to map onto a scalar field.
    pub min_confidence: f64,
    /// Minimum confidence for a column to contribute to a list field.
    pub list_min_confidence: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            list_min_confidence: 0.6,
        }
    }
}

/// A source column mapped onto a canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source_column: String,
    pub field: CanonicalField,
    pub confidence: f64,
    /// Losing columns for a scalar field, best first, tried per row when the
    /// winner's value is empty or cannot be coerced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<String>,
}

/// Two or more columns tied for the same scalar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConflict {
    pub field: CanonicalField,
    pub confidence: f64,
    /// Column that won the tie (earliest in column order).
    pub winner: String,
    /// Every tied column, including the winner, in column order.
    pub columns: Vec<String>,
}

/// The mapping decided for a dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingPlan {
    /// Mappings in source column order.
    pub mappings: Vec<FieldMapping>,
    /// Columns that map onto nothing.
    pub unmapped: Vec<String>,
    /// Ties resolved deterministically while mapping.
    pub ambiguities: Vec<MappingConflict>,
}

impl MappingPlan {
    /// The mapping for a source column.
    pub fn mapping_for_column(&self, column: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.source_column == column)
    }

    /// All mappings contributing to a field, in column order.
    pub fn mappings_for(&self, field: CanonicalField) -> impl Iterator<Item = &FieldMapping> {
        self.mappings.iter().filter(move |m| m.field == field)
    }

    /// Canonical fields covered by at least one column.
    pub fn mapped_fields(&self) -> Vec<CanonicalField> {
        CanonicalField::PRIORITY
            .iter()
            .copied()
            .filter(|&f| self.mappings_for(f).next().is_some())
            .collect()
    }
}

/// Profiles, plan and replayed products for one dataset.
#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub profiles: Vec<ColumnProfile>,
    pub plan: MappingPlan,
    pub products: Vec<CanonicalProduct>,
}

/// A (column, field, confidence) triple considered during mapping.
#[derive(Debug, Clone, Copy)]
struct Claim<'a> {
    column: &'a str,
    position: usize,
    field: CanonicalField,
    confidence: f64,
}

/// Maps classified columns onto the canonical schema.
pub struct SchemaMapper {
    classifier: ColumnClassifier,
    config: MapperConfig,
}

impl SchemaMapper {
    /// Create a mapper with default configuration.
    pub fn new() -> Self {
        Self::with_config(ColumnClassifier::new(), MapperConfig::default())
    }

    /// Create with an explicit classifier and configuration.
    pub fn with_config(classifier: ColumnClassifier, config: MapperConfig) -> Self {
        Self { classifier, config }
    }

    /// Classify, map and replay a set of raw rows.
    pub fn map_rows(&self, rows: &[RawRow]) -> MappingOutcome {
        let table = DataTable::from_rows(rows);
        debug!(
            rows = table.row_count(),
            columns = table.column_count(),
            "mapping dataset"
        );
        let profiles = self.classifier.classify_table(&table);
        let plan = self.map_columns(&profiles);
        let products = self.replay(rows, &plan);

        MappingOutcome {
            profiles,
            plan,
            products,
        }
    }

    /// Decide the dataset-wide mapping from column profiles.
    ///
    /// Claims are taken greedily in order of confidence, then canonical
    /// priority, then column order. A column is assigned at most once. A
    /// scalar field keeps its first winner; list fields accept every
    /// qualifying column.
    pub fn map_columns(&self, profiles: &[ColumnProfile]) -> MappingPlan {
        let mut claims: Vec<Claim> = profiles
            .iter()
            .filter(|p| p.is_mappable())
            .flat_map(|p| {
                p.candidates.iter().map(move |c| Claim {
                    column: p.name.as_str(),
                    position: p.position,
                    field: c.field,
                    confidence: c.confidence,
                })
            })
            .filter(|c| c.confidence >= self.threshold_for(c.field))
            .collect();

        claims.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.field.priority_rank().cmp(&b.field.priority_rank()))
                .then_with(|| a.position.cmp(&b.position))
        });

        let mut assigned: HashSet<&str> = HashSet::new();
        let mut winners: Vec<(Claim, Vec<&str>)> = Vec::new();
        let mut ambiguities = Vec::new();

        for (idx, claim) in claims.iter().enumerate() {
            if assigned.contains(claim.column) {
                continue;
            }

            if claim.field.is_list() {
                assigned.insert(claim.column);
                winners.push((*claim, Vec::new()));
                continue;
            }

            if let Some((_, losers)) = winners.iter_mut().find(|(w, _)| w.field == claim.field) {
                losers.push(claim.column);
                continue;
            }

            let tied: Vec<&Claim> = claims[idx + 1..]
                .iter()
                .filter(|other| {
                    other.field == claim.field
                        && (other.confidence - claim.confidence).abs() < TIE_EPSILON
                        && !assigned.contains(other.column)
                })
                .collect();
            if !tied.is_empty() {
                let mut columns: Vec<(usize, &str)> = std::iter::once(claim)
                    .chain(tied.into_iter())
                    .map(|c| (c.position, c.column))
                    .collect();
                columns.sort();
                warn!(
                    field = %claim.field,
                    confidence = claim.confidence,
                    winner = claim.column,
                    tied = columns.len(),
                    "ambiguous mapping resolved by column order"
                );
                ambiguities.push(MappingConflict {
                    field: claim.field,
                    confidence: claim.confidence,
                    winner: claim.column.to_string(),
                    columns: columns.into_iter().map(|(_, c)| c.to_string()).collect(),
                });
            }

            assigned.insert(claim.column);
            winners.push((*claim, Vec::new()));
        }

        let mut mappings: Vec<(usize, FieldMapping)> = winners
            .into_iter()
            .map(|(claim, losers)| {
                let mut alternates: Vec<String> = Vec::new();
                for column in losers {
                    if !assigned.contains(column) && !alternates.iter().any(|a| a == column) {
                        alternates.push(column.to_string());
                    }
                }
                info!(
                    column = claim.column,
                    field = %claim.field,
                    confidence = claim.confidence,
                    "mapped column"
                );
                (
                    claim.position,
                    FieldMapping {
                        source_column: claim.column.to_string(),
                        field: claim.field,
                        confidence: claim.confidence,
                        alternates,
                    },
                )
            })
            .collect();
        mappings.sort_by_key(|(position, _)| *position);

        let unmapped = profiles
            .iter()
            .filter(|p| !assigned.contains(p.name.as_str()))
            .map(|p| p.name.clone())
            .collect();

        MappingPlan {
            mappings: mappings.into_iter().map(|(_, m)| m).collect(),
            unmapped,
            ambiguities,
        }
    }

    /// Replay raw rows through a plan into canonical products.
    ///
    /// Rows without an identifier value are numbered `row-1`, `row-2`, ...
    pub fn replay(&self, rows: &[RawRow], plan: &MappingPlan) -> Vec<CanonicalProduct> {
        rows.iter()
            .enumerate()
            .map(|(idx, row)| Self::replay_row(idx, row, plan))
            .collect()
    }

    fn replay_row(idx: usize, row: &RawRow, plan: &MappingPlan) -> CanonicalProduct {
        let mut product = CanonicalProduct::new(String::new());

        for field in CanonicalField::PRIORITY {
            let value = if field.is_list() {
                let items: Vec<String> = plan
                    .mappings_for(field)
                    .filter_map(|m| row.get(&m.source_column))
                    .filter_map(|raw| match coerce_value(field, raw) {
                        Some(FieldValue::List(items)) => Some(items),
                        _ => None,
                    })
                    .flatten()
                    .collect();
                (!items.is_empty()).then_some(FieldValue::List(items))
            } else {
                plan.mappings_for(field).next().and_then(|m| {
                    std::iter::once(&m.source_column)
                        .chain(m.alternates.iter())
                        .filter_map(|column| row.get(column))
                        .find_map(|raw| coerce_value(field, raw))
                })
            };

            if let Some(value) = value {
                product.set_source(field, value);
            }
        }

        if product.identifier.trim().is_empty() {
            product.identifier = format!("row-{}", idx + 1);
            debug!(identifier = %product.identifier, "no identifier value, numbering row");
        }
        product
    }

    fn threshold_for(&self, field: CanonicalField) -> f64 {
        if field.is_list() {
            self.config.list_min_confidence
        } else {
            self.config.min_confidence
        }
    }
}

impl Default for SchemaMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldCandidate, ValueType};

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn profile(name: &str, position: usize, candidates: &[(CanonicalField, f64)]) -> ColumnProfile {
        let mut profile = ColumnProfile::new(name, position);
        profile.value_type = ValueType::String;
        profile.fill_rate = 1.0;
        profile.candidates = candidates
            .iter()
            .map(|&(field, confidence)| FieldCandidate { field, confidence })
            .collect();
        profile
    }

    #[test]
    fn test_end_to_end_mapping() {
        let rows = vec![row(&[
            ("Product Code", "X1"),
            ("Item Title", "Widget"),
            ("Cost", "19.99"),
        ])];
        let outcome = SchemaMapper::new().map_rows(&rows);

        let title = outcome.plan.mapping_for_column("Item Title").unwrap();
        assert_eq!(title.field, CanonicalField::Title);
        assert!(title.confidence >= 0.7);

        let product = &outcome.products[0];
        assert_eq!(product.identifier, "X1");
        assert_eq!(product.title.as_deref(), Some("Widget"));
        assert_eq!(product.price, Some(19.99));
        assert!(product.generated_fields.is_empty());
    }

    #[test]
    fn test_higher_confidence_wins_scalar_field() {
        let profiles = vec![
            profile("name", 0, &[(CanonicalField::Title, 0.7)]),
            profile("title", 1, &[(CanonicalField::Title, 0.9)]),
        ];
        let plan = SchemaMapper::new().map_columns(&profiles);

        let title: Vec<_> = plan.mappings_for(CanonicalField::Title).collect();
        assert_eq!(title.len(), 1);
        assert_eq!(title[0].source_column, "title");
        assert_eq!(title[0].alternates, vec!["name"]);
        assert!(plan.ambiguities.is_empty());
    }

    #[test]
    fn test_ties_resolve_by_column_order_and_are_recorded() {
        let profiles = vec![
            profile("first", 0, &[(CanonicalField::Brand, 0.7)]),
            profile("second", 1, &[(CanonicalField::Brand, 0.7)]),
        ];
        let plan = SchemaMapper::new().map_columns(&profiles);

        assert_eq!(plan.mappings_for(CanonicalField::Brand).next().unwrap().source_column, "first");
        assert_eq!(plan.ambiguities.len(), 1);
        assert_eq!(plan.ambiguities[0].columns, vec!["first", "second"]);
    }

    #[test]
    fn test_column_is_assigned_once() {
        let profiles = vec![profile(
            "brand_title",
            0,
            &[(CanonicalField::Title, 0.7), (CanonicalField::Brand, 0.7)],
        )];
        let plan = SchemaMapper::new().map_columns(&profiles);
        assert_eq!(plan.mappings.len(), 1);
        assert_eq!(plan.mappings[0].field, CanonicalField::Title);
    }

    #[test]
    fn test_list_fields_union_in_column_order() {
        let rows = vec![row(&[
            ("Feature 2", "C"),
            ("Bullets", "A;B"),
        ])];
        let profiles = vec![
            profile("Feature 2", 0, &[(CanonicalField::BulletPoints, 0.7)]),
            profile("Bullets", 1, &[(CanonicalField::BulletPoints, 0.9)]),
        ];
        let mapper = SchemaMapper::new();
        let plan = mapper.map_columns(&profiles);
        let products = mapper.replay(&rows, &plan);

        assert_eq!(
            products[0].bullet_points,
            Some(vec!["C".to_string(), "A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_list_threshold_is_stricter() {
        let profiles = vec![profile("pics", 0, &[(CanonicalField::Images, 0.55)])];
        let plan = SchemaMapper::new().map_columns(&profiles);
        assert!(plan.mappings.is_empty());
        assert_eq!(plan.unmapped, vec!["pics"]);
    }

    #[test]
    fn test_alternate_used_when_winner_fails_to_coerce() {
        let profiles = vec![
            profile("price", 0, &[(CanonicalField::Price, 0.9)]),
            profile("cost", 1, &[(CanonicalField::Price, 0.7)]),
        ];
        let rows = vec![
            row(&[("price", "call us"), ("cost", "12.50")]),
            row(&[("price", "9.99"), ("cost", "12.50")]),
        ];
        let mapper = SchemaMapper::new();
        let plan = mapper.map_columns(&profiles);
        let products = mapper.replay(&rows, &plan);

        assert_eq!(products[0].price, Some(12.5));
        assert_eq!(products[1].price, Some(9.99));
    }

    #[test]
    fn test_missing_identifier_numbers_rows() {
        let rows = vec![row(&[("Title", "A")]), row(&[("Title", "B")])];
        let outcome = SchemaMapper::new().map_rows(&rows);
        assert_eq!(outcome.products[0].identifier, "row-1");
        assert_eq!(outcome.products[1].identifier, "row-2");
    }

    #[test]
    fn test_unparseable_price_is_left_empty() {
        let prices = ["12.00", "1.2.3", "4.50", "8.25", "3.10"];
        let rows: Vec<RawRow> = prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let sku = format!("S{}", i);
                row(&[("SKU", sku.as_str()), ("Price", *price)])
            })
            .collect();
        let outcome = SchemaMapper::new().map_rows(&rows);

        assert_eq!(outcome.products[0].price, Some(12.0));
        assert_eq!(outcome.products[1].price, None);
        assert_eq!(outcome.products[2].price, Some(4.5));
    }

    #[test]
    fn test_price_text_with_currency_code_maps_to_price() {
        let rows = vec![
            row(&[("SKU", "A1"), ("Price", "19.99 USD")]),
            row(&[("SKU", "A2"), ("Price", "5.00 USD")]),
        ];
        let outcome = SchemaMapper::new().map_rows(&rows);

        let price = outcome.plan.mapping_for_column("Price").unwrap();
        assert_eq!(price.field, CanonicalField::Price);
        assert_eq!(outcome.products[0].price, Some(19.99));
        assert_eq!(outcome.products[1].price, Some(5.0));
        assert_eq!(
            outcome.plan.mapped_fields(),
            vec![CanonicalField::Price, CanonicalField::Identifier]
        );
    }
}
