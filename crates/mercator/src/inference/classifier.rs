//! Column classification - combining statistical and semantic analysis.

use serde::{Deserialize, Serialize};

use crate::input::DataTable;
use crate::schema::{ColumnProfile, FieldCandidate, ValueType};

use super::semantic::SemanticAnalyzer;
use super::statistical::StatisticalAnalyzer;

/// Configuration for column classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of non-empty values sampled for type inference.
    pub sample_size: usize,
    /// Share of sampled values that must qualify for a type (0.0-1.0).
    pub type_threshold: f64,
    /// Number of example values kept on each profile.
    pub example_count: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_size: 20,
            type_threshold: 0.8,
            example_count: 5,
        }
    }
}

/// Profiles columns into typed, confidence-ranked canonical-field candidates.
pub struct ColumnClassifier {
    statistical_analyzer: StatisticalAnalyzer,
    semantic_analyzer: SemanticAnalyzer,
}

impl ColumnClassifier {
    /// Create a classifier with default configuration.
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self {
            statistical_analyzer: StatisticalAnalyzer::with_settings(
                config.sample_size,
                config.type_threshold,
                config.example_count,
            ),
            semantic_analyzer: SemanticAnalyzer::new(),
        }
    }

    /// Classify every column of a table, in column order.
    pub fn classify_table(&self, table: &DataTable) -> Vec<ColumnProfile> {
        table
            .headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values: Vec<&str> = table.column_values(idx).collect();
                self.classify(name, idx, &values)
            })
            .collect()
    }

    /// Classify a single column from its full list of raw values.
    pub fn classify(&self, name: &str, position: usize, values: &[&str]) -> ColumnProfile {
        let statistical = self.statistical_analyzer.analyze_values(values);
        let sample: Vec<&str> = statistical.sample.iter().map(String::as_str).collect();
        let semantic = self.semantic_analyzer.analyze(name, &sample);

        let mut profile = ColumnProfile::new(name, position);
        profile.normalized_name = semantic.normalized_name;
        profile.value_type = statistical.value_type;
        profile.fill_rate = statistical.fill_rate.clamp(0.0, 1.0);
        profile.examples = statistical.examples;

        if statistical.value_type == ValueType::Unknown {
            return profile;
        }

        // Value-shape candidates only count where the name said nothing.
        let mut raw: Vec<FieldCandidate> = semantic.name_candidates;
        for candidate in semantic.value_candidates {
            if !raw.iter().any(|c| c.field == candidate.field) {
                raw.push(candidate);
            }
        }

        let mut candidates: Vec<FieldCandidate> = raw
            .into_iter()
            .filter_map(|c| {
                SemanticAnalyzer::shape_adjustment(
                    c.field,
                    statistical.value_type,
                    &sample,
                    c.confidence,
                )
                .map(|confidence| FieldCandidate {
                    field: c.field,
                    confidence,
                })
            })
            .collect();

        rank_candidates(&mut candidates);
        profile.candidates = candidates;
        profile
    }
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort candidates by confidence, breaking ties by canonical priority.
pub fn rank_candidates(candidates: &mut [FieldCandidate]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.field.priority_rank().cmp(&b.field.priority_rank()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CanonicalField;

    #[test]
    fn test_classify_title_column() {
        let classifier = ColumnClassifier::new();
        let profile = classifier.classify("Item Title", 1, &["Widget", "Gadget", "Gizmo"]);

        assert_eq!(profile.value_type, ValueType::String);
        assert_eq!(profile.normalized_name, "item_title");
        let top = profile.top_candidate().unwrap();
        assert_eq!(top.field, CanonicalField::Title);
        assert!(top.confidence >= 0.7);
    }

    #[test]
    fn test_classify_price_column() {
        let classifier = ColumnClassifier::new();
        let profile = classifier.classify("Cost", 2, &["19.99", "5.49"]);

        assert_eq!(profile.value_type, ValueType::Decimal);
        assert_eq!(profile.top_candidate().unwrap().field, CanonicalField::Price);
    }

    #[test]
    fn test_empty_column_has_no_candidates() {
        let classifier = ColumnClassifier::new();
        let profile = classifier.classify("Title", 0, &["", "", ""]);

        assert_eq!(profile.fill_rate, 0.0);
        assert_eq!(profile.value_type, ValueType::Unknown);
        assert!(profile.candidates.is_empty());
        assert!(!profile.is_mappable());
    }

    #[test]
    fn test_numeric_name_column_drops_text_fields() {
        let classifier = ColumnClassifier::new();
        let profile = classifier.classify("Name", 0, &["1.5", "2.5", "3.5"]);
        assert!(profile.confidence_for(CanonicalField::Title).is_none());
    }

    #[test]
    fn test_ties_break_by_field_priority() {
        let mut candidates = vec![
            FieldCandidate { field: CanonicalField::Brand, confidence: 0.7 },
            FieldCandidate { field: CanonicalField::Title, confidence: 0.7 },
            FieldCandidate { field: CanonicalField::Images, confidence: 0.9 },
        ];
        rank_candidates(&mut candidates);

        assert_eq!(candidates[0].field, CanonicalField::Images);
        assert_eq!(candidates[1].field, CanonicalField::Title);
        assert_eq!(candidates[2].field, CanonicalField::Brand);
    }

    #[test]
    fn test_unlabeled_image_column() {
        let classifier = ColumnClassifier::new();
        let profile = classifier.classify(
            "Column 9",
            8,
            &["https://img.example.com/1.jpg", "https://img.example.com/2.jpg"],
        );
        assert_eq!(profile.top_candidate().unwrap().field, CanonicalField::Images);
    }
}
