//! Column profile produced by classification.

use serde::{Deserialize, Serialize};

use super::types::{CanonicalField, ValueType};

/// A canonical field a column may map onto, with its confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldCandidate {
    pub field: CanonicalField,
    /// Confidence in the mapping (0.0-1.0).
    pub confidence: f64,
}

/// Profile of a single source column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name as it appeared in the source.
    pub name: String,
    /// Normalized token form of the name (e.g. `item_title`).
    pub normalized_name: String,
    /// Zero-based position in the source.
    pub position: usize,
    /// Inferred value type.
    pub value_type: ValueType,
    /// Fraction of non-empty values over the full column (0.0-1.0).
    pub fill_rate: f64,
    /// Bounded sample of example values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    /// Candidate canonical fields, best first.
    #[serde(default)]
    pub candidates: Vec<FieldCandidate>,
}

impl ColumnProfile {
    /// Create an empty profile for a column.
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            normalized_name: String::new(),
            position,
            value_type: ValueType::Unknown,
            fill_rate: 0.0,
            examples: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// The highest-ranked candidate, if any.
    pub fn top_candidate(&self) -> Option<&FieldCandidate> {
        self.candidates.first()
    }

    /// Columns of unknown type never take part in mapping.
    pub fn is_mappable(&self) -> bool {
        self.value_type != ValueType::Unknown && !self.candidates.is_empty()
    }

    /// Confidence for a specific field, if it is a candidate.
    pub fn confidence_for(&self, field: CanonicalField) -> Option<f64> {
        self.candidates
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.confidence)
    }
}
