//! Core type definitions for the canonical product schema.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inferred value type for a source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Numbers with a fractional part (prices, weights).
    Decimal,
    /// Whole numbers.
    Integer,
    /// Boolean words (true/false, yes/no).
    Boolean,
    /// Values holding several tokens separated by `;`, `,` or newlines.
    DelimitedList,
    /// Calendar dates.
    Date,
    /// Free text.
    String,
    /// No non-empty values were seen.
    Unknown,
}

impl ValueType {
    /// Types tested during inference, in precedence order.
    pub const PRECEDENCE: [ValueType; 6] = [
        ValueType::Decimal,
        ValueType::Integer,
        ValueType::Boolean,
        ValueType::DelimitedList,
        ValueType::Date,
        ValueType::String,
    ];

    /// Returns true if values of this type read as text.
    pub fn is_textual(&self) -> bool {
        matches!(self, ValueType::String | ValueType::DelimitedList)
    }
}

impl Default for ValueType {
    fn default() -> Self {
        ValueType::Unknown
    }
}

/// A target attribute of the canonical product schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Title,
    Description,
    Price,
    Brand,
    Category,
    BulletPoints,
    Images,
    Identifier,
}

impl CanonicalField {
    /// Fixed priority order, used to break confidence ties.
    pub const PRIORITY: [CanonicalField; 8] = [
        CanonicalField::Title,
        CanonicalField::Description,
        CanonicalField::Price,
        CanonicalField::Brand,
        CanonicalField::Category,
        CanonicalField::BulletPoints,
        CanonicalField::Images,
        CanonicalField::Identifier,
    ];

    /// Position in [`CanonicalField::PRIORITY`] (lower wins ties).
    pub fn priority_rank(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|f| *f == self)
            .unwrap_or(Self::PRIORITY.len())
    }

    /// List-valued fields may union contributions from several columns.
    pub fn is_list(self) -> bool {
        matches!(self, CanonicalField::BulletPoints | CanonicalField::Images)
    }

    /// Title, description and category describe what the product is.
    pub fn is_identity(self) -> bool {
        matches!(
            self,
            CanonicalField::Title | CanonicalField::Description | CanonicalField::Category
        )
    }

    /// Snake-case name, as used in rule tables and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::Title => "title",
            CanonicalField::Description => "description",
            CanonicalField::Price => "price",
            CanonicalField::Brand => "brand",
            CanonicalField::Category => "category",
            CanonicalField::BulletPoints => "bullet_points",
            CanonicalField::Images => "images",
            CanonicalField::Identifier => "identifier",
        }
    }

    /// Parse a field name leniently ("bulletPoints", "bullet_points", "Bullet Points").
    pub fn from_name(name: &str) -> Option<Self> {
        let compact: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::PRIORITY
            .iter()
            .copied()
            .find(|f| f.as_str().replace('_', "") == compact)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value produced for a canonical field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        assert!(CanonicalField::Title.priority_rank() < CanonicalField::Brand.priority_rank());
        assert_eq!(CanonicalField::Identifier.priority_rank(), 7);
    }

    #[test]
    fn test_from_name_is_lenient() {
        assert_eq!(
            CanonicalField::from_name("bulletPoints"),
            Some(CanonicalField::BulletPoints)
        );
        assert_eq!(
            CanonicalField::from_name("bullet_points"),
            Some(CanonicalField::BulletPoints)
        );
        assert_eq!(CanonicalField::from_name("Title"), Some(CanonicalField::Title));
        assert_eq!(CanonicalField::from_name("weight"), None);
    }

    #[test]
    fn test_list_fields() {
        assert!(CanonicalField::Images.is_list());
        assert!(!CanonicalField::Price.is_list());
    }
}
