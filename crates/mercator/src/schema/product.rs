//! Canonical product record.

use serde::{Deserialize, Serialize};

use crate::error::{MercatorError, Result};

use super::types::{CanonicalField, FieldValue};

/// Lifecycle status of a product's enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementStatus {
    /// Nothing was missing, or enhancement has not run yet.
    Pending,
    /// At least one field came from the local fallback generator.
    Partial,
    /// Every requested field came from a provider.
    Enhanced,
    /// The record could not be processed and was returned unmodified.
    Error,
}

impl Default for EnhancementStatus {
    fn default() -> Self {
        EnhancementStatus::Pending
    }
}

/// A product mapped onto the canonical schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullet_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub enhancement_status: EnhancementStatus,
    /// Fields filled by generation rather than source data, in fill order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generated_fields: Vec<CanonicalField>,
}

impl CanonicalProduct {
    /// Create a product with only an identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: None,
            description: None,
            price: None,
            brand: None,
            category: None,
            bullet_points: None,
            images: None,
            enhancement_status: EnhancementStatus::Pending,
            generated_fields: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether a field is null, blank, or an empty list.
    pub fn is_missing(&self, field: CanonicalField) -> bool {
        fn blank(value: &Option<String>) -> bool {
            value.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
        }
        fn empty(value: &Option<Vec<String>>) -> bool {
            value
                .as_ref()
                .map(|items| items.iter().all(|s| s.trim().is_empty()))
                .unwrap_or(true)
        }

        match field {
            CanonicalField::Identifier => self.identifier.trim().is_empty(),
            CanonicalField::Title => blank(&self.title),
            CanonicalField::Description => blank(&self.description),
            CanonicalField::Price => self.price.is_none(),
            CanonicalField::Brand => blank(&self.brand),
            CanonicalField::Category => blank(&self.category),
            CanonicalField::BulletPoints => empty(&self.bullet_points),
            CanonicalField::Images => empty(&self.images),
        }
    }

    /// Render a populated field as text for prompts and fallback generation.
    pub fn field_text(&self, field: CanonicalField) -> Option<String> {
        if self.is_missing(field) {
            return None;
        }
        match field {
            CanonicalField::Identifier => Some(self.identifier.clone()),
            CanonicalField::Title => self.title.clone(),
            CanonicalField::Description => self.description.clone(),
            CanonicalField::Price => self.price.map(|p| format!("{:.2}", p)),
            CanonicalField::Brand => self.brand.clone(),
            CanonicalField::Category => self.category.clone(),
            CanonicalField::BulletPoints => self.bullet_points.as_ref().map(|b| b.join("; ")),
            CanonicalField::Images => self.images.as_ref().map(|i| i.join(", ")),
        }
    }

    /// Populated fields in canonical priority order.
    pub fn known_fields(&self) -> Vec<(CanonicalField, String)> {
        CanonicalField::PRIORITY
            .iter()
            .filter_map(|&f| self.field_text(f).map(|text| (f, text)))
            .collect()
    }

    /// Fill a missing field with generated content.
    ///
    /// Returns false (and leaves the record untouched) when the field is
    /// already populated or the value does not fit the field's shape.
    pub fn fill(&mut self, field: CanonicalField, value: FieldValue) -> bool {
        let filled = self.set_source(field, value);
        if filled {
            self.generated_fields.push(field);
        }
        filled
    }

    /// Populate a missing field from source data.
    ///
    /// Same rules as [`fill`](Self::fill) but the field is not recorded as
    /// generated.
    pub fn set_source(&mut self, field: CanonicalField, value: FieldValue) -> bool {
        if !self.is_missing(field) {
            return false;
        }

        match (field, value) {
            (CanonicalField::Identifier, FieldValue::Text(v)) => self.identifier = v,
            (CanonicalField::Title, FieldValue::Text(v)) => self.title = Some(v),
            (CanonicalField::Description, FieldValue::Text(v)) => self.description = Some(v),
            (CanonicalField::Brand, FieldValue::Text(v)) => self.brand = Some(v),
            (CanonicalField::Category, FieldValue::Text(v)) => self.category = Some(v),
            (CanonicalField::Price, FieldValue::Number(v)) if v.is_finite() => {
                self.price = Some(v)
            }
            (CanonicalField::BulletPoints, FieldValue::List(v)) if !v.is_empty() => {
                self.bullet_points = Some(v)
            }
            (CanonicalField::Images, FieldValue::List(v)) if !v.is_empty() => {
                self.images = Some(v)
            }
            _ => return false,
        }
        true
    }

    /// Check the record is structurally sound enough to enhance.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| MercatorError::InvalidRecord {
            identifier: self.identifier.clone(),
            message: message.to_string(),
        };

        if self.identifier.trim().is_empty() {
            return Err(invalid("identifier is empty"));
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(invalid("price is not a finite, non-negative number"));
            }
        }
        Ok(())
    }
}
