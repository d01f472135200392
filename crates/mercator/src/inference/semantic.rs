//! Semantic analysis of column names and value shapes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::mapping::coerce_price;
use crate::schema::{CanonicalField, FieldCandidate, ValueType};

/// Confidence of an exact synonym match.
pub const EXACT_MATCH_CONFIDENCE: f64 = 0.9;
/// Confidence of a partial (token or substring) synonym match.
pub const PARTIAL_MATCH_CONFIDENCE: f64 = 0.7;
/// Confidence of a candidate inferred from values alone.
pub const VALUE_SHAPE_CONFIDENCE: f64 = 0.5;

/// Shortest compact synonym eligible for substring matching.
const MIN_SUBSTRING_LEN: usize = 4;

/// Synonyms too generic to match as part of a longer name.
const EXACT_ONLY_SYNONYMS: &[&str] = &["name", "type"];

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://\S+$").unwrap());

static IMAGE_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://\S+\.(jpe?g|png|gif|webp|avif|bmp|tiff?)(\?\S*)?$").unwrap()
});

static CURRENCY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[$€£¥]\s*\d[\d,]*(\.\d+)?$").unwrap());

/// Normalize a column name to a single token form.
///
/// Lowercases, treats every run of non-alphanumerics as one separator and
/// joins the tokens with `_`: `"  Item-Title "` becomes `item_title`. CamelCase
/// boundaries are split too, so `ProductName` becomes `product_name`.
pub fn normalize_name(name: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_lower && !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
            current.extend(c.to_lowercase());
        } else {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens.join("_")
}

/// Normalized name with separators removed (`item_title` → `itemtitle`).
fn compact(normalized: &str) -> String {
    normalized.replace('_', "")
}

/// Whether `needle` tokens appear contiguously inside `haystack` tokens.
fn contains_tokens(haystack: &[&str], needle: &[&str]) -> bool {
    !needle.is_empty()
        && needle.len() <= haystack.len()
        && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Result of semantic analysis for one column.
#[derive(Debug, Clone)]
pub struct SemanticAnalysis {
    /// Normalized column name.
    pub normalized_name: String,
    /// Candidate fields from name matching, before value-shape adjustment.
    pub name_candidates: Vec<FieldCandidate>,
    /// Candidate fields suggested by the values alone.
    pub value_candidates: Vec<FieldCandidate>,
}

/// Matches column names against ordered synonym sets per canonical field.
pub struct SemanticAnalyzer {
    synonyms: Vec<(CanonicalField, Vec<String>)>,
}

impl SemanticAnalyzer {
    /// Create a new semantic analyzer with the built-in synonym sets.
    pub fn new() -> Self {
        Self {
            synonyms: Self::build_synonyms(),
        }
    }

    /// Ordered synonym sets, in canonical priority order.
    fn build_synonyms() -> Vec<(CanonicalField, Vec<String>)> {
        let sets: [(CanonicalField, &[&str]); 8] = [
            (
                CanonicalField::Title,
                &[
                    "title", "product_title", "item_title", "product_name", "item_name",
                    "name", "listing_title", "headline",
                ],
            ),
            (
                CanonicalField::Description,
                &[
                    "description", "product_description", "item_description", "desc",
                    "long_description", "details", "summary", "overview",
                ],
            ),
            (
                CanonicalField::Price,
                &[
                    "price", "cost", "unit_price", "retail_price", "sale_price", "list_price",
                    "msrp", "amount", "rrp",
                ],
            ),
            (
                CanonicalField::Brand,
                &["brand", "brand_name", "manufacturer", "vendor", "maker"],
            ),
            (
                CanonicalField::Category,
                &[
                    "category", "product_category", "product_type", "department",
                    "categories", "taxonomy", "category_path", "type",
                ],
            ),
            (
                CanonicalField::BulletPoints,
                &[
                    "bullet_points", "bullet_point", "bullets", "features", "key_features",
                    "highlights", "feature",
                ],
            ),
            (
                CanonicalField::Images,
                &[
                    "images", "image", "image_url", "image_urls", "image_link", "photo",
                    "photos", "picture", "main_image", "img",
                ],
            ),
            (
                CanonicalField::Identifier,
                &[
                    "id", "sku", "product_id", "item_id", "product_code", "item_code",
                    "code", "upc", "ean", "gtin", "asin", "mpn", "item_number", "part_number",
                ],
            ),
        ];

        sets.into_iter()
            .map(|(field, names)| {
                (field, names.iter().map(|n| normalize_name(n)).collect())
            })
            .collect()
    }

    /// Analyze a column name and its sampled values.
    pub fn analyze(&self, name: &str, sample: &[&str]) -> SemanticAnalysis {
        let normalized_name = normalize_name(name);
        let name_candidates = self.match_name(&normalized_name);
        let value_candidates = self.match_values(sample);

        SemanticAnalysis {
            normalized_name,
            name_candidates,
            value_candidates,
        }
    }

    /// Score every canonical field against a normalized name.
    ///
    /// The best synonym per field counts; fields with no match are omitted.
    pub fn match_name(&self, normalized: &str) -> Vec<FieldCandidate> {
        if normalized.is_empty() {
            return Vec::new();
        }

        let name_tokens: Vec<&str> = normalized.split('_').collect();
        let name_compact = compact(normalized);

        self.synonyms
            .iter()
            .filter_map(|(field, synonyms)| {
                let best = synonyms
                    .iter()
                    .filter_map(|synonym| Self::score(&name_tokens, &name_compact, synonym))
                    .fold(0.0_f64, f64::max);
                (best > 0.0).then_some(FieldCandidate {
                    field: *field,
                    confidence: best,
                })
            })
            .collect()
    }

    /// Score one synonym against a name.
    fn score(name_tokens: &[&str], name_compact: &str, synonym: &str) -> Option<f64> {
        let synonym_compact = compact(synonym);
        if name_compact == synonym_compact {
            return Some(EXACT_MATCH_CONFIDENCE);
        }
        if EXACT_ONLY_SYNONYMS.contains(&synonym) {
            return None;
        }

        let synonym_tokens: Vec<&str> = synonym.split('_').collect();
        if contains_tokens(name_tokens, &synonym_tokens) {
            return Some(PARTIAL_MATCH_CONFIDENCE);
        }

        if synonym_compact.len() >= MIN_SUBSTRING_LEN && name_compact.contains(&synonym_compact) {
            return Some(PARTIAL_MATCH_CONFIDENCE);
        }

        None
    }

    /// Candidates suggested purely by the shape of the values.
    fn match_values(&self, sample: &[&str]) -> Vec<FieldCandidate> {
        if sample.is_empty() {
            return Vec::new();
        }

        let share = |pattern: &Regex| {
            sample.iter().filter(|v| pattern.is_match(v.trim())).count() as f64
                / sample.len() as f64
        };

        let mut candidates = Vec::new();
        if share(&IMAGE_URL_PATTERN) >= 0.8 {
            candidates.push(FieldCandidate {
                field: CanonicalField::Images,
                confidence: VALUE_SHAPE_CONFIDENCE,
            });
        }
        if share(&CURRENCY_PATTERN) >= 0.8 {
            candidates.push(FieldCandidate {
                field: CanonicalField::Price,
                confidence: VALUE_SHAPE_CONFIDENCE,
            });
        }
        candidates
    }

    /// Adjust a candidate's confidence for the column's value type.
    ///
    /// Returns `None` when the type rules the field out (a decimal column never
    /// maps to `title`), otherwise the adjusted confidence.
    pub fn shape_adjustment(
        field: CanonicalField,
        value_type: ValueType,
        sample: &[&str],
        confidence: f64,
    ) -> Option<f64> {
        let delta = match field {
            CanonicalField::Title
            | CanonicalField::Description
            | CanonicalField::Brand
            | CanonicalField::Category => {
                if !value_type.is_textual() {
                    return None;
                }
                0.0
            }
            CanonicalField::Price => match value_type {
                ValueType::Decimal => 0.05,
                ValueType::Integer => 0.0,
                ValueType::String | ValueType::DelimitedList if looks_like_prices(sample) => 0.0,
                _ => return None,
            },
            CanonicalField::BulletPoints => match value_type {
                ValueType::DelimitedList => 0.05,
                ValueType::String => 0.0,
                _ => return None,
            },
            CanonicalField::Images => {
                if !value_type.is_textual() {
                    return None;
                }
                let urls = sample.iter().filter(|v| URL_PATTERN.is_match(v.trim())).count();
                let any_url = sample
                    .iter()
                    .any(|v| v.contains("http://") || v.contains("https://"));
                if urls * 2 >= sample.len() || any_url {
                    0.05
                } else {
                    -0.2
                }
            }
            CanonicalField::Identifier => match value_type {
                ValueType::Boolean | ValueType::Date | ValueType::Unknown => return None,
                _ => 0.0,
            },
        };

        Some((confidence + delta).clamp(0.0, 1.0))
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Text columns still hold prices when a value carries a currency marker or
/// most sampled values parse as a price (`"19.99 USD"`).
fn looks_like_prices(sample: &[&str]) -> bool {
    if sample.iter().any(|v| CURRENCY_PATTERN.is_match(v.trim())) {
        return true;
    }
    let parsed = sample.iter().filter(|v| coerce_price(v).is_some()).count();
    !sample.is_empty() && parsed * 5 >= sample.len() * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confidence_of(candidates: &[FieldCandidate], field: CanonicalField) -> Option<f64> {
        candidates.iter().find(|c| c.field == field).map(|c| c.confidence)
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Item Title"), "item_title");
        assert_eq!(normalize_name("  Product--Code "), "product_code");
        assert_eq!(normalize_name("ProductName"), "product_name");
        assert_eq!(normalize_name("IMAGE_URL_2"), "image_url_2");
        assert_eq!(normalize_name("***"), "");
    }

    #[test]
    fn test_exact_match() {
        let analyzer = SemanticAnalyzer::new();
        let candidates = analyzer.match_name("item_title");
        assert_eq!(confidence_of(&candidates, CanonicalField::Title), Some(0.9));
    }

    #[test]
    fn test_partial_match() {
        let analyzer = SemanticAnalyzer::new();
        let candidates = analyzer.match_name(&normalize_name("Long Product Description"));
        assert_eq!(confidence_of(&candidates, CanonicalField::Description), Some(0.7));

        let candidates = analyzer.match_name(&normalize_name("Bullet Point 3"));
        assert_eq!(confidence_of(&candidates, CanonicalField::BulletPoints), Some(0.7));
    }

    #[test]
    fn test_short_synonyms_need_token_match() {
        let analyzer = SemanticAnalyzer::new();
        let candidates = analyzer.match_name("width");
        assert_eq!(confidence_of(&candidates, CanonicalField::Identifier), None);
    }

    #[test]
    fn test_generic_synonyms_match_only_whole_names() {
        let analyzer = SemanticAnalyzer::new();
        assert_eq!(confidence_of(&analyzer.match_name("name"), CanonicalField::Title), Some(0.9));

        let candidates = analyzer.match_name(&normalize_name("Manufacturer Name"));
        assert_eq!(confidence_of(&candidates, CanonicalField::Title), None);
        assert_eq!(confidence_of(&candidates, CanonicalField::Brand), Some(0.7));

        let candidates = analyzer.match_name(&normalize_name("Category Name"));
        assert_eq!(confidence_of(&candidates, CanonicalField::Title), None);
        assert_eq!(confidence_of(&candidates, CanonicalField::Category), Some(0.7));

        let candidates = analyzer.match_name(&normalize_name("Product Name EN"));
        assert_eq!(confidence_of(&candidates, CanonicalField::Title), Some(0.7));
    }

    #[test]
    fn test_text_prices_with_currency_codes() {
        let sample = ["19.99 USD", "5.00 USD", "120 USD"];
        let adjusted =
            SemanticAnalyzer::shape_adjustment(CanonicalField::Price, ValueType::String, &sample, 0.9);
        assert_eq!(adjusted, Some(0.9));

        let prose = ["call us", "ask in store", "19.99 USD"];
        let adjusted =
            SemanticAnalyzer::shape_adjustment(CanonicalField::Price, ValueType::String, &prose, 0.9);
        assert_eq!(adjusted, None);
    }

    #[test]
    fn test_decimal_column_never_maps_to_title() {
        let adjusted =
            SemanticAnalyzer::shape_adjustment(CanonicalField::Title, ValueType::Decimal, &[], 0.9);
        assert_eq!(adjusted, None);

        let price =
            SemanticAnalyzer::shape_adjustment(CanonicalField::Price, ValueType::Decimal, &[], 0.9);
        assert!(price.unwrap() > 0.9);
    }

    #[test]
    fn test_value_shape_candidates() {
        let analyzer = SemanticAnalyzer::new();
        let result = analyzer.analyze(
            "col_7",
            &["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.png"],
        );
        assert_eq!(
            confidence_of(&result.value_candidates, CanonicalField::Images),
            Some(VALUE_SHAPE_CONFIDENCE)
        );
    }
}
