//! Deterministic local generation used when every provider is exhausted.

use serde_json::json;

use crate::schema::CanonicalField;

use super::task::{GenerationTask, TaskKind};

/// Produces a value for any task without network access.
///
/// Output depends only on the task, so the same product always receives
/// the same fallback content.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGenerator;

impl LocalGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate raw text for a task.
    pub fn generate(&self, task: &GenerationTask) -> String {
        let value = match task.kind {
            TaskKind::Research => Self::research(task),
            TaskKind::Field(field) => Self::field(field, task),
        };
        match (task.kind, task.constraints.max_length) {
            (TaskKind::Field(field), Some(max)) if !field.is_list() => clamp_text(&value, max),
            _ => value,
        }
    }

    fn field(field: CanonicalField, task: &GenerationTask) -> String {
        let product = &task.product;
        let research_category = task
            .research
            .as_ref()
            .and_then(|r| r.category_guess.clone());

        match field {
            CanonicalField::Title => {
                let parts: Vec<String> = [
                    product.field_text(CanonicalField::Brand),
                    product
                        .field_text(CanonicalField::Category)
                        .or_else(|| research_category.clone()),
                    Some(product.identifier.clone()),
                ]
                .into_iter()
                .flatten()
                .filter(|p| !p.trim().is_empty())
                .collect();
                if parts.is_empty() {
                    "Product".to_string()
                } else {
                    parts.join(" ")
                }
            }
            CanonicalField::Description => {
                let subject = product
                    .field_text(CanonicalField::Title)
                    .unwrap_or_else(|| format!("Product {}", product.identifier));
                match task.research.as_ref().and_then(|r| r.audience.as_deref()) {
                    Some(audience) => format!("{}. Designed for {}.", subject, audience),
                    None => format!("{}.", subject),
                }
            }
            CanonicalField::Price => "0.00".to_string(),
            CanonicalField::Brand => "Generic".to_string(),
            CanonicalField::Category => research_category.unwrap_or_else(|| "General".to_string()),
            CanonicalField::BulletPoints => {
                let mut bullets: Vec<String> = [
                    CanonicalField::Brand,
                    CanonicalField::Category,
                    CanonicalField::Title,
                ]
                .into_iter()
                .filter_map(|f| {
                    product
                        .field_text(f)
                        .map(|text| format!("{}: {}", label(f), text))
                })
                .collect();
                if bullets.is_empty() {
                    bullets.push(format!("Item {}", product.identifier));
                }
                if let Some(max) = task.constraints.max_count {
                    bullets.truncate(max.max(1));
                }
                bullets.join("\n")
            }
            CanonicalField::Images => format!(
                "https://placehold.co/600x600?text={}",
                url_slug(&product.identifier)
            ),
            CanonicalField::Identifier => product.identifier.clone(),
        }
    }

    fn research(task: &GenerationTask) -> String {
        let product = &task.product;
        let search_terms: Vec<String> = [
            CanonicalField::Brand,
            CanonicalField::Category,
            CanonicalField::Identifier,
        ]
        .into_iter()
        .filter_map(|f| product.field_text(f))
        .collect();

        json!({
            "category_guess": product.field_text(CanonicalField::Category),
            "audience": null,
            "search_terms": search_terms,
        })
        .to_string()
    }
}

fn label(field: CanonicalField) -> &'static str {
    match field {
        CanonicalField::Brand => "Brand",
        CanonicalField::Category => "Category",
        _ => "Product",
    }
}

/// Keep ASCII alphanumerics and dashes; everything else becomes `-`.
fn url_slug(text: &str) -> String {
    let slug: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    if slug.is_empty() { "item".to_string() } else { slug }
}

/// Clamp text to `max_chars` characters, preferring a word boundary.
pub fn clamp_text(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let head = &text[..cut];

    // Back off to the last whitespace unless that loses more than half.
    match head.rfind(char::is_whitespace) {
        Some(idx) if idx >= cut / 2 => head[..idx].trim_end().to_string(),
        _ => head.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::ResearchContext;
    use crate::llm::FieldConstraints;
    use crate::schema::CanonicalProduct;

    fn generate(field: CanonicalField, product: &CanonicalProduct) -> String {
        LocalGenerator::new().generate(&GenerationTask::field(field, product))
    }

    #[test]
    fn test_title_from_known_fields() {
        let product = CanonicalProduct::new("X1").with_brand("Acme").with_category("Tools");
        assert_eq!(generate(CanonicalField::Title, &product), "Acme Tools X1");
    }

    #[test]
    fn test_fixed_fallbacks() {
        let product = CanonicalProduct::new("X1");
        assert_eq!(generate(CanonicalField::Brand, &product), "Generic");
        assert_eq!(generate(CanonicalField::Category, &product), "General");
        assert_eq!(generate(CanonicalField::Price, &product), "0.00");
    }

    #[test]
    fn test_category_prefers_research() {
        let product = CanonicalProduct::new("X1");
        let task = GenerationTask::field(CanonicalField::Category, &product).with_research(Some(
            ResearchContext {
                category_guess: Some("Kitchen".into()),
                ..Default::default()
            },
        ));
        assert_eq!(LocalGenerator::new().generate(&task), "Kitchen");
    }

    #[test]
    fn test_output_is_deterministic_and_clamped() {
        let product = CanonicalProduct::new("X1").with_title("A very long product title indeed");
        let task = GenerationTask::field(CanonicalField::Description, &product).with_constraints(
            FieldConstraints {
                max_length: Some(12),
                ..Default::default()
            },
        );
        let first = LocalGenerator::new().generate(&task);
        let second = LocalGenerator::new().generate(&task);
        assert_eq!(first, second);
        assert!(first.chars().count() <= 12);
    }

    #[test]
    fn test_clamp_text_respects_char_boundaries() {
        assert_eq!(clamp_text("héllo wörld", 7), "héllo");
        assert_eq!(clamp_text("short", 10), "short");
        assert_eq!(clamp_text("abcdefghij", 4), "abcd");
    }

    #[test]
    fn test_research_is_json() {
        let product = CanonicalProduct::new("X1").with_brand("Acme");
        let raw = LocalGenerator::new().generate(&GenerationTask::research(&product));
        let parsed = ResearchContext::parse(&raw).unwrap();
        assert_eq!(parsed.search_terms, vec!["Acme", "X1"]);
    }
}
