//! Per-product research context.

use serde::{Deserialize, Serialize};

use crate::llm::parse_json_response;
use crate::schema::{CanonicalField, CanonicalProduct};

/// What the research step learned about a sparsely described product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_guess: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_terms: Vec<String>,
}

impl ResearchContext {
    /// Parse a provider response, tolerating markdown code fences.
    pub fn parse(response: &str) -> Option<Self> {
        let mut context: Self = parse_json_response(response).ok()?;
        context.category_guess = non_blank(context.category_guess);
        context.audience = non_blank(context.audience);
        context.search_terms.retain(|t| !t.trim().is_empty());
        Some(context)
    }

    /// Research derived from the product's own fields, without a provider.
    pub fn local(product: &CanonicalProduct) -> Self {
        let search_terms = [
            CanonicalField::Brand,
            CanonicalField::Category,
            CanonicalField::Identifier,
        ]
        .into_iter()
        .filter_map(|f| product.field_text(f))
        .collect();

        Self {
            category_guess: product.field_text(CanonicalField::Category),
            audience: None,
            search_terms,
        }
    }

    /// Format for inclusion in prompts.
    pub fn to_prompt_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref category) = self.category_guess {
            parts.push(format!("Likely category: {}", category));
        }
        if let Some(ref audience) = self.audience {
            parts.push(format!("Audience: {}", audience));
        }
        if !self.search_terms.is_empty() {
            parts.push(format!("Search terms: {}", self.search_terms.join(", ")));
        }
        if parts.is_empty() {
            "None".to_string()
        } else {
            parts.join("\n")
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_json() {
        let response = "```json\n{\"category_guess\": \"Kitchen\", \"audience\": \" \", \"search_terms\": [\"pan\", \"\"]}\n```";
        let context = ResearchContext::parse(response).unwrap();
        assert_eq!(context.category_guess.as_deref(), Some("Kitchen"));
        assert_eq!(context.audience, None);
        assert_eq!(context.search_terms, vec!["pan"]);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(ResearchContext::parse("It is probably a pan.").is_none());
    }

    #[test]
    fn test_local_research_uses_known_fields() {
        let product = CanonicalProduct::new("X1").with_brand("Acme");
        let context = ResearchContext::local(&product);
        assert_eq!(context.category_guess, None);
        assert_eq!(context.search_terms, vec!["Acme", "X1"]);
    }
}
