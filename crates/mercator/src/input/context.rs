//! Context hints passed to content generation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Batch-level hints that shape generated content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextHints {
    /// Marketplace the content is generated for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace: Option<String>,

    /// Product domain (e.g., "home goods", "electronics").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Preferred tone of generated copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_voice: Option<String>,

    /// Language of generated copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Custom key-value hints.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom: HashMap<String, String>,
}

impl ContextHints {
    /// Create empty context hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marketplace.
    pub fn with_marketplace(mut self, marketplace: impl Into<String>) -> Self {
        self.marketplace = Some(marketplace.into());
        self
    }

    /// Set the domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the brand voice.
    pub fn with_brand_voice(mut self, voice: impl Into<String>) -> Self {
        self.brand_voice = Some(voice.into());
        self
    }

    /// Add a custom hint.
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// Check if any hints are provided.
    pub fn is_empty(&self) -> bool {
        self.marketplace.is_none()
            && self.domain.is_none()
            && self.brand_voice.is_none()
            && self.language.is_none()
            && self.custom.is_empty()
    }

    /// Format hints as a string for LLM prompts.
    pub fn to_prompt_string(&self) -> String {
        let mut parts = Vec::new();

        if let Some(ref marketplace) = self.marketplace {
            parts.push(format!("Marketplace: {}", marketplace));
        }
        if let Some(ref domain) = self.domain {
            parts.push(format!("Domain: {}", domain));
        }
        if let Some(ref voice) = self.brand_voice {
            parts.push(format!("Brand voice: {}", voice));
        }
        if let Some(ref language) = self.language {
            parts.push(format!("Language: {}", language));
        }

        let mut custom: Vec<_> = self.custom.iter().collect();
        custom.sort();
        for (key, value) in custom {
            parts.push(format!("{}: {}", key, value));
        }

        if parts.is_empty() {
            "No additional context provided.".to_string()
        } else {
            parts.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = ContextHints::new()
            .with_marketplace("amazon")
            .with_domain("kitchenware");

        assert_eq!(ctx.marketplace.as_deref(), Some("amazon"));
        assert!(!ctx.is_empty());
        assert!(ContextHints::new().is_empty());
    }

    #[test]
    fn test_prompt_string() {
        let ctx = ContextHints::new()
            .with_domain("toys")
            .with_custom("season", "holiday");

        let prompt = ctx.to_prompt_string();
        assert!(prompt.contains("Domain: toys"));
        assert!(prompt.contains("season: holiday"));
    }
}
