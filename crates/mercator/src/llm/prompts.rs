//! Prompt templates for content generation.

use crate::schema::CanonicalField;

use super::task::{GenerationTask, TaskKind};

/// Build the user prompt for a task.
pub fn task_prompt(task: &GenerationTask) -> String {
    match task.kind {
        TaskKind::Field(field) => field_prompt(field, task),
        TaskKind::Research => research_prompt(task),
    }
}

/// Known product fields as a bullet list.
fn known_fields_block(task: &GenerationTask) -> String {
    let known = task.product.known_fields();
    if known.is_empty() {
        return format!("  - identifier: {}", task.identifier());
    }
    known
        .iter()
        .map(|(field, value)| format!("  - {}: {}", field, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn constraints_block(task: &GenerationTask) -> String {
    let mut parts = Vec::new();
    if let Some(max) = task.constraints.max_length {
        parts.push(format!("- At most {} characters", max));
    }
    if let Some(min) = task.constraints.min_count {
        parts.push(format!("- At least {} items", min));
    }
    if let Some(max) = task.constraints.max_count {
        parts.push(format!("- At most {} items", max));
    }
    if parts.is_empty() {
        "- None".to_string()
    } else {
        parts.join("\n")
    }
}

fn field_instructions(field: CanonicalField) -> &'static str {
    match field {
        CanonicalField::Title => {
            "Write a concise, keyword-rich product title. Lead with the brand if known."
        }
        CanonicalField::Description => {
            "Write a persuasive product description of 2-4 sentences. Stick to facts implied by the known fields."
        }
        CanonicalField::Price => {
            "Estimate a plausible retail price. Reply with the number only, no currency symbol."
        }
        CanonicalField::Brand => {
            "Name the most likely brand. Reply with the brand name only, or \"Generic\" if unknown."
        }
        CanonicalField::Category => {
            "Name the most specific fitting product category, as a short path like \"Home > Kitchen > Cookware\"."
        }
        CanonicalField::BulletPoints => {
            "Write short feature bullet points, one per line, without leading symbols."
        }
        CanonicalField::Images => {
            "List publicly reachable product image URLs, one per line. Reply with nothing if none are known."
        }
        CanonicalField::Identifier => "Propose a stable product identifier.",
    }
}

/// Build a prompt for one canonical field.
pub fn field_prompt(field: CanonicalField, task: &GenerationTask) -> String {
    let research = task
        .research
        .as_ref()
        .map(|r| r.to_prompt_string())
        .unwrap_or_else(|| "None".to_string());

    format!(
        r#"Generate the "{field}" field for a product listing.

## Known Product Fields
{}

## Research
{}

## Context
{}

## Constraints
{}

## Task
{}
Reply with the field value only, without labels, quotes or commentary."#,
        known_fields_block(task),
        research,
        task.hints.to_prompt_string(),
        constraints_block(task),
        field_instructions(field),
    )
}

/// Build a prompt for the per-product research step.
pub fn research_prompt(task: &GenerationTask) -> String {
    format!(
        r#"A product record is missing its title, description and category.
Work out what the product most likely is from what is known.

## Known Product Fields
{}

## Context
{}

Respond with a JSON object:
{{
  "category_guess": "Most specific likely category",
  "audience": "Who buys this product",
  "search_terms": ["term one", "term two"]
}}"#,
        known_fields_block(task),
        task.hints.to_prompt_string(),
    )
}

/// System prompt for all content generation.
pub fn system_prompt() -> &'static str {
    r#"You are a product content specialist for Mercator, a catalog enrichment tool.

Your role is to fill in missing fields of product listings for online marketplaces.

Guidelines:
- Be concise and specific
- Never contradict the known product fields
- Do not invent certifications, materials or measurements that are not implied
- Respect every length and count constraint
- Always respond with valid JSON when requested"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::ResearchContext;
    use crate::input::ContextHints;
    use crate::llm::FieldConstraints;
    use crate::schema::CanonicalProduct;

    #[test]
    fn test_field_prompt_carries_context() {
        let product = CanonicalProduct::new("X1").with_title("Widget");
        let task = GenerationTask::field(CanonicalField::Brand, &product)
            .with_hints(ContextHints::new().with_marketplace("amazon"))
            .with_constraints(FieldConstraints {
                max_length: Some(50),
                ..Default::default()
            })
            .with_research(Some(ResearchContext {
                category_guess: Some("Tools".into()),
                audience: None,
                search_terms: Vec::new(),
            }));

        let prompt = task_prompt(&task);
        assert!(prompt.contains("\"brand\""));
        assert!(prompt.contains("title: Widget"));
        assert!(prompt.contains("Marketplace: amazon"));
        assert!(prompt.contains("At most 50 characters"));
        assert!(prompt.contains("Tools"));
    }

    #[test]
    fn test_research_prompt_asks_for_json() {
        let product = CanonicalProduct::new("SKU-9").with_brand("Acme");
        let prompt = task_prompt(&GenerationTask::research(&product));
        assert!(prompt.contains("category_guess"));
        assert!(prompt.contains("brand: Acme"));
    }
}
