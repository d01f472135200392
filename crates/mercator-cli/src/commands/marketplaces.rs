//! Marketplaces command - list rule-table entries.

use std::path::PathBuf;

use colored::Colorize;
use mercator::RequirementTable;

use crate::rules;

pub fn run(rules: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let table = rules::load(rules.as_deref())?;

    for id in table.marketplaces() {
        let Some(schema) = table.lookup(&id) else {
            continue;
        };

        let required: Vec<String> = schema
            .required_fields()
            .map(|r| r.field.to_string())
            .collect();
        let optional: Vec<String> = schema
            .fields
            .iter()
            .filter(|r| !r.required)
            .map(|r| r.field.to_string())
            .collect();

        println!(
            "{} {}",
            id.cyan().bold(),
            schema.display_name.as_deref().unwrap_or("").dimmed()
        );
        println!("  required: {}", required.join(", "));
        if !optional.is_empty() {
            println!("  optional: {}", optional.join(", ").dimmed());
        }
    }

    Ok(())
}
