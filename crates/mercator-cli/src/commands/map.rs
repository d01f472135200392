//! Map command - profile columns and show the field mapping.

use std::path::PathBuf;

use colored::Colorize;
use mercator::Mercator;
use serde_json::json;

use crate::input;

pub fn run(file: PathBuf, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let rows = input::read_rows(&file)?;
    let outcome = Mercator::new().map(&rows);

    if json {
        let report = json!({
            "columns": outcome.profiles,
            "mapping": outcome.plan,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns)",
        "Mapped".cyan().bold(),
        file.display().to_string().white(),
        rows.len(),
        outcome.profiles.len()
    );
    println!();

    for profile in &outcome.profiles {
        let target = match outcome.plan.mapping_for_column(&profile.name) {
            Some(mapping) => format!("{} ({:.2})", mapping.field, mapping.confidence)
                .green()
                .to_string(),
            None => "unmapped".dimmed().to_string(),
        };
        println!(
            "  {:24} {:14} {:>5.0}%  -> {}",
            profile.name,
            format!("{:?}", profile.value_type),
            profile.fill_rate * 100.0,
            target
        );

        if verbose && !profile.examples.is_empty() {
            println!("  {:24} {}", "", profile.examples.join(", ").dimmed());
        }
    }

    let covered: Vec<String> = outcome
        .plan
        .mapped_fields()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!();
    println!("{} {}", "Covered fields:".cyan().bold(), covered.join(", "));

    for conflict in &outcome.plan.ambiguities {
        println!();
        println!(
            "{} {} columns matched {} at {:.2}: {} (kept {})",
            "Ambiguous:".yellow().bold(),
            conflict.columns.len(),
            conflict.field,
            conflict.confidence,
            conflict.columns.join(", "),
            conflict.winner.cyan()
        );
    }

    Ok(())
}
