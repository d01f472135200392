//! Enhance command - map a data file and fill missing marketplace fields.

use std::path::PathBuf;

use colored::Colorize;
use mercator::llm::{mock_providers, providers_from_env};
use mercator::{Mercator, MercatorConfig};
use tracing::warn;

use crate::{input, rules};

/// Options for the enhance command.
pub struct EnhanceOptions {
    pub marketplace: String,
    pub rules: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub mock_llm: bool,
    pub timeout: Option<u64>,
}

pub async fn run(
    file: PathBuf,
    options: EnhanceOptions,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut config = match &options.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            MercatorConfig::from_json(&json)?
        }
        None => MercatorConfig::default(),
    };
    if let Some(concurrency) = options.concurrency {
        config.orchestrator.concurrency = concurrency;
    }
    if let Some(timeout) = options.timeout {
        config.llm.timeout_secs = timeout;
    }

    let table = rules::load(options.rules.as_deref())?;
    let providers = if options.mock_llm {
        mock_providers()
    } else {
        providers_from_env(&config.llm)?
    };
    if !providers.iter().any(|p| p.descriptor().has_credentials) {
        warn!("no provider credentials configured, every missing field will use the local fallback");
    }

    let rows = input::read_rows(&file)?;

    println!(
        "{} {} for {}",
        "Enhancing".cyan().bold(),
        file.display().to_string().white(),
        options.marketplace.white().bold()
    );

    let mercator = Mercator::with_config(config)
        .with_requirements(table)
        .with_providers(providers);
    let result = mercator.process(&rows, &options.marketplace).await?;

    if verbose {
        println!();
        println!("{}", "Mapping:".yellow().bold());
        for mapping in &result.plan.mappings {
            println!(
                "  {:24} -> {} ({:.2})",
                mapping.source_column, mapping.field, mapping.confidence
            );
        }
        for column in &result.plan.unmapped {
            println!("  {:24} -> {}", column, "unmapped".dimmed());
        }
    }

    let output_path = options.output.unwrap_or_else(|| {
        let mut p = file.clone();
        let stem = p.file_stem().unwrap_or_default().to_string_lossy().to_string();
        p.set_file_name(format!("{}.enhanced.json", stem));
        p
    });
    std::fs::write(&output_path, serde_json::to_string_pretty(&result.batch)?)?;

    let summary = result.batch.summary;
    println!();
    println!(
        "Processed {} records ({} enhanced, {} partial, {} pending, {} error)",
        summary.total().to_string().white().bold(),
        summary.enhanced.to_string().green(),
        summary.partial.to_string().yellow(),
        summary.pending.to_string().blue(),
        summary.error.to_string().red()
    );
    println!(
        "Recorded {} generation attempts",
        result.batch.attempts.len().to_string().white().bold()
    );
    if !result.batch.suppressed_providers.is_empty() {
        println!(
            "{} quota exhausted for {}",
            "Note:".yellow(),
            result.batch.suppressed_providers.join(", ")
        );
    }

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}
