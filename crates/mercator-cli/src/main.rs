//! Mercator CLI - product catalog mapping and enhancement.

mod cli;
mod commands;
mod input;
mod rules;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Map { file, json } => commands::map::run(file, json, cli.verbose),

        Commands::Enhance {
            file,
            marketplace,
            rules,
            config,
            output,
            concurrency,
            mock_llm,
            timeout,
        } => {
            let options = commands::enhance::EnhanceOptions {
                marketplace,
                rules,
                config,
                output,
                concurrency,
                mock_llm,
                timeout,
            };
            commands::enhance::run(file, options, cli.verbose).await
        }

        Commands::Marketplaces { rules } => commands::marketplaces::run(rules),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
