//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mercator: map product catalogs and fill marketplace gaps
#[derive(Parser)]
#[command(name = "mercator")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile the columns of a data file and show the field mapping
    Map {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output the mapping as JSON
        #[arg(long)]
        json: bool,
    },

    /// Map a data file and generate missing marketplace fields
    Enhance {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Target marketplace identifier (e.g., "amazon", "ebay")
        #[arg(short, long)]
        marketplace: String,

        /// Marketplace rule table (JSON); defaults to the built-in table
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output path for results (default: <file>.enhanced.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of records processed concurrently
        #[arg(long)]
        concurrency: Option<usize>,

        /// Use the mock provider instead of remote backends
        #[arg(long)]
        mock_llm: bool,

        /// Per-call provider timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List the marketplaces a rule table knows about
    Marketplaces {
        /// Marketplace rule table (JSON); defaults to the built-in table
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_enhance_arguments() {
        let cli = Cli::parse_from([
            "mercator",
            "enhance",
            "items.csv",
            "--marketplace",
            "amazon",
            "--mock-llm",
            "--concurrency",
            "3",
        ]);
        match cli.command {
            Commands::Enhance {
                marketplace,
                mock_llm,
                concurrency,
                timeout,
                ..
            } => {
                assert_eq!(marketplace, "amazon");
                assert!(mock_llm);
                assert_eq!(concurrency, Some(3));
                assert_eq!(timeout, None);
            }
            _ => panic!("expected enhance"),
        }
    }
}
