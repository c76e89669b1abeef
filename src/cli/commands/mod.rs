//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod extract;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "scansum")]
#[command(about = "Extract, correct and summarize text from images")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./scansum.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        bind: String,
    },

    /// Run the pipeline on a local image and print the result as JSON
    Extract {
        /// Image file to process
        image: PathBuf,
    },

    /// Check that the configured OCR engines and services are usable
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, &bind).await,
        Commands::Extract { image } => extract::cmd_extract(&settings, &image).await,
        Commands::Check => check::cmd_check(&settings).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_default_bind() {
        let cli = Cli::try_parse_from(["scansum", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind, "127.0.0.1:5000"),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["scansum", "extract", "scan.png", "-v", "--config", "x.toml"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Extract { image } => assert_eq!(image, PathBuf::from("scan.png")),
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_extract_requires_image() {
        assert!(Cli::try_parse_from(["scansum", "extract"]).is_err());
    }
}
