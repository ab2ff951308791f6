//! Prism CLI - feed images through the identification stage.
//!
//! Prism takes "something that represents an image" (a file path, or text
//! that expands to a path or inline Base64 data), decodes it, and prints a
//! summary record with the image's perceptual hash.
//!
//! # Usage
//!
//! ```bash
//! # Identify a single image
//! prism identify image.jpg
//!
//! # Several inputs, JSONL to a file, no hashing
//! prism identify a.png b.png --no-phash --output results.jsonl
//!
//! # View configuration
//! prism config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;
mod output;

/// Prism - image identification and perceptual fingerprinting.
#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Identify images and print summary records
    Identify(cli::identify::IdentifyArgs),

    /// View configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go to stderr raw.
    let config = match prism_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `prism config path`."
            );
            prism_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Prism v{}", prism_core::VERSION);

    match cli.command {
        Commands::Identify(args) => cli::identify::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config),
    }
}
