// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadflow - AI outreach email engine.
//!
//! Binary entry point: loads and validates configuration once, initializes
//! tracing, and dispatches to the subcommands.

mod doctor;
mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Leadflow - AI outreach email engine.
#[derive(Parser, Debug)]
#[command(name = "leadflow", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the engine and its HTTP gateway.
    Serve,
    /// Run configuration diagnostics.
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup; nothing self-heals later.
    let config = match leadflow_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                eprintln!("leadflow: config error: {error}");
            }
            std::process::exit(1);
        }
    };

    init_tracing(&config.engine.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Doctor) => doctor::run_doctor(&config).await,
        None => {
            println!("leadflow: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("leadflow: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        let config =
            leadflow_config::load_config_from_str("").expect("default config should be valid");
        assert_eq!(config.engine.sender_name, "Leadflow");
    }
}
