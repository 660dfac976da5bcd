// crates/warden-cli/src/main.rs
//
// CLI entrypoint for the Warden node reputation tools.
//
// Initializes tracing, loads configuration, opens the reputation store,
// and dispatches to the operator subcommands.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};
use commands::audit::AuditCmd;
use commands::status::StatusCmd;
use config::WardenConfig;
use output::OutputFormat;

use warden_core::identity::NodeId;

/// Warden CLI: inspect and drive storage-node reputation.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version = "0.1.0",
    about = "Warden CLI for storage-node reputation: audits, vetting, suspension, disqualification"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "~/.warden/config.toml")]
    config: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a fresh reputation record for a node.
    Init {
        /// Hex-encoded 32-byte node ID.
        node: NodeId,
    },

    /// Apply one audit outcome.
    Audit(AuditCmd),

    /// Display a node's full reputation.
    Get {
        /// Hex-encoded 32-byte node ID.
        node: NodeId,
    },

    /// Direct status transitions: disqualify, suspend, unsuspend, set.
    #[command(subcommand)]
    Status(StatusCmd),

    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found. Logged once tracing is up.
    let loaded = WardenConfig::load(&cli.config);
    let config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => WardenConfig::default(),
    };

    // Initialize tracing subscriber; RUST_LOG overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Ok(_) => tracing::debug!("Loaded configuration from {}", cli.config),
        Err(e) => tracing::debug!(
            "Could not load config from {}: {}. Using defaults.",
            cli.config,
            e
        ),
    }

    if let Commands::Config = cli.command {
        return commands::show_config::run(&config, cli.format);
    }

    let service = commands::open_service(&config)?;
    match &cli.command {
        Commands::Init { node } => commands::init::run(&service, node, cli.format).await?,
        Commands::Audit(cmd) => commands::audit::run(&service, cmd, cli.format).await?,
        Commands::Get { node } => commands::get::run(&service, node, cli.format).await?,
        Commands::Status(cmd) => commands::status::run(&service, cmd, cli.format).await?,
        Commands::Config => {}
    }

    Ok(())
}
