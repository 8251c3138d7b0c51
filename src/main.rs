use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use syncdash::config::AppConfig;
use syncdash::core::{ConnectorCatalog, ConnectorRole};
use syncdash::host::{HostApi, HostClient, SimulatedHost};
use syncdash::logging::{self, LogConfig};
use syncdash::tui;

#[derive(Parser)]
#[command(name = "syncdash")]
#[command(about = "Operator console for the sync daemon", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive console (the default).
    Console,
    /// Fetch one metrics sample and print it as JSON.
    Check,
    /// List the daemon's connectors, partitioned by role.
    Connectors,
}

#[derive(Args, Serialize)]
struct Overrides {
    /// Path to the configuration file.
    #[serde(skip)]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    host_addr: Option<SocketAddr>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    simulation: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    verbose: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    json_logs: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::new(cli.overrides.config.as_deref(), Some(&cli.overrides))?;

    logging::init(LogConfig {
        json: config.json_logs,
        verbose: config.verbose,
    });

    let host: Arc<dyn HostApi> = if config.simulation {
        Arc::new(SimulatedHost::new())
    } else {
        Arc::new(HostClient::new(config.host_addr))
    };

    match cli.command.unwrap_or(Commands::Console) {
        Commands::Console => tui::run(host, config)
            .await
            .context("console exited with an error"),
        Commands::Check => run_check(host.as_ref()).await,
        Commands::Connectors => run_connectors(host.as_ref()).await,
    }
}

async fn run_check(host: &dyn HostApi) -> Result<()> {
    let sample = host
        .system_metrics()
        .await
        .context("daemon is not reachable")?;
    println!("{}", serde_json::to_string_pretty(&sample)?);
    Ok(())
}

async fn run_connectors(host: &dyn HostApi) -> Result<()> {
    let mut catalog = ConnectorCatalog::new();
    catalog.load(host).await?;

    for role in [ConnectorRole::Source, ConnectorRole::Sink] {
        println!("{role}:");
        for connector in catalog.by_role(role) {
            println!("  {}  (schema {})", connector.name, connector.config_schema_id);
        }
    }
    Ok(())
}
