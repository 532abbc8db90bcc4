//! Agora daemon: entry point for running a governance node.

use std::path::PathBuf;

use agora_node::{AgoraNode, NodeConfig};
use agora_utils::{init_logging, LogFormat};
use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "agora-daemon", about = "Agora governance node daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the LMDB environment.
    #[arg(long, env = "AGORA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Serve the HTTP API.
    #[arg(long, env = "AGORA_ENABLE_RPC")]
    rpc: Option<bool>,

    #[arg(long, env = "AGORA_RPC_HOST")]
    rpc_host: Option<String>,

    #[arg(long, env = "AGORA_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log format: "human" or "json".
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// LMDB map size in MiB.
    #[arg(long, env = "AGORA_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Node operations.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
    /// Configuration inspection.
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand)]
enum NodeAction {
    /// Run the node until SIGINT/SIGTERM.
    Run,
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
}

impl Cli {
    /// File config (or defaults) with every flag that was given applied on top.
    fn effective_config(&self) -> anyhow::Result<NodeConfig> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => NodeConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(rpc) = self.rpc {
            config.enable_rpc = rpc;
        }
        if let Some(host) = &self.rpc_host {
            config.rpc_host = host.clone();
        }
        if let Some(port) = self.rpc_port {
            config.rpc_port = port;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(mb) = self.map_size_mb {
            config.map_size_mb = mb;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;

    match cli.command {
        Command::Config {
            action: ConfigAction::Show,
        } => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Node {
            action: NodeAction::Run,
        } => {
            init_logging(config.log_format, &config.log_level);
            if let Some(path) = &cli.config {
                tracing::info!(path = %path.display(), "loaded config file");
            }

            let mut node = AgoraNode::new(config)?;
            node.start().await?;

            tracing::info!("shutdown signal received, stopping node");
            node.stop().await?;
            tracing::info!("Agora daemon exited cleanly");
        }
    }

    Ok(())
}
