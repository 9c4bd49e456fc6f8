//! a3s-chat - streaming chat gateway for tool-calling agents

use a3s_chat::config::ChatConfig;
use a3s_chat::gateway::ServerEvent;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "a3s-chat")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Session-multiplexed streaming chat gateway")]
struct Cli {
    /// Configuration file path (.hcl)
    #[arg(short, long, env = "A3S_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one query against an in-memory session and print the events
    Run {
        /// Message to send to the agent
        #[arg(default_value = "What is the square of 12?")]
        query: String,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("a3s_chat={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (mut config, _config_path) = a3s_chat::bootstrap::load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            a3s_chat::bootstrap::run_server(config).await?;
        }
        Commands::Run { query } => {
            run_query(&config, &query).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_query(config: &ChatConfig, query: &str) -> Result<()> {
    let (mut tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ServerEvent>();
    let printer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(event) = rx.recv().await {
            let _ = write!(stdout, "{}", a3s_chat::bootstrap::render_event(&event));
            let _ = stdout.flush();
        }
    });

    let reply = a3s_chat::bootstrap::run_in_memory(config, query, &mut tx).await;
    drop(tx);
    printer.await.context("Event printer failed")?;

    if reply?.is_none() {
        tracing::warn!("Agent produced no reply");
    }
    Ok(())
}

fn show_config(config: Option<&ChatConfig>) -> Result<()> {
    let default_config;
    let config = match config {
        Some(c) => c,
        None => {
            default_config = ChatConfig::default();
            &default_config
        }
    };
    let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{}", json);
    Ok(())
}
