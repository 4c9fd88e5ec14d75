use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use astro_forecast::chart::ChartService;
use astro_forecast::config::AppConfig;
use astro_forecast::onboarding::run_wizard;
use astro_forecast::server::start_server;
use astro_forecast::service::Astrology;

#[derive(Parser)]
#[command(name = "astro-forecast")]
#[command(version, about = "Natal charts and monthly forecasts over HTTP and MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve {
        /// Overrides HOST
        #[arg(long)]
        host: Option<String>,
        /// Overrides PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Serve the MCP tools over stdio
    Mcp,
    /// Run the running-plan onboarding in the terminal
    Onboard {
        /// File holding the onboarding state
        #[arg(long, default_value = "onboarding.json")]
        state: PathBuf,
        /// Start over, discarding saved answers
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "astro_forecast=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("Invalid configuration")?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            tracing::info!("Starting astro forecast HTTP server");
            let charts = ChartService::from_config(&config)?;
            start_server(&config, charts).await?;
        }
        Commands::Mcp => {
            tracing::info!("Starting astro forecast MCP server");

            let astrology = Astrology::new(ChartService::from_config(&config)?);
            let server = astrology.serve(rmcp::transport::stdio()).await?;
            server.waiting().await?;

            tracing::info!("Server shutdown complete");
        }
        Commands::Onboard { state, reset } => {
            tokio::task::spawn_blocking(move || run_wizard(&state, reset))
                .await
                .context("Onboarding task panicked")??;
        }
    }

    Ok(())
}
