use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tft_stats::calculate::{sort_by_rank, win_rate};
use tft_stats::config::AppConfig;
use tft_stats::fetch::{ApiClient, StatsSource};
use tft_stats::models::ApexTier;
use tft_stats::web::App;

#[derive(Parser)]
#[command(name = "tft-stats")]
#[command(about = "Teamfight Tactics ranked statistics dashboard")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check that the league API is reachable
    Health,

    /// Print the top of an apex leaderboard
    Top {
        /// challenger, grandmaster or master
        #[arg(long, default_value = "challenger")]
        tier: String,

        /// Number of players to print
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(Some(cli.config.as_path()))
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting tft-stats v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let addr = format!("{}:{}", config.server.host, config.server.port);

            let app = App::start(config)?;
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {}", addr))?;
            tracing::info!("Dashboard: http://{}", addr);

            axum::serve(listener, app.router())
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            app.shutdown().await;
        }
        Commands::Health => {
            let client = ApiClient::new(config.api.client_config()?)?;
            match client.health().await {
                Ok(health) => {
                    println!("League API at {} is online", client.base_url());
                    println!("Checked at: {}", health.checked_at.format("%Y-%m-%d %H:%M:%S UTC"));
                }
                Err(e) => bail!("League API at {} is offline: {}", client.base_url(), e),
            }
        }
        Commands::Top { tier, limit } => {
            let Some(apex) = ApexTier::from_slug(&tier) else {
                bail!("Unknown tier {:?}; use challenger, grandmaster or master", tier);
            };
            let client = ApiClient::new(config.api.client_config()?)?;
            let league = client.apex_league(apex).await?;

            let mut entries: Vec<_> = league.entries.iter().collect();
            sort_by_rank(&mut entries);

            println!("\n=== TOP {} {} ===", limit, apex.label());
            for (i, e) in entries.iter().take(limit).enumerate() {
                println!(
                    "{:>3}. {:<24} {:>5} LP  {:>4}W {:>4}L  {:>3}%",
                    i + 1,
                    e.display_name(),
                    e.league_points,
                    e.wins,
                    e.losses,
                    win_rate(e.wins, e.losses)
                );
            }
            if entries.is_empty() {
                println!("(no players)");
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
