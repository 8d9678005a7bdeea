//! Coinmarketcap notifier: run once per invocation (e.g. from cron) and post
//! Slack/Discord messages for observed coins that crossed their thresholds.
//!
//! Usage: coinmarketcap-notifier [--config <path>] run-notifier

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clients_coinmarketcap::{CoinMarketCapClient, CoinMarketCapClientConfig};
use clients_webhook::WebhookClient;
use notifier::{LoggingConfig, NotifierConfig, Runner, SnapshotStore, DEFAULT_CONFIG_PATH};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about = "Notify Slack/Discord about coinmarketcap price changes")]
struct Cli {
    /// Path to the TOML settings file
    #[arg(long, global = true, env = "NOTIFIER_SETTINGS", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send notification about currency changes to the configured channels
    RunNotifier,
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    match config.format.as_str() {
        "json" => fmt().json().with_env_filter(filter).init(),
        _ => fmt().with_env_filter(filter).init(),
    }
}

async fn run_notifier(config: &NotifierConfig) -> Result<()> {
    let registry = config.registry()?;
    let store = SnapshotStore::new(&config.snapshot_path);

    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .context("failed to build HTTP client")?;
    let client = Arc::new(client);
    let ticker = CoinMarketCapClient::new(
        Arc::clone(&client),
        CoinMarketCapClientConfig {
            ticker_url: config.ticker_url.clone(),
        },
    );
    let webhooks = WebhookClient::new(client);

    Runner::new(config, &registry, &store, &ticker, &webhooks)
        .run()
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match NotifierConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the file, so fall back to defaults here.
            init_logging(&LoggingConfig::default());
            error!(config = %cli.config.display(), error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };
    init_logging(&config.logging);

    let result = match cli.command {
        Command::RunNotifier => run_notifier(&config).await,
    };

    if let Err(e) = result {
        error!(error = %format!("{:#}", e), "run failed");
        std::process::exit(1);
    }
}
