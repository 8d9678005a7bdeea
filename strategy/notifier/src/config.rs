//! Configuration for the notifier, loaded once from a TOML file at startup.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clients_coinmarketcap::DEFAULT_TICKER_URL;
use serde::Deserialize;

use crate::error::{NotifierError, Result};
use crate::registry::CoinRegistry;
use crate::types::{Metric, ObservedCoin, TriggerCondition};

/// Default location of the settings file, overridable with `NOTIFIER_SETTINGS`.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/notifier_settings.toml";

fn default_ticker_url() -> String {
    DEFAULT_TICKER_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_sender_name() -> String {
    "COINMARKETCAP_BOT".to_string()
}

fn default_icon_emoji() -> String {
    ":robot_face:".to_string()
}

/// Top-level notifier configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    /// Ticker endpoint returning every listed coin
    #[serde(default = "default_ticker_url")]
    pub ticker_url: String,
    /// JSON-lines file holding the baselines between runs
    pub snapshot_path: PathBuf,
    /// Timeout applied to every outbound HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Display name of the posting bot
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default = "default_icon_emoji")]
    pub icon_emoji: String,
    /// Slack incoming webhook used for the broadcast and per-coin channels
    #[serde(default)]
    pub slack_webhook_url: Option<String>,
    /// Channel of the broadcast message; the webhook's own channel when unset
    #[serde(default)]
    pub slack_channel: Option<String>,
    /// Discord webhooks receiving the broadcast message
    #[serde(default)]
    pub discord_webhook_urls: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub coins: Vec<CoinConfig>,
}

/// Logging settings; `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// One `[[coins]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinConfig {
    pub id: String,
    #[serde(default)]
    pub icon_url: String,
    /// Shorthand for a single `price_usd` condition
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub trigger_conditions: Vec<TriggerCondition>,
    #[serde(default)]
    pub slack_channel: Option<String>,
    #[serde(default)]
    pub discord_webhook_url: Option<String>,
}

impl CoinConfig {
    fn conditions(&self) -> Vec<TriggerCondition> {
        self.percent
            .map(|percent| TriggerCondition::new(Metric::PriceUsd, percent))
            .into_iter()
            .chain(self.trigger_conditions.iter().copied())
            .collect()
    }

    pub fn to_observed(&self) -> ObservedCoin {
        ObservedCoin {
            id: self.id.clone(),
            icon_url: self.icon_url.clone(),
            trigger_conditions: self.conditions(),
            slack_channel: self.slack_channel.clone(),
            discord_webhook_url: self.discord_webhook_url.clone(),
        }
    }
}

impl NotifierConfig {
    /// Reads, parses and validates the file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            NotifierError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: NotifierConfig =
            toml::from_str(&content).map_err(|source| NotifierError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the coin registry from the `[[coins]]` entries.
    pub fn registry(&self) -> Result<CoinRegistry> {
        CoinRegistry::new(self.coins.iter().map(CoinConfig::to_observed).collect())
    }

    pub fn validate(&self) -> Result<()> {
        if self.snapshot_path.as_os_str().is_empty() {
            return Err(config_error("snapshot_path must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(config_error("timeout_secs must be greater than zero"));
        }
        if self.coins.is_empty() {
            return Err(config_error("at least one [[coins]] entry is required"));
        }

        check_url("ticker_url", &self.ticker_url)?;
        if let Some(url) = &self.slack_webhook_url {
            check_url("slack_webhook_url", url)?;
        }
        for url in &self.discord_webhook_urls {
            check_url("discord_webhook_urls", url)?;
        }

        for coin in &self.coins {
            validate_coin(coin, self.slack_webhook_url.is_some())?;
        }

        self.registry().map(|_| ())
    }
}

fn validate_coin(coin: &CoinConfig, has_slack_webhook: bool) -> Result<()> {
    if coin.id.trim().is_empty() {
        return Err(config_error("coin id must not be empty"));
    }

    let conditions = coin.conditions();
    if conditions.is_empty() {
        return Err(config_error(format!(
            "coin {} needs `percent` or at least one trigger condition",
            coin.id
        )));
    }

    let mut metrics = HashSet::new();
    for condition in &conditions {
        if !condition.percent.is_finite() || condition.percent < 0.0 {
            return Err(config_error(format!(
                "coin {}: threshold for {} must be a non-negative number",
                coin.id, condition.metric
            )));
        }
        if !metrics.insert(condition.metric) {
            return Err(config_error(format!(
                "coin {}: more than one condition on {}",
                coin.id, condition.metric
            )));
        }
    }

    if coin.slack_channel.is_some() && !has_slack_webhook {
        return Err(config_error(format!(
            "coin {} has a slack_channel but slack_webhook_url is not set",
            coin.id
        )));
    }
    if let Some(url) = &coin.discord_webhook_url {
        check_url("discord_webhook_url", url)?;
    }
    Ok(())
}

fn check_url(key: &str, value: &str) -> Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| config_error(format!("{} is not a valid URL ({}): {}", key, value, e)))
}

fn config_error(message: impl Into<String>) -> NotifierError {
    NotifierError::Config(message.into())
}
