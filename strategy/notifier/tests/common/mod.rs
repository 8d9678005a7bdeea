//! Shared fixtures for the notifier integration tests.
//!
//! `FakeSource` serves canned ticker listings and `RecordingSink` captures
//! posted payloads, failing for any URL it was told to reject.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use clients_coinmarketcap::Ticker;
use clients_webhook::SlackPayload;
use notifier::{NotifierConfig, NotifierError, TickerSource, WebhookSink};

pub const SLACK_URL: &str = "https://hooks.slack.com/services/T000/B000/XXXX";
pub const DISCORD_URL: &str = "https://discord.com/api/webhooks/1/abc";

pub struct FakeSource {
    tickers: Mutex<Vec<Ticker>>,
    fail: bool,
}

impl FakeSource {
    pub fn new(tickers: Vec<Ticker>) -> Self {
        Self {
            tickers: Mutex::new(tickers),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            tickers: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Replaces the listing served by the next fetch.
    pub fn set(&self, tickers: Vec<Ticker>) {
        *self.tickers.lock().unwrap() = tickers;
    }
}

#[async_trait]
impl TickerSource for FakeSource {
    async fn fetch(&self) -> notifier::Result<Vec<Ticker>> {
        if self.fail {
            return Err(NotifierError::Fetch("connection refused".into()));
        }
        Ok(self.tickers.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    posted: Mutex<Vec<(String, SlackPayload)>>,
    reject: HashSet<String>,
}

impl RecordingSink {
    pub fn rejecting(urls: &[&str]) -> Self {
        Self {
            posted: Mutex::new(Vec::new()),
            reject: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    pub fn posted(&self) -> Vec<(String, SlackPayload)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.posted.lock().unwrap().clear();
    }
}

#[async_trait]
impl WebhookSink for RecordingSink {
    async fn post(&self, url: &str, payload: &SlackPayload) -> anyhow::Result<()> {
        if self.reject.contains(url) {
            anyhow::bail!("network unreachable: {}", url);
        }
        self.posted
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        Ok(())
    }
}

pub fn ticker(id: &str, price_usd: f64, total_supply: f64) -> Ticker {
    Ticker {
        id: id.to_string(),
        name: None,
        symbol: None,
        price_usd: Some(price_usd),
        price_btc: Some(price_usd / 10_000.0),
        total_supply: Some(total_supply),
        daily_volume_usd: Some(1_000_000.0),
    }
}

/// Config with bitcoin at 5% and ethereum at 2%, both on `price_usd`.
pub fn config(snapshot_path: &Path, extra: &str) -> NotifierConfig {
    let text = format!(
        r#"
        snapshot_path = "{}"
        slack_webhook_url = "{}"
        slack_channel = "crypto"
        {}

        [[coins]]
        id = "bitcoin"
        icon_url = "https://example.com/btc.png"
        percent = 5

        [[coins]]
        id = "ethereum"
        icon_url = "https://example.com/eth.png"
        percent = 2
        "#,
        snapshot_path.display(),
        SLACK_URL,
        extra
    );
    let config: NotifierConfig = toml::from_str(&text).unwrap();
    config.validate().unwrap();
    config
}
