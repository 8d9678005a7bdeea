//! Domain types shared by the registry, detector and formatter.

use std::collections::BTreeMap;
use std::fmt;

use clients_coinmarketcap::Ticker;
use serde::{Deserialize, Serialize};

use crate::error::NotifierError;

/// Numeric attribute of a coin that a trigger condition can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PriceUsd,
    PriceBtc,
    TotalSupply,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::PriceUsd, Metric::PriceBtc, Metric::TotalSupply];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::PriceUsd => "price_usd",
            Metric::PriceBtc => "price_btc",
            Metric::TotalSupply => "total_supply",
        }
    }

    /// Human readable name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Metric::PriceUsd => "price",
            Metric::PriceBtc => "BTC price",
            Metric::TotalSupply => "total supply",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (metric, threshold %) pair. The coin counts as changed once the metric
/// has moved at least `percent` percent away from its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerCondition {
    pub metric: Metric,
    pub percent: f64,
}

impl TriggerCondition {
    pub fn new(metric: Metric, percent: f64) -> Self {
        Self { metric, percent }
    }
}

/// Thresholds in effect when a snapshot record was written.
///
/// A coin with a single condition is stored as a bare number; a coin with
/// several is stored as an object keyed by metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedThreshold {
    Single(f64),
    PerMetric(BTreeMap<Metric, f64>),
}

/// A coin the operator wants to watch.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedCoin {
    pub id: String,
    pub icon_url: String,
    pub trigger_conditions: Vec<TriggerCondition>,
    /// Dedicated Slack channel for this coin's single-coin messages
    pub slack_channel: Option<String>,
    /// Dedicated Discord webhook for this coin's single-coin messages
    pub discord_webhook_url: Option<String>,
}

impl ObservedCoin {
    /// Creates a coin with one condition and no dedicated destinations.
    pub fn new(
        id: impl Into<String>,
        icon_url: impl Into<String>,
        condition: TriggerCondition,
    ) -> Self {
        Self {
            id: id.into(),
            icon_url: icon_url.into(),
            trigger_conditions: vec![condition],
            slack_channel: None,
            discord_webhook_url: None,
        }
    }

    pub fn thresholds(&self) -> RecordedThreshold {
        match self.trigger_conditions.as_slice() {
            [single] => RecordedThreshold::Single(single.percent),
            conditions => RecordedThreshold::PerMetric(
                conditions.iter().map(|c| (c.metric, c.percent)).collect(),
            ),
        }
    }
}

/// Persisted baseline of one coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: String,
    pub price_usd: f64,
    pub price_btc: f64,
    /// Absent in records written before supply was tracked
    #[serde(default)]
    pub total_supply: Option<f64>,
    pub percent: RecordedThreshold,
}

impl SnapshotRecord {
    /// New baseline from a fresh reading, stamped with the coin's current thresholds.
    pub fn from_fetched(coin: &FetchedCoin, observed: &ObservedCoin) -> Self {
        Self {
            id: coin.id.clone(),
            price_usd: coin.price_usd,
            price_btc: coin.price_btc,
            total_supply: Some(coin.total_supply),
            percent: observed.thresholds(),
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::PriceUsd => Some(self.price_usd),
            Metric::PriceBtc => Some(self.price_btc),
            Metric::TotalSupply => self.total_supply,
        }
    }
}

/// A validated ticker entry: every numeric field present and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedCoin {
    pub id: String,
    pub name: Option<String>,
    pub price_usd: f64,
    pub price_btc: f64,
    pub total_supply: f64,
    pub daily_volume_usd: f64,
}

impl FetchedCoin {
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::PriceUsd => self.price_usd,
            Metric::PriceBtc => self.price_btc,
            Metric::TotalSupply => self.total_supply,
        }
    }
}

impl TryFrom<&Ticker> for FetchedCoin {
    type Error = NotifierError;

    fn try_from(ticker: &Ticker) -> Result<Self, Self::Error> {
        let field = |value: Option<f64>, field: &'static str| {
            value
                .filter(|v| v.is_finite())
                .ok_or_else(|| NotifierError::InvalidReading {
                    id: ticker.id.clone(),
                    field,
                })
        };

        Ok(Self {
            id: ticker.id.clone(),
            name: ticker.name.clone(),
            price_usd: field(ticker.price_usd, "price_usd")?,
            price_btc: field(ticker.price_btc, "price_btc")?,
            total_supply: field(ticker.total_supply, "total_supply")?,
            daily_volume_usd: field(ticker.daily_volume_usd, "24h_volume_usd")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    /// `None` when the values are equal: there is no direction to report.
    pub fn between(old: f64, new: f64) -> Option<Self> {
        if new > old {
            Some(Direction::Increased)
        } else if new < old {
            Some(Direction::Decreased)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Movement of one metric between the baseline and the new reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricChange {
    pub metric: Metric,
    pub old: f64,
    pub new: f64,
    /// Rounded percent change, always non-negative
    pub percent: f64,
    pub direction: Direction,
}

impl MetricChange {
    pub fn delta(&self) -> f64 {
        self.new - self.old
    }
}

/// A coin that crossed at least one of its thresholds this run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub coin: ObservedCoin,
    pub previous: SnapshotRecord,
    pub current: FetchedCoin,
    /// Conditions that fired, in configuration order
    pub fired: Vec<TriggerCondition>,
    /// Every metric that moved, fired or not
    pub changes: Vec<MetricChange>,
}

impl ChangeEvent {
    pub fn change(&self, metric: Metric) -> Option<&MetricChange> {
        self.changes.iter().find(|c| c.metric == metric)
    }

    /// The change behind the first fired condition.
    pub fn primary(&self) -> Option<&MetricChange> {
        self.fired.iter().find_map(|c| self.change(c.metric))
    }

    /// Ticker name when known, otherwise the capitalized id.
    pub fn display_name(&self) -> String {
        match &self.current.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => capitalize(&self.coin.id),
        }
    }
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
