//! Coin change notifier.
//!
//! Compares each observed coin's latest ticker reading against the baseline
//! stored by the previous run and posts Slack/Discord notifications when a
//! configured percent-change threshold is crossed.

pub mod config;
pub mod detector;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod registry;
pub mod runner;
pub mod snapshot;
pub mod types;

pub use config::{CoinConfig, LoggingConfig, NotifierConfig, DEFAULT_CONFIG_PATH};
pub use detector::{percent_change, ChangeDetector, Detection, PERCENT_PRECISION};
pub use dispatcher::{dispatch, Delivery, DeliveryReport, Dispatcher, WebhookSink};
pub use error::{NotifierError, Result};
pub use formatter::MessageFormatter;
pub use registry::CoinRegistry;
pub use runner::{RunSummary, Runner, TickerSource};
pub use snapshot::SnapshotStore;
pub use types::{
    ChangeEvent, Direction, FetchedCoin, Metric, MetricChange, ObservedCoin, RecordedThreshold,
    SnapshotRecord, TriggerCondition,
};
