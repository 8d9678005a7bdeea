//! One notifier run: fetch, detect, notify, persist.

use async_trait::async_trait;
use clients_coinmarketcap::{CoinMarketCapClient, Ticker};
use tracing::{info, warn};

use crate::config::NotifierConfig;
use crate::detector::ChangeDetector;
use crate::dispatcher::{Dispatcher, WebhookSink};
use crate::error::{NotifierError, Result};
use crate::registry::CoinRegistry;
use crate::snapshot::SnapshotStore;

/// Source of the current ticker listing.
#[async_trait]
pub trait TickerSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Ticker>>;
}

#[async_trait]
impl TickerSource for CoinMarketCapClient {
    async fn fetch(&self) -> Result<Vec<Ticker>> {
        self.get_ticker()
            .await
            .map_err(|e| NotifierError::Fetch(Box::new(e)))
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub valid: usize,
    pub changed: usize,
    pub persisted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Wires the components of a run together.
pub struct Runner<'a, T: ?Sized, S: ?Sized> {
    config: &'a NotifierConfig,
    registry: &'a CoinRegistry,
    store: &'a SnapshotStore,
    source: &'a T,
    sink: &'a S,
}

impl<'a, T, S> Runner<'a, T, S>
where
    T: TickerSource + ?Sized,
    S: WebhookSink + ?Sized,
{
    pub fn new(
        config: &'a NotifierConfig,
        registry: &'a CoinRegistry,
        store: &'a SnapshotStore,
        source: &'a T,
        sink: &'a S,
    ) -> Self {
        Self {
            config,
            registry,
            store,
            source,
            sink,
        }
    }

    /// Runs the pipeline once.
    ///
    /// The snapshot is written at the end of every successful run, including
    /// runs where nothing changed. A snapshot or fetch failure returns before
    /// anything is written; delivery failures do not.
    pub async fn run(&self) -> Result<RunSummary> {
        let previous = self.store.load()?;
        let tickers = self.source.fetch().await?;

        let detection = ChangeDetector::new(self.registry).detect(&tickers, &previous)?;

        let mut summary = RunSummary {
            fetched: tickers.len(),
            valid: detection.valid,
            changed: detection.changes.len(),
            persisted: detection.snapshot.len(),
            ..Default::default()
        };

        if !detection.changes.is_empty() {
            let report = Dispatcher::new(self.sink, self.config)
                .deliver(&detection.changes)
                .await;
            if report.sent + report.failed == 0 {
                warn!(
                    changed = summary.changed,
                    "coins changed but no webhook destination is configured"
                );
            }
            summary.sent = report.sent;
            summary.failed = report.failed;
        }

        self.store.save(&detection.snapshot)?;

        info!(
            fetched = summary.fetched,
            valid = summary.valid,
            changed = summary.changed,
            persisted = summary.persisted,
            sent = summary.sent,
            failed = summary.failed,
            "run complete"
        );
        Ok(summary)
    }
}
