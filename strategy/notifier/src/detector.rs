//! Change detection and snapshot reconciliation.
//!
//! Thresholds are measured against the last baseline that fired or was reset,
//! not against the previous poll. A coin whose conditions do not fire keeps its
//! old baseline, so small moves in one direction accumulate until they cross
//! the threshold.

use std::collections::{HashMap, HashSet};

use clients_coinmarketcap::Ticker;
use tracing::{debug, info, warn};

use crate::error::{NotifierError, Result};
use crate::registry::CoinRegistry;
use crate::types::{
    ChangeEvent, Direction, FetchedCoin, Metric, MetricChange, ObservedCoin, SnapshotRecord,
    TriggerCondition,
};

/// Decimal places kept when rounding a percent change.
pub const PERCENT_PRECISION: u32 = 5;

/// Outcome of comparing one fetch against the previous snapshot.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Coins that crossed at least one threshold
    pub changes: Vec<ChangeEvent>,
    /// Full snapshot to persist, in fetch order
    pub snapshot: Vec<SnapshotRecord>,
    /// Number of tickers that passed validation
    pub valid: usize,
}

/// `abs(new - old) / old * 100`, rounded to [`PERCENT_PRECISION`] places.
///
/// Returns `None` when the baseline is zero or not finite.
pub fn percent_change(old: f64, new: f64) -> Option<f64> {
    if old == 0.0 || !old.is_finite() || !new.is_finite() {
        return None;
    }
    let percent = ((new - old).abs() / old.abs()) * 100.0;
    Some(utils::round_dp(percent, PERCENT_PRECISION))
}

/// Compares fresh readings with stored baselines using the registry's conditions.
pub struct ChangeDetector<'a> {
    registry: &'a CoinRegistry,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(registry: &'a CoinRegistry) -> Self {
        Self { registry }
    }

    /// Produces the changed coins and the snapshot to write back.
    ///
    /// Tickers with missing fields are dropped, as are coins outside the
    /// registry. Only a registry inconsistency returns an error.
    pub fn detect(&self, tickers: &[Ticker], previous: &[SnapshotRecord]) -> Result<Detection> {
        let mut baselines: HashMap<&str, &SnapshotRecord> = HashMap::with_capacity(previous.len());
        for record in previous {
            if baselines.insert(record.id.as_str(), record).is_some() {
                warn!(coin = %record.id, "duplicate snapshot record, keeping the last one");
            }
        }

        let mut detection = Detection::default();
        let mut seen = HashSet::new();

        for ticker in tickers {
            let coin = match FetchedCoin::try_from(ticker) {
                Ok(coin) => coin,
                Err(e) => {
                    debug!(error = %e, "skipping reading");
                    continue;
                }
            };
            if !seen.insert(coin.id.clone()) {
                if self.registry.contains(&coin.id) {
                    warn!(coin = %coin.id, "coin listed twice in ticker, ignoring repeat");
                }
                continue;
            }
            detection.valid += 1;

            if !self.registry.contains(&coin.id) {
                continue;
            }
            let observed = self.registry.get(&coin.id)?;

            let record = match baselines.get(coin.id.as_str()) {
                Some(&baseline) if baseline.percent != observed.thresholds() => {
                    info!(coin = %coin.id, "thresholds changed, resetting baseline");
                    SnapshotRecord::from_fetched(&coin, observed)
                }
                Some(&baseline) if !covers_conditions(baseline, observed) => {
                    info!(coin = %coin.id, "baseline lacks a watched metric, resetting baseline");
                    SnapshotRecord::from_fetched(&coin, observed)
                }
                Some(&baseline) => {
                    match evaluate_coin(observed, baseline, &coin) {
                        Some(event) => {
                            info!(
                                coin = %coin.id,
                                fired = event.fired.len(),
                                "threshold crossed"
                            );
                            let record = SnapshotRecord::from_fetched(&coin, observed);
                            detection.changes.push(event);
                            record
                        }
                        None => baseline.clone(),
                    }
                }
                None => {
                    info!(coin = %coin.id, "no baseline yet, recording first reading");
                    SnapshotRecord::from_fetched(&coin, observed)
                }
            };
            detection.snapshot.push(record);
        }

        Ok(detection)
    }
}

/// A record written before a metric was tracked cannot serve as its baseline.
fn covers_conditions(baseline: &SnapshotRecord, observed: &ObservedCoin) -> bool {
    observed
        .trigger_conditions
        .iter()
        .all(|condition| baseline.value(condition.metric).is_some())
}

/// Evaluates every condition of `observed`; any one firing makes an event.
fn evaluate_coin(
    observed: &ObservedCoin,
    baseline: &SnapshotRecord,
    current: &FetchedCoin,
) -> Option<ChangeEvent> {
    let mut fired = Vec::new();
    for condition in &observed.trigger_conditions {
        match evaluate_condition(condition, baseline, current) {
            Ok(true) => fired.push(*condition),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "skipping trigger condition"),
        }
    }

    if fired.is_empty() {
        return None;
    }

    let changes = Metric::ALL
        .iter()
        .filter_map(|&metric| metric_change(metric, baseline, current).ok().flatten())
        .collect();

    Some(ChangeEvent {
        coin: observed.clone(),
        previous: baseline.clone(),
        current: current.clone(),
        fired,
        changes,
    })
}

fn evaluate_condition(
    condition: &TriggerCondition,
    baseline: &SnapshotRecord,
    current: &FetchedCoin,
) -> Result<bool> {
    Ok(metric_change(condition.metric, baseline, current)?
        .is_some_and(|change| change.percent >= condition.percent))
}

/// Movement of `metric`, `Ok(None)` when it did not move at all.
fn metric_change(
    metric: Metric,
    baseline: &SnapshotRecord,
    current: &FetchedCoin,
) -> Result<Option<MetricChange>> {
    let undefined = || NotifierError::UndefinedPercentChange {
        id: current.id.clone(),
        metric,
    };

    let old = baseline.value(metric).ok_or_else(undefined)?;
    let new = current.value(metric);
    let percent = percent_change(old, new).ok_or_else(undefined)?;

    Ok(Direction::between(old, new).map(|direction| MetricChange {
        metric,
        old,
        new,
        percent,
        direction,
    }))
}
