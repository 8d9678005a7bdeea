use std::collections::BTreeMap;
use std::fs;

use notifier::{Metric, NotifierError, RecordedThreshold, SnapshotRecord, SnapshotStore};

fn record(id: &str, price_usd: f64) -> SnapshotRecord {
    SnapshotRecord {
        id: id.to_string(),
        price_usd,
        price_btc: price_usd / 10_000.0,
        total_supply: Some(21_000_000.0),
        percent: RecordedThreshold::Single(1.0),
    }
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("absent.jsonl"));
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn save_writes_one_json_object_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coins.jsonl");
    let store = SnapshotStore::new(&path);

    store
        .save(&[record("bitcoin", 6500.5), record("ethereum", 300.0)])
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        r#"{"id":"bitcoin","price_usd":6500.5,"price_btc":0.65005,"total_supply":21000000.0,"percent":1.0}"#
    );
    assert_eq!(store.load().unwrap()[1], record("ethereum", 300.0));
}

#[test]
fn save_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coins.jsonl");
    let store = SnapshotStore::new(&path);

    store
        .save(&[record("bitcoin", 1.0), record("litecoin", 2.0)])
        .unwrap();
    store.save(&[record("ethereum", 3.0)]).unwrap();

    assert_eq!(store.load().unwrap(), vec![record("ethereum", 3.0)]);
    // No temp file left behind after the rename.
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("coins.jsonl");
    let store = SnapshotStore::new(&path);

    store.save(&[record("bitcoin", 1.0)]).unwrap();
    assert!(path.exists());
}

#[test]
fn malformed_line_fails_with_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coins.jsonl");
    fs::write(
        &path,
        "{\"id\":\"bitcoin\",\"price_usd\":1.0,\"price_btc\":1.0,\"total_supply\":1.0,\"percent\":1.0}\n\n{\"id\":\"ethereum\"}\n",
    )
    .unwrap();

    match SnapshotStore::new(&path).load() {
        Err(NotifierError::MalformedSnapshot { line, path: reported, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(reported, path);
        }
        other => panic!("expected MalformedSnapshot, got {:?}", other),
    }
}

#[test]
fn per_metric_thresholds_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("coins.jsonl"));
    let mut thresholds = BTreeMap::new();
    thresholds.insert(Metric::PriceUsd, 2.0);
    thresholds.insert(Metric::TotalSupply, 0.5);
    let mut multi = record("bitcoin", 1.0);
    multi.percent = RecordedThreshold::PerMetric(thresholds);

    store.save(&[multi.clone()]).unwrap();
    assert_eq!(store.load().unwrap(), vec![multi]);
}
