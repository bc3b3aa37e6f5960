use super::*;
use std::time::Duration;

use shared::{
    domain::{default_slider_values, GLOBAL_NAMESPACE, SLIDER_DEFAULT, SLIDER_KEYS},
    error::ErrorCode,
};

use crate::memory::InMemoryValueStore;

fn values(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}

#[tokio::test]
async fn load_returns_exact_values_when_every_key_is_present() {
    let store = InMemoryValueStore::new()
        .with_value("global", "val0", 1)
        .with_value("global", "val1", 4)
        .with_value("global", "val3", 9)
        .with_value("global", "val4", 0);
    let sync = ValueSynchronizer::new(Arc::new(store));

    let report = sync.load(GLOBAL_NAMESPACE, &SLIDER_KEYS).await.expect("load");

    assert_eq!(
        report.values,
        vec![
            ("val0".to_string(), Some(1)),
            ("val1".to_string(), Some(4)),
            ("val3".to_string(), Some(9)),
            ("val4".to_string(), Some(0)),
        ]
    );
    assert!(report.absent_keys().is_empty());
}

#[tokio::test]
async fn missing_row_is_marked_absent_without_affecting_other_keys() {
    let store = InMemoryValueStore::new()
        .with_value("global", "val0", 2)
        .with_value("global", "val3", 8)
        .with_value("global", "val4", 6);
    let sync = ValueSynchronizer::new(Arc::new(store));

    let report = sync.load(GLOBAL_NAMESPACE, &SLIDER_KEYS).await.expect("load");

    assert_eq!(report.get("val0"), Some(2));
    assert_eq!(report.get("val1"), None);
    assert_eq!(report.get("val3"), Some(8));
    assert_eq!(report.get("val4"), Some(6));
    assert_eq!(report.absent_keys(), vec!["val1"]);
}

#[tokio::test]
async fn failed_read_is_treated_as_absence() {
    let store = InMemoryValueStore::new()
        .with_value("global", "val0", 2)
        .with_value("global", "val1", 3);
    store.fail_reads_for("global", "val1").await;
    let sync = ValueSynchronizer::new(Arc::new(store));

    let report = sync
        .load("global", &["val0", "val1"])
        .await
        .expect("per-key failure is not fatal");

    assert_eq!(report.get("val0"), Some(2));
    assert_eq!(report.get("val1"), None);
}

#[tokio::test]
async fn apply_keeps_defaults_for_absent_keys() {
    let store = InMemoryValueStore::new().with_value("global", "val3", 10);
    let sync = ValueSynchronizer::new(Arc::new(store));
    let mut sliders = default_slider_values();

    sync.load(GLOBAL_NAMESPACE, &SLIDER_KEYS)
        .await
        .expect("load")
        .apply_to(&mut sliders);

    assert_eq!(sliders.get("val3"), Some(&10));
    for key in ["val0", "val1", "val4"] {
        assert_eq!(sliders.get(key), Some(&SLIDER_DEFAULT), "key {key}");
    }
}

#[tokio::test]
async fn load_fails_only_when_store_is_unreachable() {
    let store = Arc::new(InMemoryValueStore::new().with_value("global", "val0", 1));
    store.set_offline(true).await;
    let sync = ValueSynchronizer::new(store);

    let err = sync
        .load(GLOBAL_NAMESPACE, &SLIDER_KEYS)
        .await
        .expect_err("offline store");
    assert!(matches!(err, StoreError::Unreachable(_)));
}

#[tokio::test]
async fn load_of_no_keys_is_empty_success() {
    let sync = ValueSynchronizer::new(Arc::new(InMemoryValueStore::new()));
    let keys: [&str; 0] = [];

    let report = sync.load("global", &keys).await.expect("load");
    assert!(report.values.is_empty());
}

#[tokio::test]
async fn reads_run_concurrently() {
    let store = InMemoryValueStore::new()
        .with_latency(Duration::from_millis(200))
        .with_value("global", "val0", 1);
    let sync = ValueSynchronizer::new(Arc::new(store));

    let started = tokio::time::Instant::now();
    sync.load(GLOBAL_NAMESPACE, &SLIDER_KEYS).await.expect("load");

    // Serial reads would take at least 800ms.
    assert!(started.elapsed() < Duration::from_millis(700));
}

#[tokio::test]
async fn saved_values_are_retrievable_by_load() {
    let store = Arc::new(InMemoryValueStore::new());
    let sync = ValueSynchronizer::new(store.clone());
    let sliders = values(&[("val0", 3), ("val1", 5), ("val3", 7), ("val4", 10)]);

    let report = sync.save(GLOBAL_NAMESPACE, &sliders).await;
    assert_eq!(report.outcome(), SaveOutcome::Success);
    assert!(report.failed_keys().is_empty());

    let loaded = sync.load(GLOBAL_NAMESPACE, &SLIDER_KEYS).await.expect("load");
    let mut round_tripped = BTreeMap::new();
    loaded.apply_to(&mut round_tripped);
    assert_eq!(round_tripped, sliders);
    assert_eq!(store.write_count().await, 4);
}

#[tokio::test]
async fn one_failing_write_fails_save_but_keeps_other_writes() {
    let store = Arc::new(
        InMemoryValueStore::new()
            .with_value("global", "val0", 0)
            .with_value("global", "val1", 0)
            .with_value("global", "val3", 0)
            .with_value("global", "val4", 0),
    );
    store.fail_writes_for("global", "val3").await;
    let sync = ValueSynchronizer::new(store.clone());

    let report = sync
        .save(
            GLOBAL_NAMESPACE,
            &values(&[("val0", 4), ("val1", 6), ("val3", 8), ("val4", 9)]),
        )
        .await;

    assert_eq!(
        report.outcome(),
        SaveOutcome::Failure("Failed to save values".to_string())
    );
    assert!(!report.is_success());
    assert_eq!(report.failed_keys(), vec!["val3"]);

    let err = store
        .upsert_value(&NamedValue::new("global", "val3", 1))
        .await
        .expect_err("write still failing");
    assert!(matches!(err, StoreError::Api(ref api) if api.code == ErrorCode::Internal));

    let loaded = sync.load(GLOBAL_NAMESPACE, &SLIDER_KEYS).await.expect("load");
    assert_eq!(loaded.get("val0"), Some(4));
    assert_eq!(loaded.get("val1"), Some(6));
    assert_eq!(loaded.get("val3"), Some(0));
    assert_eq!(loaded.get("val4"), Some(9));
}

#[tokio::test]
async fn store_does_not_bound_slider_values() {
    let store = Arc::new(InMemoryValueStore::new());
    let sync = ValueSynchronizer::new(store.clone());

    let report = sync.save("global", &values(&[("val0", 42)])).await;

    assert!(report.is_success());
    assert_eq!(store.value("global", "val0").await, Some(42));
}

#[tokio::test]
async fn save_while_offline_reports_every_entry_failed() {
    let store = Arc::new(InMemoryValueStore::new());
    store.set_offline(true).await;
    let sync = ValueSynchronizer::new(store);

    let report = sync
        .save("global", &values(&[("val0", 1), ("val1", 2)]))
        .await;

    assert_eq!(report.failed_keys(), vec!["val0", "val1"]);
}
