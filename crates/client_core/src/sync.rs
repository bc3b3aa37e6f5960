//! Batch load and save of named values.
//!
//! Both directions fan out one request per key and wait for every request to
//! settle. Nothing is retried, and a save is not transactional: entries that
//! were written stay written even when a sibling write fails.

use std::{collections::BTreeMap, sync::Arc};

use futures::future::join_all;
use shared::domain::NamedValue;
use tracing::{info, warn};

use crate::{
    error::{StoreError, SAVE_ERROR_MESSAGE},
    store::RemoteValueStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub namespace: String,
    /// Caller key order; `None` marks a key whose read failed or had no row.
    pub values: Vec<(String, Option<i64>)>,
}

impl LoadReport {
    pub fn get(&self, key: &str) -> Option<i64> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == key)
            .and_then(|(_, value)| *value)
    }

    pub fn absent_keys(&self) -> Vec<&str> {
        self.values
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|(_, value)| value.is_some()).count()
    }

    /// Overwrites only the keys that were loaded.
    pub fn apply_to(&self, target: &mut BTreeMap<String, i64>) {
        for (key, value) in &self.values {
            if let Some(value) = value {
                target.insert(key.clone(), *value);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Success,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub namespace: String,
    pub results: Vec<(String, Result<(), String>)>,
}

impl SaveReport {
    pub fn outcome(&self) -> SaveOutcome {
        if self.results.iter().all(|(_, result)| result.is_ok()) {
            SaveOutcome::Success
        } else {
            SaveOutcome::Failure(SAVE_ERROR_MESSAGE.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == SaveOutcome::Success
    }

    pub fn failed_keys(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, result)| result.is_err())
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

#[derive(Clone)]
pub struct ValueSynchronizer {
    store: Arc<dyn RemoteValueStore>,
}

impl ValueSynchronizer {
    pub fn new(store: Arc<dyn RemoteValueStore>) -> Self {
        Self { store }
    }

    /// Reads every key concurrently. Only an unreachable store fails the call;
    /// per-key errors and missing rows come back as `None`.
    pub async fn load<S: AsRef<str>>(
        &self,
        namespace: &str,
        keys: &[S],
    ) -> Result<LoadReport, StoreError> {
        if let Err(err) = self.store.ping().await {
            warn!(namespace, "sync: store unreachable, load not attempted: {err}");
            return Err(err);
        }

        let reads = keys.iter().map(|key| {
            let key = key.as_ref();
            async move { (key.to_string(), self.store.read_value(namespace, key).await) }
        });

        let values = join_all(reads)
            .await
            .into_iter()
            .map(|(key, result)| match result {
                Ok(Some(value)) => (key, Some(value)),
                Ok(None) => {
                    warn!(namespace, key = %key, "sync: no stored row, keeping caller default");
                    (key, None)
                }
                Err(err) => {
                    warn!(namespace, key = %key, "sync: read failed, keeping caller default: {err}");
                    (key, None)
                }
            })
            .collect::<Vec<_>>();

        let report = LoadReport {
            namespace: namespace.to_string(),
            values,
        };
        info!(
            namespace,
            loaded = report.present_count(),
            requested = keys.len(),
            "sync: load settled"
        );
        Ok(report)
    }

    /// Upserts every entry concurrently.
    pub async fn save(&self, namespace: &str, values: &BTreeMap<String, i64>) -> SaveReport {
        let writes = values.iter().map(|(key, value)| {
            let row = NamedValue::new(namespace, key.clone(), *value);
            async move {
                let result = self.store.upsert_value(&row).await;
                (row.key, result)
            }
        });

        let results = join_all(writes)
            .await
            .into_iter()
            .map(|(key, result)| {
                let result = result.map_err(|err| {
                    warn!(namespace, key = %key, "sync: write failed: {err}");
                    err.to_string()
                });
                (key, result)
            })
            .collect();

        let report = SaveReport {
            namespace: namespace.to_string(),
            results,
        };
        match report.outcome() {
            SaveOutcome::Success => info!(namespace, count = values.len(), "sync: save settled"),
            SaveOutcome::Failure(_) => warn!(
                namespace,
                failed = ?report.failed_keys(),
                "sync: save partially failed; written entries are kept"
            ),
        }
        report
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
