//! In-process value store used by tests.

use std::{
    collections::{BTreeMap, HashSet},
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{NamedValue, ValueKey},
    error::{ApiException, ErrorCode},
};
use tokio::sync::Mutex;

use crate::{error::StoreError, store::RemoteValueStore};

#[derive(Default)]
struct MemoryState {
    rows: BTreeMap<ValueKey, i64>,
    failing_reads: HashSet<ValueKey>,
    failing_writes: HashSet<ValueKey>,
    offline: bool,
    write_count: usize,
}

#[derive(Default)]
pub struct InMemoryValueStore {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

impl InMemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation sleeps this long before touching state.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_value(mut self, namespace: &str, key: &str, value: i64) -> Self {
        self.state
            .get_mut()
            .rows
            .insert(ValueKey::new(namespace, key), value);
        self
    }

    pub async fn set_value(&self, namespace: &str, key: &str, value: i64) {
        self.state
            .lock()
            .await
            .rows
            .insert(ValueKey::new(namespace, key), value);
    }

    pub async fn value(&self, namespace: &str, key: &str) -> Option<i64> {
        self.state
            .lock()
            .await
            .rows
            .get(&ValueKey::new(namespace, key))
            .copied()
    }

    pub async fn fail_reads_for(&self, namespace: &str, key: &str) {
        self.state
            .lock()
            .await
            .failing_reads
            .insert(ValueKey::new(namespace, key));
    }

    pub async fn fail_writes_for(&self, namespace: &str, key: &str) {
        self.state
            .lock()
            .await
            .failing_writes
            .insert(ValueKey::new(namespace, key));
    }

    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Number of upserts that reached the table.
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.write_count
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn ensure_online(state: &MemoryState) -> Result<(), StoreError> {
        if state.offline {
            return Err(StoreError::Unreachable("in-memory store is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteValueStore for InMemoryValueStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let state = self.state.lock().await;
        Self::ensure_online(&state)
    }

    async fn get_counter(&self, namespace: &str, key: &str) -> Result<Option<i64>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        Self::ensure_online(&state)?;
        Ok(state.rows.get(&ValueKey::new(namespace, key)).copied())
    }

    async fn increment_counter(
        &self,
        namespace: &str,
        key: &str,
    ) -> Result<Option<i64>, StoreError> {
        self.simulate_latency().await;
        let mut state = self.state.lock().await;
        Self::ensure_online(&state)?;
        let value = state.rows.entry(ValueKey::new(namespace, key)).or_insert(0);
        *value += 1;
        Ok(Some(*value))
    }

    async fn read_value(&self, namespace: &str, key: &str) -> Result<Option<i64>, StoreError> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        Self::ensure_online(&state)?;
        let id = ValueKey::new(namespace, key);
        if state.failing_reads.contains(&id) {
            return Err(StoreError::InvalidResponse(format!("read failed for {id}")));
        }
        Ok(state.rows.get(&id).copied())
    }

    async fn upsert_value(&self, value: &NamedValue) -> Result<(), StoreError> {
        self.simulate_latency().await;
        let mut state = self.state.lock().await;
        Self::ensure_online(&state)?;
        let id = value.identity();
        if state.failing_writes.contains(&id) {
            return Err(StoreError::Api(ApiException {
                code: ErrorCode::Internal,
                message: format!("write failed for {id}"),
            }));
        }
        state.rows.insert(id, value.value);
        state.write_count += 1;
        Ok(())
    }
}
