//! Counter fetch/increment with a duplicate-submission guard.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use shared::domain::CounterState;
use tracing::{error, info};

use crate::{
    error::{CounterError, StoreError},
    store::RemoteValueStore,
};

pub struct CounterController {
    store: Arc<dyn RemoteValueStore>,
    namespace: String,
    key: String,
    timeout: Duration,
    in_flight: AtomicBool,
    last_error: Mutex<Option<String>>,
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CounterController {
    pub fn new(
        store: Arc<dyn RemoteValueStore>,
        namespace: impl Into<String>,
        key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            key: key.into(),
            timeout,
            in_flight: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// User-facing message of the most recent failed call, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self, value: i64) -> CounterState {
        CounterState::new(self.namespace.clone(), self.key.clone(), value)
    }

    /// Current value; a counter without a row reads as 0.
    pub async fn fetch(&self) -> Result<i64, CounterError> {
        let _guard = self.begin()?;
        match self
            .bounded(self.store.get_counter(&self.namespace, &self.key))
            .await
        {
            Ok(value) => {
                let value = value.unwrap_or(0);
                info!(namespace = %self.namespace, key = %self.key, value, "counter: fetched");
                Ok(value)
            }
            Err(source) => {
                error!(namespace = %self.namespace, key = %self.key, "counter: fetch failed: {source}");
                let err = CounterError::Fetch { source };
                self.set_last_error(err.user_message());
                Err(err)
            }
        }
    }

    /// Server-side atomic increment; the only way the counter is mutated.
    pub async fn increment(&self) -> Result<i64, CounterError> {
        let _guard = self.begin()?;
        match self
            .bounded(self.store.increment_counter(&self.namespace, &self.key))
            .await
        {
            Ok(value) => {
                let value = value.unwrap_or(0);
                info!(namespace = %self.namespace, key = %self.key, value, "counter: incremented");
                Ok(value)
            }
            Err(source) => {
                error!(namespace = %self.namespace, key = %self.key, "counter: increment failed: {source}");
                let err = CounterError::Increment { source };
                self.set_last_error(err.user_message());
                Err(err)
            }
        }
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, CounterError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CounterError::Busy)?;
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        Ok(InFlightGuard(&self.in_flight))
    }

    async fn bounded<F>(&self, call: F) -> Result<Option<i64>, StoreError>
    where
        F: Future<Output = Result<Option<i64>, StoreError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }

    fn set_last_error(&self, message: &str) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
    }
}

#[cfg(test)]
#[path = "tests/counter_tests.rs"]
mod tests;
