use std::{collections::BTreeMap, sync::Arc};

use shared::domain::{CLICKS_KEY, GLOBAL_NAMESPACE, SLIDER_KEYS};

pub mod config;
pub mod counter;
pub mod error;
pub mod hue;
pub mod memory;
pub mod notice;
pub mod store;
pub mod sync;

pub use config::{load_settings, StoreSettings};
pub use counter::CounterController;
pub use error::{CounterError, StoreError};
pub use memory::InMemoryValueStore;
pub use notice::{NoticeWatcher, SaveNotice, SaveStatus};
pub use store::{RemoteValueStore, RestValueStore};
pub use sync::{LoadReport, SaveOutcome, SaveReport, ValueSynchronizer};

/// Counter and slider access bound to the fixed `global` namespace.
pub struct TallyClient {
    sync: ValueSynchronizer,
    counter: CounterController,
}

impl TallyClient {
    pub fn connect(settings: &StoreSettings) -> Result<Self, StoreError> {
        let store = RestValueStore::new(settings)?;
        Ok(Self::with_store(Arc::new(store), settings))
    }

    pub fn with_store(store: Arc<dyn RemoteValueStore>, settings: &StoreSettings) -> Self {
        Self {
            sync: ValueSynchronizer::new(store.clone()),
            counter: CounterController::new(
                store,
                GLOBAL_NAMESPACE,
                CLICKS_KEY,
                settings.request_timeout(),
            ),
        }
    }

    pub fn counter(&self) -> &CounterController {
        &self.counter
    }

    pub async fn load_sliders(&self) -> Result<LoadReport, StoreError> {
        self.sync.load(GLOBAL_NAMESPACE, &SLIDER_KEYS).await
    }

    pub async fn save_sliders(&self, values: &BTreeMap<String, i64>) -> SaveReport {
        self.sync.save(GLOBAL_NAMESPACE, values).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
