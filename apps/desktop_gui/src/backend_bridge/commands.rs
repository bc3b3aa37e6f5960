//! Backend commands queued from UI to backend worker.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    FetchCounter,
    IncrementCounter,
    LoadSliders,
    SaveSliders { values: BTreeMap<String, i64> },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchCounter => "fetch_counter",
            Self::IncrementCounter => "increment_counter",
            Self::LoadSliders => "load_sliders",
            Self::SaveSliders { .. } => "save_sliders",
        }
    }
}
