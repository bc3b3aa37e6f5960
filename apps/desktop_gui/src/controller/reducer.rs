//! Reducer-like state transitions applied to backend events.

use std::collections::BTreeMap;

use client_core::SaveOutcome;
use shared::domain::default_slider_values;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};

const ACCESS_KEY_HINT: &str =
    "The store rejected the access key; check STORE_ANON_KEY or --store-key";

#[derive(Debug, Clone)]
pub struct ViewModel {
    pub count: i64,
    /// Disables the increment button while a counter request is outstanding.
    pub counter_pending: bool,
    pub counter_error: Option<UiError>,
    pub sliders: BTreeMap<String, i64>,
    /// Keys still showing their default because the store had no value.
    pub defaulted_sliders: Vec<String>,
    pub save_pending: bool,
    pub last_error: Option<UiError>,
    pub status: String,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            count: 0,
            counter_pending: false,
            counter_error: None,
            sliders: default_slider_values(),
            defaulted_sliders: Vec::new(),
            save_pending: false,
            last_error: None,
            status: String::new(),
        }
    }
}

impl ViewModel {
    /// Marks the request the command starts; called once it has been queued.
    pub fn command_queued(&mut self, cmd: &BackendCommand) {
        match cmd {
            BackendCommand::FetchCounter | BackendCommand::IncrementCounter => {
                self.counter_pending = true;
                self.counter_error = None;
            }
            BackendCommand::SaveSliders { .. } => self.save_pending = true,
            BackendCommand::LoadSliders => {}
        }
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::CounterUpdated(value) => {
                self.count = value;
                self.counter_pending = false;
            }
            UiEvent::CounterFailed(err) => {
                self.counter_pending = false;
                if err.requires_reauth() {
                    self.status = ACCESS_KEY_HINT.to_string();
                }
                self.counter_error = Some(err);
            }
            UiEvent::SlidersLoaded(report) => {
                report.apply_to(&mut self.sliders);
                self.defaulted_sliders = report
                    .absent_keys()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
            }
            UiEvent::SaveFinished {
                outcome,
                failed_keys,
            } => {
                self.save_pending = false;
                match outcome {
                    SaveOutcome::Success => self.status.clear(),
                    SaveOutcome::Failure(_) if !failed_keys.is_empty() => {
                        self.status = format!("Not saved: {}", failed_keys.join(", "));
                    }
                    SaveOutcome::Failure(_) => {}
                }
            }
            UiEvent::Error(err) => {
                tracing::warn!(context = ?err.context(), "{}", err.message());
                if err.requires_reauth() {
                    self.status = ACCESS_KEY_HINT.to_string();
                }
                self.last_error = Some(err);
            }
        }
    }

    pub fn increment_enabled(&self) -> bool {
        !self.counter_pending
    }
}

#[cfg(test)]
mod tests {
    use client_core::LoadReport;

    use super::*;
    use crate::controller::events::UiErrorContext;

    #[test]
    fn increment_is_disabled_while_counter_request_is_pending() {
        let mut model = ViewModel::default();
        model.command_queued(&BackendCommand::IncrementCounter);
        assert!(!model.increment_enabled());

        model.apply(UiEvent::CounterUpdated(8));
        assert!(model.increment_enabled());
        assert_eq!(model.count, 8);
    }

    #[test]
    fn counter_failure_keeps_previous_count_and_releases_button() {
        let mut model = ViewModel::default();
        model.apply(UiEvent::CounterUpdated(3));
        model.command_queued(&BackendCommand::IncrementCounter);

        model.apply(UiEvent::CounterFailed(UiError::from_message(
            UiErrorContext::Counter,
            "Failed to increment counter",
        )));

        assert_eq!(model.count, 3);
        assert!(model.increment_enabled());
        assert_eq!(
            model.counter_error.as_ref().map(UiError::message),
            Some("Failed to increment counter")
        );
        assert!(model.status.is_empty());

        model.command_queued(&BackendCommand::FetchCounter);
        assert!(model.counter_error.is_none());
    }

    #[test]
    fn partial_slider_load_keeps_defaults() {
        let mut model = ViewModel::default();
        model.apply(UiEvent::SlidersLoaded(LoadReport {
            namespace: "global".to_string(),
            values: vec![
                ("val0".to_string(), Some(9)),
                ("val1".to_string(), None),
                ("val3".to_string(), Some(1)),
                ("val4".to_string(), None),
            ],
        }));

        assert_eq!(model.sliders.get("val0"), Some(&9));
        assert_eq!(model.sliders.get("val1"), Some(&5));
        assert_eq!(model.sliders.get("val3"), Some(&1));
        assert_eq!(model.defaulted_sliders, vec!["val1", "val4"]);
    }

    #[test]
    fn save_failure_lists_failed_keys_until_next_success() {
        let mut model = ViewModel::default();
        model.command_queued(&BackendCommand::SaveSliders {
            values: model.sliders.clone(),
        });
        assert!(model.save_pending);

        model.apply(UiEvent::SaveFinished {
            outcome: SaveOutcome::Failure("Failed to save values".to_string()),
            failed_keys: vec!["val3".to_string()],
        });
        assert!(!model.save_pending);
        assert_eq!(model.status, "Not saved: val3");

        model.apply(UiEvent::SaveFinished {
            outcome: SaveOutcome::Success,
            failed_keys: Vec::new(),
        });
        assert!(model.status.is_empty());
    }

    #[test]
    fn rejected_access_key_shows_key_hint() {
        let mut model = ViewModel::default();
        model.command_queued(&BackendCommand::FetchCounter);
        model.apply(UiEvent::CounterFailed(UiError::with_detail(
            UiErrorContext::Counter,
            "Failed to fetch counter value",
            "value store rejected request: Unauthorized: Invalid API key",
        )));
        assert_eq!(model.status, ACCESS_KEY_HINT);
        assert_eq!(
            model.counter_error.as_ref().map(UiError::message),
            Some("Failed to fetch counter value")
        );

        let mut model = ViewModel::default();
        model.apply(UiEvent::Error(UiError::from_message(
            UiErrorContext::Sliders,
            "Failed to load slider values: value store unreachable: connection refused",
        )));
        assert!(model.status.is_empty());
        assert!(model.last_error.is_some());
    }
}
