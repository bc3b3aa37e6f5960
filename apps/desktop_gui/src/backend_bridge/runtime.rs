//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{CounterError, SaveNotice, StoreSettings, TallyClient};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::Mutex;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Starts the backend worker thread. Each command runs as its own task so
/// the startup counter fetch and slider load proceed in parallel.
pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: StoreSettings,
    notice: SaveNotice,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = match TallyClient::connect(&settings) {
                Ok(client) => Arc::new(client),
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!(store_url = %settings.store_url, "invalid store settings: {err}");
                    return;
                }
            };
            let notice = Arc::new(Mutex::new(notice));
            tracing::info!(store_url = %settings.store_url, "backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                let client = client.clone();
                let notice = notice.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let event = run_command(&client, &notice, cmd).await;
                    let _ = ui_tx.try_send(event);
                });
            }
        });
    });
}

fn counter_failure(err: &CounterError) -> UiError {
    let detail = std::error::Error::source(err)
        .map(ToString::to_string)
        .unwrap_or_default();
    UiError::with_detail(UiErrorContext::Counter, err.user_message(), &detail)
}

pub async fn run_command(
    client: &TallyClient,
    notice: &Mutex<SaveNotice>,
    cmd: BackendCommand,
) -> UiEvent {
    match cmd {
        BackendCommand::FetchCounter => match client.counter().fetch().await {
            Ok(value) => UiEvent::CounterUpdated(value),
            Err(err) => UiEvent::CounterFailed(counter_failure(&err)),
        },
        BackendCommand::IncrementCounter => match client.counter().increment().await {
            Ok(value) => UiEvent::CounterUpdated(value),
            Err(err) => UiEvent::CounterFailed(counter_failure(&err)),
        },
        BackendCommand::LoadSliders => match client.load_sliders().await {
            Ok(report) => UiEvent::SlidersLoaded(report),
            Err(err) => UiEvent::Error(UiError::from_message(
                UiErrorContext::Sliders,
                format!("Failed to load slider values: {err}"),
            )),
        },
        BackendCommand::SaveSliders { values } => {
            let report = client.save_sliders(&values).await;
            let outcome = report.outcome();
            notice.lock().await.record(&outcome);
            UiEvent::SaveFinished {
                outcome,
                failed_keys: report
                    .failed_keys()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            }
        }
    }
}
