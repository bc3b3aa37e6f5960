mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, SaveNotice};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::TallyApp;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the configured store URL.
    #[arg(long)]
    store_url: Option<String>,
    /// Overrides the configured store access key.
    #[arg(long)]
    store_key: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.store_url {
        settings.store_url = url;
    }
    if let Some(key) = args.store_key {
        settings.store_key = key;
    }

    let notice = SaveNotice::new(settings.save_notice_duration());
    let notice_watcher = notice.watch();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings, notice);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Tally")
            .with_inner_size([420.0, 520.0])
            .with_min_inner_size([320.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Tally",
        options,
        Box::new(|_cc| Ok(Box::new(TallyApp::new(cmd_tx, ui_rx, notice_watcher)))),
    )
}
