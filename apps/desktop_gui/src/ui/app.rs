use std::time::Duration;

use client_core::{hue::hue, NoticeWatcher, SaveStatus};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{SLIDER_KEYS, SLIDER_MAX, SLIDER_MIN};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::ViewModel;

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 90, 90);
const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(67, 181, 129);

fn slider_color(value: i64) -> egui::Color32 {
    egui::Color32::from(egui::ecolor::Hsva::new(hue(value) / 360.0, 0.75, 0.85, 1.0))
}

pub struct TallyApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    notice: NoticeWatcher,
    model: ViewModel,
}

impl TallyApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        notice: NoticeWatcher,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            notice,
            model: ViewModel::default(),
        };
        app.send(BackendCommand::FetchCounter);
        app.send(BackendCommand::LoadSliders);
        app
    }

    fn send(&mut self, cmd: BackendCommand) {
        let mut status = String::new();
        if dispatch_backend_command(&self.cmd_tx, cmd.clone(), &mut status) {
            self.model.command_queued(&cmd);
        } else {
            self.model.status = status;
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.model.apply(event);
        }
    }

    fn show_counter(&mut self, ui: &mut egui::Ui) {
        ui.heading("Counter");
        ui.label(egui::RichText::new(format!("Count: {}", self.model.count)).size(28.0));

        let label = if self.model.counter_pending {
            "Incrementing..."
        } else {
            "Increment"
        };
        if ui
            .add_enabled(self.model.increment_enabled(), egui::Button::new(label))
            .clicked()
        {
            self.send(BackendCommand::IncrementCounter);
        }
        if let Some(err) = &self.model.counter_error {
            ui.colored_label(ERROR_COLOR, err.message());
        }
    }

    fn show_sliders(&mut self, ui: &mut egui::Ui) {
        ui.heading("Ratings");
        for key in SLIDER_KEYS {
            let Some(value) = self.model.sliders.get_mut(key) else {
                continue;
            };
            ui.horizontal(|ui| {
                let (swatch, _) =
                    ui.allocate_exact_size(egui::vec2(18.0, 18.0), egui::Sense::hover());
                ui.painter().rect_filled(swatch, 4.0, slider_color(*value));
                ui.add(egui::Slider::new(value, SLIDER_MIN..=SLIDER_MAX).text(key));
            });
        }
        if !self.model.defaulted_sliders.is_empty() {
            ui.weak(format!(
                "No stored value yet for {}",
                self.model.defaulted_sliders.join(", ")
            ));
        }

        let save_label = if self.model.save_pending {
            "Saving..."
        } else {
            "Save"
        };
        if ui
            .add_enabled(!self.model.save_pending, egui::Button::new(save_label))
            .clicked()
        {
            let values = self.model.sliders.clone();
            self.send(BackendCommand::SaveSliders { values });
        }

        match self.notice.status() {
            SaveStatus::Idle => {}
            SaveStatus::Saved => {
                ui.colored_label(SUCCESS_COLOR, "Saved");
            }
            SaveStatus::Failed(reason) => {
                ui.colored_label(ERROR_COLOR, reason);
            }
        }
    }
}

impl eframe::App for TallyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_counter(ui);
            ui.separator();
            self.show_sliders(ui);

            if let Some(err) = &self.model.last_error {
                ui.separator();
                ui.colored_label(ERROR_COLOR, err.message());
            }
            if !self.model.status.is_empty() {
                ui.label(self.model.status.as_str());
            }
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
