mod canvas;
mod keyboard;

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::NoteDuration;
use crate::patch::ChimePatch;
use crate::recorder::NoteRecorder;
use crate::scheduler::Scheduler;
use crate::{EngineCommand, EngineHandle, EngineUpdate};

pub struct ChimeApp {
    engine: EngineHandle,
    recorder: NoteRecorder,
    duration: NoteDuration,
    patch: ChimePatch,
    patch_path: Option<PathBuf>,
    error_message: Option<String>,
}

impl ChimeApp {
    pub fn new(engine: EngineHandle) -> Self {
        let recorder = NoteRecorder::new(Arc::new(engine.clone()), Scheduler::new());
        let patch = ChimePatch::default();

        Self {
            engine,
            recorder,
            duration: patch.default_duration,
            patch,
            patch_path: None,
            error_message: None,
        }
    }

    /// Strikes a note on the engine and, when a session is active,
    /// records it.
    fn play_note(&mut self, note: &str) {
        let _ = self.engine.command_tx.send(EngineCommand::TriggerNote {
            note: note.to_string(),
            duration: self.duration,
        });
        self.recorder.record(note);
    }

    fn process_engine_updates(&mut self) {
        while let Ok(update) = self.engine.update_rx.try_recv() {
            match update {
                EngineUpdate::StreamStarted => {
                    debug!("audio stream is up");
                    self.error_message = None;
                }
                EngineUpdate::Error { message } => {
                    self.error_message = Some(message);
                }
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Patch...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_title("Open Chime Patch")
                        .add_filter("ron", &["ron"])
                        .pick_file()
                    {
                        match ChimePatch::load(&path) {
                            Ok(patch) => {
                                let _ = self
                                    .engine
                                    .command_tx
                                    .send(EngineCommand::SetPatch(patch.clone()));
                                self.duration = patch.default_duration;
                                self.patch = patch;
                                self.patch_path = Some(path);
                                self.error_message = None;
                            }
                            Err(e) => {
                                self.error_message =
                                    Some(format!("Failed to load patch: {}", e));
                            }
                        }
                    }
                    ui.close();
                }

                if ui.button("Save Patch...").clicked() {
                    let dialog = rfd::FileDialog::new()
                        .set_title("Save Chime Patch")
                        .add_filter("ron", &["ron"])
                        .set_file_name("chime.ron");
                    if let Some(path) = dialog.save_file() {
                        match self.patch.save(&path) {
                            Ok(()) => {
                                self.patch_path = Some(path);
                                info!("patch saved");
                            }
                            Err(e) => {
                                self.error_message =
                                    Some(format!("Failed to save patch: {}", e));
                            }
                        }
                    }
                    ui.close();
                }

                ui.separator();

                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.recorder.is_recording() {
                if ui.button("⏺ Recording...").clicked() {
                    self.recorder.stop();
                }
            } else if ui.button("⏺ Record").clicked() {
                self.recorder.start();
            }

            let can_play = !self.recorder.notes().is_empty() && !self.recorder.is_playing();
            let play_label = if self.recorder.is_playing() {
                "▶ Playing..."
            } else {
                "▶ Play"
            };
            if ui
                .add_enabled(can_play, egui::Button::new(play_label))
                .clicked()
            {
                self.recorder.play(self.duration);
            }

            let has_notes = !self.recorder.notes().is_empty();
            if ui
                .add_enabled(has_notes, egui::Button::new("🗑 Clear"))
                .clicked()
            {
                self.recorder.clear();
            }

            ui.separator();

            ui.label("Chime length:");
            egui::ComboBox::from_id_salt("note_duration")
                .selected_text(self.duration.label())
                .show_ui(ui, |ui| {
                    for duration in NoteDuration::ALL {
                        ui.selectable_value(&mut self.duration, duration, duration.label());
                    }
                });
        });
    }

    fn recorded_notes_panel(&self, ui: &mut egui::Ui) {
        ui.heading(format!("Melody ({} notes)", self.recorder.notes().len()));

        if self.recorder.notes().is_empty() {
            ui.label("Record something to see it here.");
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for recorded in self.recorder.notes() {
                    ui.label(
                        egui::RichText::new(&recorded.note)
                            .background_color(egui::Color32::from_rgb(102, 126, 234))
                            .color(egui::Color32::WHITE),
                    );
                }
            });
        });
    }
}

impl eframe::App for ChimeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_engine_updates();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        if let Some(ref error) = self.error_message {
            let error = error.clone();
            egui::TopBottomPanel::top("error").show(ctx, |ui| {
                ui.colored_label(egui::Color32::RED, error);
            });
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.controls(ui);
        });

        egui::SidePanel::right("recorded_notes")
            .min_width(180.0)
            .show(ctx, |ui| {
                self.recorded_notes_panel(ui);
            });

        let mut struck = Vec::new();

        egui::TopBottomPanel::bottom("keyboard").show(ctx, |ui| {
            if let Some(note) = keyboard::show(ui).played {
                struck.push(note);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Wind Chime Melody Maker");
                ui.label("Click the grid to ring a chime. Hovering highlights the pitch.");
            });
            ui.add_space(8.0);
            if let Some(note) = canvas::show(ui).played {
                struck.push(note);
            }
        });

        for note in struck {
            self.play_note(&note);
        }

        // Keep repainting so the playing flag and hover highlight stay live.
        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let _ = self.engine.command_tx.send(EngineCommand::Shutdown);
    }
}
