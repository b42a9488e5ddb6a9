// src/gui.rs
use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Line, Plot, PlotPoints};

use ecg_monitor::{MonitorController, RecordingFile, ResultPanel, Severity};

pub struct MonitorApp {
    controller: MonitorController,
    path_input: String,
    log_messages: Vec<String>,
}

impl MonitorApp {
    pub fn new(mut controller: MonitorController) -> Self {
        controller.start();
        Self {
            controller,
            path_input: String::new(),
            log_messages: vec!["ECG.AI monitor ready.".to_owned()],
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 {
            self.log_messages.remove(0);
        }
    }

    fn attach_from_input(&mut self) {
        let path = self.path_input.trim().to_owned();
        match RecordingFile::from_path(&path) {
            Ok(file) => {
                self.log(&format!("Attached {} ({} bytes)", file.name, file.len()));
                self.controller.attach_file(file);
            }
            Err(e) => self.log(&format!("Cannot read {}: {}", path, e)),
        }
    }

    fn draw_signal(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("LIVE LEAD II SIGNAL (SIMULATED)").small().color(Color32::GRAY));
        let points = self.controller.stream().window().plot_points();
        Plot::new("lead_ii")
            .height(260.0)
            .include_y(-2.0)
            .include_y(2.0)
            .auto_bounds_x()
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::new(points))
                        .color(Color32::from_rgb(239, 68, 68))
                        .width(2.0),
                );
            });
    }

    fn draw_result(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("DIAGNOSTIC OUTPUT").small().color(Color32::GRAY));
        let view = self.controller.view();
        match &view.panel {
            ResultPanel::Empty => {
                let text = if view.busy { "Analyzing..." } else { "Awaiting Signal..." };
                ui.label(RichText::new(text).color(Color32::DARK_GRAY));
            }
            ResultPanel::Unavailable { reason } => {
                ui.label(RichText::new("ANALYSIS UNAVAILABLE").strong().color(Color32::YELLOW));
                ui.label(reason.as_str());
            }
            ResultPanel::Diagnosis(card) => {
                let color = match card.severity {
                    Severity::Alert => Color32::from_rgb(239, 68, 68),
                    Severity::Normal => Color32::from_rgb(16, 185, 129),
                };
                ui.label(RichText::new(card.banner.as_str()).strong().color(color));
                ui.heading(card.diagnosis.as_str());
                ui.horizontal(|ui| {
                    ui.label(format!("Confidence: {}", card.confidence_text));
                    ui.separator();
                    ui.label(format!("Avg BPM: {}", card.bpm_text));
                });
            }
        }
        if !view.is_empty() && ui.button("Clear Analysis").clicked() {
            self.controller.clear();
            self.log("Analysis cleared");
        }
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.pump();
        ctx.request_repaint_after(self.controller.stream().tick_interval());

        ctx.set_visuals(egui::Visuals::dark());

        egui::SidePanel::right("result").min_width(300.0).show(ctx, |ui| {
            ui.add_space(10.0);
            self.draw_result(ui);
            ui.add_space(20.0);
            ui.separator();
            egui::ScrollArea::vertical().max_height(140.0).show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("ECG.AI MONITOR");
            ui.separator();
            self.draw_signal(ui);
            ui.add_space(20.0);
            ui.label("Upload ECG Record (PTB-XL/CSV)");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.path_input);
                if ui.button("Attach").clicked() {
                    self.attach_from_input();
                }
                let busy = self.controller.view().busy;
                let label = if busy { "Analyzing..." } else { "Analyze" };
                if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                    match self.controller.submit() {
                        Ok(id) => self.log(&format!("Analysis {} submitted", id)),
                        Err(e) => self.log(&e.to_string()),
                    }
                }
            });
        });
    }
}
