// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod gui;
use std::sync::Arc;

use anyhow::Context;
use eframe::egui;
use ecg_monitor::{HttpClassifier, MonitorConfig, MonitorController};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = MonitorConfig::from_env().context("reading ECG_MONITOR_* settings")?;
    log::info!("classifier endpoint: {}/analyze", config.base_url.trim_end_matches('/'));

    // One worker drives the timer and the request; all state lives on the UI thread.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let _guard = runtime.enter();

    let classifier = HttpClassifier::new(&config)?;
    let controller = MonitorController::new(&config, Arc::new(classifier))?;

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1200.0, 720.0])
        .with_min_inner_size([900.0, 560.0])
        .with_title("ECG.AI Monitor");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "ECG.AI Monitor",
        options,
        Box::new(move |_cc| Box::new(gui::MonitorApp::new(controller))),
    )
    .map_err(|e| anyhow::anyhow!("monitor window failed: {e}"))
}
