mod activity;
mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod stats;
mod tasks;
mod ui;

use app::DataDeckApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let root = std::env::current_dir().unwrap_or_default();
    let config = DashboardConfig::load_or_default(&root);
    log::debug!("Configuration: {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "DataDeck – Tabular Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(DataDeckApp::new(AppState::new(config))))),
    )
}
