mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::MortalityApp;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration, using defaults: {e:#}");
            config::DashboardConfig::default()
        }
    };

    // Tables are loaded once, before the window becomes interactive.
    let state = match data::loader::load_store(&config.data) {
        Ok(store) => AppState::new(store, &config.defaults),
        Err(e) => {
            log::error!("Failed to load data: {e:#}");
            AppState::failed(format!("Error: {e:#}"))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "WHO All Cause Mortality Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(MortalityApp::new(state)))),
    )
}
