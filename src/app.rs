use eframe::egui;

use crate::state::AppState;
use crate::ui::{map, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MortalityApp {
    pub state: AppState,
}

impl MortalityApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for MortalityApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: line chart ----
        egui::TopBottomPanel::bottom("line_chart")
            .default_height(350.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::line_chart(ui, &self.state);
            });

        // ---- Central panel: country map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::country_map(ui, &self.state);
        });
    }
}
