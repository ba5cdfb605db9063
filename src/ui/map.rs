use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::SequentialScale;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Country map view: shaded, ranked country table
// ---------------------------------------------------------------------------

const LEGEND_STEPS: usize = 24;

/// Render every country for the selected statistic, sex and year, shaded on
/// the GnBu scale.
pub fn country_map(ui: &mut Ui, state: &AppState) {
    let map = &state.map;
    let scale = SequentialScale::gnbu();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!(
            "{} – {}, {}, {}",
            state.selection.statistic.label(),
            map.column,
            state.selection.sex,
            state.selection.year
        ));
        if let Some((lo, hi)) = map.range {
            ui.separator();
            legend(ui, &scale, lo, hi);
        }
    });

    if map.cells.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No data for this sex and year.");
        });
        return;
    }

    TableBuilder::new(ui)
        .id_salt("country_map")
        .striped(true)
        .column(Column::exact(36.0))
        .column(Column::remainder().at_least(160.0))
        .column(Column::auto().at_least(100.0))
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Country");
            });
            header.col(|ui: &mut Ui| {
                ui.strong(map.column.as_str());
            });
        })
        .body(|mut body| {
            for (rank, cell) in map.ranked().into_iter().enumerate() {
                let fill = scale.color_for(cell.value, map.range);
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{}", rank + 1));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(RichText::new("   ").background_color(fill));
                        ui.label(cell.country.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format_value(cell.value));
                    });
                });
            }
        });
}

fn legend(ui: &mut Ui, scale: &SequentialScale, lo: f64, hi: f64) {
    ui.label(format_value(Some(lo)));
    let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 12.0), egui::Sense::hover());
    let step = rect.width() / LEGEND_STEPS as f32;
    for i in 0..LEGEND_STEPS {
        let t = i as f32 / (LEGEND_STEPS - 1) as f32;
        let x = rect.left() + step * i as f32;
        let swatch = egui::Rect::from_min_size(
            egui::pos2(x, rect.top()),
            egui::vec2(step + 0.5, rect.height()),
        );
        ui.painter().rect_filled(swatch, 0.0, scale.at(t));
    }
    ui.label(format_value(Some(hi)));
    ui.label(RichText::new("no data").background_color(scale.no_data()).color(Color32::WHITE));
}

pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => "–".to_string(),
        Some(v) if v.abs() >= 1000.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
    }
}
