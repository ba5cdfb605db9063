use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Statistic;
use crate::state::{AppState, GraphMode};

// ---------------------------------------------------------------------------
// Left side panel – selection controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    if state.store.is_none() {
        ui.label("No data loaded.");
        return;
    }

    // ---- Statistic ----
    ui.strong("Statistic");
    let mut statistic = state.selection.statistic;
    egui::ComboBox::from_id_salt("statistic")
        .width(ui.available_width())
        .selected_text(statistic.label())
        .show_ui(ui, |ui: &mut Ui| {
            for stat in Statistic::ALL {
                ui.selectable_value(&mut statistic, stat, stat.label());
            }
        });
    state.set_statistic(statistic);
    ui.add_space(4.0);

    // ---- Age group / sex ----
    ui.horizontal(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.strong("Age Group");
            let mut column = state.selection.column.clone();
            egui::ComboBox::from_id_salt("age_group")
                .selected_text(column.clone())
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &state.options.columns {
                        ui.selectable_value(&mut column, col.clone(), col.as_str());
                    }
                });
            state.set_column(column);
        });
        ui.vertical(|ui: &mut Ui| {
            ui.strong("Sex");
            let mut sex = state.selection.sex;
            egui::ComboBox::from_id_salt("sex")
                .selected_text(sex.as_str())
                .show_ui(ui, |ui: &mut Ui| {
                    for s in &state.options.sexes {
                        ui.selectable_value(&mut sex, *s, s.as_str());
                    }
                });
            state.set_sex(sex);
        });
    });
    ui.add_space(4.0);

    // ---- Year ----
    ui.strong("Year");
    if let Some((min, max)) = state.options.year_range {
        let mut year = state.selection.year;
        ui.add(egui::Slider::new(&mut year, min..=max).step_by(1.0));
        state.set_year(year);
    } else {
        ui.label("No years available.");
    }
    ui.add_space(4.0);

    // ---- Graph mode ----
    let mut mode = state.selection.graph_mode;
    ui.horizontal(|ui: &mut Ui| {
        for m in [GraphMode::ByYear, GraphMode::ByAge] {
            ui.radio_value(&mut mode, m, m.label());
        }
    });
    state.set_graph_mode(mode);
    ui.separator();

    country_picker(ui, state);
}

/// Searchable multi-select list. Selected countries are listed first, in the
/// order they were picked.
fn country_picker(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(format!("Countries ({})", state.selection.countries.len()));
        if ui.small_button("Clear").clicked() {
            state.clear_countries();
        }
    });

    let mut toggled: Option<String> = None;

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for country in &state.selection.countries {
            let chip = RichText::new(format!("{country} ✕"))
                .color(state.series_colors.color_for(country));
            if ui.small_button(chip).clicked() {
                toggled = Some(country.clone());
            }
        }
    });

    ui.add(
        egui::TextEdit::singleline(&mut state.country_search)
            .hint_text("Search countries…")
            .desired_width(f32::INFINITY),
    );

    let needle = state.country_search.to_lowercase();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for country in &state.options.countries {
                if !needle.is_empty() && !country.to_lowercase().contains(&needle) {
                    continue;
                }
                let mut checked = state.selection.countries.contains(country);
                if ui.checkbox(&mut checked, country.as_str()).changed() {
                    toggled = Some(country.clone());
                }
            }
        });

    if let Some(country) = toggled {
        state.toggle_country(&country);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with row counts and the status message.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.heading("WHO All Cause Mortality");

        ui.separator();

        if let Some(store) = &state.store {
            let table = store.resolve(state.selection.statistic);
            ui.label(format!(
                "{}: {} rows, {} countries on map",
                table.statistic.label(),
                table.len(),
                state.map.cells.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
