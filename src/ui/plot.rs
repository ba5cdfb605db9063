use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints, PlotUi, Points};

use crate::color::SeriesColors;
use crate::data::transform::{AgeProfile, TimeSeriesPoint};
use crate::state::{AppState, LineChart};

// ---------------------------------------------------------------------------
// Line chart (lower half of the central panel)
// ---------------------------------------------------------------------------

/// Render the line chart for the current graph mode.
pub fn line_chart(ui: &mut Ui, state: &AppState) {
    if state.store.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Data files could not be loaded (see the status bar).");
        });
        return;
    }
    if state.chart.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No data for the selected countries.");
        });
        return;
    }

    match &state.chart {
        LineChart::Years(points) => {
            let series = year_series(points, &state.selection.countries);
            Plot::new("year_chart")
                .legend(Legend::default())
                .x_axis_label("Year")
                .allow_boxed_zoom(true)
                .allow_drag(true)
                .allow_scroll(true)
                .allow_zoom(true)
                .show(ui, |plot_ui| {
                    for (country, segments) in &series {
                        draw_series(plot_ui, country, segments, &state.series_colors);
                    }
                });
        }
        LineChart::Ages(profile) => {
            let labels = profile.labels.clone();
            let hover_labels = profile.labels.clone();
            Plot::new("age_chart")
                .legend(Legend::default().position(egui_plot::Corner::RightTop))
                .x_axis_label("Age group")
                .x_axis_formatter(move |mark, _range| bracket_label(&labels, mark.value))
                .label_formatter(move |name, point| {
                    let bracket = bracket_label(&hover_labels, point.x.round());
                    if name.is_empty() {
                        format!("{bracket}\n{:.2}", point.y)
                    } else {
                        format!("{name}\n{bracket}: {:.2}", point.y)
                    }
                })
                .allow_boxed_zoom(true)
                .allow_drag(true)
                .allow_scroll(true)
                .allow_zoom(true)
                .show(ui, |plot_ui| {
                    for (country, segments) in age_series(profile) {
                        draw_series(plot_ui, &country, &segments, &state.series_colors);
                    }
                });
        }
    }
}

fn draw_series(plot_ui: &mut PlotUi, country: &str, segments: &[Vec<[f64; 2]>], colors: &SeriesColors) {
    let color = colors.color_for(country);
    for segment in segments {
        let line = Line::new(PlotPoints::from(segment.clone()))
            .name(country)
            .color(color)
            .width(1.5);
        plot_ui.line(line);

        let markers = Points::new(PlotPoints::from(segment.clone()))
            .name(country)
            .color(color)
            .radius(3.0);
        plot_ui.points(markers);
    }
}

/// Axis text for an age-bracket position; blank between positions.
fn bracket_label(labels: &[String], x: f64) -> String {
    if (x - x.round()).abs() > 1e-6 || x < 0.0 {
        return String::new();
    }
    labels.get(x.round() as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Shaping view data into plot segments
// ---------------------------------------------------------------------------

/// Split `(x, value)` pairs into contiguous runs, breaking at missing values.
fn segments(points: impl IntoIterator<Item = (f64, Option<f64>)>) -> Vec<Vec<[f64; 2]>> {
    let mut out: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current = Vec::new();
    for (x, value) in points {
        match value {
            Some(y) => current.push([x, y]),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// One entry per selected country that has points, ordered by year.
fn year_series(points: &[TimeSeriesPoint], countries: &[String]) -> Vec<(String, Vec<Vec<[f64; 2]>>)> {
    countries
        .iter()
        .filter_map(|country| {
            let mut own: Vec<&TimeSeriesPoint> =
                points.iter().filter(|p| &p.country == country).collect();
            if own.is_empty() {
                return None;
            }
            own.sort_by_key(|p| p.year);
            let segs = segments(own.iter().map(|p| (p.year as f64, p.value)));
            Some((country.clone(), segs))
        })
        .collect()
}

/// One entry per profile series, x = bracket position.
fn age_series(profile: &AgeProfile) -> Vec<(String, Vec<Vec<[f64; 2]>>)> {
    profile
        .series
        .iter()
        .map(|s| {
            let segs = segments(s.values.iter().enumerate().map(|(i, v)| (i as f64, *v)));
            (s.country.clone(), segs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::transform::ProfileSeries;
    use pretty_assertions::assert_eq;

    fn point(country: &str, year: i32, value: Option<f64>) -> TimeSeriesPoint {
        TimeSeriesPoint {
            country: country.into(),
            year,
            value,
        }
    }

    #[test]
    fn missing_values_split_segments() {
        let segs = segments([(0.0, Some(1.0)), (1.0, None), (2.0, Some(3.0)), (3.0, Some(4.0))]);
        assert_eq!(segs, vec![vec![[0.0, 1.0]], vec![[2.0, 3.0], [3.0, 4.0]]]);
        assert!(segments([(0.0, None)]).is_empty());
    }

    #[test]
    fn year_series_follow_selection_order_and_sort_years() {
        let points = vec![
            point("France", 2001, Some(2.0)),
            point("Japan", 2000, Some(5.0)),
            point("France", 2000, Some(1.0)),
        ];
        let countries = vec!["Japan".to_string(), "France".to_string(), "Peru".to_string()];
        let series = year_series(&points, &countries);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].0, "Japan");
        assert_eq!(series[1].1, vec![vec![[2000.0, 1.0], [2001.0, 2.0]]]);
    }

    #[test]
    fn age_series_use_bracket_positions() {
        let profile = AgeProfile {
            labels: vec!["0-4".into(), "5-9".into()],
            series: vec![ProfileSeries {
                country: "Peru".into(),
                values: vec![Some(3.0), Some(1.0)],
            }],
        };
        let series = age_series(&profile);
        assert_eq!(series[0].1, vec![vec![[0.0, 3.0], [1.0, 1.0]]]);
    }

    #[test]
    fn bracket_labels_only_on_integer_positions() {
        let labels = vec!["0-4".to_string(), "5-9".to_string()];
        assert_eq!(bracket_label(&labels, 1.0), "5-9");
        assert_eq!(bracket_label(&labels, 0.5), "");
        assert_eq!(bracket_label(&labels, 2.0), "");
        assert_eq!(bracket_label(&labels, -1.0), "");
    }
}
