use crate::color::SeriesColors;
use crate::config::SelectionDefaults;
use crate::data::filter::{filter_rows, RowFilter};
use crate::data::model::{DatasetStore, Sex, Statistic};
use crate::data::transform::{
    age_profile, map_cells, time_series, AgeProfile, MapView, TimeSeriesPoint,
};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Selection – the current control values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMode {
    /// Year on the x axis, one line per country.
    ByYear,
    /// Age bracket on the x axis for the selected year.
    ByAge,
}

impl GraphMode {
    pub fn label(self) -> &'static str {
        match self {
            GraphMode::ByYear => "Graph over years",
            GraphMode::ByAge => "Graph over age groups",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub statistic: Statistic,
    /// Value column shown by the map and the year series.
    pub column: String,
    pub sex: Sex,
    pub year: i32,
    /// Selected countries, in the order they were picked.
    pub countries: Vec<String>,
    pub graph_mode: GraphMode,
}

impl Selection {
    /// Initial selection, with defaults clamped to what the data offers.
    pub fn initial(options: &ControlOptions, defaults: &SelectionDefaults) -> Self {
        let mut countries: Vec<String> = defaults
            .countries
            .iter()
            .filter(|c| options.countries.contains(*c))
            .cloned()
            .collect();
        if countries.is_empty() {
            countries.extend(options.countries.first().cloned());
        }

        let sex = if options.sexes.contains(&defaults.sex) || options.sexes.is_empty() {
            defaults.sex
        } else {
            options.sexes[0]
        };

        let year = match options.year_range {
            Some((lo, hi)) => defaults.year.clamp(lo, hi),
            None => defaults.year,
        };

        Self {
            statistic: defaults.statistic,
            column: options.columns.first().cloned().unwrap_or_default(),
            sex,
            year,
            countries,
            graph_mode: GraphMode::ByYear,
        }
    }

    /// Rows for the map: every country, exact sex and year.
    pub fn map_filter(&self) -> RowFilter {
        RowFilter::new().sex(self.sex).year(self.year)
    }

    /// Rows for the line chart: selected countries and sex, plus the exact
    /// year in age-profile mode.
    pub fn chart_filter(&self) -> RowFilter {
        let filter = RowFilter::new()
            .countries(self.countries.iter().cloned())
            .sex(self.sex);
        match self.graph_mode {
            GraphMode::ByYear => filter,
            GraphMode::ByAge => filter.year(self.year),
        }
    }
}

// ---------------------------------------------------------------------------
// Control options derived once from the data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlOptions {
    pub columns: Vec<String>,
    pub countries: Vec<String>,
    pub sexes: Vec<Sex>,
    pub year_range: Option<(i32, i32)>,
}

impl ControlOptions {
    pub fn from_store(store: &DatasetStore) -> Self {
        let reference = store.reference_table();
        Self {
            columns: store.columns().labels(),
            countries: reference.countries(),
            sexes: reference.sexes(),
            year_range: reference.year_range(),
        }
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LineChart {
    Years(Vec<TimeSeriesPoint>),
    Ages(AgeProfile),
}

impl Default for LineChart {
    fn default() -> Self {
        LineChart::Years(Vec::new())
    }
}

impl LineChart {
    pub fn is_empty(&self) -> bool {
        match self {
            LineChart::Years(points) => points.is_empty(),
            LineChart::Ages(profile) => profile.is_empty(),
        }
    }
}

/// Resolve → filter → shape for the map view.
pub fn build_map(store: &DatasetStore, selection: &Selection) -> Result<MapView, DashboardError> {
    let table = store.resolve(selection.statistic);
    let rows = filter_rows(table, &selection.map_filter());
    map_cells(&table.columns, &rows, &selection.column)
}

/// Resolve → filter → shape for the line chart.
pub fn build_chart(store: &DatasetStore, selection: &Selection) -> Result<LineChart, DashboardError> {
    let table = store.resolve(selection.statistic);
    let rows = filter_rows(table, &selection.chart_filter());
    match selection.graph_mode {
        GraphMode::ByYear => Ok(LineChart::Years(time_series(
            &table.columns,
            &rows,
            &selection.column,
        )?)),
        GraphMode::ByAge => Ok(LineChart::Ages(age_profile(
            &table.columns,
            &rows,
            &selection.countries,
        ))),
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded tables (None if startup loading failed).
    pub store: Option<DatasetStore>,

    /// Values offered by the controls.
    pub options: ControlOptions,

    /// Current control values.
    pub selection: Selection,

    /// Cached map view for the current selection.
    pub map: MapView,

    /// Cached line chart for the current selection.
    pub chart: LineChart,

    /// One colour per selected country, shared by both graph modes.
    pub series_colors: SeriesColors,

    /// Text typed into the country search box.
    pub country_search: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the state around a loaded store and compute the first views.
    pub fn new(store: DatasetStore, defaults: &SelectionDefaults) -> Self {
        let options = ControlOptions::from_store(&store);
        let selection = Selection::initial(&options, defaults);
        let mut state = Self {
            store: Some(store),
            options,
            selection,
            map: MapView::default(),
            chart: LineChart::default(),
            series_colors: SeriesColors::default(),
            country_search: String::new(),
            status_message: None,
        };
        state.refresh_map();
        state.refresh_chart();
        state
    }

    /// State shown when the tables could not be loaded.
    pub fn failed(message: String) -> Self {
        let defaults = SelectionDefaults::default();
        let options = ControlOptions::default();
        Self {
            store: None,
            selection: Selection::initial(&options, &defaults),
            options,
            map: MapView::default(),
            chart: LineChart::default(),
            series_colors: SeriesColors::default(),
            country_search: String::new(),
            status_message: Some(message),
        }
    }

    /// Recompute the map after a statistic / column / sex / year change.
    pub fn refresh_map(&mut self) {
        let Some(store) = &self.store else { return };
        match build_map(store, &self.selection) {
            Ok(map) => self.map = map,
            Err(e) => self.report(e),
        }
    }

    /// Recompute the line chart after any control change.
    pub fn refresh_chart(&mut self) {
        let Some(store) = &self.store else { return };
        match build_chart(store, &self.selection) {
            Ok(chart) => self.chart = chart,
            Err(e) => self.report(e),
        }
        self.series_colors = SeriesColors::new(&self.selection.countries);
    }

    fn report(&mut self, err: DashboardError) {
        log::error!("failed to build view: {err}");
        self.status_message = Some(format!("Error: {err}"));
    }

    pub fn set_statistic(&mut self, statistic: Statistic) {
        if self.selection.statistic != statistic {
            self.selection.statistic = statistic;
            self.rebuild(true);
        }
    }

    pub fn set_column(&mut self, column: String) {
        if self.selection.column != column {
            self.selection.column = column;
            self.rebuild(true);
        }
    }

    pub fn set_sex(&mut self, sex: Sex) {
        if self.selection.sex != sex {
            self.selection.sex = sex;
            self.rebuild(true);
        }
    }

    pub fn set_year(&mut self, year: i32) {
        if self.selection.year != year {
            self.selection.year = year;
            self.rebuild(true);
        }
    }

    pub fn set_graph_mode(&mut self, mode: GraphMode) {
        if self.selection.graph_mode != mode {
            self.selection.graph_mode = mode;
            self.rebuild(false);
        }
    }

    /// Add a country at the end of the selection, or remove it.
    pub fn toggle_country(&mut self, country: &str) {
        let countries = &mut self.selection.countries;
        if let Some(pos) = countries.iter().position(|c| c == country) {
            countries.remove(pos);
        } else {
            countries.push(country.to_string());
        }
        self.rebuild(false);
    }

    pub fn clear_countries(&mut self) {
        if !self.selection.countries.is_empty() {
            self.selection.countries.clear();
            self.rebuild(false);
        }
    }

    /// Clear the previous error and rerun the affected views.
    fn rebuild(&mut self, map: bool) {
        self.status_message = None;
        if map {
            self.refresh_map();
        }
        self.refresh_chart();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::store;
    use pretty_assertions::assert_eq;

    fn state() -> AppState {
        AppState::new(store(), &SelectionDefaults::default())
    }

    #[test]
    fn initial_selection_falls_back_to_available_values() {
        let s = state();
        assert_eq!(s.selection.statistic, Statistic::Deaths);
        assert_eq!(s.selection.column, "All ages");
        assert_eq!(s.selection.sex, Sex::All);
        assert_eq!(s.selection.year, 2000);
        assert_eq!(s.selection.countries, vec!["France".to_string()]);
        assert_eq!(s.selection.graph_mode, GraphMode::ByYear);
    }

    #[test]
    fn defaults_are_clamped_into_year_range() {
        let options = ControlOptions::from_store(&store());
        let defaults = SelectionDefaults {
            year: 2050,
            countries: vec!["Japan".into(), "Atlantis".into()],
            ..SelectionDefaults::default()
        };
        let sel = Selection::initial(&options, &defaults);
        assert_eq!(sel.year, 2001);
        assert_eq!(sel.countries, vec!["Japan".to_string()]);
    }

    #[test]
    fn initial_views_are_built() {
        let s = state();
        assert_eq!(s.map.cells.len(), 2);
        match &s.chart {
            LineChart::Years(points) => {
                let years: Vec<_> = points.iter().map(|p| p.year).collect();
                assert_eq!(years, vec![2000, 2001]);
            }
            other => panic!("expected year series, got {other:?}"),
        }
    }

    #[test]
    fn map_ignores_country_selection() {
        let mut s = state();
        s.clear_countries();
        assert!(s.chart.is_empty());
        assert_eq!(s.map.cells.len(), 2);
    }

    #[test]
    fn age_mode_builds_profile_for_selected_year() {
        let mut s = state();
        s.toggle_country("Japan");
        s.set_graph_mode(GraphMode::ByAge);
        match &s.chart {
            LineChart::Ages(profile) => {
                assert_eq!(profile.labels, vec!["0-4", "5-9", "10+"]);
                let order: Vec<_> = profile.series.iter().map(|s| s.country.as_str()).collect();
                assert_eq!(order, vec!["France", "Japan"]);
            }
            other => panic!("expected age profile, got {other:?}"),
        }

        s.set_sex(Sex::Male);
        match &s.chart {
            LineChart::Ages(profile) => assert!(profile.series_for("Japan").is_none()),
            other => panic!("expected age profile, got {other:?}"),
        }
    }

    #[test]
    fn statistic_switch_reads_other_table() {
        let mut s = state();
        s.set_column("0-4".into());
        s.set_statistic(Statistic::Population);
        let france = s.map.cells.iter().find(|c| c.country == "France").unwrap();
        assert_eq!(france.value, Some(12.3 * 100.0));
    }

    #[test]
    fn unknown_column_sets_status_instead_of_panicking() {
        let mut s = state();
        s.set_column("100+".into());
        assert!(s.status_message.as_deref().unwrap().contains("100+"));
    }

    #[test]
    fn toggling_country_twice_removes_it() {
        let mut s = state();
        s.toggle_country("Japan");
        assert_eq!(s.series_colors.len(), 2);
        s.toggle_country("Japan");
        assert_eq!(s.selection.countries, vec!["France".to_string()]);
    }
}
