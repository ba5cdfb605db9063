use std::collections::HashSet;

use serde::Serialize;

use super::model::{StatRow, ValueColumns};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Year series: one (Country, Year, Value) point per row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub country: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Project each row onto `(country, year, row[column])`.
///
/// Pure projection: output length equals `rows.len()` and nothing is
/// aggregated. Expects rows filtered by countries and sex, with year left
/// open.
pub fn time_series(
    columns: &ValueColumns,
    rows: &[&StatRow],
    column: &str,
) -> Result<Vec<TimeSeriesPoint>, DashboardError> {
    let idx = columns.require(column)?;
    Ok(rows
        .iter()
        .map(|row| TimeSeriesPoint {
            country: row.country.clone(),
            year: row.year,
            value: row.value(idx),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Age profile: age brackets on the x axis, one series per country
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSeries {
    pub country: String,
    /// One value per entry of [`AgeProfile::labels`].
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AgeProfile {
    /// Age-bracket column labels, in file order.
    pub labels: Vec<String>,
    /// Series in the order the countries were requested. A country with no
    /// row is absent, never zero-filled.
    pub series: Vec<ProfileSeries>,
}

impl AgeProfile {
    pub fn series_for(&self, country: &str) -> Option<&ProfileSeries> {
        self.series.iter().find(|s| s.country == country)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Pivot rows of a single (sex, year) so age brackets become the position
/// axis and each requested country becomes a series.
///
/// Only [`ColumnKind::AgeBracket`](super::model::ColumnKind) columns are used.
/// If several rows exist for one country the first one wins; callers are
/// expected to have filtered by an exact year.
pub fn age_profile(columns: &ValueColumns, rows: &[&StatRow], countries: &[String]) -> AgeProfile {
    let brackets: Vec<(usize, &str)> = columns.age_brackets().collect();
    let labels = brackets.iter().map(|(_, label)| label.to_string()).collect();

    let mut emitted = HashSet::new();
    let series = countries
        .iter()
        .filter(|&country| emitted.insert(country.as_str()))
        .filter_map(|country| {
            let row = rows.iter().find(|r| &r.country == country)?;
            Some(ProfileSeries {
                country: country.clone(),
                values: brackets.iter().map(|(idx, _)| row.value(*idx)).collect(),
            })
        })
        .collect();

    AgeProfile { labels, series }
}

// ---------------------------------------------------------------------------
// Map view: one shaded cell per country
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCell {
    pub country: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MapView {
    pub column: String,
    pub cells: Vec<MapCell>,
    /// Finite min / max of the cell values, used by the colour scale.
    pub range: Option<(f64, f64)>,
}

impl MapView {
    /// Cells ordered by value, largest first; cells without data go last.
    pub fn ranked(&self) -> Vec<&MapCell> {
        let mut cells: Vec<&MapCell> = self.cells.iter().collect();
        cells.sort_by(|a, b| match (a.value, b.value) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.country.cmp(&b.country),
        });
        cells
    }
}

/// Build the map view from rows filtered by sex and year only.
pub fn map_cells(
    columns: &ValueColumns,
    rows: &[&StatRow],
    column: &str,
) -> Result<MapView, DashboardError> {
    let idx = columns.require(column)?;
    let cells: Vec<MapCell> = rows
        .iter()
        .map(|row| MapCell {
            country: row.country.clone(),
            value: row.value(idx).filter(|v| v.is_finite()),
        })
        .collect();

    let range = cells
        .iter()
        .filter_map(|c| c.value)
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    Ok(MapView {
        column: column.to_string(),
        cells,
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter_rows, RowFilter};
    use crate::data::model::fixtures::{columns, row, table};
    use crate::data::model::{Sex, Statistic};
    use pretty_assertions::assert_eq;

    #[test]
    fn france_scenario_projects_single_point() {
        let cols = ValueColumns::new(["0-4"]);
        let france = row("France", Sex::All, 2000, &[Some(12.3)]);
        let points = time_series(&cols, &[&france], "0-4").unwrap();
        assert_eq!(
            points,
            vec![TimeSeriesPoint {
                country: "France".into(),
                year: 2000,
                value: Some(12.3),
            }]
        );
    }

    #[test]
    fn time_series_keeps_one_point_per_row() {
        let t = table(Statistic::Deaths);
        let rows = filter_rows(&t, &RowFilter::new().countries(["France", "Japan"]).sex(Sex::All));
        let points = time_series(&t.columns, &rows, "5-9").unwrap();
        assert_eq!(points.len(), rows.len());
        let japan_2001 = points
            .iter()
            .find(|p| p.country == "Japan" && p.year == 2001)
            .unwrap();
        assert_eq!(japan_2001.value, None);
    }

    #[test]
    fn time_series_rejects_unknown_column() {
        let t = table(Statistic::Deaths);
        let rows = filter_rows(&t, &RowFilter::new());
        assert_eq!(
            time_series(&t.columns, &rows, "100-104"),
            Err(DashboardError::UnknownColumn("100-104".into()))
        );
    }

    #[test]
    fn age_profile_pivots_brackets_in_requested_country_order() {
        let t = table(Statistic::Deaths);
        let wanted = vec!["Japan".to_string(), "France".to_string()];
        let rows = filter_rows(
            &t,
            &RowFilter::new().countries(wanted.clone()).sex(Sex::All).year(2000),
        );
        let profile = age_profile(&t.columns, &rows, &wanted);

        assert_eq!(profile.labels, vec!["0-4", "5-9", "10+"]);
        let order: Vec<_> = profile.series.iter().map(|s| s.country.as_str()).collect();
        assert_eq!(order, vec!["Japan", "France"]);
        assert_eq!(
            profile.series_for("France").unwrap().values,
            vec![Some(12.3), Some(7.7), Some(10.0)]
        );
    }

    #[test]
    fn age_profile_omits_countries_without_rows() {
        let t = table(Statistic::Deaths);
        let wanted = vec!["France".to_string(), "Japan".to_string()];
        let rows = filter_rows(
            &t,
            &RowFilter::new().countries(wanted.clone()).sex(Sex::Male).year(2000),
        );
        let profile = age_profile(&t.columns, &rows, &wanted);
        assert_eq!(profile.series.len(), 1);
        assert!(profile.series_for("Japan").is_none());
    }

    #[test]
    fn age_profile_of_no_rows_has_no_series() {
        let wanted = vec!["France".to_string()];
        let profile = age_profile(&columns(), &[], &wanted);
        assert!(profile.is_empty());
        assert_eq!(profile.labels.len(), 3);
    }

    #[test]
    fn map_cells_track_finite_range_and_rank_missing_last() {
        let cols = ValueColumns::new(["0-4"]);
        let a = row("A", Sex::All, 2000, &[Some(3.0)]);
        let b = row("B", Sex::All, 2000, &[None]);
        let c = row("C", Sex::All, 2000, &[Some(9.0)]);
        let d = row("D", Sex::All, 2000, &[Some(f64::NAN)]);
        let view = map_cells(&cols, &[&a, &b, &c, &d], "0-4").unwrap();

        assert_eq!(view.range, Some((3.0, 9.0)));
        let ranked: Vec<_> = view.ranked().iter().map(|c| c.country.as_str()).collect();
        assert_eq!(ranked, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn map_of_no_rows_has_no_range() {
        let view = map_cells(&columns(), &[], "All ages").unwrap();
        assert!(view.cells.is_empty());
        assert_eq!(view.range, None);
    }
}
