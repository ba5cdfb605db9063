use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Statistic – which table a view reads from
// ---------------------------------------------------------------------------

/// The three WHO statistics offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Statistic {
    #[serde(rename = "deaths")]
    Deaths,
    #[serde(rename = "pop")]
    Population,
    #[serde(rename = "rate")]
    Rate,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Deaths, Statistic::Population, Statistic::Rate];

    /// Key used by the selector (`deaths`, `pop`, `rate`).
    pub fn key(self) -> &'static str {
        match self {
            Statistic::Deaths => "deaths",
            Statistic::Population => "pop",
            Statistic::Rate => "rate",
        }
    }

    /// Label shown in the statistic combo box.
    pub fn label(self) -> &'static str {
        match self {
            Statistic::Deaths => "Total Deaths in Age Group",
            Statistic::Population => "Population",
            Statistic::Rate => "Deaths per 1000 People",
        }
    }

    /// File name the table is read from when no override is configured.
    pub fn default_file(self) -> &'static str {
        match self {
            Statistic::Deaths => "who_all_cause_deaths.csv",
            Statistic::Population => "who_population.csv",
            Statistic::Rate => "who_ac_deaths_per_1000.csv",
        }
    }
}

impl FromStr for Statistic {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.key() == s)
            .ok_or_else(|| DashboardError::InvalidArgument(s.to_string()))
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    All,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::All];

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::All => "All",
        }
    }
}

impl FromStr for Sex {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Sex::ALL
            .into_iter()
            .find(|sex| sex.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DashboardError::UnknownSex(s.to_string()))
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValueColumns – the validated column layout after Country / Sex / Year
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// A genuine age bracket such as `0`, `1-4`, `85+` or `<1`.
    AgeBracket,
    /// A total or catch-all column such as `All ages` or `Unknown`.
    Summary,
}

impl ColumnKind {
    /// Classify a header by its text rather than its position.
    pub fn classify(label: &str) -> Self {
        if is_age_bracket(label) {
            ColumnKind::AgeBracket
        } else {
            ColumnKind::Summary
        }
    }
}

fn is_age_bracket(label: &str) -> bool {
    let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    let is_num = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if let Some(rest) = compact.strip_prefix('<') {
        return is_num(rest);
    }
    if let Some(rest) = compact.strip_suffix('+') {
        return is_num(rest);
    }
    if let Some((lo, hi)) = compact.split_once('-') {
        return match (lo.parse::<u32>(), hi.parse::<u32>()) {
            (Ok(a), Ok(b)) => is_num(lo) && is_num(hi) && a <= b,
            _ => false,
        };
    }
    is_num(&compact)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueColumn {
    pub label: String,
    pub kind: ColumnKind,
}

/// Ordered value-column headers of a table, classified once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueColumns {
    columns: Vec<ValueColumn>,
}

impl ValueColumns {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = labels
            .into_iter()
            .map(|label| {
                let label = label.into();
                let kind = ColumnKind::classify(&label);
                ValueColumn { label, kind }
            })
            .collect();
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValueColumn> {
        self.columns.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    /// Position of a column inside each row's `values`.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    /// Like [`index_of`](Self::index_of) but fails with `UnknownColumn`.
    pub fn require(&self, label: &str) -> Result<usize, DashboardError> {
        self.index_of(label)
            .ok_or_else(|| DashboardError::UnknownColumn(label.to_string()))
    }

    /// `(index, label)` of the age-bracket columns, in file order.
    pub fn age_brackets(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == ColumnKind::AgeBracket)
            .map(|(i, c)| (i, c.label.as_str()))
    }
}

// ---------------------------------------------------------------------------
// StatRow – one (Country, Sex, Year) record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub country: String,
    pub sex: Sex,
    pub year: i32,
    /// One value per entry of the table's [`ValueColumns`]; `None` is "no data".
    pub values: Vec<Option<f64>>,
}

impl StatRow {
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// StatisticTable
// ---------------------------------------------------------------------------

/// One loaded statistic. Read-only once constructed.
#[derive(Debug, Clone)]
pub struct StatisticTable {
    pub statistic: Statistic,
    pub columns: ValueColumns,
    pub rows: Vec<StatRow>,
}

impl StatisticTable {
    /// Build a table, rejecting duplicate (Country, Sex, Year) keys.
    pub fn new(
        statistic: Statistic,
        columns: ValueColumns,
        rows: Vec<StatRow>,
    ) -> Result<Self, DashboardError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert((row.country.as_str(), row.sex, row.year)) {
                return Err(DashboardError::DuplicateKey {
                    country: row.country.clone(),
                    sex: row.sex.to_string(),
                    year: row.year,
                });
            }
        }
        Ok(Self {
            statistic,
            columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted unique country names.
    pub fn countries(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sexes present in the table, in `Male, Female, All` order.
    pub fn sexes(&self) -> Vec<Sex> {
        let present: BTreeSet<Sex> = self.rows.iter().map(|r| r.sex).collect();
        present.into_iter().collect()
    }

    /// Inclusive year range, `None` for an empty table.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.year).min()?;
        let max = self.rows.iter().map(|r| r.year).max()?;
        Some((min, max))
    }
}

// ---------------------------------------------------------------------------
// DatasetStore – the three tables, selected by statistic
// ---------------------------------------------------------------------------

/// Immutable holder of the deaths, population and rate tables.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    deaths: StatisticTable,
    population: StatisticTable,
    rate: StatisticTable,
}

impl DatasetStore {
    /// Assemble the store. All tables must share the deaths table's columns.
    pub fn new(
        deaths: StatisticTable,
        population: StatisticTable,
        rate: StatisticTable,
    ) -> Result<Self, DashboardError> {
        for other in [&population, &rate] {
            if other.columns != deaths.columns {
                return Err(DashboardError::SchemaMismatch {
                    table: other.statistic.key().to_string(),
                    expected: deaths.columns.labels(),
                    found: other.columns.labels(),
                });
            }
        }
        Ok(Self {
            deaths,
            population,
            rate,
        })
    }

    pub fn resolve(&self, statistic: Statistic) -> &StatisticTable {
        match statistic {
            Statistic::Deaths => &self.deaths,
            Statistic::Population => &self.population,
            Statistic::Rate => &self.rate,
        }
    }

    /// Shared column layout of all three tables.
    pub fn columns(&self) -> &ValueColumns {
        &self.deaths.columns
    }

    /// The table control options (countries, sexes, years) are derived from.
    pub fn reference_table(&self) -> &StatisticTable {
        &self.deaths
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn row(country: &str, sex: Sex, year: i32, values: &[Option<f64>]) -> StatRow {
        StatRow {
            country: country.to_string(),
            sex,
            year,
            values: values.to_vec(),
        }
    }

    pub fn columns() -> ValueColumns {
        ValueColumns::new(["All ages", "0-4", "5-9", "10+", "Unknown"])
    }

    /// Small table over two countries, two years and two sexes.
    pub fn table(statistic: Statistic) -> StatisticTable {
        let scale = match statistic {
            Statistic::Deaths => 1.0,
            Statistic::Population => 100.0,
            Statistic::Rate => 0.01,
        };
        let v = |x: f64| Some(x * scale);
        let rows = vec![
            row("France", Sex::All, 2000, &[v(30.0), v(12.3), v(7.7), v(10.0), None]),
            row("France", Sex::Male, 2000, &[v(16.0), v(7.0), v(4.0), v(5.0), None]),
            row("Japan", Sex::All, 2000, &[v(40.0), v(20.0), v(5.0), v(15.0), v(0.0)]),
            row("France", Sex::All, 2001, &[v(31.0), v(12.0), v(8.0), v(11.0), None]),
            row("Japan", Sex::All, 2001, &[v(41.0), v(19.0), None, v(16.0), v(0.0)]),
            row("Japan", Sex::Female, 2001, &[v(20.0), v(9.0), v(3.0), v(8.0), None]),
        ];
        StatisticTable::new(statistic, columns(), rows).expect("fixture keys are unique")
    }

    pub fn store() -> DatasetStore {
        DatasetStore::new(
            table(Statistic::Deaths),
            table(Statistic::Population),
            table(Statistic::Rate),
        )
        .expect("fixture layouts match")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn statistic_keys_parse_and_unknown_key_is_invalid_argument() {
        assert_eq!("deaths".parse::<Statistic>(), Ok(Statistic::Deaths));
        assert_eq!("pop".parse::<Statistic>(), Ok(Statistic::Population));
        assert_eq!("rate".parse::<Statistic>(), Ok(Statistic::Rate));
        assert_eq!(
            "births".parse::<Statistic>(),
            Err(DashboardError::InvalidArgument("births".into()))
        );
    }

    #[test]
    fn sex_parses_case_insensitively() {
        assert_eq!("male".parse::<Sex>(), Ok(Sex::Male));
        assert_eq!(" All ".parse::<Sex>(), Ok(Sex::All));
        assert!("Both".parse::<Sex>().is_err());
    }

    #[test]
    fn age_bracket_classification_uses_header_text() {
        for label in ["0", "1", "1-4", "5 - 9", "85+", "95 +", "<1"] {
            assert_eq!(ColumnKind::classify(label), ColumnKind::AgeBracket, "{label}");
        }
        for label in ["All ages", "Unknown", "Total", "9-5", "-4", "4-", "+"] {
            assert_eq!(ColumnKind::classify(label), ColumnKind::Summary, "{label}");
        }
    }

    #[test]
    fn age_brackets_skip_summary_columns_and_keep_order() {
        let cols = columns();
        let brackets: Vec<_> = cols.age_brackets().collect();
        assert_eq!(brackets, vec![(1, "0-4"), (2, "5-9"), (3, "10+")]);
        assert_eq!(cols.index_of("Unknown"), Some(4));
        assert_eq!(
            cols.require("15-19"),
            Err(DashboardError::UnknownColumn("15-19".into()))
        );
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let rows = vec![
            row("France", Sex::All, 2000, &[Some(1.0)]),
            row("France", Sex::All, 2000, &[Some(2.0)]),
        ];
        let err = StatisticTable::new(Statistic::Deaths, ValueColumns::new(["0-4"]), rows)
            .unwrap_err();
        assert!(matches!(err, DashboardError::DuplicateKey { year: 2000, .. }));
    }

    #[test]
    fn resolve_returns_matching_table_and_is_idempotent() {
        let store = store();
        for stat in Statistic::ALL {
            let first = store.resolve(stat);
            let second = store.resolve(stat);
            assert_eq!(first.statistic, stat);
            assert!(std::ptr::eq(first, second));
            let by_key: Statistic = stat.key().parse().unwrap();
            assert!(std::ptr::eq(first, store.resolve(by_key)));
        }
        assert!(matches!(
            "deaths_per_cap".parse::<Statistic>(),
            Err(DashboardError::InvalidArgument(_))
        ));
    }

    #[test]
    fn store_rejects_mismatched_layouts() {
        let other = StatisticTable::new(
            Statistic::Population,
            ValueColumns::new(["0-4", "5-9"]),
            Vec::new(),
        )
        .unwrap();
        let err = DatasetStore::new(table(Statistic::Deaths), other, table(Statistic::Rate))
            .unwrap_err();
        assert!(matches!(err, DashboardError::SchemaMismatch { ref table, .. } if table == "pop"));
    }

    #[test]
    fn control_options_come_from_rows() {
        let t = table(Statistic::Deaths);
        assert_eq!(t.countries(), vec!["France".to_string(), "Japan".to_string()]);
        assert_eq!(t.sexes(), vec![Sex::Male, Sex::Female, Sex::All]);
        assert_eq!(t.year_range(), Some((2000, 2001)));
    }
}
