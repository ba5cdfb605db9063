use thiserror::Error;

// ---------------------------------------------------------------------------
// Typed contract errors raised by the data layer
// ---------------------------------------------------------------------------

/// Errors produced while resolving, validating or transforming statistic tables.
///
/// An empty filter result is deliberately *not* represented here: it is a
/// valid state that the UI renders as an empty chart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// A statistic key outside `deaths` / `pop` / `rate`.
    #[error("invalid statistic '{0}', expected one of: deaths, pop, rate")]
    InvalidArgument(String),

    /// A value column that is not part of the table layout.
    #[error("unknown value column '{0}'")]
    UnknownColumn(String),

    /// A sex label that is not Male / Female / All.
    #[error("unknown sex '{0}', expected Male, Female or All")]
    UnknownSex(String),

    /// Two rows share the same (Country, Sex, Year) key.
    #[error("duplicate row for ({country}, {sex}, {year})")]
    DuplicateKey {
        country: String,
        sex: String,
        year: i32,
    },

    /// The three tables do not share one column layout.
    #[error("{table} columns {found:?} differ from deaths columns {expected:?}")]
    SchemaMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}
