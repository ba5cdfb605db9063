/// Data layer: core types, loading, filtering and view shaping.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet  (deaths, pop, rate)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → DatasetStore (three StatisticTables)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DatasetStore  │  resolve(statistic) → &StatisticTable
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  countries / sex / year predicates → rows
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ transform  │  time series, age profile, map cells
///   └───────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod transform;
