use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{DatasetStore, Sex, StatRow, Statistic, StatisticTable, ValueColumns};
use crate::config::DataConfig;

const COUNTRY: &str = "Country";
const SEX: &str = "Sex";
const YEAR: &str = "Year";

static JSON_NULL: JsonValue = JsonValue::Null;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the deaths, population and rate tables named by `config`.
pub fn load_store(config: &DataConfig) -> Result<DatasetStore> {
    let load = |stat: Statistic| -> Result<StatisticTable> {
        let path = config.path_for(stat);
        let table = load_table(&path, stat)
            .with_context(|| format!("loading {stat} table from {}", path.display()))?;
        log::info!(
            "Loaded {} table: {} rows, {} value columns",
            stat,
            table.len(),
            table.columns.len()
        );
        Ok(table)
    };

    let store = DatasetStore::new(
        load(Statistic::Deaths)?,
        load(Statistic::Population)?,
        load(Statistic::Rate)?,
    )?;
    Ok(store)
}

/// Load one statistic table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row `Country,Sex,Year,<value columns...>`
/// * `.json`    – `[{ "Country": ..., "Sex": ..., "Year": ..., "0-4": ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_table(path: &Path, statistic: Statistic) -> Result<StatisticTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, statistic),
        "json" => load_json(path, statistic),
        "parquet" | "pq" => load_parquet(path, statistic),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Header layout shared by all formats
// ---------------------------------------------------------------------------

/// Where the key columns sit and which headers carry values.
struct Layout {
    country: usize,
    sex: usize,
    year: usize,
    /// `(position in the source, header)` of every value column.
    values: Vec<(usize, String)>,
}

impl Layout {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("missing '{name}' column"))
        };
        let country = find(COUNTRY)?;
        let sex = find(SEX)?;
        let year = find(YEAR)?;

        let values = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| ![country, sex, year].contains(i) && !is_index_column(h))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(Self {
            country,
            sex,
            year,
            values,
        })
    }

    fn columns(&self) -> ValueColumns {
        ValueColumns::new(self.values.iter().map(|(_, h)| h.clone()))
    }
}

/// A pandas index written by `to_csv()` without `index=False`.
fn is_index_column(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed:")
}

fn parse_year(s: &str) -> Result<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Ok(y);
    }
    // pandas writes integer columns holding NaN as floats ("2000.0").
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() < i32::MAX as f64 => Ok(f as i32),
        _ => bail!("'{s}' is not a year"),
    }
}

fn parse_value(s: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .with_context(|| format!("'{s}' is not a number"))?;
    Ok(Some(v))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, statistic: Statistic) -> Result<StatisticTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let layout = Layout::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let country = cell(layout.country).trim().to_string();
        let sex: Sex = cell(layout.sex)
            .parse()
            .with_context(|| format!("CSV row {row_no}"))?;
        let year = parse_year(cell(layout.year)).with_context(|| format!("CSV row {row_no}"))?;
        let values = layout
            .values
            .iter()
            .map(|(idx, header)| {
                parse_value(cell(*idx)).with_context(|| format!("CSV row {row_no}, '{header}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        rows.push(StatRow {
            country,
            sex,
            year,
            values,
        });
    }

    Ok(StatisticTable::new(statistic, layout.columns(), rows)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Value column order is taken from the first record.
fn load_json(path: &Path, statistic: Statistic) -> Result<StatisticTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let headers: Vec<String> = match records.first() {
        Some(first) => first
            .as_object()
            .context("Row 0 is not a JSON object")?
            .keys()
            .cloned()
            .collect(),
        None => vec![COUNTRY.into(), SEX.into(), YEAR.into()],
    };
    let layout = Layout::from_headers(&headers)?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let field = |name: &str| obj.get(name).unwrap_or(&JSON_NULL);

        let country = field(COUNTRY)
            .as_str()
            .with_context(|| format!("Row {i}: '{COUNTRY}' is not a string"))?
            .to_string();
        let sex: Sex = field(SEX)
            .as_str()
            .with_context(|| format!("Row {i}: '{SEX}' is not a string"))?
            .parse()
            .with_context(|| format!("Row {i}"))?;
        let year = json_year(field(YEAR)).with_context(|| format!("Row {i}"))?;

        let values = layout
            .values
            .iter()
            .map(|(_, header)| {
                json_value(field(header)).with_context(|| format!("Row {i}, '{header}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        rows.push(StatRow {
            country,
            sex,
            year,
            values,
        });
    }

    Ok(StatisticTable::new(statistic, layout.columns(), rows)?)
}

fn json_year(val: &JsonValue) -> Result<i32> {
    match val {
        JsonValue::Number(n) => parse_year(&n.to_string()),
        JsonValue::String(s) => parse_year(s),
        other => bail!("'{YEAR}' is {other}, expected a number"),
    }
}

fn json_value(val: &JsonValue) -> Result<Option<f64>> {
    match val {
        JsonValue::Null => Ok(None),
        JsonValue::Number(n) => Ok(n.as_f64()),
        JsonValue::String(s) => parse_value(s),
        other => bail!("{other} is not a number"),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// `Country` and `Sex` must be string columns, `Year` any integer or float
/// type, and value columns any numeric type (cast to Float64). Works with
/// files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path, statistic: Statistic) -> Result<StatisticTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = Layout::from_headers(&headers)?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let countries = string_column(batch.column(layout.country), COUNTRY)?;
        let sexes = string_column(batch.column(layout.sex), SEX)?;
        let years = cast(batch.column(layout.year), &DataType::Int64)
            .with_context(|| format!("casting '{YEAR}' to Int64"))?;
        let years = years
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .clone();

        let value_cols = layout
            .values
            .iter()
            .map(|(idx, header)| {
                let arr = cast(batch.column(*idx), &DataType::Float64)
                    .with_context(|| format!("casting '{header}' to Float64"))?;
                arr.as_any()
                    .downcast_ref::<Float64Array>()
                    .cloned()
                    .context("expected Float64Array")
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            if countries.is_null(row) || sexes.is_null(row) || years.is_null(row) {
                bail!("Row {row}: null key column");
            }
            let sex: Sex = sexes
                .value(row)
                .parse()
                .with_context(|| format!("Row {row}"))?;
            let year = i32::try_from(years.value(row))
                .with_context(|| format!("Row {row}: year out of range"))?;
            let values = value_cols
                .iter()
                .map(|col| (!col.is_null(row)).then(|| col.value(row)))
                .collect();

            rows.push(StatRow {
                country: countries.value(row).to_string(),
                sex,
                year,
                values,
            });
        }
    }

    Ok(StatisticTable::new(statistic, layout.columns(), rows)?)
}

fn string_column(col: &dyn Array, name: &str) -> Result<StringArray> {
    let arr = cast(col, &DataType::Utf8).with_context(|| format!("casting '{name}' to Utf8"))?;
    arr.as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .context("expected StringArray")
}
