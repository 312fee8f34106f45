use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataFormatError;
use super::model::{CellValue, GamesTable, Record};

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

pub const NAME: &str = "Name";
pub const PLATFORM: &str = "Platform";
pub const YEAR: &str = "Year_of_Release";
pub const GENRE: &str = "Genre";
pub const PUBLISHER: &str = "Publisher";
pub const CRITIC_SCORE: &str = "Critic_Score";
pub const USER_SCORE: &str = "User_Score";
pub const RATING: &str = "Rating";

/// Placeholder for a user score that has not been determined yet.
pub const SCORE_SENTINEL: &str = "tbd";

/// Cell contents read as "no value" regardless of column.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Which missing values cause a row to be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Drop a row with a missing value in any column, including ones the
    /// dashboard never reads (sales, counts, developer).
    #[default]
    AnyColumn,
    /// Drop a row only when one of the columns the dashboard reads is missing.
    RequiredColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rows released before this year are dropped.
    pub min_year: i32,
    pub missing_policy: MissingPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            min_year: 2000,
            missing_policy: MissingPolicy::AnyColumn,
        }
    }
}

static NULL_CELL: CellValue = CellValue::Null;

/// Untyped rows straight out of a source file.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a games table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the column names of the games dataset
/// * `.json`    – `[{ "Name": ..., "Platform": ..., ... }, ...]`
/// * `.parquet` – one column per field, strings and numbers
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<GamesTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let table = build_table(raw, options)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(table)
}

// ---------------------------------------------------------------------------
// Coercion: RawTable -> GamesTable
// ---------------------------------------------------------------------------

/// Coerce raw rows into records, dropping incomplete and too-old rows.
///
/// Numeric columns are coerced for every row before any row is dropped, so a
/// malformed score fails the load even on a row that would be discarded.
pub fn build_table(raw: RawTable, options: &LoadOptions) -> Result<GamesTable, DataFormatError> {
    let column = |name: &str| {
        raw.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataFormatError::missing_column(name))
    };
    let idx = ColumnIndex {
        name: column(NAME)?,
        platform: column(PLATFORM)?,
        year: column(YEAR)?,
        genre: column(GENRE)?,
        publisher: column(PUBLISHER)?,
        critic_score: column(CRITIC_SCORE)?,
        user_score: column(USER_SCORE)?,
        rating: column(RATING)?,
    };

    let n_rows = raw.rows.len();
    let mut dropped_missing = 0usize;
    let mut dropped_early = 0usize;
    let mut records = Vec::with_capacity(n_rows);

    for (row_no, cells) in raw.rows.into_iter().enumerate() {
        let cells: Vec<CellValue> = cells
            .into_iter()
            .enumerate()
            .map(|(col_idx, cell)| normalize_cell(cell, col_idx == idx.user_score))
            .collect();
        let cell = |i: usize| cells.get(i).unwrap_or(&NULL_CELL);

        let row = row_no + 1;
        let year = coerce_year(cell(idx.year), row)?;
        let critic_score = coerce_score(cell(idx.critic_score), row, CRITIC_SCORE)?;
        let user_score = coerce_score(cell(idx.user_score), row, USER_SCORE)?;

        let incomplete = match options.missing_policy {
            MissingPolicy::AnyColumn => {
                cells.len() < raw.headers.len() || cells.iter().any(CellValue::is_null)
            }
            MissingPolicy::RequiredColumns => idx.all().iter().any(|&i| cell(i).is_null()),
        };
        let (Some(year), Some(critic_score), Some(user_score)) = (year, critic_score, user_score)
        else {
            dropped_missing += 1;
            continue;
        };
        if incomplete {
            dropped_missing += 1;
            continue;
        }
        if year < options.min_year {
            dropped_early += 1;
            continue;
        }

        records.push(Record {
            name: coerce_text(cell(idx.name)),
            platform: coerce_text(cell(idx.platform)),
            year,
            genre: coerce_text(cell(idx.genre)),
            publisher: coerce_text(cell(idx.publisher)),
            critic_score,
            user_score,
            rating: coerce_text(cell(idx.rating)),
        });
    }

    log::info!(
        "Read {n_rows} rows: dropped {dropped_missing} with missing values, \
         {dropped_early} released before {}, kept {}",
        options.min_year,
        records.len()
    );

    Ok(GamesTable::from_records(records))
}

struct ColumnIndex {
    name: usize,
    platform: usize,
    year: usize,
    genre: usize,
    publisher: usize,
    critic_score: usize,
    user_score: usize,
    rating: usize,
}

impl ColumnIndex {
    fn all(&self) -> [usize; 8] {
        [
            self.name,
            self.platform,
            self.year,
            self.genre,
            self.publisher,
            self.critic_score,
            self.user_score,
            self.rating,
        ]
    }
}

/// Map NA tokens, NaN and (in the user score column) the sentinel to `Null`.
fn normalize_cell(cell: CellValue, is_user_score: bool) -> CellValue {
    match cell {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if NA_TOKENS.contains(&trimmed) || (is_user_score && trimmed == SCORE_SENTINEL) {
                CellValue::Null
            } else {
                CellValue::Text(s)
            }
        }
        CellValue::Float(f) if f.is_nan() => CellValue::Null,
        other => other,
    }
}

fn coerce_year(cell: &CellValue, row: usize) -> Result<Option<i32>, DataFormatError> {
    let invalid = || DataFormatError::invalid(row, YEAR, cell.to_string(), "an integer year");
    let as_year = |f: f64| {
        if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
            Ok(Some(f as i32))
        } else {
            Err(invalid())
        }
    };
    match cell {
        CellValue::Null => Ok(None),
        CellValue::Integer(i) => i32::try_from(*i).map(Some).map_err(|_| invalid()),
        CellValue::Float(f) => as_year(*f),
        CellValue::Text(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i32>() {
                Ok(Some(i))
            } else if let Ok(f) = s.parse::<f64>() {
                as_year(f)
            } else {
                Err(invalid())
            }
        }
        CellValue::Bool(_) => Err(invalid()),
    }
}

fn coerce_score(
    cell: &CellValue,
    row: usize,
    column: &str,
) -> Result<Option<f64>, DataFormatError> {
    let invalid = || DataFormatError::invalid(row, column, cell.to_string(), "a number");
    match cell {
        CellValue::Null => Ok(None),
        CellValue::Integer(i) => Ok(Some(*i as f64)),
        CellValue::Float(f) => Ok(Some(*f)),
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Some(f)),
            _ => Err(invalid()),
        },
        CellValue::Bool(_) => Err(invalid()),
    }
}

fn coerce_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        rows.push(record.iter().map(csv_cell).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Cells stay text exactly as written; numeric columns are parsed on coercion.
fn csv_cell(s: &str) -> CellValue {
    if NA_TOKENS.contains(&s.trim()) {
        CellValue::Null
    } else {
        CellValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Name": "Wii Sports", "Platform": "Wii", "Year_of_Release": 2006, ... },
///   ...
/// ]
/// ```
///
/// A key absent from one object is treated as a missing value in that row.
fn read_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut seen = BTreeSet::new();
    let mut headers = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {} is not a JSON object", i + 1))?;
        for key in obj.keys() {
            if seen.insert(key.clone()) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by **Pandas** (`df.to_parquet()`) or
/// **Polars** (`df.write_parquet()`). Every column is read; nulls become
/// missing values.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .zip(&headers)
            .map(|(col, name)| readable_column(col, name))
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            rows.push(columns.iter().map(|col| extract_cell(col, row)).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

/// Cast a column to one of the types [`extract_cell`] reads.
///
/// Dictionary-encoded columns (pandas `category`) are unpacked to their value
/// type, string views become `Utf8`, narrow integers widen to `Int64` and
/// `Float16` to `Float64`. Anything else is an error.
fn readable_column(col: &ArrayRef, name: &str) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => return Ok(col.clone()),
        DataType::Dictionary(_, value) => {
            let unpacked = cast(col, value)
                .with_context(|| format!("unpacking dictionary column '{name}'"))?;
            return readable_column(&unpacked, name);
        }
        DataType::Utf8View => DataType::Utf8,
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 => DataType::Float64,
        other => bail!("Parquet column '{name}' has unsupported type {other:?}"),
    };
    cast(col, &target).with_context(|| format!("casting column '{name}' to {target:?}"))
}

/// Extract a single cell from a column prepared by [`readable_column`].
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // readable_column admits no other type
        _ => CellValue::Null,
    }
}
