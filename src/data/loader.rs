use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{DateTime, Local};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row + records; every cell is kept as text
/// * `.json`    – `[{ "col": value, ... }, ...]` or a single object
/// * `.parquet` – flat scalar columns (recommended for large tables)
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Session file history
// ---------------------------------------------------------------------------

/// A file loaded during this session, shown in the file list.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
    pub row_count: usize,
    pub column_count: usize,
    pub loaded_at: DateTime<Local>,
}

impl LoadedFile {
    pub fn describe(path: &Path, dataset: &Dataset) -> Result<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("reading metadata of {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(LoadedFile {
            path: path.to_path_buf(),
            name,
            size_bytes: meta.len(),
            row_count: dataset.len(),
            column_count: dataset.columns.len(),
            loaded_at: Local::now(),
        })
    }
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`, ...
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, e.g. `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "region": "north", "units": 10, "price": "2.50" },
///   ...
/// ]
/// ```
///
/// A single top-level object is treated as a one-record dataset. Array items
/// that are not objects are skipped.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let items = match root {
        JsonValue::Array(items) => items,
        obj @ JsonValue::Object(_) => vec![obj],
        other => bail!("Expected a JSON array or object, got {}", json_kind(&other)),
    };

    let mut rows = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let obj = match item {
            JsonValue::Object(obj) => obj,
            other => {
                log::warn!("Skipping JSON item {i}: {} is not an object", json_kind(&other));
                continue;
            }
        };
        rows.push(
            obj.into_iter()
                .map(|(key, val)| (key, json_to_cell(val)))
                .collect::<Record>(),
        );
    }

    Ok(Dataset::from_records(rows))
}

fn json_to_cell(val: JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s),
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) => CellValue::Number(f),
            None => CellValue::Text(n.to_string()),
        },
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

fn json_kind(val: &JsonValue) -> &'static str {
    match val {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Cells stay text; numeric interpretation happens in [`CellValue::as_number`].
/// Short rows are padded with nulls, surplus cells are ignored.
fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    parse_csv(file)
}

pub fn parse_csv<R: std::io::Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > headers.len() {
            log::debug!(
                "CSV row {row_no}: {} cells for {} headers, ignoring the rest",
                record.len(),
                headers.len()
            );
        }
        let row: Record = headers
            .iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let cell = record
                    .get(col_idx)
                    .map_or(CellValue::Null, CellValue::from);
                (name.as_str(), cell)
            })
            .collect();
        rows.push(row);
    }

    Ok(Dataset::from_records(rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns.
///
/// Numeric columns (ints, floats, decimals) become numbers, string columns
/// become text, anything else is rendered with Arrow's display formatter.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let columns: Vec<(String, Vec<CellValue>)> = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, col)| {
                let cells = column_cells(col)
                    .with_context(|| format!("reading parquet column '{}'", field.name()))?;
                Ok((field.name().clone(), cells))
            })
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            rows.push(
                columns
                    .iter()
                    .map(|(name, cells)| (name.as_str(), cells[row].clone()))
                    .collect::<Record>(),
            );
        }
    }

    Ok(Dataset::from_records(rows))
}

// -- Arrow helpers --

/// Convert a whole Arrow column into cells.
fn column_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let n = col.len();
    let cells = match col.data_type() {
        dt if dt.is_numeric() => {
            let floats = cast(col, &DataType::Float64).context("casting to Float64")?;
            let floats = floats.as_primitive::<Float64Type>();
            (0..n)
                .map(|i| {
                    if floats.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Number(floats.value(i))
                    }
                })
                .collect()
        }
        DataType::Utf8 => {
            let s = col.as_string::<i32>();
            (0..n).map(|i| string_cell(s.is_null(i), || s.value(i))).collect()
        }
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            (0..n).map(|i| string_cell(s.is_null(i), || s.value(i))).collect()
        }
        _ => {
            let fmt = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())
                .context("formatting column")?;
            (0..n)
                .map(|i| {
                    if col.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Text(fmt.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}

fn string_cell<'a>(is_null: bool, value: impl FnOnce() -> &'a str) -> CellValue {
    if is_null {
        CellValue::Null
    } else {
        CellValue::Text(value().to_string())
    }
}
