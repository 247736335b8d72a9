use std::collections::BTreeMap;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    CellValue, Dataset, Record, AGE, CITY, GENDER, PRODUCT_CATEGORY, PURCHASE_AMOUNT,
    REQUIRED_COLUMNS,
};
use crate::error::LoadError;

type Row = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a customer dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one transaction per line
/// * `.json`    – `[{ "City": ..., "Purchase_Amount": ..., ... }, ...]`
/// * `.parquet` – flat columns, as written by `df.to_parquet()`
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }?;

    log::info!(
        "Loaded {} records from {} ({} columns, numeric: {:?})",
        dataset.len(),
        path.display(),
        dataset.columns.len(),
        dataset.numeric_columns
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Validation shared by every format
// ---------------------------------------------------------------------------

/// Check the schema and type the required columns.
///
/// Fails with [`LoadError::Schema`] when a required column is absent and with
/// [`LoadError::Data`] when a purchase amount is not a finite number.
pub fn build_dataset(columns: Vec<String>, rows: Vec<Row>) -> Result<Dataset, LoadError> {
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|req| !columns.iter().any(|c| c == *req))
    {
        return Err(LoadError::Schema {
            column: missing.to_string(),
        });
    }

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, mut row) in rows.into_iter().enumerate() {
        let mut take = |col: &str| row.remove(col).unwrap_or(CellValue::Null);

        let amount_cell = take(PURCHASE_AMOUNT);
        // NaN and infinities parse as floats but cannot be summed or binned.
        let purchase_amount = amount_cell
            .as_f64()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| LoadError::Data {
                row: row_no,
                column: PURCHASE_AMOUNT.to_string(),
                value: match &amount_cell {
                    CellValue::Null => String::new(),
                    other => other.to_string(),
                },
            })?;

        let city = take(CITY);
        let gender = take(GENDER);
        let product_category = take(PRODUCT_CATEGORY);
        let age = take(AGE);

        records.push(Record {
            city,
            gender,
            product_category,
            age,
            purchase_amount,
            extra: row,
        });
    }

    Ok(Dataset::from_records(columns, records))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one transaction per record.
/// Cell types are guessed per value; empty cells are nulls.
fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let reader = csv::Reader::from_path(path)?;
    read_csv(reader)
}

/// Parse CSV from any reader. Exposed for in-memory sources.
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset, LoadError> {
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), guess_cell_type(value)))
            .collect();
        rows.push(row);
    }

    build_dataset(headers, rows)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "City": "Lahore", "Gender": "Male", "Product_Category": "Books",
///     "Age": 34, "Purchase_Amount": 120.5 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_json(&text)
}

/// Parse a records-oriented JSON document.
pub fn parse_json(text: &str) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".into()))?;

    // Columns in first-seen order across all records.
    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;

        let mut row = Row::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    build_dataset(columns, rows)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let mut cells = Row::new();
            for (col_idx, col_name) in columns.iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row)?;
                cells.insert(col_name.clone(), value);
            }
            rows.push(cells);
        }
    }

    build_dataset(columns, rows)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue, LoadError> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Dictionary-encoded categories, dates and the like: keep the text form.
        _ => CellValue::String(array_value_to_string(col, row)?),
    };
    Ok(value)
}
