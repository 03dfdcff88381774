//! Result export and table previews
//!
//! CSV export keeps the column order of the scored table: canonical columns,
//! then distance_km, distance_meters.

use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use std::path::Path;

/// Download name for the exported result set
pub const RESULT_FILE_NAME: &str = "hasil_validasi_jarak_excel_only.csv";

/// Rows shown in upload/normalization previews
pub const PREVIEW_ROWS: usize = 5;

/// Serialize a table as UTF-8 CSV with a header row
pub fn write_result_csv(result: &DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut df = result.clone();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut df)?;
    Ok(buf)
}

pub fn write_result_csv_to_path(result: &DataFrame, path: &Path) -> Result<()> {
    let bytes = write_result_csv(result)?;
    std::fs::write(path, bytes)?;
    tracing::info!("Wrote {} rows to {:?}", result.height(), path);
    Ok(())
}

/// Display-ready slice of a table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Row count of the full table, not the preview
    pub total_rows: usize,
}

/// First `limit` rows rendered as strings; nulls render empty
pub fn preview(df: &DataFrame, limit: Option<usize>) -> Result<TablePreview> {
    let head = match limit {
        Some(n) => df.head(Some(n)),
        None => df.clone(),
    };

    let headers = head
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows = Vec::with_capacity(head.height());
    for idx in 0..head.height() {
        let mut row = Vec::with_capacity(head.width());
        for column in head.get_columns() {
            row.push(display_value(&column.get(idx)?));
        }
        rows.push(row);
    }

    Ok(TablePreview {
        headers,
        rows,
        total_rows: df.height(),
    })
}

fn display_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float64(v) => v.to_string(),
        AnyValue::Float32(v) => v.to_string(),
        other => other.to_string(),
    }
}
