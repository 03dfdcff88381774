//! Spreadsheet Intake
//!
//! Turns one uploaded file into a raw Polars table. Excel workbooks go through
//! calamine, CSV through Polars' own reader. Every cell is read as a string
//! (empty cells as null); typing happens later in normalization.

use crate::error::{Result, ValidationError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use std::io::Cursor;
use std::path::Path;

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// .xlsx / .xlsm / .xlsb / .xls (sniffed by calamine)
    Excel,
    Csv,
}

impl SheetFormat {
    pub const ACCEPTED_EXTENSIONS: [&'static str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "csv"];

    /// Pick the format from the file extension (case-insensitive)
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" => Some(SheetFormat::Excel),
            "csv" => Some(SheetFormat::Csv),
            _ => None,
        }
    }
}

/// One uploaded spreadsheet, read into memory
pub struct UploadedSheet {
    pub file_name: String,
    pub format: SheetFormat,
    /// First worksheet; headers as written, all cells as strings
    pub table: DataFrame,
}

impl UploadedSheet {
    /// Read an upload held in memory
    pub fn from_bytes(file_name: &str, bytes: &[u8]) -> Result<Self> {
        let format = SheetFormat::from_file_name(file_name).ok_or_else(|| {
            file_read_error(
                file_name,
                format!(
                    "unsupported file type (expected one of: .{})",
                    SheetFormat::ACCEPTED_EXTENSIONS.join(", .")
                ),
            )
        })?;

        let table = match format {
            SheetFormat::Excel => Self::read_excel(bytes),
            SheetFormat::Csv => Self::read_csv(bytes),
        }
        .map_err(|reason| file_read_error(file_name, reason))?;

        tracing::info!(
            "Read '{}' ({:?}): {} rows × {} columns",
            file_name,
            format,
            table.height(),
            table.width()
        );

        Ok(UploadedSheet {
            file_name: file_name.to_string(),
            format,
            table,
        })
    }

    /// Read a spreadsheet from disk
    pub fn load(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = std::fs::read(path)
            .map_err(|e| file_read_error(&file_name, e.to_string()))?;

        Self::from_bytes(&file_name, &bytes)
    }

    /// First worksheet of a workbook; first row is the header row
    fn read_excel(bytes: &[u8]) -> std::result::Result<DataFrame, String> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| format!("unable to open workbook: {}", e))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| "the workbook does not contain any worksheets".to_string())?
            .map_err(|e| format!("unable to read the first worksheet: {}", e))?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| "the worksheet is empty".to_string())?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell_to_string(cell).unwrap_or_default())
            .collect();
        let headers = unique_headers(&headers);

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for row in rows {
            let cells: Vec<Option<String>> = row.iter().map(cell_to_string).collect();
            if cells.iter().all(|c| c.is_none()) {
                continue;
            }
            for (idx, values) in columns.iter_mut().enumerate() {
                values.push(cells.get(idx).cloned().flatten());
            }
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();

        DataFrame::new(columns).map_err(|e| e.to_string())
    }

    /// CSV with a header row; schema inference disabled so every column is a string
    fn read_csv(bytes: &[u8]) -> std::result::Result<DataFrame, String> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| e.to_string())
    }
}

fn file_read_error(file_name: &str, reason: String) -> ValidationError {
    ValidationError::FileRead {
        file_name: file_name.to_string(),
        reason,
    }
}

/// Cell as display string; empty and error cells are null
fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Blank headers become `unnamed_<index>`; repeats get `_duplicated_<n>`,
/// matching the names Polars assigns when reading CSV.
fn unique_headers(headers: &[String]) -> Vec<String> {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();

    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let base = if header.trim().is_empty() {
                format!("unnamed_{}", idx)
            } else {
                header.clone()
            };

            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}_duplicated_{}", base, *count - 1)
            };
            *count += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SheetFormat::from_file_name("orders.XLSX"), Some(SheetFormat::Excel));
        assert_eq!(SheetFormat::from_file_name("orders.xls"), Some(SheetFormat::Excel));
        assert_eq!(SheetFormat::from_file_name("orders.csv"), Some(SheetFormat::Csv));
        assert_eq!(SheetFormat::from_file_name("orders.txt"), None);
        assert_eq!(SheetFormat::from_file_name("orders"), None);
    }

    #[test]
    fn test_csv_is_read_as_strings() {
        let csv = b"Shipment,delivery_lat,delivery_lng,actual_lat,actual_lng\n\
                    SHP-1,-6.2,106.8,-6.21,106.81\n\
                    SHP-2,N/A,106.8,,106.81\n";

        let sheet = UploadedSheet::from_bytes("upload.csv", csv).unwrap();
        assert_eq!(sheet.format, SheetFormat::Csv);
        assert_eq!(sheet.table.height(), 2);
        assert_eq!(sheet.table.width(), 5);
        assert_eq!(sheet.table.column("delivery_lat").unwrap().dtype(), &DataType::String);
        assert_eq!(
            sheet.table.column("delivery_lat").unwrap().str().unwrap().get(1),
            Some("N/A")
        );
    }

    #[test]
    fn test_corrupt_workbook_is_file_read_error() {
        let err = UploadedSheet::from_bytes("broken.xlsx", b"definitely not a workbook")
            .err()
            .unwrap();
        match err {
            ValidationError::FileRead { file_name, reason } => {
                assert_eq!(file_name, "broken.xlsx");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_extension_is_file_read_error() {
        let err = UploadedSheet::from_bytes("notes.txt", b"a,b\n1,2\n").err().unwrap();
        assert!(matches!(err, ValidationError::FileRead { .. }));
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn test_unique_headers() {
        let headers: Vec<String> = ["shipment", "", "shipment", "shipment"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            unique_headers(&headers),
            vec![
                "shipment",
                "unnamed_1",
                "shipment_duplicated_0",
                "shipment_duplicated_1"
            ]
        );
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), None);
        assert_eq!(cell_to_string(&Data::String("  ".into())), None);
        assert_eq!(cell_to_string(&Data::Float(106.8456)), Some("106.8456".to_string()));
        assert_eq!(cell_to_string(&Data::Int(42)), Some("42".to_string()));
    }
}
