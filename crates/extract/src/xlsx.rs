//! XLSX workbook reader.

use calamine::{Data, Reader, Xlsx};
use relay_core::{markers, Error, ExtractedDocument, Result};
use std::io::Cursor;

/// Separator placed between the cells of one row.
pub const CELL_DELIMITER: &str = " | ";

/// Reader for XLSX workbooks.
///
/// Every worksheet gets a marker, even an empty one. Each row with at least
/// one value becomes one line of its trimmed cell values.
pub struct XlsxReader;

impl XlsxReader {
    pub fn new() -> Self {
        Self
    }

    /// Read worksheet rows into `doc`. Sheets read before a failure stay in `doc`.
    pub fn read_into(&self, bytes: &[u8], doc: &mut ExtractedDocument) -> Result<()> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| Error::XlsxParseError(format!("Failed to open workbook: {}", e)))?;

        for sheet_name in workbook.sheet_names() {
            doc.push_line(markers::sheet_marker(&sheet_name));

            let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
                Error::XlsxParseError(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;

            let mut rows = 0usize;
            for row in range.rows() {
                if let Some(line) = row_line(row) {
                    doc.push_line(line);
                    rows += 1;
                }
            }
            log::debug!("Sheet '{}': {} non-empty rows", sheet_name, rows);
        }

        Ok(())
    }
}

impl Default for XlsxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Format used for date and date-time cells.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Display text of one cell.
///
/// Date cells print as calendar timestamps rather than serial numbers and
/// booleans as `True`/`False`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(value) if value.is_datetime() => value
            .as_datetime()
            .map(|dt| dt.format(DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| value.to_string()),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Join the non-empty cells of a row, or `None` for a row without values.
fn row_line(row: &[Data]) -> Option<String> {
    let cells: Vec<String> = row
        .iter()
        .filter(|cell| !matches!(cell, Data::Empty))
        .map(|cell| cell_text(cell).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if cells.is_empty() {
        None
    } else {
        Some(cells.join(CELL_DELIMITER))
    }
}
