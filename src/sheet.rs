//! Spreadsheet codec
//!
//! Reads the first worksheet of any workbook calamine understands (xlsx,
//! xlsm, xlsb, xls, ods) into a [`Table`], and writes a [`Table`] back out as
//! a single-sheet xlsx workbook.
//!
//! The first row of the sheet is the header. Header cells that are blank or
//! that carry a spreadsheet-generated `Unnamed` label are treated as index
//! columns and dropped together with their data.

use crate::error::{InventoryError, IoResultExt, Result};
use crate::table::{CellValue, Table};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Worksheet name used for downloads
pub const SHEET_NAME: &str = "Datos";

/// Text layout for date cells
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// MIME type of an xlsx workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Parse a workbook held in memory
pub fn read_table(bytes: Vec<u8>) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InventoryError::spreadsheet("El archivo no contiene hojas"))??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    // (source column, header name) for every column that survives
    let kept = header_columns(header);
    let mut table = Table::new(kept.iter().map(|(_, name)| name.clone()).collect());

    for row in rows {
        let values: Vec<CellValue> = kept
            .iter()
            .map(|(idx, _)| row.get(*idx).map(cell_value).unwrap_or_default())
            .collect();

        if values.iter().all(CellValue::is_empty) {
            continue;
        }
        table.push_row(values);
    }

    Ok(table)
}

/// Read and parse a workbook from disk
pub fn read_table_from_path(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path).with_path(path)?;
    read_table(bytes)
}

/// Serialize a table to an xlsx workbook with one sheet
pub fn write_table(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(col)?, name.as_str(), &header_format)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1)
            .map_err(|_| InventoryError::Export("too many rows".to_string()))?;

        for (col, cell) in row.iter().enumerate() {
            let col = column_number(col)?;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(text) => {
                    worksheet.write_string(row_num, col, text.as_str())?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number(row_num, col, *number)?;
                }
                CellValue::Bool(flag) => {
                    worksheet.write_boolean(row_num, col, *flag)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_number(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| InventoryError::Export("too many columns".to_string()))
}

/// Header names worth keeping, with duplicate names disambiguated as
/// `Name.1`, `Name.2`, ...
fn header_columns(header: &[Data]) -> Vec<(usize, String)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut kept = Vec::new();

    for (idx, cell) in header.iter().enumerate() {
        let name = cell_value(cell).to_string().trim().to_string();
        if name.is_empty() || name.contains("Unnamed") {
            continue;
        }

        let count = seen.entry(name.clone()).or_insert(0);
        let unique = if *count == 0 {
            name.clone()
        } else {
            format!("{}.{}", name, count)
        };
        *count += 1;
        kept.push((idx, unique));
    }

    kept
}

/// Date cells become text in the same layout a CSV export would use
fn date_text(datetime: NaiveDateTime) -> String {
    datetime.format(DATE_FORMAT).to_string()
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::Text(date_text(datetime)),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{COL_DELEGATION, COL_STATUS};

    fn sample() -> Table {
        let mut table = Table::new(vec![
            COL_DELEGATION.to_string(),
            COL_STATUS.to_string(),
            "Cantidad".to_string(),
            "Activo".to_string(),
        ]);
        table.push_row(vec![
            CellValue::text("PUNO"),
            CellValue::text("Nuevo"),
            CellValue::Number(3.0),
            CellValue::Bool(true),
        ]);
        table.push_row(vec![
            CellValue::text("TACNA"),
            CellValue::Empty,
            CellValue::Number(1.5),
            CellValue::Bool(false),
        ]);
        table
    }

    #[test]
    fn test_write_then_read_preserves_cells() {
        let table = sample();
        let bytes = write_table(&table).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let parsed = read_table(bytes).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_unnamed_columns_dropped() {
        let mut table = Table::new(vec![
            "Unnamed: 0".to_string(),
            COL_DELEGATION.to_string(),
        ]);
        table.push_row(vec![CellValue::Number(0.0), CellValue::text("PUNO")]);

        let parsed = read_table(write_table(&table).unwrap()).unwrap();
        assert_eq!(parsed.columns(), &[COL_DELEGATION.to_string()]);
        assert!(parsed.rows()[0][0].is_text("PUNO"));
    }

    #[test]
    fn test_duplicate_headers_disambiguated() {
        let header = vec![
            Data::String("Serie".into()),
            Data::Empty,
            Data::String("Serie".into()),
        ];
        let kept = header_columns(&header);
        assert_eq!(kept, vec![(0, "Serie".to_string()), (2, "Serie.1".to_string())]);
    }

    #[test]
    fn test_date_cells_read_as_text() {
        let datetime = chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .unwrap();
        assert_eq!(date_text(datetime), "2024-03-05 14:30:00");
    }

    #[test]
    fn test_garbage_is_a_spreadsheet_error() {
        let err = read_table(b"this is not a workbook".to_vec()).unwrap_err();
        assert!(matches!(err, InventoryError::Spreadsheet(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_read_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table_from_path(&dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, InventoryError::Io { .. }));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let mut table = Table::new(vec![COL_DELEGATION.to_string(), COL_STATUS.to_string()]);
        table.push_row(vec![CellValue::text("PUNO"), CellValue::Empty]);
        table.push_row(vec![CellValue::Empty, CellValue::Empty]);
        table.push_row(vec![CellValue::text("TACNA"), CellValue::text("Nuevo")]);

        let parsed = read_table(write_table(&table).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
    }
}
