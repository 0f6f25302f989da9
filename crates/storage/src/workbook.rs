use std::collections::BTreeMap;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use chrono::NaiveDateTime;
use thiserror::Error;

//
// ─── CELL VALUES ───────────────────────────────────────────────────────────────
//

/// Value of a single workbook cell, reduced to the shapes the parser
/// understands. Everything else (booleans, error cells) reads as
/// `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl CellValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

//
// ─── SHEET ─────────────────────────────────────────────────────────────────────
//

/// Sparse cell grid for one sheet, addressed 1-based by (column, row)
/// like the source workbook.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl Sheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: u32, row: u32, value: CellValue) {
        self.cells.insert((column, row), value);
    }

    /// Cell value at the given position; absent cells read as `Empty`.
    #[must_use]
    pub fn cell(&self, column: u32, row: u32) -> &CellValue {
        self.cells.get(&(column, row)).unwrap_or(&EMPTY_CELL)
    }
}

//
// ─── WORKBOOK ──────────────────────────────────────────────────────────────────
//

/// An in-memory workbook: named sheets of cells.
///
/// Built either directly (tests, fixtures) or by loading the cached
/// cell values of an `.xlsx` file.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: BTreeMap<String, Sheet>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkbookError {
    #[error("failed to read workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
}

impl Workbook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_sheet(&mut self, name: impl Into<String>, sheet: Sheet) {
        self.sheets.insert(name.into(), sheet);
    }

    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    /// Load an `.xlsx` workbook, keeping cached cell values only
    /// (formulas are read through their stored results).
    ///
    /// # Errors
    ///
    /// Returns `WorkbookError::Xlsx` if the file cannot be opened or a
    /// sheet cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let mut xlsx: Xlsx<_> = open_workbook(path)?;
        let names = xlsx.sheet_names().to_owned();

        let mut workbook = Self::new();
        for name in names {
            let range = xlsx.worksheet_range(&name)?;
            let (start_row, start_column) = range.start().unwrap_or((0, 0));

            let mut sheet = Sheet::new();
            for (row_idx, row) in range.rows().enumerate() {
                for (column_idx, data) in row.iter().enumerate() {
                    let value = convert_cell(data);
                    if value != CellValue::Empty {
                        let column = start_column + u32::try_from(column_idx).unwrap_or(u32::MAX) + 1;
                        let row_number = start_row + u32::try_from(row_idx).unwrap_or(u32::MAX) + 1;
                        sheet.set(column, row_number, value);
                    }
                }
            }
            workbook.insert_sheet(name, sheet);
        }
        Ok(workbook)
    }
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::String(value) => CellValue::Text(value.clone()),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::DateTime(value) => value
            .as_datetime()
            .map_or(CellValue::Empty, CellValue::DateTime),
        Data::DateTimeIso(value) => value
            .parse::<NaiveDateTime>()
            .map_or(CellValue::Empty, CellValue::DateTime),
        Data::Empty | Data::Bool(_) | Data::Error(_) | Data::DurationIso(_) => CellValue::Empty,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_cells_read_as_empty() {
        let sheet = Sheet::new();
        assert_eq!(*sheet.cell(2, 4), CellValue::Empty);
    }

    #[test]
    fn set_then_read_round_trips() {
        let mut sheet = Sheet::new();
        sheet.set(2, 4, CellValue::text("Q"));
        sheet.set(4, 5, CellValue::Number(42.0));
        assert_eq!(sheet.cell(2, 4).as_text(), Some("Q"));
        assert_eq!(*sheet.cell(4, 5), CellValue::Number(42.0));
        assert_eq!(sheet.cell(4, 5).as_text(), None);
    }

    #[test]
    fn workbook_finds_sheets_by_name() {
        let mut workbook = Workbook::new();
        workbook.insert_sheet("自然科学", Sheet::new());
        assert!(workbook.sheet("自然科学").is_some());
        assert!(workbook.sheet("文学＆歴史").is_none());
    }
}
