//! Workbook loading through calamine (xlsx, xlsm, xlsb, xls, ods).

use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// File extensions the workbook reader understands.
pub const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Whether `path` has one of the workbook extensions (case-insensitive).
#[must_use]
pub fn is_excel_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            EXCEL_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Convert calamine Data to CellValue
///
/// Formula cells arrive here already resolved to their cached result.
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Blank,
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            tracing::warn!("Error cell value {e:?} read as blank");
            CellValue::Blank
        }
    }
}

/// Build a sheet from a calamine range, honouring its absolute position.
fn range_to_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let mut sheet = Sheet::with_name(name);
    let Some((start_row, start_col)) = range.start() else {
        return sheet;
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let data = sheet.data_mut();
    data.resize_with(start_row, Vec::new);
    for row in range.rows() {
        let mut cells = vec![CellValue::Blank; start_col];
        cells.extend(row.iter().map(data_to_cell_value));
        data.push(cells);
    }

    sheet.trim_trailing_blanks();
    sheet
}

impl Sheet {
    /// Load a specific sheet from a workbook file by name
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened, sheet not found, or read fails.
    pub fn from_excel_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Self> {
        let mut workbook = open_workbook_auto(path.as_ref())?;
        if !workbook.sheet_names().iter().any(|n| n == sheet_name) {
            return Err(SheetError::SheetNotFound {
                name: sheet_name.to_string(),
            });
        }
        let range = workbook.worksheet_range(sheet_name)?;
        Ok(range_to_sheet(sheet_name, &range))
    }
}

impl Book {
    /// Load a book from a workbook file (all sheets, in workbook order)
    ///
    /// The book is named after the file stem.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_excel<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !is_excel_path(path) {
            return Err(SheetError::UnsupportedFormat(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)?;
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let book_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Book1");
        let mut book = Book::with_name(book_name);

        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name)?;
            tracing::debug!(
                sheet = %sheet_name,
                rows = range.height(),
                cols = range.width(),
                "read worksheet"
            );
            book.add_sheet(&sheet_name, range_to_sheet(&sheet_name, &range))?;
        }

        Ok(book)
    }
}
