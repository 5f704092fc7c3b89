//! Sheet/Book model for rowcast
//!
//! A read-only view over already-loaded spreadsheet data: books of named
//! sheets, sheets of rows, rows of [`CellValue`]s. Workbook files are read
//! through calamine (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) and CSV files
//! through the `csv` crate. Formula cells are resolved to their cached result
//! while loading, so consumers only ever see text, booleans, numbers and
//! blanks.
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use rowcast_sheet::{CellValue, Sheet};
//!
//! let sheet = Sheet::from_data(vec![
//!     vec!["id", "name"],
//!     vec!["int", "string"],
//! ]);
//!
//! assert_eq!(sheet.row_count(), 2);
//! assert_eq!(sheet.cell(1, 0), Some(&CellValue::text("int")));
//! assert!(sheet.cell(1, 5).is_none());
//! ```
//!
//! ## Loading a workbook
//!
//! ```no_run
//! use rowcast_sheet::Book;
//!
//! let book = Book::from_excel("Items.xlsx").unwrap();
//! for (name, sheet) in book.sheets() {
//!     println!("{name}: {} rows", sheet.row_count());
//! }
//! ```

pub mod a1_notation;
mod book;
mod cell;
mod csv;
mod error;
mod excel;
mod sheet;

/// Re-export book type.
pub use book::Book;
/// Re-export cell value types.
pub use cell::{CellKind, CellValue};
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export workbook path helpers.
pub use excel::{is_excel_path, EXCEL_EXTENSIONS};
/// Re-export sheet type.
pub use sheet::Sheet;
