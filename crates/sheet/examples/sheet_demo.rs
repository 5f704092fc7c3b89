//! Print every sheet of a workbook with typed cells.
//!
//! Run with: cargo run --example sheet_demo -p rowcast-sheet -- Items.xlsx

use rowcast_sheet::{a1_notation, Book, CellValue};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: sheet_demo <workbook>");
        return Ok(());
    };

    let book = if path.ends_with(".csv") {
        Book::from_csv(&path)?
    } else {
        Book::from_excel(&path)?
    };

    println!("=== {} ({} sheets) ===", book.name(), book.sheet_count());
    for (name, sheet) in book.sheets() {
        println!("\n--- {name} ---");
        for (row_idx, row) in sheet.rows().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if cell.is_blank() {
                    continue;
                }
                let kind = match cell {
                    CellValue::Text(_) => "text",
                    CellValue::Boolean(_) => "bool",
                    CellValue::Number(_) => "number",
                    CellValue::Blank => "blank",
                };
                println!(
                    "{:>6} {kind:<6} {cell}",
                    a1_notation::cell_address(row_idx, col_idx)
                );
            }
        }
    }

    Ok(())
}
