use rowcast_sheet::{Book, CellValue, CsvOptions, Sheet, SheetError};
use rust_xlsxwriter::{Formula, Workbook};
use std::path::Path;
use tempfile::tempdir;

fn write_items_workbook(path: &Path) {
    let mut workbook = Workbook::new();

    let item = workbook.add_worksheet();
    item.set_name("item").unwrap();
    item.write_string(0, 0, "id").unwrap();
    item.write_string(0, 1, "name").unwrap();
    item.write_string(0, 2, "price").unwrap();
    item.write_string(1, 0, "int").unwrap();
    item.write_string(1, 1, "string").unwrap();
    item.write_string(1, 2, "float").unwrap();
    item.write_number(3, 0, 1.0).unwrap();
    item.write_string(3, 1, "Sword").unwrap();
    item.write_number(3, 2, 12.5).unwrap();
    item.write_boolean(4, 0, true).unwrap();
    item.write_formula(4, 2, Formula::new("=C4*2").set_result("25"))
        .unwrap();

    let equip = workbook.add_worksheet();
    equip.set_name("equip").unwrap();
    equip.write_string(2, 3, "offset").unwrap();

    workbook.save(path).unwrap();
}

// ===== Workbook Loading Tests =====

#[test]
fn test_book_from_excel_preserves_sheet_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Items.xlsx");
    write_items_workbook(&path);

    let book = Book::from_excel(&path).unwrap();
    assert_eq!(book.name(), "Items");
    assert_eq!(book.sheet_names(), vec!["item", "equip"]);
}

#[test]
fn test_cells_are_typed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Items.xlsx");
    write_items_workbook(&path);

    let book = Book::from_excel(&path).unwrap();
    let item = book.get_sheet("item").unwrap();

    assert_eq!(item.cell(0, 0), Some(&CellValue::text("id")));
    assert_eq!(item.cell(3, 0), Some(&CellValue::Number(1.0)));
    assert_eq!(item.cell(3, 2), Some(&CellValue::Number(12.5)));
    assert_eq!(item.cell(4, 0), Some(&CellValue::Boolean(true)));
    // Row 2 (comments) was never written
    assert!(item.row(2).is_none());
}

#[test]
fn test_formula_cells_use_cached_result() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Items.xlsx");
    write_items_workbook(&path);

    let item = Sheet::from_excel_sheet(&path, "item").unwrap();
    let cached = item.cell(4, 2).unwrap();
    assert!(matches!(cached, CellValue::Number(_) | CellValue::Text(_)));
    assert_eq!(cached.to_text(), "25");
}

#[test]
fn test_sheet_not_starting_at_a1() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Items.xlsx");
    write_items_workbook(&path);

    let equip = Sheet::from_excel_sheet(&path, "equip").unwrap();
    assert_eq!(equip.cell(2, 3), Some(&CellValue::text("offset")));
    assert_eq!(equip.last_row_index(), Some(2));
}

#[test]
fn test_missing_sheet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Items.xlsx");
    write_items_workbook(&path);

    let result = Sheet::from_excel_sheet(&path, "nope");
    assert!(matches!(result, Err(SheetError::SheetNotFound { .. })));
}

#[test]
fn test_unsupported_extension() {
    let result = Book::from_excel("table.txt");
    assert!(matches!(result, Err(SheetError::UnsupportedFormat(_))));
}

// ===== CSV Tests =====

#[test]
fn test_book_from_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weapons.csv");
    std::fs::write(&path, "id,name\nint,string\n\n1,Axe\n").unwrap();

    let book = Book::from_csv(&path).unwrap();
    assert_eq!(book.sheet_names(), vec!["weapons"]);

    let sheet = book.get_sheet("weapons").unwrap();
    assert_eq!(sheet.cell(3, 1), Some(&CellValue::text("Axe")));
    assert!(sheet.row(2).is_none());
}

#[test]
fn test_csv_layout_with_empty_comment_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weapons.csv");
    std::fs::write(&path, "id,name\nint,string\n\n1,Axe\n#2,Old\n3,Bow\n").unwrap();

    let sheet = Sheet::from_csv(&path).unwrap();
    assert_eq!(sheet.cell(1, 1), Some(&CellValue::text("string")));
    assert!(sheet.row(2).is_none());
    assert_eq!(sheet.cell(3, 0), Some(&CellValue::Number(1.0)));
    assert_eq!(sheet.cell(3, 1), Some(&CellValue::text("Axe")));
    assert_eq!(sheet.cell(5, 0), Some(&CellValue::Number(3.0)));
    assert_eq!(sheet.last_row_index(), Some(5));
}

#[test]
fn test_tsv_layout_with_crlf_line_endings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weapons.tsv");
    std::fs::write(&path, "id\tname\r\nint\tstring\r\n\r\n1\tAxe\r\n").unwrap();

    let book = Book::from_csv_with_options(&path, CsvOptions::tsv()).unwrap();
    let sheet = book.get_sheet("weapons").unwrap();
    assert!(sheet.row(2).is_none());
    assert_eq!(sheet.cell(3, 0), Some(&CellValue::Number(1.0)));
    assert_eq!(sheet.cell(3, 1), Some(&CellValue::text("Axe")));
}
