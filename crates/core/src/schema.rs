//! Schema extraction from a sheet's three header rows.
//!
//! Row 0 holds field names, row 1 declared type names and row 2 optional
//! comments. Scanning runs left to right:
//!
//! - a column whose name or type cell is text starting with `#` is an
//!   annotation column and is skipped;
//! - otherwise the first column whose name or type cell is missing or blank
//!   ends the schema.

use rowcast_sheet::{CellValue, Sheet};
use serde::Serialize;
use std::collections::HashSet;

/// Index of the header (field name) row.
pub const HEADER_ROW: usize = 0;
/// Index of the declared type row.
pub const TYPE_ROW: usize = 1;
/// Index of the optional comment row.
pub const COMMENT_ROW: usize = 2;
/// Index of the first data row.
pub const FIRST_DATA_ROW: usize = 3;

/// One schema field read from the header block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub declared_type: String,
    pub comment: String,
    /// Sheet column the header was declared in. Data rows are read by
    /// descriptor position, not by this column.
    pub column: usize,
}

/// Extract the ordered field list from the header, type and comment rows.
///
/// Returns `None` when the header row or the type row is absent.
pub fn extract_schema(
    header: Option<&[CellValue]>,
    types: Option<&[CellValue]>,
    comments: Option<&[CellValue]>,
) -> Option<Vec<FieldDescriptor>> {
    let (header, types) = (header?, types?);

    let mut fields = Vec::new();
    let mut seen = HashSet::new();

    for (column, name_cell) in header.iter().enumerate() {
        let type_cell = types.get(column);

        if name_cell.is_comment_marker() || type_cell.is_some_and(CellValue::is_comment_marker) {
            tracing::trace!(column, "skipping annotation column");
            continue;
        }

        let Some(type_cell) = type_cell.filter(|c| !c.is_blank()) else {
            break;
        };
        if name_cell.is_blank() {
            break;
        }

        let name = name_cell.to_text();
        if !seen.insert(name.clone()) {
            tracing::warn!(column, field = %name, "duplicate field name ignored");
            continue;
        }

        let comment = comments
            .and_then(|row| row.get(column))
            .map(CellValue::to_text)
            .unwrap_or_default();

        fields.push(FieldDescriptor {
            name,
            declared_type: type_cell.to_text(),
            comment,
            column,
        });
    }

    Some(fields)
}

/// Extract the schema from the first three rows of a sheet.
pub fn schema_from_sheet(sheet: &Sheet) -> Option<Vec<FieldDescriptor>> {
    let schema = extract_schema(
        sheet.row(HEADER_ROW),
        sheet.row(TYPE_ROW),
        sheet.row(COMMENT_ROW),
    );
    if let Some(fields) = &schema {
        tracing::debug!(sheet = sheet.name(), fields = fields.len(), "extracted schema");
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells
            .iter()
            .map(|s| {
                if s.is_empty() {
                    CellValue::Blank
                } else {
                    CellValue::text(*s)
                }
            })
            .collect()
    }

    fn names(fields: &[FieldDescriptor]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_trailing_annotation_column() {
        let header = row(&["id", "name", "#note"]);
        let types = row(&["int", "string", "string"]);

        let fields = extract_schema(Some(&header), Some(&types), None).unwrap();
        assert_eq!(
            fields,
            vec![
                FieldDescriptor {
                    name: "id".to_string(),
                    declared_type: "int".to_string(),
                    comment: String::new(),
                    column: 0,
                },
                FieldDescriptor {
                    name: "name".to_string(),
                    declared_type: "string".to_string(),
                    comment: String::new(),
                    column: 1,
                },
            ]
        );
    }

    #[test]
    fn test_annotation_in_type_row_keeps_column_positions() {
        let header = row(&["id", "memo", "price"]);
        let types = row(&["int", "#string", "float"]);

        let fields = extract_schema(Some(&header), Some(&types), None).unwrap();
        assert_eq!(names(&fields), vec!["id", "price"]);
        assert_eq!(fields[1].column, 2);
    }

    #[test]
    fn test_blank_column_terminates() {
        let header = row(&["id", "", "price"]);
        let types = row(&["int", "string", "float"]);

        let fields = extract_schema(Some(&header), Some(&types), None).unwrap();
        assert_eq!(names(&fields), vec!["id"]);
    }

    #[test]
    fn test_missing_type_cell_terminates() {
        let header = row(&["id", "name"]);
        let types = row(&["int"]);

        let fields = extract_schema(Some(&header), Some(&types), None).unwrap();
        assert_eq!(names(&fields), vec!["id"]);
    }

    #[test]
    fn test_missing_rows() {
        let header = row(&["id"]);
        assert!(extract_schema(Some(&header), None, None).is_none());
        assert!(extract_schema(None, Some(&header), None).is_none());
    }

    #[test]
    fn test_comments() {
        let header = row(&["id", "name"]);
        let types = row(&["int", "string"]);
        let comments = row(&["key"]);

        let fields = extract_schema(Some(&header), Some(&types), Some(&comments)).unwrap();
        assert_eq!(fields[0].comment, "key");
        assert_eq!(fields[1].comment, "");
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let header = row(&["id", "id", "name"]);
        let types = row(&["int", "string", "string"]);

        let fields = extract_schema(Some(&header), Some(&types), None).unwrap();
        assert_eq!(names(&fields), vec!["id", "name"]);
        assert_eq!(fields[0].declared_type, "int");
        assert_eq!(fields[1].column, 2);
    }

    #[test]
    fn test_non_text_header_is_rendered() {
        let header = vec![CellValue::Number(2024.0)];
        let types = row(&["int"]);

        let fields = extract_schema(Some(&header), Some(&types), None).unwrap();
        assert_eq!(fields[0].name, "2024");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let sheet = Sheet::from_data(vec![
            row(&["id", "#x", "name"]),
            row(&["int", "int", "string"]),
            row(&["", "", "display name"]),
        ]);

        let first = schema_from_sheet(&sheet).unwrap();
        let second = schema_from_sheet(&sheet).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[1].comment, "display name");
    }
}
