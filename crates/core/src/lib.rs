//! # rowcast-core
//!
//! Typed record import from spreadsheet sheets.
//!
//! A sheet describes its own schema in three header rows (field names,
//! declared types, comments). Every following row becomes one record whose
//! fields are coerced from raw cell values into their target types.
//!
//! This crate provides:
//! - Schema extraction from the header rows
//! - The coercion engine (scalar, enum, collection, constructor and JSON fallbacks)
//! - Record building with row skipping and termination rules
//! - A type registry resolving declared type names
//! - Asset definitions for whole-workbook imports
//!
//! ```
//! use rowcast_core::{build_records, schema_from_sheet, PrimitiveType, RecordType, Value};
//! use rowcast_sheet::Sheet;
//!
//! let sheet = Sheet::from_data(vec![
//!     vec!["id", "name", "#note"],
//!     vec!["int", "string", "string"],
//!     vec!["", "", ""],
//!     vec!["1", "Sword", "sharp"],
//! ]);
//! let record_type = RecordType::new("Item")
//!     .field("id", PrimitiveType::I32)
//!     .field("name", PrimitiveType::String);
//!
//! let schema = schema_from_sheet(&sheet).unwrap();
//! let records = build_records(&sheet, &schema, &record_type).unwrap();
//! assert_eq!(records[0].get("id"), Some(&Value::Int(1)));
//! ```

/// Whole-workbook import.
pub mod asset;
/// Asset lookup by workbook path.
pub mod catalog;
/// The coercion chain.
pub mod coerce;
/// Error types and result aliases.
pub mod error;
/// Record building.
pub mod record;
/// Declared type resolution.
pub mod registry;
/// Header row schema extraction.
pub mod schema;
/// JSON fallback parsing.
pub mod structured;
/// Target type descriptions.
pub mod target;
/// Typed values.
pub mod value;

/// Re-export asset import entry points.
pub use asset::{
    import_book, import_book_collecting, import_sheet, import_typed, AssetDefinition,
    ImportRecord, ImportResult, RecordSource, SheetBinding, SheetRecords,
};
/// Re-export the asset catalog.
pub use catalog::{is_importable_path, AssetCatalog};
/// Re-export the coercion functions.
pub use coerce::{coerce_value, convert_direct};
/// Re-export core error types.
pub use error::{
    CoerceError, ConversionError, ConversionKind, ImportError, Result, RowImportError, TypeError,
};
/// Re-export record building.
pub use record::{build_records, Record, RecordBuilder};
/// Re-export the type registry.
pub use registry::TypeRegistry;
/// Re-export schema extraction.
pub use schema::{
    extract_schema, schema_from_sheet, FieldDescriptor, COMMENT_ROW, FIRST_DATA_ROW, HEADER_ROW,
    TYPE_ROW,
};
/// Re-export target types.
pub use target::{
    ConstructError, Constructor, CustomShape, CustomType, EnumType, FieldDef, PrimitiveType,
    RecordType, TargetType,
};
/// Re-export the typed value.
pub use value::Value;
