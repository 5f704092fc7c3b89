//! Asset definitions and whole-workbook import.
//!
//! An asset binds the sheets of one workbook to record types. Importing an
//! asset runs schema extraction and record building for every bound sheet
//! and collects the results per sheet.

use crate::error::{ImportError, Result, RowImportError};
use crate::record::{Record, RecordBuilder};
use crate::registry::TypeRegistry;
use crate::schema::schema_from_sheet;
use crate::target::RecordType;
use rowcast_sheet::{Book, Sheet};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;

/// Where the record type of a bound sheet comes from.
#[derive(Debug, Clone)]
pub enum RecordSource {
    /// A record type supplied by the caller.
    Explicit(RecordType),
    /// A record type built from the sheet's own type row.
    Inferred,
}

/// One sheet of an asset and the record type its rows become.
#[derive(Debug, Clone)]
pub struct SheetBinding {
    pub sheet_name: String,
    pub record: RecordSource,
}

impl SheetBinding {
    pub fn new(sheet_name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            record: RecordSource::Explicit(record_type),
        }
    }

    pub fn inferred(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            record: RecordSource::Inferred,
        }
    }
}

/// A workbook-to-records import definition.
#[derive(Debug, Clone, Default)]
pub struct AssetDefinition {
    pub name: String,
    /// Workbook file stem; defaults to `name`.
    pub excel_name: Option<String>,
    /// Output directory for the imported data.
    pub output: Option<PathBuf>,
    /// Emit an info event after each import of this asset.
    pub log_on_import: bool,
    pub sheets: Vec<SheetBinding>,
}

impl AssetDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// An asset importing every sheet of `book` with inferred record types.
    #[must_use]
    pub fn for_book(book: &Book) -> Self {
        let mut asset = Self::new(book.name());
        asset.sheets = book
            .sheet_names()
            .into_iter()
            .map(SheetBinding::inferred)
            .collect();
        asset
    }

    #[must_use]
    pub fn with_excel_name(mut self, excel_name: impl Into<String>) -> Self {
        self.excel_name = Some(excel_name.into());
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    #[must_use]
    pub fn with_log_on_import(mut self, log_on_import: bool) -> Self {
        self.log_on_import = log_on_import;
        self
    }

    /// Bind a sheet to an explicit record type.
    #[must_use]
    pub fn bind(mut self, sheet_name: impl Into<String>, record_type: RecordType) -> Self {
        self.sheets.push(SheetBinding::new(sheet_name, record_type));
        self
    }

    /// Bind a sheet whose record type comes from its type row.
    #[must_use]
    pub fn bind_inferred(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheets.push(SheetBinding::inferred(sheet_name));
        self
    }

    /// The workbook file stem this asset is imported from.
    #[must_use]
    pub fn excel_name(&self) -> &str {
        self.excel_name.as_deref().unwrap_or(&self.name)
    }
}

/// The records imported from one sheet.
#[derive(Debug, Clone)]
pub struct SheetRecords {
    pub sheet_name: String,
    pub record_type: String,
    pub records: Vec<Record>,
}

/// The outcome of importing one asset.
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub asset: String,
    pub sheets: Vec<SheetRecords>,
    /// Row failures, only populated by [`import_book_collecting`].
    pub errors: Vec<RowImportError>,
}

impl ImportResult {
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&SheetRecords> {
        self.sheets.iter().find(|s| s.sheet_name == name)
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.sheets.iter().map(|s| s.records.len()).sum()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Sheet name to array of record objects.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let sheets: Map<String, JsonValue> = self
            .sheets
            .iter()
            .map(|s| {
                let records = s.records.iter().map(Record::to_json).collect();
                (s.sheet_name.clone(), JsonValue::Array(records))
            })
            .collect();
        JsonValue::Object(sheets)
    }
}

/// Import every bound sheet of `book`, stopping at the first failing row.
///
/// Bound sheets missing from the book are skipped; sheets lacking a header
/// or type row are skipped with a warning.
pub fn import_book(
    book: &Book,
    asset: &AssetDefinition,
    registry: &TypeRegistry,
) -> Result<ImportResult> {
    import(book, asset, registry, false)
}

/// Like [`import_book`], but failing rows are collected into
/// [`ImportResult::errors`] and the import carries on.
pub fn import_book_collecting(
    book: &Book,
    asset: &AssetDefinition,
    registry: &TypeRegistry,
) -> Result<ImportResult> {
    import(book, asset, registry, true)
}

fn import(
    book: &Book,
    asset: &AssetDefinition,
    registry: &TypeRegistry,
    collect: bool,
) -> Result<ImportResult> {
    let mut result = ImportResult {
        asset: asset.name.clone(),
        ..ImportResult::default()
    };

    for binding in &asset.sheets {
        let Some(sheet) = book.sheet(&binding.sheet_name) else {
            tracing::debug!(
                asset = %asset.name,
                sheet = %binding.sheet_name,
                "sheet not in workbook"
            );
            continue;
        };

        let errors = collect.then_some(&mut result.errors);
        match import_sheet(sheet, &binding.record, registry, errors) {
            Ok(records) => result.sheets.push(records),
            Err(ImportError::SchemaMissing { sheet }) => {
                tracing::warn!(asset = %asset.name, sheet = %sheet, "sheet has no schema, skipped");
            }
            Err(err) => return Err(err),
        }
    }

    if asset.log_on_import {
        tracing::info!(
            asset = %asset.name,
            sheets = result.sheets.len(),
            records = result.record_count(),
            "imported {} sheets",
            result.sheets.len()
        );
    }
    Ok(result)
}

/// Import one sheet.
///
/// With `errors` present, failing rows are pushed there instead of ending
/// the import.
pub fn import_sheet(
    sheet: &Sheet,
    source: &RecordSource,
    registry: &TypeRegistry,
    mut errors: Option<&mut Vec<RowImportError>>,
) -> Result<SheetRecords> {
    let schema = schema_from_sheet(sheet).ok_or_else(|| ImportError::SchemaMissing {
        sheet: sheet.name().to_string(),
    })?;

    let inferred;
    let record_type = match source {
        RecordSource::Explicit(record_type) => record_type,
        RecordSource::Inferred => {
            inferred = RecordType::from_schema(sheet.name(), &schema, registry)?;
            &inferred
        }
    };

    let mut records = Vec::new();
    for row in RecordBuilder::new(sheet, &schema, record_type).rows() {
        match (row, errors.as_deref_mut()) {
            (Ok(record), _) => records.push(record),
            (Err(err), Some(errors)) => errors.push(err),
            (Err(err), None) => return Err(err.into()),
        }
    }

    tracing::debug!(sheet = sheet.name(), records = records.len(), "imported sheet");
    Ok(SheetRecords {
        sheet_name: sheet.name().to_string(),
        record_type: record_type.name.clone(),
        records,
    })
}

/// A Rust type rows can be imported into directly.
///
/// The record type describes the columns; the built records are then
/// deserialized with serde.
pub trait ImportRecord: DeserializeOwned {
    fn record_type() -> RecordType;
}

/// Import a sheet straight into typed values.
pub fn import_typed<T: ImportRecord>(sheet: &Sheet) -> Result<Vec<T>> {
    let schema = schema_from_sheet(sheet).ok_or_else(|| ImportError::SchemaMissing {
        sheet: sheet.name().to_string(),
    })?;
    let record_type = T::record_type();

    RecordBuilder::new(sheet, &schema, &record_type)
        .rows()
        .enumerate()
        .map(|(index, row)| {
            row?.deserialize().map_err(|source| ImportError::Deserialize {
                sheet: sheet.name().to_string(),
                index,
                source,
            })
        })
        .collect()
}
