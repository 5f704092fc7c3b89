//! Error types for rowcast.

use rowcast_sheet::a1_notation::cell_address;
use rowcast_sheet::SheetError;
use std::fmt;
use thiserror::Error;

/// Result type for rowcast import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// The failure classes of a direct scalar conversion.
///
/// Only these kinds let the coercion chain fall back to a constructor or
/// to structured parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// The text is not in a recognizable format for the target.
    Format,
    /// The source can never be converted to the target type.
    InvalidCast,
    /// The source value is not acceptable for the target (e.g. NaN into an integer).
    Argument,
    /// The source value is outside the target's range.
    Overflow,
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionKind::Format => "format error",
            ConversionKind::InvalidCast => "invalid cast",
            ConversionKind::Argument => "argument error",
            ConversionKind::Overflow => "overflow",
        };
        f.write_str(name)
    }
}

/// A failed scalar conversion of one source value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert '{source_value}' to {target_type}: {kind}")]
pub struct ConversionError {
    pub source_value: String,
    pub target_type: String,
    pub kind: ConversionKind,
}

impl ConversionError {
    pub fn new(
        source_value: impl Into<String>,
        target_type: impl Into<String>,
        kind: ConversionKind,
    ) -> Self {
        Self {
            source_value: source_value.into(),
            target_type: target_type.into(),
            kind,
        }
    }
}

/// Errors raised while coercing one cell value into a target type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// Direct conversion failed and no fallback applied.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The text is not a member name of the enum.
    #[error("'{name}' is not a member of enum {enum_type}")]
    EnumParse { name: String, enum_type: String },

    /// Text could not be parsed into the required structured shape.
    #[error("cannot parse '{text}' as {target_type}: {message}")]
    StructuredParse {
        text: String,
        target_type: String,
        message: String,
        /// The direct conversion failure that led to structured parsing.
        #[source]
        cause: Option<ConversionError>,
        /// A constructor failure that preceded structured parsing.
        constructor_failure: Option<ConversionError>,
    },

    /// A registered constructor failed with a non-conversion error.
    #[error("constructor of {target_type} failed: {message}")]
    Constructor {
        target_type: String,
        message: String,
    },
}

impl CoerceError {
    pub(crate) fn structured(
        text: impl Into<String>,
        target_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::StructuredParse {
            text: text.into(),
            target_type: target_type.into(),
            message: message.into(),
            cause: None,
            constructor_failure: None,
        }
    }
}

/// A coercion failure located at one cell of one sheet.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct RowImportError {
    /// 0-based row index within the sheet
    pub row_index: usize,
    /// 0-based column index within the sheet
    pub column_index: usize,
    pub sheet_name: String,
    pub field: String,
    #[source]
    pub cause: CoerceError,
}

impl fmt::Display for RowImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid cell value at row {}, column {} ({}) of sheet '{}', field '{}': {}",
            self.row_index,
            self.column_index,
            cell_address(self.row_index, self.column_index),
            self.sheet_name,
            self.field,
            self.cause
        )
    }
}

/// A declared type token that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Unknown type: {0}")]
    Unknown(String),

    #[error("Malformed type '{token}': {message}")]
    Malformed { token: String, message: String },

    #[error("Type already registered: {0}")]
    Duplicate(String),
}

/// Errors that can occur while importing sheets.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The header or type row of a sheet is absent.
    #[error("Sheet '{sheet}' has no header or type row")]
    SchemaMissing { sheet: String },

    #[error(transparent)]
    Row(#[from] RowImportError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("Record type not found: {0}")]
    RecordTypeNotFound(String),

    #[error("Cannot deserialize record {index} of sheet '{sheet}': {source}")]
    Deserialize {
        sheet: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Sheet(#[from] SheetError),
}
