//! Row-to-record materialization.

use crate::coerce::coerce_value;
use crate::error::RowImportError;
use crate::schema::{FieldDescriptor, FIRST_DATA_ROW};
use crate::target::RecordType;
use crate::value::Value;
use indexmap::IndexMap;
use rowcast_sheet::{CellValue, Sheet};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// One imported row: field name to typed value, in record-type order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// A record with every field of `record_type` at its default.
    #[must_use]
    pub fn new(record_type: &RecordType) -> Self {
        Self {
            fields: record_type
                .fields
                .iter()
                .map(|field| (field.name.clone(), field.ty.default_value()))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Deserialize the record into a user type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.to_json())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Materializes the data rows of one sheet into records.
///
/// Data starts at row 3. Absent rows are skipped, rows whose first cell is
/// `#`-prefixed text are skipped, and the first row with a missing or blank
/// first cell ends the table.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder<'a> {
    sheet: &'a Sheet,
    schema: &'a [FieldDescriptor],
    record_type: &'a RecordType,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(
        sheet: &'a Sheet,
        schema: &'a [FieldDescriptor],
        record_type: &'a RecordType,
    ) -> Self {
        Self {
            sheet,
            schema,
            record_type,
        }
    }

    /// Iterate the surviving rows, one result per row.
    ///
    /// A failing row does not stop the iteration; callers decide whether to
    /// abort or collect.
    #[must_use]
    pub fn rows(&self) -> Rows<'a> {
        Rows {
            builder: *self,
            next: FIRST_DATA_ROW,
            last: self.sheet.last_row_index(),
            done: false,
        }
    }

    /// Build every record, stopping at the first failing row.
    pub fn build(&self) -> Result<Vec<Record>, RowImportError> {
        self.rows().collect()
    }

    fn build_row(&self, row_index: usize, cells: &[CellValue]) -> Result<Record, RowImportError> {
        let mut record = Record::new(self.record_type);

        // descriptor i reads cell i, whatever column it was declared in
        for (column, descriptor) in self.schema.iter().enumerate() {
            let Some(field) = self.record_type.get(&descriptor.name) else {
                continue;
            };
            if !field.accessible {
                continue;
            }
            let Some(cell) = cells.get(column).filter(|c| !c.is_blank()) else {
                continue;
            };

            let value = coerce_value(cell, &field.ty).map_err(|cause| RowImportError {
                row_index,
                column_index: column,
                sheet_name: self.sheet.name().to_string(),
                field: field.name.clone(),
                cause,
            })?;
            record.set(&field.name, value);
        }

        Ok(record)
    }
}

/// Iterator over the records of a sheet; see [`RecordBuilder::rows`].
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    builder: RecordBuilder<'a>,
    next: usize,
    last: Option<usize>,
    done: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<Record, RowImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let last = self.last?;
        while !self.done && self.next <= last {
            let row_index = self.next;
            self.next += 1;

            let Some(cells) = self.builder.sheet.row(row_index) else {
                continue;
            };
            let Some(first) = cells.first().filter(|c| !c.is_blank()) else {
                tracing::trace!(row = row_index, "blank first cell ends the table");
                self.done = true;
                break;
            };
            if first.is_comment_marker() {
                tracing::trace!(row = row_index, "skipping disabled row");
                continue;
            }

            return Some(self.builder.build_row(row_index, cells));
        }
        None
    }
}

/// Build the records of one sheet, stopping at the first failing row.
pub fn build_records(
    sheet: &Sheet,
    schema: &[FieldDescriptor],
    record_type: &RecordType,
) -> Result<Vec<Record>, RowImportError> {
    RecordBuilder::new(sheet, schema, record_type).build()
}
