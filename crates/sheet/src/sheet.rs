use crate::cell::CellValue;

/// A sheet representing a 2D grid of cells (row-major storage)
///
/// Rows may be ragged. An empty row vector stands for an *absent* row, one
/// that holds no cells at all; a column index past the end of a row is a
/// *missing* cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Sheet {
            name: "Sheet1".to_string(),
            data: converted,
        }
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows, absent rows included
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Index of the last row that holds at least one cell
    #[must_use]
    pub fn last_row_index(&self) -> Option<usize> {
        self.data.iter().rposition(|row| !row.is_empty())
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_row_index().is_none()
    }

    /// Get a row by index, or `None` if the row is absent
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.data
            .get(index)
            .filter(|row| !row.is_empty())
            .map(Vec::as_slice)
    }

    /// Get a cell, or `None` if the cell is missing
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.data.get(row).and_then(|r| r.get(col))
    }

    /// Set a cell value, growing the grid as needed
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) {
        if self.data.len() <= row {
            self.data.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.data[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Blank);
        }
        cells[col] = value.into();
    }

    /// Append a row; an empty vector appends an absent row
    pub fn row_append<T: Into<CellValue>>(&mut self, data: Vec<T>) {
        self.data.push(data.into_iter().map(Into::into).collect());
    }

    /// Iterate over all rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get the raw data
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable access to raw data
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }

    /// Drop trailing blank cells from every row.
    ///
    /// A row made only of blank cells becomes absent.
    pub fn trim_trailing_blanks(&mut self) {
        for row in &mut self.data {
            let keep = row.iter().rposition(|c| !c.is_blank()).map_or(0, |i| i + 1);
            row.truncate(keep);
        }
        let keep = self.last_row_index().map_or(0, |i| i + 1);
        self.data.truncate(keep);
    }
}
