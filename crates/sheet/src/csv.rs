use crate::book::Book;
use crate::cell::CellValue;
use crate::error::Result;
use crate::sheet::Sheet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// CSV reader options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Whether to infer booleans and numbers; otherwise every non-empty
    /// field is text
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
            infer_types: true,
        }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

impl Sheet {
    /// Load a sheet from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Load a sheet from a CSV file with custom options
    pub fn from_csv_with_options<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Self::from_csv_reader(reader, options)
    }

    /// Load a sheet from a CSV string
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes(), CsvOptions::default())
    }

    /// Load a sheet from a reader
    ///
    /// Empty lines and rows made only of empty fields become absent rows.
    pub fn from_csv_reader<R: Read>(mut reader: R, options: CsvOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false) // header rows are data to the schema extractor
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut sheet = Sheet::with_name("Sheet1");
        let data = sheet.data_mut();

        // blank lines are dropped by the reader; keep them as absent rows
        for result in csv_reader.records() {
            let record = result?;
            if let Some(position) = record.position() {
                for _ in 0..blank_lines_at(&bytes, position.byte()) {
                    data.push(Vec::new());
                }
            }
            let row: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if options.infer_types {
                        CellValue::parse(field)
                    } else if field.is_empty() {
                        CellValue::Blank
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect();
            data.push(row);
        }

        sheet.trim_trailing_blanks();
        Ok(sheet)
    }
}

/// Count the empty lines starting at `offset`, where the reader positions a
/// record before skipping the blank lines that precede it.
fn blank_lines_at(bytes: &[u8], offset: u64) -> usize {
    let start = usize::try_from(offset).map_or(bytes.len(), |o| o.min(bytes.len()));
    let mut rest = &bytes[start..];
    // the `\n` of a CRLF split from the previous record's `\r`
    if start > 0 && bytes[start - 1] == b'\r' {
        rest = rest.strip_prefix(b"\n").unwrap_or(rest);
    }

    let mut count = 0;
    let mut iter = rest.iter().peekable();
    while let Some(&b) = iter.next() {
        match b {
            b'\r' => {
                iter.next_if_eq(&&b'\n');
                count += 1;
            }
            b'\n' => count += 1,
            _ => break,
        }
    }
    count
}

impl Book {
    /// Load a single-sheet book from a CSV file
    ///
    /// Both the book and its sheet are named after the file stem.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Load a single-sheet book from a CSV file with custom options
    pub fn from_csv_with_options<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1")
            .to_string();

        let sheet = Sheet::from_csv_with_options(path, options)?;
        let mut book = Book::with_name(&name);
        book.add_sheet(&name, sheet)?;
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_inference() {
        let sheet = Sheet::from_csv_str("id,name,ok\nint,string,bool\n,,\n1,Sword,true\n").unwrap();

        assert_eq!(sheet.cell(0, 0), Some(&CellValue::text("id")));
        assert!(sheet.row(2).is_none());
        assert_eq!(sheet.cell(3, 0), Some(&CellValue::Number(1.0)));
        assert_eq!(sheet.cell(3, 2), Some(&CellValue::Boolean(true)));
    }

    #[test]
    fn test_csv_without_inference() {
        let options = CsvOptions::default().with_type_inference(false);
        let sheet = Sheet::from_csv_reader("1,,x\n".as_bytes(), options).unwrap();

        assert_eq!(sheet.cell(0, 0), Some(&CellValue::text("1")));
        assert_eq!(sheet.cell(0, 1), Some(&CellValue::Blank));
    }

    #[test]
    fn test_csv_blank_lines_keep_row_positions() {
        let sheet = Sheet::from_csv_str("id,note\n\n1,\"two\nlines\"\n\n2,x\n").unwrap();

        assert_eq!(sheet.cell(0, 0), Some(&CellValue::text("id")));
        assert!(sheet.row(1).is_none());
        assert_eq!(sheet.cell(2, 0), Some(&CellValue::Number(1.0)));
        assert_eq!(sheet.cell(2, 1), Some(&CellValue::text("two\nlines")));
        assert!(sheet.row(3).is_none());
        assert_eq!(sheet.cell(4, 0), Some(&CellValue::Number(2.0)));
        assert_eq!(sheet.row_count(), 5);
    }

    #[test]
    fn test_csv_empty_comment_line_before_data() {
        let sheet = Sheet::from_csv_str("id,name\nint,string\n\n1,Axe\n#2,Old\n3,Bow\n").unwrap();

        assert!(sheet.row(2).is_none());
        assert_eq!(sheet.cell(3, 0), Some(&CellValue::Number(1.0)));
        assert_eq!(sheet.cell(3, 1), Some(&CellValue::text("Axe")));
        assert_eq!(sheet.cell(4, 0), Some(&CellValue::text("#2")));
        assert_eq!(sheet.cell(5, 1), Some(&CellValue::text("Bow")));
    }

    #[test]
    fn test_csv_crlf_blank_lines() {
        let sheet = Sheet::from_csv_str("id\r\nint\r\n\r\n\r\n7\r\n").unwrap();

        assert_eq!(sheet.cell(1, 0), Some(&CellValue::text("int")));
        assert!(sheet.row(2).is_none());
        assert!(sheet.row(3).is_none());
        assert_eq!(sheet.cell(4, 0), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn test_blank_lines_at() {
        assert_eq!(blank_lines_at(b"a\n\n\nb", 2), 2);
        assert_eq!(blank_lines_at(b"a\nb", 2), 0);
        assert_eq!(blank_lines_at(b"a\r\n\r\nb", 2), 1);
        assert_eq!(blank_lines_at(b"a\r\n\r\nb", 3), 1);
        assert_eq!(blank_lines_at(b"\n\na", 0), 2);
        assert_eq!(blank_lines_at(b"a", 9), 0);
    }

    #[test]
    fn test_csv_ragged_rows() {
        let sheet = Sheet::from_csv_str("a,b,c\nd\n").unwrap();
        assert_eq!(sheet.row(1).map(<[CellValue]>::len), Some(1));
    }
}
