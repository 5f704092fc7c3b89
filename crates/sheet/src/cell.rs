use serde::{Deserialize, Serialize};
use std::fmt;

/// The runtime kind of a non-blank cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Text,
    Boolean,
    Number,
    Blank,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Text => "text",
            CellKind::Boolean => "boolean",
            CellKind::Number => "number",
            CellKind::Blank => "blank",
        };
        f.write_str(name)
    }
}

/// Represents the raw value of one spreadsheet cell.
///
/// Formula cells never appear here: readers resolve them to their cached
/// result before building a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Blank,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Create a text cell.
    #[must_use]
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// The runtime kind of this value.
    #[must_use]
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Blank => CellKind::Blank,
            CellValue::Boolean(_) => CellKind::Boolean,
            CellValue::Number(_) => CellKind::Number,
            CellValue::Text(_) => CellKind::Text,
        }
    }

    /// Check if the cell holds no value
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Borrow the text of a text cell
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as a number
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether this is a text cell whose content starts with `#`.
    ///
    /// Such cells mark annotation columns and disabled rows.
    #[must_use]
    pub fn is_comment_marker(&self) -> bool {
        self.as_text().is_some_and(|s| s.starts_with('#'))
    }

    /// Render the value as text.
    ///
    /// Integral numbers render without a fraction (`3`, not `3.0`), booleans
    /// as `true`/`false`, and blank cells as the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Parse a string into a `CellValue` with type inference
    /// Tries: blank -> bool -> number -> text
    #[must_use]
    pub fn parse(s: &str) -> CellValue {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Blank;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        // "inf"/"nan" parse as f64 but are text in a spreadsheet
        if trimmed.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<f64>() {
                return CellValue::Number(n);
            }
        }

        CellValue::Text(s.to_string())
    }
}

/// Format a number the way a spreadsheet displays it in a text context.
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Blank
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Number(i as f64)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Number(f64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Number(f)
    }
}

impl From<f32> for CellValue {
    fn from(f: f32) -> Self {
        CellValue::Number(f64::from(f))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Blank,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::approx_constant)]
    use super::*;

    #[test]
    fn test_parse_blank() {
        assert_eq!(CellValue::parse(""), CellValue::Blank);
        assert_eq!(CellValue::parse("  "), CellValue::Blank);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(CellValue::parse("true"), CellValue::Boolean(true));
        assert_eq!(CellValue::parse("FALSE"), CellValue::Boolean(false));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(CellValue::parse("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::parse("-2.5"), CellValue::Number(-2.5));
    }

    #[test]
    fn test_parse_keeps_text_untrimmed() {
        assert_eq!(CellValue::parse(" hi "), CellValue::text(" hi "));
        assert_eq!(CellValue::parse("nan"), CellValue::text("nan"));
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Number(3.0).to_text(), "3");
        assert_eq!(CellValue::Number(3.25).to_text(), "3.25");
        assert_eq!(CellValue::Number(-0.0).to_text(), "0");
        assert_eq!(CellValue::Boolean(true).to_text(), "true");
        assert_eq!(CellValue::Blank.to_text(), "");
    }

    #[test]
    fn test_comment_marker() {
        assert!(CellValue::text("#note").is_comment_marker());
        assert!(!CellValue::text("note").is_comment_marker());
        assert!(!CellValue::Number(1.0).is_comment_marker());
    }
}
