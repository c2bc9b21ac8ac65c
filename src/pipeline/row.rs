//! Format-neutral rows handed from the parsers to the normalizer.
//!
//! CSV, spreadsheet and PDF parsers all produce [`RawRow`]s: an ordered list
//! of `(column, value)` pairs. Column order is kept because it becomes the
//! subject order of the student record.

/// A loosely-typed cell as it came out of the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// The cell is missing or blank.
    Empty,
}

impl CellValue {
    /// Build a text cell; whitespace-only text becomes [`CellValue::Empty`].
    pub fn text(s: impl AsRef<str>) -> Self {
        let s = s.as_ref().trim();
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The value as display text, `""` when empty.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => crate::model::format_number(*n),
            CellValue::Empty => String::new(),
        }
    }
}

/// One data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row by pairing `header` with `values` positionally.
    ///
    /// Missing trailing values become [`CellValue::Empty`]; values beyond the
    /// header are dropped.
    pub fn from_positional(header: &[String], values: impl IntoIterator<Item = CellValue>) -> Self {
        let mut values = values.into_iter();
        let cells = header
            .iter()
            .map(|h| (h.clone(), values.next().unwrap_or(CellValue::Empty)))
            .collect();
        Self { cells }
    }

    pub fn push(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.push((column.into(), value));
    }

    /// First value stored under `column` (exact match).
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }
}
