//! In-memory table model
//!
//! A [`Table`] is a header row plus data rows of [`CellValue`]s, one value per
//! column. Columns are whatever the source workbook declared; unknown columns
//! are carried through untouched so a download reproduces them.

use std::fmt;

/// Delegation column, the partition key of the dataset
pub const COL_DELEGATION: &str = "Delegación";
/// Location column
pub const COL_LOCATION: &str = "Ubicación";
/// Status column
pub const COL_STATUS: &str = "Estado";
/// Shipping destination column
pub const COL_DESTINATION: &str = "Destino Expedición";

/// A single cell value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    /// Blank cell
    #[default]
    Empty,
    /// Text cell
    Text(String),
    /// Numeric cell
    Number(f64),
    /// Boolean cell
    Bool(bool),
}

impl CellValue {
    /// Create a text cell
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Whether the cell holds nothing (blank or empty text)
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Borrow the text if this is a text cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this cell is exactly the given text
    pub fn is_text(&self, expected: &str) -> bool {
        self.as_str() == Some(expected)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            // Whole numbers render like integers: 12, not 12.0
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Rows keyed by a shared header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals, mostly for tests and fixtures
    pub fn from_text_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(
                row.iter()
                    .map(|v| {
                        if v.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::text(*v)
                        }
                    })
                    .collect(),
            );
        }
        table
    }

    /// Append a row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate the values of one column; `None` if the column is absent
    pub fn column_values<'a>(
        &'a self,
        name: &str,
    ) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Keep only rows matching the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&[CellValue]) -> bool) {
        self.rows.retain(|row| keep(row));
    }

    /// Copy of the table holding only rows matching the predicate
    pub fn filtered(&self, mut keep: impl FnMut(&[CellValue]) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Mutable access to rows, for in-place normalization
    pub fn rows_mut(&mut self) -> &mut [Vec<CellValue>] {
        &mut self.rows
    }

    /// Narrow to rows whose delegation equals `delegation`.
    ///
    /// `None` or an empty string means no narrowing.
    pub fn for_delegation(&self, delegation: Option<&str>) -> Table {
        match (delegation.filter(|d| !d.is_empty()), self.column_index(COL_DELEGATION)) {
            (None, _) => self.clone(),
            (Some(name), Some(idx)) => self.filtered(|row| row[idx].is_text(name)),
            (Some(_), None) => Table::new(self.columns.clone()),
        }
    }
}
