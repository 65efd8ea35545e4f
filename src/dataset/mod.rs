//! Tabular dataset model.
//!
//! A [`Dataset`] is an ordered list of rows where row 0 is the header
//! (column names) and the remaining rows are the body. Cells are loosely
//! typed: a column may hold numbers in some rows and text in others, exactly
//! as the data arrived. Nothing at this layer coerces values; comparisons
//! that want numbers go through [`crate::duplicates::compare`].
//!
//! # Example
//!
//! ```
//! use dupecases::dataset::{Cell, Dataset};
//!
//! let data = Dataset::from_parts(
//!     vec!["ID".to_string(), "Name".to_string()],
//!     vec![
//!         vec![Cell::from(1.0), Cell::from("Ann")],
//!         vec![Cell::from(2.0), Cell::from("Bob")],
//!     ],
//! );
//!
//! assert_eq!(data.len(), 3);
//! assert_eq!(data.body_len(), 2);
//! assert_eq!(data.column_index("Name"), Some(1));
//! ```

pub mod io;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use io::{read_csv, read_csv_from, write_csv, write_csv_to};

/// Errors that can occur while loading or validating a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened or read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File that failed
        path: std::path::PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader or writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A body row does not have as many cells as the header.
    #[error("row {row} has {found} cells but the header has {expected}")]
    RaggedRow {
        /// 1-based body row number
        row: usize,
        /// Header width
        expected: usize,
        /// Width of the offending row
        found: usize,
    },

    /// The configured delimiter cannot be used by the CSV reader.
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
}

/// A single cell value.
///
/// Serialized untagged, so JSON numbers, strings and `null` map directly
/// onto `Number`, `Text` and `Empty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric value
    Number(f64),
    /// Free text
    Text(String),
    /// Missing value
    Empty,
}

impl Cell {
    /// Infer a cell from a raw text field.
    ///
    /// Empty fields become [`Cell::Empty`]. A field becomes [`Cell::Number`]
    /// only when the number prints back as exactly the same text, so
    /// `"02134"`, `"1.50"` or a 20-digit ID stay [`Cell::Text`] and keep
    /// both their key and their written form.
    #[must_use]
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            return Self::Empty;
        }
        match field.parse::<f64>() {
            Ok(n) if n.is_finite() && format_number(n) == field => Self::Number(n),
            _ => Self::Text(field.to_string()),
        }
    }

    /// Whether the cell reads as a number, stored as one or not.
    #[must_use]
    pub fn is_numeric_like(&self) -> bool {
        match self {
            Self::Number(_) => true,
            Self::Text(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
            Self::Empty => false,
        }
    }

    /// String form of the cell, as used in composite keys and CSV output.
    ///
    /// Integral numbers print without a fractional part, so `Number(34.0)`
    /// and `Text("34")` produce the same key.
    #[must_use]
    pub fn key_string(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::Empty => String::new(),
        }
    }

    /// Whether this cell holds no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u32> for Cell {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // -0 and 0 share a key
        return "0".to_string();
    }
    n.to_string()
}

/// One dataset record.
pub type Row = Vec<Cell>;

/// Header row followed by body rows.
///
/// The dataset is treated as immutable input by the engine; operations
/// that reorder rows build a new `Dataset`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    /// Wrap raw rows. Row 0 is taken as the header.
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a dataset from column names and body rows.
    #[must_use]
    pub fn from_parts(header: Vec<String>, body: Vec<Row>) -> Self {
        let mut rows = Vec::with_capacity(body.len() + 1);
        rows.push(header.into_iter().map(Cell::Text).collect());
        rows.extend(body);
        Self { rows }
    }

    /// The header row, if any.
    #[must_use]
    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// All rows after the header.
    #[must_use]
    pub fn body(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// All rows including the header.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Total row count including the header.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows at all (not even a header).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of body rows.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Number of header columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.header().map_or(0, Vec::len)
    }

    /// Column names taken from the header row.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.header()
            .map(|h| h.iter().map(Cell::key_string).collect())
            .unwrap_or_default()
    }

    /// Index of the first column with the given name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header()?.iter().position(|c| c.key_string() == name)
    }

    /// Cell at a body row and column, `None` if either is out of range.
    #[must_use]
    pub fn cell(&self, body_row: usize, column: usize) -> Option<&Cell> {
        self.body().get(body_row)?.get(column)
    }

    /// Check that every body row is as wide as the header.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::RaggedRow`] for the first mismatching row.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let expected = self.width();
        for (idx, row) in self.body().iter().enumerate() {
            if row.len() != expected {
                return Err(DatasetError::RaggedRow {
                    row: idx + 1,
                    expected,
                    found: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Append a column, filling every body row with `Empty`.
    ///
    /// Returns the new column's index.
    pub fn push_column(&mut self, name: &str) -> usize {
        let index = self.width();
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        for (i, row) in self.rows.iter_mut().enumerate() {
            // Pad short rows so the new column lines up with the header
            if row.len() < index {
                row.resize(index, Cell::Empty);
            }
            row.push(if i == 0 {
                Cell::Text(name.to_string())
            } else {
                Cell::Empty
            });
        }
        index
    }

    /// Overwrite one body cell. Returns `false` if out of range.
    pub fn set_cell(&mut self, body_row: usize, column: usize, value: Cell) -> bool {
        match self.rows.get_mut(body_row + 1).and_then(|r| r.get_mut(column)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Describe every header column as a [`Variable`], inferring its kind.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.column_names()
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let numeric = self
                    .body()
                    .iter()
                    .filter_map(|row| row.get(index))
                    .all(|c| c.is_numeric_like() || c.is_empty());
                let kind = if numeric {
                    VariableKind::Numeric
                } else {
                    VariableKind::String
                };
                Variable::new(index, name, kind)
            })
            .collect()
    }
}

/// Identifies a column used for matching or sorting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Zero-based column index into a row
    #[serde(rename = "columnIndex")]
    pub index: usize,
    /// Display name, not used in computation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ColumnSpec {
    /// Column spec without a display name.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self { index, name: None }
    }

    /// Column spec with a display name.
    #[must_use]
    pub fn named(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: Some(name.into()),
        }
    }

    /// Display label: the name if present, otherwise `#index`.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.index))
    }
}

impl From<&Variable> for ColumnSpec {
    fn from(var: &Variable) -> Self {
        Self::named(var.index, var.name.clone())
    }
}

/// Storage kind of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// All values are numbers or missing
    Numeric,
    /// Any other content
    String,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A named dataset column with optional value labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Column index in the dataset
    pub index: usize,
    /// Column name
    pub name: String,
    /// Storage kind
    pub kind: VariableKind,
    /// Labels for coded values, e.g. `0 => "Duplicate case"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub value_labels: BTreeMap<u32, String>,
}

impl Variable {
    /// Create a variable without value labels.
    #[must_use]
    pub fn new(index: usize, name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            index,
            name: name.into(),
            kind,
            value_labels: BTreeMap::new(),
        }
    }
}
