//! Case store and result log abstractions.
//!
//! The identify action never touches a concrete dataset directly. It reads
//! the active dataset through [`CaseStore`], writes indicator variables back
//! through it, and records a report through [`ResultLog`]. The in-memory
//! implementations in [`memory`] back the CLI and the tests.
//!
//! # Architecture
//!
//! * [`CaseStore`]: active dataset, variable metadata, batched cell writes.
//! * [`ResultLog`]: ordered report of log text, analytic notes and tables.
//! * [`memory`]: [`MemoryStore`] and [`MemoryLog`].

pub mod memory;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::{Cell, Dataset, Variable, VariableKind};
use crate::statistics::Statistic;

pub use memory::{MemoryLog, MemoryStore};

/// Error type for case store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A variable with this name already exists.
    #[error("a variable named {0:?} already exists")]
    DuplicateVariable(String),

    /// A cell update addressed a row or column that does not exist.
    #[error("cell ({row}, {column}) is outside the dataset")]
    CellOutOfRange { row: usize, column: usize },

    /// A replacement dataset does not have the active dataset's shape.
    #[error("replacement dataset is {found_rows}x{found_width}, expected {expected_rows}x{expected_width}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_width: usize,
        found_rows: usize,
        found_width: usize,
    },
}

/// One cell write in a batched update.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    /// Body row index
    pub row: usize,
    /// Column index
    pub column: usize,
    /// New value
    pub value: Cell,
}

impl CellUpdate {
    /// Create a cell update.
    #[must_use]
    pub fn new(row: usize, column: usize, value: impl Into<Cell>) -> Self {
        Self {
            row,
            column,
            value: value.into(),
        }
    }
}

/// Access to the active dataset and its variable metadata.
pub trait CaseStore {
    /// The active dataset.
    fn dataset(&self) -> &Dataset;

    /// All variables, in column order.
    fn variables(&self) -> Vec<Variable>;

    /// Look up a variable by exact name.
    fn variable(&self, name: &str) -> Option<Variable> {
        self.variables().into_iter().find(|v| v.name == name)
    }

    /// Append a new variable and return its column index.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateVariable`] if the name is taken.
    fn create_variable(
        &mut self,
        name: &str,
        kind: VariableKind,
        value_labels: BTreeMap<u32, String>,
    ) -> Result<usize, StoreError>;

    /// Apply a batch of cell writes. Either every update applies or none.
    ///
    /// # Errors
    ///
    /// [`StoreError::CellOutOfRange`] for the first invalid address.
    fn update_cells(&mut self, updates: Vec<CellUpdate>) -> Result<(), StoreError>;

    /// Replace the active dataset with one of the same shape.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShapeMismatch`] if the row count or width differs.
    fn replace_dataset(&mut self, data: Dataset) -> Result<(), StoreError>;
}

/// An entry in the result log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogEntry {
    /// Command-like text describing what was run
    Log {
        text: String,
        timestamp: DateTime<Utc>,
    },
    /// Titled note with analytic context
    Analytic {
        title: String,
        note: String,
        timestamp: DateTime<Utc>,
    },
    /// Frequency table
    Statistic {
        statistic: Statistic,
        timestamp: DateTime<Utc>,
    },
}

impl LogEntry {
    /// When the entry was recorded.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Log { timestamp, .. }
            | Self::Analytic { timestamp, .. }
            | Self::Statistic { timestamp, .. } => *timestamp,
        }
    }
}

/// Sink for the human-readable report of a run.
pub trait ResultLog {
    /// Record command-like text.
    fn add_log(&mut self, text: &str);

    /// Record a titled analytic note.
    fn add_analytic(&mut self, title: &str, note: &str);

    /// Record a frequency table.
    fn add_statistic(&mut self, statistic: Statistic);
}
