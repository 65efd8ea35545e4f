//! Duplicate case identification.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the grouping engine over a [`Dataset`]:
//! 1. **Keying** - Split header from body and group body rows by their
//!    composite key (see [`crate::duplicates::groups`])
//! 2. **Sorting** - Optionally order each group by the sorting columns
//! 3. **Classification** - Flag one primary row per group and assign
//!    1-based sequence numbers inside groups of 2+ rows
//! 4. **Reordering** - Build a copy of the dataset with matching rows first
//!
//! The engine is pure: it never mutates its input, holds no state between
//! calls, and never fails. Degenerate input (header only, empty matching
//! columns, out-of-range indices) produces well-defined output instead of
//! an error.
//!
//! # Example
//!
//! ```
//! use dupecases::dataset::{Cell, ColumnSpec, Dataset};
//! use dupecases::duplicates::{DuplicateFinder, FinderConfig, PrimarySelection};
//!
//! let data = Dataset::from_parts(
//!     vec!["Name".to_string()],
//!     vec![
//!         vec![Cell::from("Ann")],
//!         vec![Cell::from("Bob")],
//!         vec![Cell::from("Ann")],
//!     ],
//! );
//!
//! let config = FinderConfig::new(vec![ColumnSpec::new(0)])
//!     .with_primary_selection(PrimarySelection::Last);
//! let result = DuplicateFinder::new(config).process(&data);
//!
//! assert_eq!(result.primary_values, vec![0, 1, 1]);
//! assert_eq!(result.sequence_values, vec![1, 0, 2]);
//! assert_eq!(result.order, vec![0, 2, 1]);
//! ```

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::compare::SortDirection;
use super::groups::{group_by_key, DuplicateGroup, GroupingStats};
use crate::dataset::{ColumnSpec, Dataset, Row};
use crate::progress::ProgressCallback;

/// Which member of a sorted group is flagged primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimarySelection {
    /// First row after sorting
    First,
    /// Last row after sorting
    #[default]
    Last,
}

impl PrimarySelection {
    /// Pick the primary row of a group.
    #[must_use]
    pub fn pick(self, group: &DuplicateGroup) -> Option<usize> {
        match self {
            Self::First => group.members.first().copied(),
            Self::Last => group.members.last().copied(),
        }
    }

    /// Conventional indicator variable name for this selection.
    #[must_use]
    pub fn default_indicator_name(self) -> &'static str {
        match self {
            Self::First => "PrimaryFirst",
            Self::Last => "PrimaryLast",
        }
    }
}

impl std::fmt::Display for PrimarySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Last => write!(f, "last"),
        }
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Columns whose combined values define group membership.
    pub matching: Vec<ColumnSpec>,
    /// Columns used to order members inside each group.
    pub sorting: Vec<ColumnSpec>,
    /// Direction applied to every sorting column.
    pub sort_direction: SortDirection,
    /// Which sorted member becomes primary.
    pub primary_selection: PrimarySelection,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("matching", &self.matching)
            .field("sorting", &self.sorting)
            .field("sort_direction", &self.sort_direction)
            .field("primary_selection", &self.primary_selection)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Create a configuration for the given matching columns.
    #[must_use]
    pub fn new(matching: Vec<ColumnSpec>) -> Self {
        Self {
            matching,
            ..Self::default()
        }
    }

    /// Set the sorting columns.
    #[must_use]
    pub fn with_sorting(mut self, sorting: Vec<ColumnSpec>) -> Self {
        self.sorting = sorting;
        self
    }

    /// Set the sort direction.
    #[must_use]
    pub fn with_sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = direction;
        self
    }

    /// Set which member of each group is primary.
    #[must_use]
    pub fn with_primary_selection(mut self, selection: PrimarySelection) -> Self {
        self.primary_selection = selection;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn out_of_range(&self, width: usize) -> Vec<&ColumnSpec> {
        self.matching
            .iter()
            .chain(&self.sorting)
            .filter(|c| c.index >= width)
            .collect()
    }
}

/// Output of the grouping engine.
///
/// `primary_values` and `sequence_values` hold one entry per body row,
/// aligned with the input order. `reordered` is always built; callers
/// decide whether to apply it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateResult {
    /// 1 for the primary row of each group (and every unique row), else 0
    pub primary_values: Vec<u8>,
    /// 1-based rank inside a matching group, 0 for unique rows
    pub sequence_values: Vec<u32>,
    /// Header, then matching rows, then unique rows
    #[serde(rename = "reorderedData")]
    pub reordered: Dataset,
    /// Body row positions in the order they appear in `reordered`
    #[serde(skip)]
    pub order: Vec<usize>,
    /// Grouping statistics
    #[serde(skip)]
    pub stats: GroupingStats,
}

impl DuplicateResult {
    fn unchanged(data: &Dataset) -> Self {
        Self {
            reordered: data.clone(),
            ..Self::default()
        }
    }

    /// Number of classified body rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primary_values.len()
    }

    /// Whether no rows were classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primary_values.is_empty()
    }

    /// Whether any matching group was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.sequence_values.iter().any(|&s| s > 0)
    }

    /// Permute a per-row vector into the order of `reordered`.
    #[must_use]
    pub fn in_reordered_order<T: Copy>(&self, values: &[T]) -> Vec<T> {
        self.order.iter().map(|&row| values[row]).collect()
    }
}

/// Grouping engine over a dataset.
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Classify every body row and build the reordered dataset.
    ///
    /// If the dataset has fewer than 2 rows the classification vectors are
    /// empty and the dataset is returned unchanged.
    #[must_use]
    pub fn process(&self, data: &Dataset) -> DuplicateResult {
        if data.len() < 2 {
            log::debug!("Dataset has {} row(s); nothing to classify", data.len());
            return DuplicateResult::unchanged(data);
        }

        let config = &self.config;
        let body = data.body();

        let missing = config.out_of_range(data.width());
        if !missing.is_empty() {
            let labels: Vec<String> = missing.iter().map(|c| c.label()).collect();
            log::warn!(
                "Column(s) {} are outside the {} dataset columns; their values are treated as missing",
                labels.join(", "),
                data.width()
            );
        }

        self.phase_start("keying", body.len());
        let (mut groups, stats) = group_by_key(body, &config.matching);
        self.phase_end("keying");

        if !config.sorting.is_empty() {
            self.phase_start("sorting", stats.duplicate_groups);
            groups
                .par_iter_mut()
                .filter(|g| g.has_duplicates())
                .for_each(|g| g.sort_members(body, &config.sorting, config.sort_direction));
            self.phase_end("sorting");
        }

        let (primary_values, sequence_values, matching) =
            classify(&groups, body.len(), config.primary_selection);

        let order: Vec<usize> = (0..body.len())
            .filter(|&row| matching[row])
            .chain((0..body.len()).filter(|&row| !matching[row]))
            .collect();

        let mut rows: Vec<Row> = Vec::with_capacity(data.len());
        rows.extend(data.header().cloned());
        rows.extend(order.iter().map(|&row| body[row].clone()));

        log::info!(
            "Classified {} rows: {} primary, {} duplicate",
            body.len(),
            primary_values.iter().filter(|&&p| p == 1).count(),
            primary_values.iter().filter(|&&p| p == 0).count()
        );

        DuplicateResult {
            primary_values,
            sequence_values,
            reordered: Dataset::new(rows),
            order,
            stats,
        }
    }

    fn phase_start(&self, phase: &str, total: usize) {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_start(phase, total);
        }
    }

    fn phase_end(&self, phase: &str) {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_end(phase);
        }
    }
}

/// Assign primary flags and sequence numbers from sorted groups.
///
/// Returns the primary vector, the sequence vector, and a per-row flag
/// marking membership of a group with 2+ rows.
fn classify(
    groups: &[DuplicateGroup],
    rows: usize,
    selection: PrimarySelection,
) -> (Vec<u8>, Vec<u32>, Vec<bool>) {
    let mut primary = vec![0u8; rows];
    let mut sequence = vec![0u32; rows];
    let mut matching = vec![false; rows];

    for group in groups {
        if group.has_duplicates() {
            for (rank, &row) in group.members.iter().enumerate() {
                sequence[row] = rank as u32 + 1;
                matching[row] = true;
            }
            if let Some(row) = selection.pick(group) {
                primary[row] = 1;
            }
        } else if let Some(&row) = group.members.first() {
            primary[row] = 1;
        }
    }

    (primary, sequence, matching)
}

/// Run the grouping engine once with the given configuration.
///
/// Convenience wrapper around [`DuplicateFinder::process`].
#[must_use]
pub fn process_duplicates(data: &Dataset, config: &FinderConfig) -> DuplicateResult {
    DuplicateFinder::new(config.clone()).process(data)
}
