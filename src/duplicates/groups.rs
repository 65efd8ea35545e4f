//! Composite-key grouping of dataset rows.
//!
//! # Overview
//!
//! Every body row gets a composite key built from the string form of its
//! cells at the matching columns. Rows sharing a key form a
//! [`DuplicateGroup`]. Groups are returned in the order their first member
//! appears, and members keep their row order inside the group, so later
//! phases can rely on "original order" without re-sorting.
//!
//! The key is a tuple of components rather than a delimiter-joined string,
//! so no cell content can collide with another key. A matching column that
//! is out of range for a row yields a `None` component; rows missing the
//! same columns therefore group together. With no matching columns at all
//! there is nothing to compare, and every row forms its own group.
//!
//! # Example
//!
//! ```
//! use dupecases::dataset::{Cell, ColumnSpec};
//! use dupecases::duplicates::group_by_key;
//!
//! let body = vec![
//!     vec![Cell::from("Ann"), Cell::from(34.0)],
//!     vec![Cell::from("Bob"), Cell::from(29.0)],
//!     vec![Cell::from("Ann"), Cell::from("34")],
//! ];
//!
//! let (groups, stats) = group_by_key(&body, &[ColumnSpec::new(0), ColumnSpec::new(1)]);
//!
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[0].members, vec![0, 2]);  // Number 34 and text "34" share a key
//! assert_eq!(stats.duplicate_groups, 1);
//! assert_eq!(stats.matching_rows, 2);
//! ```

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::compare::{compare_cells, SortDirection};
use crate::dataset::{Cell, ColumnSpec, Row};

/// Group identity: one component per matching column, `None` when the
/// column is missing from the row.
pub type CompositeKey = Vec<Option<String>>;

/// Build the composite key for a row.
#[must_use]
pub fn composite_key(row: &Row, matching: &[ColumnSpec]) -> CompositeKey {
    matching
        .iter()
        .map(|col| row.get(col.index).map(Cell::key_string))
        .collect()
}

/// Rows sharing one composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Shared composite key
    pub key: CompositeKey,
    /// Body row positions, in first-seen order until sorted
    pub members: Vec<usize>,
}

impl DuplicateGroup {
    /// Create a group with its first member.
    #[must_use]
    pub fn new(key: CompositeKey, first: usize) -> Self {
        Self {
            key,
            members: vec![first],
        }
    }

    /// Number of rows in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if this group holds matching cases (2+ rows).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.members.len() > 1
    }

    /// Number of non-primary members.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Human-readable key, components joined with `" | "`.
    #[must_use]
    pub fn key_label(&self) -> String {
        self.key
            .iter()
            .map(|c| c.as_deref().unwrap_or("<missing>"))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Stable-sort members by the sorting columns.
    ///
    /// The first column that differs decides; rows equal on every column
    /// keep their current relative order.
    pub fn sort_members(&mut self, body: &[Row], sorting: &[ColumnSpec], direction: SortDirection) {
        if sorting.is_empty() || self.members.len() < 2 {
            return;
        }
        self.members.sort_by(|&a, &b| {
            let (row_a, row_b) = (&body[a], &body[b]);
            sorting
                .iter()
                .map(|col| compare_cells(row_a.get(col.index), row_b.get(col.index)))
                .find(|ord| ord.is_ne())
                .map_or(std::cmp::Ordering::Equal, |ord| direction.apply(ord))
        });
    }
}

/// Statistics from the grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingStats {
    /// Number of body rows processed
    pub total_rows: usize,
    /// Number of distinct composite keys
    pub distinct_keys: usize,
    /// Number of keys shared by 2+ rows
    pub duplicate_groups: usize,
    /// Rows belonging to a group of 2+ rows
    pub matching_rows: usize,
    /// Rows whose key is unique
    pub unique_rows: usize,
    /// Size of the largest group
    pub largest_group: usize,
}

impl GroupingStats {
    /// Percentage of rows that belong to a matching group.
    #[must_use]
    pub fn matching_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.matching_rows as f64 / self.total_rows as f64) * 100.0
        }
    }
}

/// Group body rows by their composite key.
///
/// Keys are computed in parallel; bucketing is sequential so that group
/// order and member order follow the row order.
///
/// # Arguments
///
/// * `body` - Body rows (header excluded)
/// * `matching` - Columns whose combined values define group membership
///
/// # Returns
///
/// A tuple of:
/// - `Vec<DuplicateGroup>` - All groups, singletons included, in first-seen order
/// - `GroupingStats` - Statistics about the grouping
#[must_use]
pub fn group_by_key(body: &[Row], matching: &[ColumnSpec]) -> (Vec<DuplicateGroup>, GroupingStats) {
    if matching.is_empty() {
        log::warn!("No matching columns given; every row is treated as unique");
        let groups: Vec<DuplicateGroup> = (0..body.len())
            .map(|row| DuplicateGroup::new(Vec::new(), row))
            .collect();
        let stats = GroupingStats {
            total_rows: body.len(),
            distinct_keys: body.len(),
            unique_rows: body.len(),
            largest_group: usize::from(!body.is_empty()),
            ..GroupingStats::default()
        };
        return (groups, stats);
    }

    let keys: Vec<CompositeKey> = body
        .par_iter()
        .map(|row| composite_key(row, matching))
        .collect();

    let mut positions: HashMap<CompositeKey, usize> = HashMap::with_capacity(keys.len());
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for (row, key) in keys.into_iter().enumerate() {
        match positions.get(&key) {
            Some(&idx) => groups[idx].members.push(row),
            None => {
                log::trace!("Row {} opens a new group", row);
                positions.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup::new(key, row));
            }
        }
    }

    let mut stats = GroupingStats {
        total_rows: body.len(),
        distinct_keys: groups.len(),
        ..GroupingStats::default()
    };
    for group in &groups {
        stats.largest_group = stats.largest_group.max(group.len());
        if group.has_duplicates() {
            stats.duplicate_groups += 1;
            stats.matching_rows += group.len();
            log::debug!(
                "Key [{}]: {} matching cases",
                group.key_label(),
                group.len()
            );
        } else {
            stats.unique_rows += 1;
        }
    }

    log::info!(
        "Grouping complete: {} rows → {} keys, {} matching groups ({:.1}% of rows)",
        stats.total_rows,
        stats.distinct_keys,
        stats.duplicate_groups,
        stats.matching_rate()
    );

    (groups, stats)
}
