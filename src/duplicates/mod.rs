//! Duplicate case detection module.
//!
//! This module provides functionality for:
//! - Composite-key grouping of rows (see [`groups`])
//! - Numeric-if-parseable in-group sorting (see [`compare`])
//! - Primary/sequence classification and reordering (see [`finder`])

pub mod compare;
pub mod finder;
pub mod groups;

pub use compare::{compare_cells, numeric_value, SortDirection};
pub use finder::{process_duplicates, DuplicateFinder, DuplicateResult, FinderConfig, PrimarySelection};
pub use groups::{composite_key, group_by_key, CompositeKey, DuplicateGroup, GroupingStats};
