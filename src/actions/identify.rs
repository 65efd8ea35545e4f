//! Identify duplicate cases in the active dataset.
//!
//! # Overview
//!
//! [`identify_duplicates`] is the caller-level flow around the grouping
//! engine:
//! - Resolve variable names against the [`CaseStore`] (fail fast on unknown
//!   names, with a suggestion)
//! - Reject indicator names that collide with existing variables
//! - Run the engine and the statistics generator on a worker thread
//! - Only after success: reorder the dataset, create the indicator
//!   variables, and write the report to the [`ResultLog`]
//!
//! A failure at any step leaves both the store and the log untouched.
//!
//! # Example
//!
//! ```
//! use dupecases::actions::identify::{identify_duplicates, IdentifyRequest};
//! use dupecases::dataset::{Cell, Dataset};
//! use dupecases::store::{CaseStore, MemoryLog, MemoryStore};
//!
//! let data = Dataset::from_parts(
//!     vec!["Name".to_string()],
//!     vec![vec![Cell::from("Ann")], vec![Cell::from("Bob")], vec![Cell::from("Ann")]],
//! );
//! let mut store = MemoryStore::new(data);
//! let mut log = MemoryLog::new();
//!
//! let request = IdentifyRequest::new(vec!["Name".to_string()]);
//! identify_duplicates(&mut store, &mut log, &request, None).unwrap();
//!
//! assert_eq!(store.dataset().column_names(), vec!["Name", "PrimaryLast"]);
//! assert_eq!(log.statistics().count(), 1);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::dataset::{Cell, ColumnSpec, VariableKind};
use crate::duplicates::{DuplicateResult, PrimarySelection, SortDirection};
use crate::error::suggest_similar;
use crate::progress::ProgressCallback;
use crate::statistics::{Statistic, DUPLICATE_LABEL, NON_MATCHING_LABEL, PRIMARY_LABEL};
use crate::store::{CaseStore, CellUpdate, ResultLog, StoreError};
use crate::worker::{spawn_with_progress, WorkerError, WorkerRequest, DEFAULT_SEQUENCE_NAME};

/// Title of the analytic log entry.
pub const ANALYTIC_TITLE: &str = "Identify Duplicate Cases";

/// Error type for the identify action.
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// No matching variables were given.
    #[error("No matching variables have been selected.")]
    NoMatchingVariables,

    /// A variable name does not exist in the dataset.
    #[error("unknown variable {name:?}{}", .suggestion.as_deref().map(|s| format!(" (did you mean {s:?}?)")).unwrap_or_default())]
    UnknownVariable {
        name: String,
        suggestion: Option<String>,
    },

    /// The indicator variables could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The background job failed.
    #[error("duplicate identification failed: {0}")]
    Worker(#[from] WorkerError),
}

/// Options for one identify run, naming variables rather than indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifyRequest {
    /// Variables defining a match
    pub matching: Vec<String>,
    /// Variables ordering cases inside each match group
    pub sorting: Vec<String>,
    /// Direction applied to all sorting variables
    pub sort_direction: SortDirection,
    /// First or last sorted case is primary
    pub primary_selection: PrimarySelection,
    /// Primary indicator variable name; derived from the selection if `None`
    pub primary_indicator_name: Option<String>,
    /// Create the sequence indicator variable
    pub sequence_count_enabled: bool,
    /// Sequence indicator variable name
    pub sequence_indicator_name: String,
    /// Move matching cases to the top of the file
    pub move_matching_to_top: bool,
    /// Record frequency tables in the log
    pub display_frequencies: bool,
}

impl IdentifyRequest {
    /// Request with default options.
    #[must_use]
    pub fn new(matching: Vec<String>) -> Self {
        Self {
            matching,
            sorting: Vec::new(),
            sort_direction: SortDirection::default(),
            primary_selection: PrimarySelection::default(),
            primary_indicator_name: None,
            sequence_count_enabled: false,
            sequence_indicator_name: DEFAULT_SEQUENCE_NAME.to_string(),
            move_matching_to_top: true,
            display_frequencies: true,
        }
    }

    /// Effective primary indicator name.
    #[must_use]
    pub fn primary_name(&self) -> String {
        self.primary_indicator_name
            .clone()
            .unwrap_or_else(|| self.primary_selection.default_indicator_name().to_string())
    }

    /// Command-like text for the result log.
    #[must_use]
    pub fn syntax(&self) -> String {
        let mut text = format!("IDENTIFY DUPLICATES\n  /MATCH={}", self.matching.join(" "));
        if !self.sorting.is_empty() {
            let dir = match self.sort_direction {
                SortDirection::Ascending => "A",
                SortDirection::Descending => "D",
            };
            text.push_str(&format!("\n  /SORT={} ({dir})", self.sorting.join(" ")));
        }
        text.push_str(&format!(
            "\n  /PRIMARY={} {}",
            self.primary_selection.to_string().to_uppercase(),
            self.primary_name()
        ));
        if self.sequence_count_enabled {
            text.push_str(&format!("\n  /SEQUENCE={}", self.sequence_indicator_name));
        }
        text.push_str(&format!(
            "\n  /MOVETOTOP={}\n  /FREQUENCIES={}.",
            yes_no(self.move_matching_to_top),
            yes_no(self.display_frequencies)
        ));
        text
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

/// What an identify run did.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifyOutcome {
    /// Fewer than two rows; nothing was written.
    TooFewRows,
    /// Indicators were written.
    Applied(IdentifySummary),
}

impl IdentifyOutcome {
    /// Whether any matching group was found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        match self {
            Self::TooFewRows => false,
            Self::Applied(summary) => summary.result.has_duplicates(),
        }
    }

    /// The applied summary, if any.
    #[must_use]
    pub fn summary(&self) -> Option<&IdentifySummary> {
        match self {
            Self::TooFewRows => None,
            Self::Applied(summary) => Some(summary),
        }
    }
}

/// Details of an applied identify run.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifySummary {
    /// Engine output, aligned with the original row order
    pub result: DuplicateResult,
    /// Frequency tables (empty when frequencies are off)
    pub statistics: Vec<Statistic>,
    /// Column of the primary indicator
    pub primary_column: usize,
    /// Column of the sequence indicator, if created
    pub sequence_column: Option<usize>,
    /// Whether matching cases were moved to the top
    pub moved_to_top: bool,
}

/// Resolve variable names to column specs.
fn resolve<S: CaseStore + ?Sized>(store: &S, names: &[String]) -> Result<Vec<ColumnSpec>, IdentifyError> {
    let variables = store.variables();
    names
        .iter()
        .map(|name| {
            variables
                .iter()
                .find(|v| &v.name == name)
                .map(ColumnSpec::from)
                .ok_or_else(|| IdentifyError::UnknownVariable {
                    name: name.clone(),
                    suggestion: suggest_similar(name, variables.iter().map(|v| v.name.as_str()))
                        .map(str::to_string),
                })
        })
        .collect()
}

fn check_free<S: CaseStore + ?Sized>(store: &S, name: &str) -> Result<(), StoreError> {
    if store.variable(name).is_some() {
        return Err(StoreError::DuplicateVariable(name.to_string()));
    }
    Ok(())
}

fn analytic_note(request: &IdentifyRequest, result: &DuplicateResult) -> String {
    let stats = &result.stats;
    let mut note = format!(
        "Matched on {}. Found {} matching group(s) covering {} of {} case(s); {} case(s) are unique.",
        request.matching.join(", "),
        stats.duplicate_groups,
        stats.matching_rows,
        stats.total_rows,
        stats.unique_rows
    );
    note.push_str(&format!(
        " The {} case in each group is the primary case",
        request.primary_selection
    ));
    if request.sorting.is_empty() {
        note.push_str(" in file order.");
    } else {
        note.push_str(&format!(
            " after sorting by {} ({}).",
            request.sorting.join(", "),
            match request.sort_direction {
                SortDirection::Ascending => "ascending",
                SortDirection::Descending => "descending",
            }
        ));
    }
    if request.move_matching_to_top {
        note.push_str(" Matching cases were moved to the top of the file.");
    }
    note
}

/// Identify duplicate cases and write the indicator variables.
///
/// # Errors
///
/// Returns [`IdentifyError`] if the request is invalid, an indicator name
/// is already taken, or the worker fails. Nothing is written in that case.
pub fn identify_duplicates<S, L>(
    store: &mut S,
    log: &mut L,
    request: &IdentifyRequest,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<IdentifyOutcome, IdentifyError>
where
    S: CaseStore + ?Sized,
    L: ResultLog + ?Sized,
{
    if request.matching.is_empty() {
        return Err(IdentifyError::NoMatchingVariables);
    }
    let matching = resolve(store, &request.matching)?;
    let sorting = resolve(store, &request.sorting)?;

    let primary_name = request.primary_name();
    check_free(store, &primary_name)?;
    if request.sequence_count_enabled {
        check_free(store, &request.sequence_indicator_name)?;
        if request.sequence_indicator_name == primary_name {
            return Err(StoreError::DuplicateVariable(primary_name).into());
        }
    }

    if store.dataset().len() < 2 {
        log::info!("Dataset has no cases; nothing to identify");
        return Ok(IdentifyOutcome::TooFewRows);
    }

    let worker_request = WorkerRequest {
        data: store.dataset().clone(),
        matching_columns: matching,
        sorting_columns: sorting,
        sort_direction: request.sort_direction,
        primary_selection: request.primary_selection,
        primary_indicator_name: Some(primary_name.clone()),
        sequence_count_enabled: request.sequence_count_enabled,
        sequence_indicator_name: request.sequence_indicator_name.clone(),
        move_matching_to_top: request.move_matching_to_top,
        display_frequencies: request.display_frequencies,
    };

    if let Some(ref cb) = progress {
        cb.on_phase_start("job", worker_request.data.body_len());
    }
    let job = spawn_with_progress(worker_request, progress.clone()).and_then(|h| h.wait());
    if let Some(ref cb) = progress {
        cb.on_phase_end("job");
    }
    let output = job?;
    let result = output.result;

    let (primary_values, sequence_values) = if request.move_matching_to_top {
        store.replace_dataset(result.reordered.clone())?;
        (
            result.in_reordered_order(&result.primary_values),
            result.in_reordered_order(&result.sequence_values),
        )
    } else {
        (result.primary_values.clone(), result.sequence_values.clone())
    };

    let primary_labels = BTreeMap::from([
        (0, DUPLICATE_LABEL.to_string()),
        (1, PRIMARY_LABEL.to_string()),
    ]);
    let primary_column = store.create_variable(&primary_name, VariableKind::Numeric, primary_labels)?;
    store.update_cells(
        primary_values
            .iter()
            .enumerate()
            .map(|(row, &v)| CellUpdate::new(row, primary_column, Cell::from(u32::from(v))))
            .collect(),
    )?;

    let sequence_column = if request.sequence_count_enabled {
        let labels = BTreeMap::from([(0, NON_MATCHING_LABEL.to_string())]);
        let column = store.create_variable(&request.sequence_indicator_name, VariableKind::Numeric, labels)?;
        store.update_cells(
            sequence_values
                .iter()
                .enumerate()
                .map(|(row, &v)| CellUpdate::new(row, column, v))
                .collect(),
        )?;
        Some(column)
    } else {
        None
    };

    log.add_log(&request.syntax());
    log.add_analytic(ANALYTIC_TITLE, &analytic_note(request, &result));
    if request.display_frequencies {
        for statistic in &output.statistics {
            log.add_statistic(statistic.clone());
        }
    }

    log::info!(
        "Identified {} matching group(s) over {} case(s)",
        result.stats.duplicate_groups,
        result.stats.total_rows
    );

    Ok(IdentifyOutcome::Applied(IdentifySummary {
        result,
        statistics: output.statistics,
        primary_column,
        sequence_column,
        moved_to_top: request.move_matching_to_top,
    }))
}
