//! Background execution boundary for duplicate identification.
//!
//! One [`WorkerRequest`] goes in, one [`WorkerResponse`] comes out. The
//! request carries the dataset and every option; the response carries the
//! classification vectors, the reordered dataset and the frequency tables,
//! or an error message. There is no streaming and no cancellation.
//!
//! Two transports are provided:
//! - [`spawn`]: run the job on a dedicated thread and receive the reply over
//!   a channel, so an interactive caller is never blocked by a large dataset.
//! - [`serve`]: read one JSON request from a reader and write one JSON
//!   response to a writer (used by the `worker` subcommand).
//!
//! A panic inside the engine is caught and reported as a failed response,
//! never as a half-written result.
//!
//! # Example
//!
//! ```
//! use dupecases::dataset::{Cell, ColumnSpec, Dataset};
//! use dupecases::worker::{spawn, WorkerRequest};
//!
//! let data = Dataset::from_parts(
//!     vec!["Name".to_string()],
//!     vec![vec![Cell::from("Ann")], vec![Cell::from("Ann")]],
//! );
//! let request = WorkerRequest::new(data, vec![ColumnSpec::new(0)]);
//!
//! let output = spawn(request).unwrap().wait().unwrap();
//! assert_eq!(output.result.primary_values, vec![0, 1]);
//! assert_eq!(output.statistics.len(), 1);
//! ```

use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::{ColumnSpec, Dataset};
use crate::duplicates::{DuplicateFinder, DuplicateResult, FinderConfig, PrimarySelection, SortDirection};
use crate::progress::ProgressCallback;
use crate::statistics::{generate_statistics, Statistic, StatisticsOptions};

/// Default name of the sequence indicator variable.
pub const DEFAULT_SEQUENCE_NAME: &str = "MatchSequence";

fn default_sequence_name() -> String {
    DEFAULT_SEQUENCE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

/// Errors crossing the worker boundary.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker thread could not be started.
    #[error("failed to start worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The worker went away without replying.
    #[error("worker exited without a response{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Disconnected(Option<String>),

    /// The worker replied with a failure.
    #[error("{0}")]
    Failed(String),

    /// The worker replied with success but no result.
    #[error("malformed worker response: {0}")]
    Malformed(String),

    /// Reading the request or writing the response failed.
    #[error("worker I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The response could not be serialized.
    #[error("worker serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the worker needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    /// Header plus body rows
    pub data: Dataset,
    /// Columns defining group membership
    pub matching_columns: Vec<ColumnSpec>,
    /// Columns ordering members inside a group
    #[serde(default)]
    pub sorting_columns: Vec<ColumnSpec>,
    /// Direction for all sorting columns
    #[serde(default)]
    pub sort_direction: SortDirection,
    /// First or last sorted member is primary
    #[serde(default)]
    pub primary_selection: PrimarySelection,
    /// Name of the primary indicator; derived from the selection if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_indicator_name: Option<String>,
    /// Also tabulate sequence numbers
    #[serde(default)]
    pub sequence_count_enabled: bool,
    /// Name of the sequence indicator
    #[serde(default = "default_sequence_name")]
    pub sequence_indicator_name: String,
    /// Caller intends to apply the reordered dataset
    #[serde(default = "default_true")]
    pub move_matching_to_top: bool,
    /// Produce frequency tables
    #[serde(default = "default_true")]
    pub display_frequencies: bool,
}

impl WorkerRequest {
    /// Request with default options.
    #[must_use]
    pub fn new(data: Dataset, matching_columns: Vec<ColumnSpec>) -> Self {
        Self {
            data,
            matching_columns,
            sorting_columns: Vec::new(),
            sort_direction: SortDirection::default(),
            primary_selection: PrimarySelection::default(),
            primary_indicator_name: None,
            sequence_count_enabled: false,
            sequence_indicator_name: default_sequence_name(),
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

    /// Engine configuration for this request.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::new(self.matching_columns.clone())
            .with_sorting(self.sorting_columns.clone())
            .with_sort_direction(self.sort_direction)
            .with_primary_selection(self.primary_selection)
    }

    /// Statistics options for this request.
    #[must_use]
    pub fn statistics_options(&self) -> StatisticsOptions {
        StatisticsOptions {
            primary_indicator_name: self.primary_name(),
            sequence_count_enabled: self.sequence_count_enabled,
            sequence_indicator_name: self.sequence_indicator_name.clone(),
        }
    }

    /// Run the engine and, if requested, the statistics generator.
    #[must_use]
    pub fn execute(&self, progress: Option<Arc<dyn ProgressCallback>>) -> WorkerOutput {
        let mut config = self.finder_config();
        if let Some(cb) = progress {
            config = config.with_progress_callback(cb);
        }
        let result = DuplicateFinder::new(config).process(&self.data);
        let statistics = if self.display_frequencies {
            generate_statistics(
                &result.primary_values,
                &result.sequence_values,
                &self.statistics_options(),
            )
        } else {
            Vec::new()
        };
        WorkerOutput { result, statistics }
    }
}

/// Successful worker output.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerOutput {
    /// Classification vectors and reordered dataset
    pub result: DuplicateResult,
    /// Frequency tables (empty when frequencies are off)
    pub statistics: Vec<Statistic>,
}

/// The single reply message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerResponse {
    /// Whether the run succeeded
    pub success: bool,
    /// Engine output on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DuplicateResult>,
    /// Frequency tables on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Vec<Statistic>>,
    /// Error message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerResponse {
    /// Successful reply.
    #[must_use]
    pub fn success(output: WorkerOutput) -> Self {
        Self {
            success: true,
            result: Some(output.result),
            statistics: Some(output.statistics),
            error: None,
        }
    }

    /// Failed reply.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            statistics: None,
            error: Some(message.into()),
        }
    }

    /// Convert the reply into the caller's result type.
    ///
    /// # Errors
    ///
    /// [`WorkerError::Failed`] for a failure reply, [`WorkerError::Malformed`]
    /// for a success reply without a result.
    pub fn into_output(self) -> Result<WorkerOutput, WorkerError> {
        if !self.success {
            return Err(WorkerError::Failed(
                self.error
                    .unwrap_or_else(|| "unknown worker error".to_string()),
            ));
        }
        let result = self
            .result
            .ok_or_else(|| WorkerError::Malformed("missing result".to_string()))?;
        Ok(WorkerOutput {
            result,
            statistics: self.statistics.unwrap_or_default(),
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "worker panicked".to_string())
}

/// Execute a request, turning a panic into a failure reply.
#[must_use]
pub fn handle(request: &WorkerRequest, progress: Option<Arc<dyn ProgressCallback>>) -> WorkerResponse {
    match panic::catch_unwind(AssertUnwindSafe(|| request.execute(progress))) {
        Ok(output) => WorkerResponse::success(output),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("Duplicate identification failed: {}", message);
            WorkerResponse::failure(format!("Duplicate identification failed: {message}"))
        }
    }
}

/// Handle to a job running on a worker thread.
pub struct JobHandle {
    receiver: mpsc::Receiver<WorkerResponse>,
    thread: JoinHandle<()>,
}

impl JobHandle {
    /// Block until the worker replies.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError`] if the worker failed or exited without
    /// replying.
    pub fn wait(self) -> Result<WorkerOutput, WorkerError> {
        match self.receiver.recv() {
            Ok(response) => {
                // The thread has nothing left to do after sending
                let _ = self.thread.join();
                response.into_output()
            }
            Err(_) => {
                let reason = self.thread.join().err().map(|p| panic_message(p.as_ref()));
                Err(WorkerError::Disconnected(reason))
            }
        }
    }
}

/// Run a request on a dedicated worker thread.
///
/// # Errors
///
/// Returns [`WorkerError::Spawn`] if the thread cannot be created.
pub fn spawn(request: WorkerRequest) -> Result<JobHandle, WorkerError> {
    spawn_with_progress(request, None)
}

/// Run a request on a dedicated worker thread, reporting engine phases.
///
/// # Errors
///
/// Returns [`WorkerError::Spawn`] if the thread cannot be created.
pub fn spawn_with_progress(
    request: WorkerRequest,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<JobHandle, WorkerError> {
    let (sender, receiver) = mpsc::channel();
    let thread = thread::Builder::new()
        .name("dupecases-worker".to_string())
        .spawn(move || {
            log::debug!(
                "Worker started: {} rows, {} matching column(s)",
                request.data.body_len(),
                request.matching_columns.len()
            );
            let response = handle(&request, progress);
            if sender.send(response).is_err() {
                log::debug!("Worker caller went away before the reply");
            }
        })
        .map_err(WorkerError::Spawn)?;
    Ok(JobHandle { receiver, thread })
}

/// Read one JSON request, write one JSON response.
///
/// A request that fails to parse produces a failure response rather than
/// an error, so the peer always gets exactly one reply.
///
/// # Errors
///
/// Returns [`WorkerError`] if reading the input or writing the reply fails.
pub fn serve<R: Read, W: Write>(mut input: R, mut output: W) -> Result<WorkerResponse, WorkerError> {
    let mut raw = String::new();
    input.read_to_string(&mut raw)?;

    let response = match serde_json::from_str::<WorkerRequest>(&raw) {
        Ok(request) => handle(&request, None),
        Err(e) => {
            log::warn!("Rejected worker request: {}", e);
            WorkerResponse::failure(format!("Malformed request: {e}"))
        }
    };

    serde_json::to_writer(&mut output, &response)?;
    writeln!(output)?;
    output.flush()?;
    Ok(response)
}
