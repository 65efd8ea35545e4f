//! Structured error handling and exit codes.

use serde::Serialize;

use crate::actions::identify::IdentifyError;
use crate::config::ConfigError;
use crate::dataset::DatasetError;

/// Exit codes for the dupecases application.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found (completed normally, no matching cases)
/// - 3: Invalid input (unreadable dataset, unknown variable, bad config)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Identification completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Identification completed but every case is unique.
    NoDuplicates = 2,
    /// Invalid input: The dataset, request or configuration was rejected.
    InvalidInput = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DC000",
            Self::GeneralError => "DC001",
            Self::NoDuplicates => "DC002",
            Self::InvalidInput => "DC003",
        }
    }

    /// Classify an application error.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let invalid = err.chain().any(|cause| {
            cause.downcast_ref::<DatasetError>().is_some()
                || cause.downcast_ref::<ConfigError>().is_some()
                || cause.downcast_ref::<IdentifyError>().is_some_and(|e| {
                    matches!(
                        e,
                        IdentifyError::NoMatchingVariables
                            | IdentifyError::UnknownVariable { .. }
                            | IdentifyError::Store(_)
                    )
                })
        });
        if invalid {
            Self::InvalidInput
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}

/// Closest candidate to `input`, if any is similar enough to suggest.
#[must_use]
pub fn suggest_similar<'a>(input: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|c| (c, strsim::jaro_winkler(&input.to_lowercase(), &c.to_lowercase())))
        .filter(|&(_, score)| score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}
