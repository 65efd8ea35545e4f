//! JSON output formatter for identification results.
//!
//! Provides machine-readable JSON output for scripting and automation. The
//! document has the worker response shape plus a summary block.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "success": true,
//!   "result": {
//!     "primaryValues": [0, 1, 1],
//!     "sequenceValues": [1, 0, 2],
//!     "reorderedData": [["Name"], ["Ann"], ["Ann"], ["Bob"]]
//!   },
//!   "statistics": [
//!     {
//!       "title": "PrimaryLast Frequency",
//!       "description": "...",
//!       "component": "Frequency Table",
//!       "output": { "columns": ["", "Frequency", "Percent"], "rows": [...] }
//!     }
//!   ],
//!   "summary": {
//!     "totalCases": 3,
//!     "distinctKeys": 2,
//!     "matchingGroups": 1,
//!     "matchingCases": 2,
//!     "uniqueCases": 1,
//!     "largestGroup": 2,
//!     "matchingRate": 66.7,
//!     "exitCode": 0,
//!     "exitCodeName": "DC000"
//!   },
//!   "log": [
//!     { "type": "log", "text": "IDENTIFY DUPLICATES ...", "timestamp": "..." }
//!   ]
//! }
//! ```

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::{DuplicateResult, GroupingStats};
use crate::error::ExitCode;
use crate::statistics::Statistic;
use crate::store::MemoryLog;

/// Errors that can occur during JSON output generation.
#[derive(Debug, Error)]
pub enum JsonOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Summary block in JSON format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSummary {
    /// Number of cases classified
    pub total_cases: usize,
    /// Number of distinct match keys
    pub distinct_keys: usize,
    /// Number of keys shared by 2+ cases
    pub matching_groups: usize,
    /// Cases in a matching group
    pub matching_cases: usize,
    /// Cases with a unique key
    pub unique_cases: usize,
    /// Size of the largest matching group
    pub largest_group: usize,
    /// Percentage of cases in a matching group, one decimal place
    pub matching_rate: f64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DC000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from grouping statistics and an exit code.
    #[must_use]
    pub fn from_stats(stats: &GroupingStats, exit_code: ExitCode) -> Self {
        Self {
            total_cases: stats.total_rows,
            distinct_keys: stats.distinct_keys,
            matching_groups: stats.duplicate_groups,
            matching_cases: stats.matching_rows,
            unique_cases: stats.unique_rows,
            largest_group: stats.largest_group,
            matching_rate: (stats.matching_rate() * 10.0).round() / 10.0,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// JSON output formatter.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    success: bool,
    result: &'a DuplicateResult,
    statistics: &'a [Statistic],
    summary: JsonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    log: Option<&'a MemoryLog>,
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output formatter.
    #[must_use]
    pub fn new(result: &'a DuplicateResult, statistics: &'a [Statistic], exit_code: ExitCode) -> Self {
        Self {
            success: true,
            result,
            statistics,
            summary: JsonSummary::from_stats(&result.stats, exit_code),
            log: None,
        }
    }

    /// Include the result log entries.
    #[must_use]
    pub fn with_log(mut self, log: &'a MemoryLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns `JsonOutputError` if writing or serialization fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Cell, ColumnSpec, Dataset};
    use crate::duplicates::{process_duplicates, FinderConfig};
    use crate::statistics::{generate_statistics, StatisticsOptions};

    fn sample_result() -> DuplicateResult {
        let data = Dataset::from_parts(
            vec!["Name".to_string()],
            vec![
                vec![Cell::from("Ann")],
                vec![Cell::from("Bob")],
                vec![Cell::from("Ann")],
            ],
        );
        process_duplicates(&data, &FinderConfig::new(vec![ColumnSpec::new(0)]))
    }

    #[test]
    fn test_json_output_shape() {
        let result = sample_result();
        let stats = generate_statistics(
            &result.primary_values,
            &result.sequence_values,
            &StatisticsOptions::default(),
        );
        let output = JsonOutput::new(&result, &stats, ExitCode::Success);
        let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

        assert_eq!(json["success"], serde_json::json!(true));
        assert_eq!(json["result"]["primaryValues"], serde_json::json!([0, 1, 1]));
        assert_eq!(json["result"]["reorderedData"][1], serde_json::json!(["Ann"]));
        assert_eq!(json["statistics"][0]["title"], serde_json::json!("PrimaryLast Frequency"));
        assert_eq!(json["summary"]["matchingGroups"], serde_json::json!(1));
        assert_eq!(json["summary"]["matchingRate"], serde_json::json!(66.7));
        assert_eq!(json["summary"]["exitCodeName"], serde_json::json!("DC000"));
        assert!(json.get("log").is_none());
    }

    #[test]
    fn test_json_output_with_log() {
        use crate::store::ResultLog;

        let result = sample_result();
        let mut log = MemoryLog::new();
        log.add_log("IDENTIFY DUPLICATES");
        let output = JsonOutput::new(&result, &[], ExitCode::NoDuplicates).with_log(&log);
        let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
        assert_eq!(json["log"][0]["text"], serde_json::json!("IDENTIFY DUPLICATES"));
        assert_eq!(json["summary"]["exitCode"], serde_json::json!(2));
    }

    #[test]
    fn test_write_to_pretty() {
        let result = sample_result();
        let output = JsonOutput::new(&result, &[], ExitCode::Success);
        let mut buffer = Vec::new();
        output.write_to(&mut buffer, true).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("\n  \"success\": true"));
        assert!(text.ends_with('\n'));
    }
}
