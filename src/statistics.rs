//! Frequency tables for the duplicate classification.
//!
//! [`generate_statistics`] turns the engine's classification vectors into
//! one frequency table for the primary/duplicate indicator and, optionally,
//! one for the sequence numbers. Every table ends with a `Total` row whose
//! count is the number of classified rows and whose percent is `"100.0"`.
//!
//! Percentages are computed independently per row and formatted with one
//! decimal place, so category rows need not sum to exactly `100.0`.
//!
//! # Example
//!
//! ```
//! use dupecases::statistics::{generate_statistics, StatisticsOptions};
//!
//! let stats = generate_statistics(&[1, 0, 1, 0, 1], &[0; 5], &StatisticsOptions::default());
//!
//! assert_eq!(stats.len(), 1);
//! let rows = &stats[0].output.rows;
//! assert_eq!(rows[0].label, "Duplicate case");
//! assert_eq!(rows[0].percent, "40.0");
//! assert_eq!(rows[2].label, "Total");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Component tag attached to every frequency table.
pub const FREQUENCY_COMPONENT: &str = "Frequency Table";

/// Label for rows whose primary indicator is 0.
pub const DUPLICATE_LABEL: &str = "Duplicate case";
/// Label for rows whose primary indicator is 1.
pub const PRIMARY_LABEL: &str = "Primary case";
/// Label for sequence number 0.
pub const NON_MATCHING_LABEL: &str = "Non-matching case";
/// Label for the trailing total row.
pub const TOTAL_LABEL: &str = "Total";

/// Inputs besides the classification vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsOptions {
    /// Name of the primary indicator variable, used in the first title
    pub primary_indicator_name: String,
    /// Whether to emit the sequence-number table
    pub sequence_count_enabled: bool,
    /// Name of the sequence variable, used in the second title
    pub sequence_indicator_name: String,
}

impl Default for StatisticsOptions {
    fn default() -> Self {
        Self {
            primary_indicator_name: "PrimaryLast".to_string(),
            sequence_count_enabled: false,
            sequence_indicator_name: "MatchSequence".to_string(),
        }
    }
}

/// One category (or total) row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRow {
    /// Category label
    pub label: String,
    /// Number of rows in the category
    pub count: usize,
    /// Share of all rows, one decimal place
    pub percent: String,
}

impl FrequencyRow {
    fn category(label: impl Into<String>, count: usize, total: usize) -> Self {
        Self {
            label: label.into(),
            count,
            percent: format_percent(count, total),
        }
    }

    fn total(total: usize) -> Self {
        Self {
            label: TOTAL_LABEL.to_string(),
            count: total,
            percent: "100.0".to_string(),
        }
    }
}

/// Tabular payload of a statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    /// Column headings
    pub columns: Vec<String>,
    /// Category rows followed by the total row
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    fn new(rows: Vec<FrequencyRow>) -> Self {
        Self {
            columns: vec![
                String::new(),
                "Frequency".to_string(),
                "Percent".to_string(),
            ],
            rows,
        }
    }

    /// The trailing total row.
    #[must_use]
    pub fn total(&self) -> Option<&FrequencyRow> {
        self.rows.last().filter(|r| r.label == TOTAL_LABEL)
    }

    /// Category rows (everything except the total).
    #[must_use]
    pub fn categories(&self) -> &[FrequencyRow] {
        match self.total() {
            Some(_) => &self.rows[..self.rows.len() - 1],
            None => &self.rows,
        }
    }
}

/// A titled frequency table ready for a report log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    /// Table title
    pub title: String,
    /// Descriptive text
    pub description: String,
    /// Component kind tag
    pub component: String,
    /// Tabular output
    pub output: FrequencyTable,
}

/// Percentage of `count` in `total`, one decimal place.
#[must_use]
pub fn format_percent(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", 100.0 * count as f64 / total as f64)
}

/// Build frequency tables from the classification vectors.
///
/// Returns an empty list when there are no classified rows, one table
/// otherwise, and two when `sequence_count_enabled` is set.
#[must_use]
pub fn generate_statistics(
    primary_values: &[u8],
    sequence_values: &[u32],
    options: &StatisticsOptions,
) -> Vec<Statistic> {
    let total = primary_values.len();
    if total == 0 {
        return Vec::new();
    }

    let primary_count = primary_values.iter().filter(|&&v| v == 1).count();
    let duplicate_count = total - primary_count;

    let mut statistics = vec![Statistic {
        title: format!("{} Frequency", options.primary_indicator_name),
        description: format!(
            "Frequency of primary and duplicate cases as recorded in {}",
            options.primary_indicator_name
        ),
        component: FREQUENCY_COMPONENT.to_string(),
        output: FrequencyTable::new(vec![
            FrequencyRow::category(DUPLICATE_LABEL, duplicate_count, total),
            FrequencyRow::category(PRIMARY_LABEL, primary_count, total),
            FrequencyRow::total(total),
        ]),
    }];

    if options.sequence_count_enabled {
        let mut tally: BTreeMap<u32, usize> = BTreeMap::new();
        for &value in sequence_values {
            *tally.entry(value).or_default() += 1;
        }
        let seq_total = sequence_values.len();

        let mut rows: Vec<FrequencyRow> = tally
            .into_iter()
            .map(|(value, count)| {
                let label = if value == 0 {
                    NON_MATCHING_LABEL.to_string()
                } else {
                    format!("Sequence {value}")
                };
                FrequencyRow::category(label, count, seq_total)
            })
            .collect();
        rows.push(FrequencyRow::total(seq_total));

        statistics.push(Statistic {
            title: format!("{} Frequency", options.sequence_indicator_name),
            description: format!(
                "Sequential count of matching cases as recorded in {}",
                options.sequence_indicator_name
            ),
            component: FREQUENCY_COMPONENT.to_string(),
            output: FrequencyTable::new(rows),
        });
    }

    log::debug!(
        "Generated {} frequency table(s) for {} rows",
        statistics.len(),
        total
    );
    statistics
}
