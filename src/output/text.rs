//! Human-readable text output.
//!
//! Renders a one-paragraph summary followed by each frequency table:
//!
//! ```text
//! Identify Duplicate Cases
//!   Matching variables: Name, Age
//!   10 cases, 3 matching groups, 6 matching cases, 4 unique cases
//!
//! PrimaryLast Frequency
//!                   Frequency  Percent
//!   Duplicate case          3     30.0
//!   Primary case            7     70.0
//!   Total                  10    100.0
//! ```
//!
//! Titles are styled with `yansi` when color is enabled.

use std::fmt::Write as _;

use yansi::Paint;

use crate::dataset::Variable;
use crate::duplicates::GroupingStats;
use crate::statistics::{FrequencyTable, Statistic};

/// Text output formatter.
pub struct TextOutput<'a> {
    matching: &'a [String],
    stats: &'a GroupingStats,
    statistics: &'a [Statistic],
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a text formatter.
    #[must_use]
    pub fn new(matching: &'a [String], stats: &'a GroupingStats, statistics: &'a [Statistic]) -> Self {
        Self {
            matching,
            stats,
            statistics,
            color: true,
        }
    }

    /// Enable or disable ANSI styling.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Render everything to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", title(crate::actions::identify::ANALYTIC_TITLE, self.color));
        let _ = writeln!(out, "  Matching variables: {}", self.matching.join(", "));
        let _ = writeln!(
            out,
            "  {} cases, {} matching groups, {} matching cases, {} unique cases",
            self.stats.total_rows,
            self.stats.duplicate_groups,
            self.stats.matching_rows,
            self.stats.unique_rows
        );
        for statistic in self.statistics {
            out.push('\n');
            let _ = writeln!(out, "{}", title(&statistic.title, self.color));
            out.push_str(&render_table(&statistic.output));
        }
        out
    }
}

fn title(text: &str, color: bool) -> String {
    if color {
        text.bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

/// Render a frequency table with right-aligned numbers.
#[must_use]
pub fn render_table(table: &FrequencyTable) -> String {
    let label_width = table
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);
    let heading = |i: usize| table.columns.get(i).map_or("", String::as_str);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<label_width$}  {:>9}  {:>7}",
        heading(0),
        heading(1),
        heading(2)
    );
    for row in &table.rows {
        let _ = writeln!(
            out,
            "  {:<label_width$}  {:>9}  {:>7}",
            row.label, row.count, row.percent
        );
    }
    out
}

/// Render a variable listing.
#[must_use]
pub fn render_variables(variables: &[Variable], color: bool) -> String {
    let name_width = variables
        .iter()
        .map(|v| v.name.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "{}", title("Variables", color));
    for var in variables {
        let _ = writeln!(
            out,
            "  {:>3}  {:<name_width$}  {}",
            var.index, var.name, var.kind
        );
    }
    out
}
