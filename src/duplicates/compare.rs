//! Numeric-if-parseable cell comparison used for in-group sorting.
//!
//! Both operands are parsed as floating-point numbers the lenient way a
//! spreadsheet user would expect: leading whitespace is skipped and the
//! longest numeric prefix is taken (`"12kg"` is `12`). If both parse, they
//! compare numerically. Otherwise the cells compare by their string form.
//!
//! On columns that mix numbers and text this ordering is not transitive.
//! That is accepted: the input is loosely typed and the comparison mirrors
//! it rather than rejecting it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dataset::Cell;

/// Direction applied uniformly to all sorting columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Natural order
    #[default]
    Ascending,
    /// Reversed comparison result
    Descending,
}

impl SortDirection {
    /// Apply this direction to a natural-order comparison.
    #[must_use]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Numeric value of a cell, if it parses as one.
#[must_use]
pub fn numeric_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if !n.is_nan() => Some(*n),
        Cell::Number(_) | Cell::Empty => None,
        Cell::Text(s) => parse_leading_float(s),
    }
}

/// Parse the longest floating-point prefix of `s`.
///
/// Accepts an optional sign, digits with an optional fraction, an optional
/// exponent, and the literal `Infinity`. Returns `None` when no digits are
/// found.
#[must_use]
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts if at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Compare two cells, numerically when both parse as numbers.
///
/// Missing cells (out-of-range columns) compare equal to each other and as
/// empty strings against present cells.
#[must_use]
pub fn compare_cells(a: Option<&Cell>, b: Option<&Cell>) -> Ordering {
    let num_a = a.and_then(numeric_value);
    let num_b = b.and_then(numeric_value);

    if let (Some(x), Some(y)) = (num_a, num_b) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    let text_a = a.map(Cell::key_string).unwrap_or_default();
    let text_b = b.map(Cell::key_string).unwrap_or_default();
    text_a.cmp(&text_b)
}
