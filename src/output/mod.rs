//! Output formatters for identification results.
//!
//! This module provides different output formats:
//! - Text for people (summary plus frequency tables)
//! - JSON for automation and scripting
//! - CSV for the resulting dataset
//!
//! # Example
//!
//! ```
//! use dupecases::dataset::{Cell, ColumnSpec, Dataset};
//! use dupecases::duplicates::{process_duplicates, FinderConfig};
//! use dupecases::error::ExitCode;
//! use dupecases::output::json::JsonOutput;
//!
//! let data = Dataset::from_parts(
//!     vec!["Name".to_string()],
//!     vec![vec![Cell::from("Ann")], vec![Cell::from("Ann")]],
//! );
//! let result = process_duplicates(&data, &FinderConfig::new(vec![ColumnSpec::new(0)]));
//!
//! let output = JsonOutput::new(&result, &[], ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

// Re-export main types
pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;
