//! CSV output formatter for the resulting dataset.
//!
//! Writes the header row and every case, including the indicator variables
//! the identify action appended.
//!
//! # Example
//!
//! ```
//! use dupecases::dataset::{Cell, Dataset};
//! use dupecases::output::csv::CsvOutput;
//!
//! let data = Dataset::from_parts(vec!["Name".to_string()], vec![vec![Cell::from("Ann")]]);
//! let text = CsvOutput::new(&data).to_csv_string().unwrap();
//! assert_eq!(text, "Name\nAnn\n");
//! ```

use std::io;
use std::path::Path;

use crate::dataset::{write_csv, write_csv_to, Dataset, DatasetError};

/// CSV output formatter.
pub struct CsvOutput<'a> {
    data: &'a Dataset,
    delimiter: char,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter using `,` as delimiter.
    #[must_use]
    pub fn new(data: &'a Dataset) -> Self {
        Self {
            data,
            delimiter: ',',
        }
    }

    /// Use a different field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), DatasetError> {
        write_csv_to(self.data, writer, self.delimiter)
    }

    /// Write the CSV output to a new file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be created or written.
    pub fn write_file(&self, path: &Path) -> Result<(), DatasetError> {
        write_csv(self.data, path, self.delimiter)
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if serialization fails.
    pub fn to_csv_string(&self) -> Result<String, DatasetError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
