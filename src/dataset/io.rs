//! CSV reading and writing for datasets.
//!
//! The first record is the header. Field types are inferred per cell with
//! [`Cell::from_field`], so a column may mix numbers and text.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use super::{Cell, Dataset, DatasetError, Row};

fn delimiter_byte(delimiter: char) -> Result<u8, DatasetError> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(DatasetError::InvalidDelimiter(delimiter))
    }
}

/// Load a dataset from a CSV file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, is not valid CSV,
/// or has body rows that differ in width from the header.
pub fn read_csv(path: &Path, delimiter: char) -> Result<Dataset, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = read_csv_from(file, delimiter)?;
    log::debug!(
        "Loaded {} rows x {} columns from {}",
        data.body_len(),
        data.width(),
        path.display()
    );
    Ok(data)
}

/// Load a dataset from any CSV reader.
///
/// # Errors
///
/// See [`read_csv`].
pub fn read_csv_from<R: Read>(reader: R, delimiter: char) -> Result<Dataset, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter_byte(delimiter)?)
        .from_reader(reader);

    let mut rows: Vec<Row> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: Row = if rows.is_empty() {
            // Header cells are names, never numbers
            record.iter().map(|f| Cell::Text(f.to_string())).collect()
        } else {
            record.iter().map(Cell::from_field).collect()
        };
        rows.push(row);
    }

    let data = Dataset::new(rows);
    data.validate()?;
    Ok(data)
}

/// Write a dataset (header included) to a CSV file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be created or written.
pub fn write_csv(data: &Dataset, path: &Path, delimiter: char) -> Result<(), DatasetError> {
    let file = File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv_to(data, file, delimiter)?;
    log::info!("Wrote {} rows to {}", data.body_len(), path.display());
    Ok(())
}

/// Write a dataset to any writer as CSV.
///
/// # Errors
///
/// Returns [`DatasetError`] if serialization or writing fails.
pub fn write_csv_to<W: Write>(data: &Dataset, writer: W, delimiter: char) -> Result<(), DatasetError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .delimiter(delimiter_byte(delimiter)?)
        .from_writer(writer);

    for row in data.rows() {
        csv_writer.write_record(row.iter().map(Cell::key_string))?;
    }

    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
