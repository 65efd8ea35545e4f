//! Caller-level actions over a case store.
//!
//! # Identify
//!
//! The identify action resolves variable names, runs the grouping engine
//! and statistics generator on a worker thread, then writes the primary and
//! sequence indicator variables and the report:
//!
//! ```no_run
//! use dupecases::actions::identify::{identify_duplicates, IdentifyRequest};
//! use dupecases::dataset::read_csv;
//! use dupecases::store::{MemoryLog, MemoryStore};
//! use std::path::Path;
//!
//! let mut store = MemoryStore::new(read_csv(Path::new("people.csv"), ',').unwrap());
//! let mut log = MemoryLog::new();
//! let request = IdentifyRequest::new(vec!["Name".to_string(), "Age".to_string()]);
//! let outcome = identify_duplicates(&mut store, &mut log, &request, None).unwrap();
//! println!("duplicates found: {}", outcome.has_duplicates());
//! ```

pub mod identify;

// Re-export commonly used types
pub use identify::{
    identify_duplicates, IdentifyError, IdentifyOutcome, IdentifyRequest, IdentifySummary,
};
