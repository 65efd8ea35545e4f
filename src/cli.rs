//! Command-line interface definitions for dupecases.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! The CLI follows standard conventions with global options (verbosity, color) and
//! subcommands for different operations.
//!
//! Options that also exist in the config file are `Option`s here so an
//! absent flag falls through to the config layers.
//!
//! # Example
//!
//! ```bash
//! # Flag duplicates on Name + Age, newest ID is primary
//! dupecases identify people.csv -m Name -m Age -s ID --direction ascending --primary last
//!
//! # Frequency tables as JSON, result written to a new CSV
//! dupecases identify people.csv -m Name --sequence --output json --write flagged.csv
//!
//! # List the variables of a dataset
//! dupecases variables people.csv
//!
//! # Serve one JSON request on stdin
//! dupecases worker < request.json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::{PrimarySelection, SortDirection};

/// Identify duplicate cases in tabular datasets.
///
/// Groups rows that share the values of the matching variables, flags one
/// primary case per group, numbers the matching cases, and reports
/// frequency tables.
#[derive(Debug, Parser)]
#[command(name = "dupecases")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Additional config file (TOML), merged over the user config
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupecases.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Identify duplicate cases in a CSV dataset
    Identify(IdentifyArgs),
    /// List the variables of a CSV dataset
    Variables(VariablesArgs),
    /// Read one JSON worker request on stdin and answer on stdout
    Worker,
}

/// Arguments for the identify subcommand.
#[derive(Debug, Args)]
pub struct IdentifyArgs {
    /// CSV file with a header row
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Matching variable (can be specified multiple times)
    #[arg(short, long = "match", value_name = "VARIABLE", required = true)]
    pub matching: Vec<String>,

    /// Sorting variable within match groups (can be specified multiple times)
    #[arg(short, long = "sort", value_name = "VARIABLE")]
    pub sorting: Vec<String>,

    /// Sort direction for all sorting variables
    #[arg(long, value_enum, value_name = "DIRECTION")]
    pub direction: Option<DirectionArg>,

    /// Which case in each sorted group is primary
    #[arg(long, value_enum, value_name = "WHICH")]
    pub primary: Option<PrimaryArg>,

    /// Name of the primary indicator variable
    #[arg(long, value_name = "NAME")]
    pub primary_name: Option<String>,

    /// Also create the sequential count variable
    #[arg(long)]
    pub sequence: bool,

    /// Name of the sequential count variable
    #[arg(long, value_name = "NAME")]
    pub sequence_name: Option<String>,

    /// Move matching cases to the top of the file
    #[arg(long, conflicts_with = "keep_order")]
    pub move_to_top: bool,

    /// Keep the original case order
    #[arg(long)]
    pub keep_order: bool,

    /// Report frequency tables
    #[arg(long, conflicts_with = "no_frequencies")]
    pub frequencies: bool,

    /// Do not report frequency tables
    #[arg(long)]
    pub no_frequencies: bool,

    /// Field delimiter for reading and writing CSV
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Write the resulting dataset to this CSV file
    #[arg(short, long, value_name = "PATH")]
    pub write: Option<PathBuf>,
}

impl IdentifyArgs {
    /// Tri-state of `--move-to-top` / `--keep-order`.
    #[must_use]
    pub fn move_matching_to_top(&self) -> Option<bool> {
        flag_pair(self.move_to_top, self.keep_order)
    }

    /// Tri-state of `--frequencies` / `--no-frequencies`.
    #[must_use]
    pub fn display_frequencies(&self) -> Option<bool> {
        flag_pair(self.frequencies, self.no_frequencies)
    }

    /// `Some(true)` if `--sequence` was given, else defer to config.
    #[must_use]
    pub fn sequence_count(&self) -> Option<bool> {
        self.sequence.then_some(true)
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Arguments for the variables subcommand.
#[derive(Debug, Args)]
pub struct VariablesArgs {
    /// CSV file with a header row
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Field delimiter
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Sort direction argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl From<DirectionArg> for SortDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Ascending => SortDirection::Ascending,
            DirectionArg::Descending => SortDirection::Descending,
        }
    }
}

/// Primary selection argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PrimaryArg {
    /// First case after sorting
    First,
    /// Last case after sorting
    Last,
}

impl From<PrimaryArg> for PrimarySelection {
    fn from(arg: PrimaryArg) -> Self {
        match arg {
            PrimaryArg::First => PrimarySelection::First,
            PrimaryArg::Last => PrimarySelection::Last,
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary and tables
    Text,
    /// JSON for scripting
    Json,
    /// Resulting dataset as CSV
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
