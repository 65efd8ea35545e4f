//! dupecases - Identify duplicate cases in tabular datasets
//!
//! Groups the rows of a dataset by the values of one or more matching
//! variables, flags one primary case per group, numbers the cases inside
//! each matching group, optionally moves matching cases to the top, and
//! summarizes the result as frequency tables.
//!
//! # Layout
//!
//! * [`dataset`]: cells, rows, variables, CSV I/O
//! * [`duplicates`]: the grouping engine
//! * [`statistics`]: frequency tables from the classification vectors
//! * [`worker`]: background execution boundary (thread + JSON transport)
//! * [`store`]: case store and result log abstractions
//! * [`actions`]: the identify action over a store
//! * [`output`]: text, JSON and CSV formatters

pub mod actions;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod statistics;
pub mod store;
pub mod worker;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::identify::{identify_duplicates, IdentifyOutcome, IdentifyRequest};
use crate::cli::{Cli, Commands, IdentifyArgs, OutputFormat, VariablesArgs};
use crate::config::Config;
use crate::dataset::read_csv;
use crate::duplicates::DuplicateResult;
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::store::{CaseStore, MemoryLog, MemoryStore};

/// Merge CLI arguments over the loaded configuration.
#[must_use]
pub fn identify_request(args: &IdentifyArgs, config: &Config) -> IdentifyRequest {
    let primary_selection = args.primary.map_or(config.primary_selection, Into::into);
    let primary_indicator_name = args
        .primary_name
        .clone()
        .or_else(|| config.primary_indicator_name.clone());

    IdentifyRequest {
        matching: args.matching.clone(),
        sorting: args.sorting.clone(),
        sort_direction: args.direction.map_or(config.sort_direction, Into::into),
        primary_selection,
        primary_indicator_name,
        sequence_count_enabled: args.sequence_count().unwrap_or(config.sequence_count),
        sequence_indicator_name: args
            .sequence_name
            .clone()
            .unwrap_or_else(|| config.sequence_indicator_name.clone()),
        move_matching_to_top: args
            .move_matching_to_top()
            .unwrap_or(config.move_matching_to_top),
        display_frequencies: args
            .display_frequencies()
            .unwrap_or(config.display_frequencies),
    }
}

/// Run the application with parsed arguments.
///
/// # Errors
///
/// Returns an error if configuration, input, or identification fails.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let Cli {
        quiet,
        no_color,
        config,
        command,
        ..
    } = cli;

    let config = Config::load(config.as_deref()).context("Failed to load configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    match command {
        Commands::Identify(args) => run_identify(&args, &config, quiet, !no_color),
        Commands::Variables(args) => run_variables(&args, &config, !no_color),
        Commands::Worker => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let response = worker::serve(stdin.lock(), stdout.lock())?;
            Ok(if response.success {
                ExitCode::Success
            } else {
                ExitCode::GeneralError
            })
        }
    }
}

fn run_identify(
    args: &IdentifyArgs,
    config: &Config,
    quiet: bool,
    color: bool,
) -> anyhow::Result<ExitCode> {
    let delimiter = args.delimiter.unwrap_or(config.delimiter);
    let request = identify_request(args, config);

    let data = read_csv(&args.input, delimiter)
        .with_context(|| format!("Failed to read dataset {}", args.input.display()))?;
    log::info!(
        "Loaded {} case(s) and {} variable(s) from {}",
        data.body_len(),
        data.width(),
        args.input.display()
    );

    let mut store = MemoryStore::new(data);
    let mut log = MemoryLog::new();
    let progress: Arc<dyn ProgressCallback> =
        Arc::new(Progress::new(quiet || args.output != OutputFormat::Text));

    let outcome = identify_duplicates(&mut store, &mut log, &request, Some(progress))?;
    let exit_code = if outcome.has_duplicates() {
        ExitCode::Success
    } else {
        ExitCode::NoDuplicates
    };

    let (result, statistics) = match outcome {
        IdentifyOutcome::Applied(summary) => (summary.result, summary.statistics),
        IdentifyOutcome::TooFewRows => (
            DuplicateResult {
                reordered: store.dataset().clone(),
                ..DuplicateResult::default()
            },
            Vec::new(),
        ),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => {
            let text = TextOutput::new(&request.matching, &result.stats, &statistics)
                .with_color(color)
                .render();
            write!(out, "{text}")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&result, &statistics, exit_code)
                .with_log(&log)
                .write_to(&mut out, true)?;
        }
        OutputFormat::Csv => {
            CsvOutput::new(store.dataset())
                .with_delimiter(delimiter)
                .write_to(&mut out)?;
        }
    }

    if let Some(ref path) = args.write {
        CsvOutput::new(store.dataset())
            .with_delimiter(delimiter)
            .write_file(path)
            .with_context(|| format!("Failed to write dataset {}", path.display()))?;
    }

    Ok(exit_code)
}

fn run_variables(args: &VariablesArgs, config: &Config, color: bool) -> anyhow::Result<ExitCode> {
    let delimiter = args.delimiter.unwrap_or(config.delimiter);
    let data = read_csv(&args.input, delimiter)
        .with_context(|| format!("Failed to read dataset {}", args.input.display()))?;
    let variables = data.variables();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => write!(out, "{}", output::text::render_variables(&variables, color))?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&variables)?)?,
        OutputFormat::Csv => {
            let mut writer = ::csv::Writer::from_writer(&mut out);
            writer.write_record(["index", "name", "kind"])?;
            for var in &variables {
                writer.write_record([var.index.to_string(), var.name.clone(), var.kind.to_string()])?;
            }
            writer.flush()?;
        }
    }
    Ok(ExitCode::Success)
}
