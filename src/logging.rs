//! Logging infrastructure for dupecases.
//!
//! Structured logging uses the `log` facade with the `env_logger` backend.
//! Log output goes to stderr so it never mixes with JSON or CSV on stdout.
//! Levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! # Example
//!
//! ```rust,no_run
//! use dupecases::logging::init_logging;
//!
//! // Debug level, e.g. for `dupecases -v identify ...`
//! init_logging(1, false);
//!
//! log::debug!("Matching on 2 variables");
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by `RUST_LOG`)
///
/// Calling it again is harmless: `env_logger` can only be installed once
/// per process, so later calls keep the first logger.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    match from_env {
        Some(_) => {
            builder.parse_default_env();
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        log::trace!("Logger already initialized; keeping existing configuration");
        return;
    }

    match from_env {
        Some(spec) => log::debug!("Logging initialized from RUST_LOG={:?}", spec),
        None => log::debug!("Logging initialized at level: {}", current_level_name()),
    }
}

/// Determine the log level from CLI flags.
///
/// `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Configure the log format.
///
/// Debug builds prefix a timestamp; any `-v` adds the module path. Release
/// builds print the level and message only.
fn configure_format(builder: &mut Builder, verbose: u8) {
    let with_timestamp = cfg!(debug_assertions);
    let with_module = verbose >= 1;

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if with_timestamp {
            write!(buf, "{} ", buf.timestamp_seconds())?;
        }
        write!(buf, "{style}{level:<5}{style:#} ")?;
        if with_module {
            write!(buf, "[{}] ", record.module_path().unwrap_or("unknown"))?;
        }
        writeln!(buf, "{}", record.args())
    });
}

/// Get the current log level as a string.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
