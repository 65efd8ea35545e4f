//! Progress reporting utilities using indicatif.
//!
//! The engine reports its phases (`keying`, `sorting`) through
//! [`ProgressCallback`]; the CLI additionally reports a `job` phase while it
//! waits for the background worker. [`Progress`] renders these as a single
//! spinner on stderr: a phase started while another is running only changes
//! the spinner message, and the spinner stays up until the outermost phase
//! ends. Reporting is optional: library callers that pass no callback pay
//! nothing.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress callback for the duplicate identification phases.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "keying", "sorting")
    /// * `total` - Total number of items the phase will process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// The running spinner and the phases currently open, outermost first.
struct Spinner {
    bar: ProgressBar,
    phases: Vec<String>,
}

/// Spinner-based progress reporter.
pub struct Progress {
    spinner: Mutex<Option<Spinner>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupecases::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn describe(phase: &str) -> String {
        match phase {
            "job" => "Identifying duplicate cases".to_string(),
            "keying" => "Building match keys".to_string(),
            "sorting" => "Sorting matching groups".to_string(),
            other => other.to_string(),
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }
        log::trace!("Phase {} started with {} item(s)", phase, total);
        let mut slot = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(spinner) => {
                spinner.phases.push(phase.to_string());
                spinner.bar.set_message(Self::describe(phase));
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(Self::style());
                bar.set_message(Self::describe(phase));
                bar.enable_steady_tick(Duration::from_millis(100));
                *slot = Some(Spinner {
                    bar,
                    phases: vec![phase.to_string()],
                });
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        let mut slot = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(spinner) = slot.as_mut() else {
            return;
        };
        if let Some(pos) = spinner.phases.iter().rposition(|p| p == phase) {
            spinner.phases.remove(pos);
        }
        let outer = spinner.phases.last().cloned();
        match outer {
            Some(outer) => spinner.bar.set_message(Self::describe(&outer)),
            None => {
                if let Some(done) = slot.take() {
                    done.bar.finish_and_clear();
                    log::debug!("Phase {} finished in {:?}", phase, done.bar.elapsed());
                }
            }
        }
    }
}
