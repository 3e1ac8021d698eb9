//! Terminal UI for one-shot pipeline runs, rendered via `indicatif`.

use std::time::Duration;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::pipeline::{AttemptRecord, RunOutcome};

/// Spinner-based attempt log for `rexec run`.
///
/// One spinner tracks the in-flight attempt; completed attempts are printed
/// above it as plain lines so the history survives the spinner.
pub struct RunUi {
    multi: MultiProgress,
    attempt_bar: ProgressBar,
    verbose: bool,
}

impl RunUi {
    pub fn new(verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");

        let attempt_bar = multi.add(ProgressBar::new_spinner());
        attempt_bar.set_style(style);
        attempt_bar.set_prefix("Attempt");

        Self {
            multi,
            attempt_bar,
            verbose,
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the
    /// rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Start the spinner for a new attempt.
    pub fn start_attempt(&self, attempt: u32, max: u32) {
        self.attempt_bar.set_message(format!(
            "{}/{} {}",
            style(attempt).cyan(),
            max,
            style("(generating...)").dim()
        ));
        self.attempt_bar
            .enable_steady_tick(Duration::from_millis(100));
    }

    /// Record the outcome of a finished attempt.
    pub fn attempt_outcome(&self, record: &AttemptRecord) {
        self.attempt_bar.disable_steady_tick();
        if record.success {
            self.print_line(format!(
                "{} Attempt {}/{} succeeded",
                style("✓").green(),
                record.attempt,
                record.total_attempts
            ));
        } else {
            let error = record.error.as_deref().unwrap_or("unknown error");
            let summary = first_line(error, 120);
            self.print_line(format!(
                "{} Attempt {}/{} failed: {}",
                style("✗").red(),
                record.attempt,
                record.total_attempts,
                style(summary).dim()
            ));
            if self.verbose && !record.code.is_empty() {
                self.print_line(format!("{}", style("--- generated code ---").dim()));
                self.print_line(&record.code);
            }
        }
    }

    /// Final summary, printed after the loop ends.
    pub fn finish(&self, outcome: &RunOutcome) {
        self.attempt_bar.finish_and_clear();
        if outcome.success {
            self.print_line(format!(
                "{} Completed in {:.1}s after {} attempt(s)",
                style("✓").green().bold(),
                outcome.total_time_secs,
                outcome.attempts.len()
            ));
            if let Some(output) = &outcome.final_result.output
                && !output.is_empty()
            {
                self.print_line(format!("{}", style("--- output ---").dim()));
                self.print_line(output.trim_end());
            }
        } else {
            self.print_line(format!(
                "{} Failed after {} attempt(s) in {:.1}s",
                style("✗").red().bold(),
                outcome.attempts.len(),
                outcome.total_time_secs
            ));
        }
    }
}

/// Truncate to the first line, ellipsized at `max` chars.
fn first_line(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let truncated: String = line.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
