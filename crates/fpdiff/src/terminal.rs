//! Terminal UI utilities for progress indication and styled output.

use std::borrow::Cow;
use std::io::{self, Write};
use std::time::Duration;

use console::style;
use fpdiff::{Report, ReportSink, ResultPair};
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner for indeterminate progress.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Create a new spinner with a message.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(spinner_style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Finish the spinner with a success message.
    pub fn finish_with_success(&self, message: &str) {
        self.bar.finish_and_clear();
        success(message);
    }

    /// Finish the spinner with a failure message.
    pub fn finish_with_failure(&self, message: &str) {
        self.bar.finish_and_clear();
        error(message);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

// ============================================================================
// Styled output helpers
// ============================================================================

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

// ============================================================================
// Report sink
// ============================================================================

/// Passing blocks to stdout, failing blocks to stderr in red.
pub struct ConsoleSink {
    quiet: bool,
}

impl ConsoleSink {
    /// With `quiet`, passing blocks and the summary are suppressed.
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ReportSink for ConsoleSink {
    fn pass(&mut self, _pair: &ResultPair, block: &str) {
        if !self.quiet {
            println!("{block}");
        }
    }

    fn fail(&mut self, _pair: &ResultPair, block: &str) {
        // Flush first so blocks stay in sample order.
        let _ = io::stdout().flush();
        eprintln!("{}", style(block).red());
    }

    fn finish(&mut self, report: &Report) {
        if self.quiet {
            return;
        }
        let _ = io::stdout().flush();
        if report.all_passed() {
            success(&report.summary());
        } else {
            warning(&report.summary());
        }
    }
}
