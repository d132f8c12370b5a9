//! Output formatting and progress indicators
//!
//! This module provides the global output mode, the console diagnostic
//! sink, spinners and formatted error display.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::OnceLock;

use crate::core::diagnostics::{Diagnostic, DiagnosticSink, Level};

static GLOBAL_OUTPUT: OnceLock<OutputConfig> = OnceLock::new();

/// Output mode selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputConfig {
    /// Suppress everything except errors
    pub quiet: bool,
    /// Emit JSON lines
    pub json: bool,
    /// Verbosity level (`-v` count)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Make this the process-wide output configuration
    ///
    /// Only the first call has an effect.
    pub fn apply_global(self) {
        let _ = GLOBAL_OUTPUT.set(self);
    }

    /// The process-wide output configuration
    pub fn global() -> Self {
        GLOBAL_OUTPUT.get().copied().unwrap_or_default()
    }

    /// Whether interactive decorations (spinners) should be shown
    pub fn interactive(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Prints build diagnostics to the terminal
///
/// Errors go to stderr; informational lines go to stdout unless quiet.
/// In JSON mode every diagnostic is one JSON object per line on stdout.
#[derive(Clone)]
pub struct ConsoleSink {
    config: OutputConfig,
    spinner: Option<ProgressBar>,
}

impl ConsoleSink {
    /// Create a sink; output is printed around `spinner` when given
    pub fn new(config: OutputConfig, spinner: Option<ProgressBar>) -> Self {
        Self { config, spinner }
    }

    /// Render a diagnostic as a terminal line
    pub fn format(diagnostic: &Diagnostic) -> String {
        match diagnostic.level {
            Level::Error => format!("{} {} {}", status::ERROR, diagnostic.label, diagnostic.message),
            Level::Info => format!("  {} {}", diagnostic.label, diagnostic.message),
        }
    }

    fn print(&self, diagnostic: &Diagnostic) {
        if self.config.json {
            if let Ok(line) = serde_json::to_string(diagnostic) {
                println!("{line}");
            }
            return;
        }

        match diagnostic.level {
            Level::Error => eprintln!("{}", Self::format(diagnostic)),
            Level::Info if !self.config.quiet => println!("{}", Self::format(diagnostic)),
            Level::Info => {}
        }
    }
}

impl DiagnosticSink for ConsoleSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| self.print(&diagnostic)),
            None => self.print(&diagnostic),
        }
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print a top-level error with its cause chain
pub fn display_error(error: &anyhow::Error) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        let _ = writeln!(stderr, "  Caused by: {cause}");
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
