//! Compiler output classification
//!
//! The compiler has no exit-code contract: a unit failed if its merged
//! output contained at least one error report, and was cancelled if the
//! build was cancelled while it ran, whatever the output said.

use regex::Regex;
use serde::Serialize;

use crate::core::diagnostics::Level;

/// Terminal state of one compile unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    /// Artifact produced
    Ok,
    /// Compiler reported errors, or the unit could not be started
    Failed,
    /// Build cancelled while the unit ran
    Cancelled,
}

/// Lines that mean the compilation cannot have succeeded
const FATAL_PREFIXES: &[&str] = &[
    "Exception in thread",
    "Error occurred during initialization of VM",
    "Could not find or load main class",
];

/// Inspects compiler output lines until the process exits
#[derive(Debug)]
pub struct OutputClassifier {
    error_line: Regex,
    errors_seen: usize,
}

impl OutputClassifier {
    /// Create a classifier in the running state
    pub fn new() -> Self {
        // `path(line): col: n Error: message` or a bare `Error: message`
        let error_line =
            Regex::new(r"(?:^|\s|:\s*)Error:(?:\s|$)").expect("Invalid error line pattern");
        Self {
            error_line,
            errors_seen: 0,
        }
    }

    /// Inspect one line of output and return the level to report it at
    pub fn inspect(&mut self, line: &str) -> Level {
        let trimmed = line.trim_start();
        let is_error = self.error_line.is_match(trimmed)
            || FATAL_PREFIXES.iter().any(|p| trimmed.starts_with(p));
        if is_error {
            self.errors_seen += 1;
            Level::Error
        } else {
            Level::Info
        }
    }

    /// Number of error lines seen so far
    pub fn errors_seen(&self) -> usize {
        self.errors_seen
    }

    /// Settle into the terminal state once the process has exited
    pub fn finish(self, cancelled: bool) -> OutcomeStatus {
        if cancelled {
            OutcomeStatus::Cancelled
        } else if self.errors_seen > 0 {
            OutcomeStatus::Failed
        } else {
            OutcomeStatus::Ok
        }
    }
}

impl Default for OutputClassifier {
    fn default() -> Self {
        Self::new()
    }
}
