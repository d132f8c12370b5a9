//! Build diagnostics
//!
//! Diagnostics are the only user-visible output of a build. Each one is
//! attributed to a compile unit by its display label.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Informational message or plain compiler output
    Info,
    /// Compiler error or unit failure
    Error,
}

/// A message attributed to a compile unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Unit display label, e.g. `[App (module web)]`
    pub label: String,
    /// Severity
    pub level: Level,
    /// Message text
    pub message: String,
}

impl Diagnostic {
    /// Create an informational diagnostic
    pub fn info(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            level: Level::Info,
            message: message.into(),
        }
    }

    /// Create an error diagnostic
    pub fn error(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Receiver of build diagnostics
pub trait DiagnosticSink: Send + Sync {
    /// Deliver one diagnostic
    fn report(&self, diagnostic: Diagnostic);
}

/// Sink that keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the diagnostics received so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages received so far, in order
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics().into_iter().map(|d| d.message).collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
