//! Up-to-date check
//!
//! Compilation is skipped only when nothing changed and every artifact of
//! the plan is already on disk. Otherwise every unit is compiled.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::plan::BuildPlan;

/// Result of the up-to-date check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No changes and all outputs present
    UpToDate,
    /// At least one unit must be compiled
    NeedsCompilation,
}

/// Check a plan against the changed sources, probing outputs on disk
pub fn check(dirty: &BTreeSet<PathBuf>, plan: &BuildPlan) -> Freshness {
    check_with(dirty, &plan.expected_outputs(), Path::is_file)
}

/// Check the expected outputs against the changed sources using `is_file`
pub fn check_with<F>(dirty: &BTreeSet<PathBuf>, outputs: &[PathBuf], is_file: F) -> Freshness
where
    F: Fn(&Path) -> bool,
{
    if !dirty.is_empty() {
        tracing::debug!("{} changed sources", dirty.len());
        return Freshness::NeedsCompilation;
    }

    match outputs.iter().find(|p| !is_file(p)) {
        Some(missing) => {
            tracing::debug!("Output missing: {}", missing.display());
            Freshness::NeedsCompilation
        }
        None => Freshness::UpToDate,
    }
}
