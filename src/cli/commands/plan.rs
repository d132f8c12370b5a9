//! Plan command implementation
//!
//! Implements `flexbuild plan`: prints the compile units each selected
//! build configuration expands into, without compiling anything.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::output::OutputConfig;
use crate::config::defaults::MANIFEST_FILE;
use crate::core::manifest::Manifest;
use crate::core::plan;
use crate::core::unit::{BuildTarget, OutputKind};

/// One unit of an expanded plan, as shown to the user
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlannedUnit {
    /// Display label
    pub label: String,
    /// Artifact kind
    pub kind: OutputKind,
    /// Entry class or stylesheet
    pub main_class: String,
    /// Artifact path
    pub output: PathBuf,
    /// Derived from the main configuration
    pub temporary: bool,
}

/// Expanded plan of one build target
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlannedTarget {
    /// Target identifier (`module/configuration`)
    pub target: String,
    /// Units in build order
    pub units: Vec<PlannedUnit>,
}

/// Expand a target into its printable plan
pub fn describe(target: &BuildTarget) -> PlannedTarget {
    let plan = plan::expand(&target.main, &target.module);
    PlannedTarget {
        target: target.id(),
        units: plan
            .units()
            .iter()
            .map(|unit| PlannedUnit {
                label: unit.display_name(),
                kind: unit.kind,
                main_class: unit.main_class.clone(),
                output: unit.output_file_path(),
                temporary: unit.temporary,
            })
            .collect(),
    }
}

/// Execute the plan command
pub fn execute(project_dir: &Path, module: Option<&str>, config: Option<&str>) -> Result<()> {
    let manifest_path = project_dir.join(MANIFEST_FILE);
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("Failed to load {}", manifest_path.display()))?;
    let targets = manifest
        .select_targets(project_dir, module, config)
        .context("Failed to select build configurations")?;

    let planned: Vec<PlannedTarget> = targets.iter().map(describe).collect();

    if OutputConfig::global().json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
        return Ok(());
    }

    for target in &planned {
        println!("{}", target.target);
        for (index, unit) in target.units.iter().enumerate() {
            println!(
                "  {}. {} {:?} -> {}",
                index + 1,
                unit.label,
                unit.kind,
                unit.output.display()
            );
        }
    }
    Ok(())
}
