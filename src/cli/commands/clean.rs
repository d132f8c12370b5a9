//! CLI implementation for `flexbuild clean` command
//!
//! Removes the project's `.flexbuild/` directory: incremental build state
//! and generated compiler configs. Compiled artifacts are left in place.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::output::{status, OutputConfig};
use crate::config::defaults::{MANIFEST_FILE, STATE_DIR};
use crate::infra::filesystem;

/// Execute the clean command
pub fn execute(path: &Path) -> Result<()> {
    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        anyhow::bail!("No {MANIFEST_FILE} found in {}", path.display());
    }

    let quiet = OutputConfig::global().quiet;
    let state_dir = path.join(STATE_DIR);
    if !state_dir.exists() {
        if !quiet {
            println!("{} Nothing to clean", status::SUCCESS);
        }
        return Ok(());
    }

    filesystem::remove_dir_all(&state_dir).context("Failed to clean build state")?;

    if !quiet {
        println!("{} Removed {STATE_DIR}/", status::SUCCESS);
    }
    Ok(())
}
