//! Build command implementation
//!
//! Implements `flexbuild build`: loads the manifest, builds every selected
//! target through the orchestrator and reports a summary. Ctrl-C cancels
//! the running compiler and stops the build.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::cli::output::{create_spinner, status, ConsoleSink, OutputConfig};
use crate::config::defaults::MANIFEST_FILE;
use crate::core::builder::{BuildOrchestrator, BuildOutcome};
use crate::core::manifest::Manifest;
use crate::infra::compiler::ProcessCompiler;
use crate::infra::dirs::FlexbuildDirs;
use crate::infra::provisioner::FileConfigProvisioner;
use crate::infra::sdk::SdkRegistry;
use crate::infra::state::StateStore;
use crate::infra::toolchain::JavaToolchain;

/// Build options
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Build only configurations of this module
    pub module: Option<String>,
    /// Build only this configuration
    pub config: Option<String>,
    /// Skip the up-to-date check
    pub force: bool,
}

/// Wire the production collaborators for a project
pub fn orchestrator(
    project_dir: &Path,
    manifest: &Manifest,
) -> BuildOrchestrator<ProcessCompiler, StateStore> {
    let toolchain = match &manifest.project.java {
        Some(java) => JavaToolchain::new(java.clone()),
        None => JavaToolchain::detect(),
    };
    let toolchain = match &manifest.project.compiler_heap {
        Some(heap) => toolchain.with_heap(heap.clone()),
        None => toolchain,
    };

    let compiler = ProcessCompiler::new(
        Arc::new(FileConfigProvisioner::for_project(project_dir)),
        Arc::new(SdkRegistry::new(manifest.sdks.clone())),
        toolchain,
        FlexbuildDirs::new().compiler_work_dir(),
    )
    .with_project_options(manifest.project.additional_options.clone());

    BuildOrchestrator::new(compiler, StateStore::for_project(project_dir))
}

/// Execute the build command
pub async fn execute(project_dir: &Path, options: BuildOptions) -> Result<()> {
    let manifest_path = project_dir.join(MANIFEST_FILE);
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("Failed to load {}", manifest_path.display()))?;

    let targets = manifest
        .select_targets(
            project_dir,
            options.module.as_deref(),
            options.config.as_deref(),
        )
        .context("Failed to select build configurations")?;

    let output = OutputConfig::global();
    if targets.is_empty() {
        if !output.quiet {
            println!("{} No build configurations in {MANIFEST_FILE}", status::INFO);
        }
        return Ok(());
    }

    tracing::info!(
        "Building project {} ({} configurations)",
        manifest.project.name,
        targets.len()
    );

    let orchestrator = orchestrator(project_dir, &manifest).with_force(options.force);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling build");
            on_interrupt.cancel();
        }
    });

    let spinner = output.interactive().then(|| create_spinner("Building"));
    let sink = ConsoleSink::new(output, spinner.clone());

    let mut built = 0usize;
    let mut up_to_date = 0usize;
    let mut failed = Vec::new();
    let mut cancelled = false;

    for target in &targets {
        if let Some(pb) = &spinner {
            pb.set_message(format!("Building {}", target.id()));
        }

        let outcome = orchestrator
            .build(target, &sink, &cancel)
            .await
            .with_context(|| format!("Failed to build {}", target.id()))?;

        match outcome {
            BuildOutcome::UpToDate => up_to_date += 1,
            BuildOutcome::Succeeded { .. } => built += 1,
            BuildOutcome::Failed { .. } => failed.push(target.id()),
            BuildOutcome::Cancelled { .. } => {
                cancelled = true;
                break;
            }
        }
    }

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if cancelled {
        bail!("Build cancelled");
    }
    if !failed.is_empty() {
        bail!("Build failed for: {}", failed.join(", "));
    }

    if output.json {
        println!(
            "{}",
            serde_json::json!({ "built": built, "up_to_date": up_to_date })
        );
    } else if !output.quiet {
        println!("{} Build complete!", status::SUCCESS);
        println!("  Compiled: {built}");
        println!("  Up to date: {up_to_date}");
    }
    Ok(())
}
