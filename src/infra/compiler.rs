//! Compiler invocation
//!
//! [`ProcessCompiler`] prepares everything a unit needs before a compiler
//! process can exist (config files, output path, SDK, command line) and
//! then hands over to [`CompilerProcess`]. Any failure during preparation
//! is reported as a [`UnitError`] and no process is started.

use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::builder::UnitRunner;
use crate::core::classify::OutcomeStatus;
use crate::core::command::{build_command, entry_point, toolchain_command, OptionSources};
use crate::core::context::{ConfigProvisioner, SdkLookup};
use crate::core::diagnostics::DiagnosticSink;
use crate::core::options::MacroContext;
use crate::core::unit::{BuildTarget, CompileUnit};
use crate::error::{SdkError, UnitError};
use crate::infra::filesystem;
use crate::infra::process::CompilerProcess;
use crate::infra::toolchain::JavaToolchain;

/// Runs SDK compilers as child processes
#[derive(Clone)]
pub struct ProcessCompiler {
    provisioner: Arc<dyn ConfigProvisioner>,
    sdks: Arc<dyn SdkLookup>,
    toolchain: JavaToolchain,
    project_options: String,
    work_dir: PathBuf,
}

impl std::fmt::Debug for ProcessCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessCompiler")
            .field("toolchain", &self.toolchain)
            .field("project_options", &self.project_options)
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

impl ProcessCompiler {
    /// Create a compiler running in `work_dir`
    pub fn new(
        provisioner: Arc<dyn ConfigProvisioner>,
        sdks: Arc<dyn SdkLookup>,
        toolchain: JavaToolchain,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            provisioner,
            sdks,
            toolchain,
            project_options: String::new(),
            work_dir,
        }
    }

    /// Set the project-level free-form compiler options
    #[must_use]
    pub fn with_project_options(mut self, options: impl Into<String>) -> Self {
        self.project_options = options.into();
        self
    }

    /// Assemble the compiler process for `unit` without starting it
    pub fn prepare(
        &self,
        target: &BuildTarget,
        unit: &CompileUnit,
    ) -> Result<CompilerProcess, UnitError> {
        let module = &target.module;

        let mut config_files = vec![self.provisioner.render(module, unit)?];
        // Derived units never see the user's extra config
        if let Some(additional) = unit
            .compiler_options
            .additional_config_file
            .as_ref()
            .filter(|_| !unit.temporary)
        {
            if !additional.is_file() {
                return Err(UnitError::MissingAdditionalConfig {
                    path: additional.clone(),
                    unit: unit.name.clone(),
                    module: module.name.clone(),
                });
            }
            config_files.push(additional.clone());
        }

        filesystem::ensure_can_create_file(&unit.output_file_path())?;

        let sdk_name = unit.sdk.as_deref().ok_or_else(|| SdkError::NotSet {
            unit: unit.name.clone(),
        })?;
        let sdk = self.sdks.resolve(sdk_name)?;
        let entry = entry_point(unit.kind, &sdk.version);

        let toolchain = toolchain_command(
            self.toolchain.java_path(),
            self.toolchain.heap(),
            &sdk,
            entry,
        );
        let options = OptionSources {
            project: &self.project_options,
            module: &module.additional_options,
            unit: &unit.compiler_options.additional_options,
        };
        let ctx = MacroContext::new(&module.dir, &module.project_dir, &sdk.home);
        let command = build_command(toolchain, &config_files, &options, &ctx);

        filesystem::create_dir_all(&self.work_dir).map_err(|e| UnitError::ProcessSpawn {
            program: self.toolchain.java_path().display().to_string(),
            error: e.to_string(),
        })?;

        CompilerProcess::from_command_line(command, self.work_dir.clone()).ok_or_else(|| {
            UnitError::ProcessSpawn {
                program: self.toolchain.java_path().display().to_string(),
                error: "empty command line".to_string(),
            }
        })
    }
}

impl UnitRunner for ProcessCompiler {
    async fn run_unit(
        &self,
        target: &BuildTarget,
        unit: &CompileUnit,
        sink: &dyn DiagnosticSink,
        cancel: &CancellationToken,
    ) -> Result<OutcomeStatus, UnitError> {
        let process = self.prepare(target, unit)?;
        process.run(&unit.display_name(), sink, cancel).await
    }
}
