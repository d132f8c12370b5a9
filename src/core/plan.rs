//! Build plan expansion
//!
//! Expands a main build configuration into the ordered list of units to
//! compile: the main unit, one unit per runtime-loaded module, one unit per
//! existing runtime stylesheet. Derived units are fresh values built from
//! the main unit; they never alias its compiler options.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::defaults::ARTIFACT_EXTENSION;
use crate::core::options::remove_options;
use crate::core::unit::{CompileUnit, Module, OutputKind, ResourceFilesMode, RlmDescriptor};

/// Options never inherited by runtime-loaded modules
const RLM_STRIPPED_OPTIONS: &[&str] = &["link-report"];

/// Ordered units of one build; the main unit is always first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    units: Vec<CompileUnit>,
}

impl BuildPlan {
    /// The main unit
    pub fn main(&self) -> &CompileUnit {
        &self.units[0]
    }

    /// All units in compile order
    pub fn units(&self) -> &[CompileUnit] {
        &self.units
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Always false: a plan holds at least the main unit
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Artifact paths every unit is expected to produce
    pub fn expected_outputs(&self) -> Vec<PathBuf> {
        self.units.iter().map(CompileUnit::output_file_path).collect()
    }
}

/// Expand `main` into a build plan, probing stylesheets on disk
pub fn expand(main: &CompileUnit, module: &Module) -> BuildPlan {
    expand_with(main, module, Path::is_file)
}

/// Expand `main` into a build plan using `is_file` to probe stylesheets
pub fn expand_with<F>(main: &CompileUnit, module: &Module, is_file: F) -> BuildPlan
where
    F: Fn(&Path) -> bool,
{
    let mut units = Vec::with_capacity(1 + main.rlms.len() + main.css_files.len());
    units.push(main.clone());

    if main.supports_secondary_artifacts() {
        units.extend(main.rlms.iter().map(|rlm| rlm_unit(main, rlm)));

        for css in &main.css_files {
            if is_file(css) {
                units.push(css_unit(main, module, css));
            } else {
                tracing::debug!("Skipping missing runtime stylesheet {}", css.display());
            }
        }
    }

    tracing::debug!("Expanded {} into {} units", main.name, units.len());
    BuildPlan { units }
}

fn temporary_copy(main: &CompileUnit) -> CompileUnit {
    CompileUnit {
        temporary: true,
        use_html_wrapper: false,
        rlms: Vec::new(),
        css_files: Vec::new(),
        ..main.clone()
    }
}

fn rlm_unit(main: &CompileUnit, rlm: &RlmDescriptor) -> CompileUnit {
    let mut unit = temporary_copy(main);
    let output = Path::new(&rlm.output_file);

    unit.kind = OutputKind::RuntimeLoadedModule;
    unit.main_class.clone_from(&rlm.main_class);
    unit.optimize_for = if rlm.optimize {
        main.name.clone()
    } else {
        String::new()
    };
    unit.output_file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(subdir) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        unit.output_folder = main.output_folder.join(subdir);
    }

    unit.compiler_options.resource_files_mode = ResourceFilesMode::None;
    unit.compiler_options.additional_options = remove_options(
        &unit.compiler_options.additional_options,
        RLM_STRIPPED_OPTIONS,
    );
    unit
}

fn css_unit(main: &CompileUnit, module: &Module, css: &Path) -> CompileUnit {
    let mut unit = temporary_copy(main);

    unit.kind = OutputKind::Application;
    unit.main_class = css.to_string_lossy().into_owned();
    unit.optimize_for = String::new();

    let stem = css
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    unit.output_file_name = format!("{stem}.{ARTIFACT_EXTENSION}");

    let relative = css.parent().and_then(|dir| {
        module
            .relative_to_source_root(dir)
            .or_else(|| module.relative_to_content_root(dir))
    });
    if let Some(relative) = relative.filter(|r| !r.as_os_str().is_empty()) {
        unit.output_folder = main.output_folder.join(relative);
    }

    unit.compiler_options.resource_files_mode = ResourceFilesMode::None;
    unit
}
