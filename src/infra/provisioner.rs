//! Compiler config file generation
//!
//! Every compile unit gets its own `flex-config` XML file under
//! `<project>/.flexbuild/configs/`. The file carries what the compiler needs
//! to know about the unit itself: source paths, the entry file or included
//! sources, the output path and the optimization link report.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::defaults::{CONFIGS_DIR, STATE_DIR};
use crate::core::context::ConfigProvisioner;
use crate::core::unit::{CompileUnit, Module, OutputKind, TargetPlatform};
use crate::error::UnitError;
use crate::infra::filesystem;

const SOURCE_EXTENSIONS: [&str; 2] = ["mxml", "as"];

/// Writes one config file per compile unit into a configs directory
#[derive(Debug, Clone)]
pub struct FileConfigProvisioner {
    configs_dir: PathBuf,
}

impl FileConfigProvisioner {
    /// Provisioner writing into `configs_dir`
    pub fn new(configs_dir: PathBuf) -> Self {
        Self { configs_dir }
    }

    /// Provisioner writing into the project's state directory
    pub fn for_project(project_dir: &Path) -> Self {
        Self::new(project_dir.join(STATE_DIR).join(CONFIGS_DIR))
    }

    /// Directory the config files are written to
    pub fn configs_dir(&self) -> &Path {
        &self.configs_dir
    }

    /// Config file path for a unit
    ///
    /// Derived units share their parent's name, so the file name carries a
    /// short hash of the unit label to keep them apart.
    pub fn config_path(&self, unit: &CompileUnit) -> PathBuf {
        let digest = hex::encode(Sha256::digest(unit.display_name().as_bytes()));
        self.configs_dir.join(format!(
            "{}-{}-{}.xml",
            sanitize(&unit.module),
            sanitize(&unit.name),
            &digest[..8]
        ))
    }

    /// Link report written by a main unit and loaded as externs by the RLMs
    /// optimized for it
    pub fn link_report_path(&self, module: &str, unit_name: &str) -> PathBuf {
        self.configs_dir.join(format!(
            "{}-{}-link-report.xml",
            sanitize(module),
            sanitize(unit_name)
        ))
    }

    fn render_xml(&self, module: &Module, unit: &CompileUnit) -> Result<String, UnitError> {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<flex-config>\n");

        xml.push_str("  <compiler>\n");
        if unit.platform == TargetPlatform::Mobile {
            xml.push_str("    <mobile>true</mobile>\n");
        }
        xml.push_str("    <source-path append=\"true\">\n");
        for root in &module.source_roots {
            push_element(&mut xml, 6, "path-element", &root.display().to_string());
        }
        xml.push_str("    </source-path>\n");
        xml.push_str("  </compiler>\n");

        if unit.kind.is_library() {
            xml.push_str("  <include-sources>\n");
            for root in &module.source_roots {
                push_element(&mut xml, 4, "path-element", &root.display().to_string());
            }
            xml.push_str("  </include-sources>\n");
        } else {
            let entry = entry_file(module, unit)?;
            xml.push_str("  <file-specs>\n");
            push_element(&mut xml, 4, "path-element", &entry.display().to_string());
            xml.push_str("  </file-specs>\n");
        }

        if unit.kind == OutputKind::Application
            && !unit.temporary
            && unit.rlms.iter().any(|rlm| rlm.optimize)
        {
            let report = self.link_report_path(&unit.module, &unit.name);
            push_element(&mut xml, 2, "link-report", &report.display().to_string());
        }
        if !unit.optimize_for.is_empty() {
            let report = self.link_report_path(&unit.module, &unit.optimize_for);
            xml.push_str("  <load-externs>\n");
            push_element(&mut xml, 4, "path-element", &report.display().to_string());
            xml.push_str("  </load-externs>\n");
        }

        push_element(
            &mut xml,
            2,
            "output",
            &unit.output_file_path().display().to_string(),
        );
        xml.push_str("</flex-config>\n");
        Ok(xml)
    }
}

impl ConfigProvisioner for FileConfigProvisioner {
    fn render(&self, module: &Module, unit: &CompileUnit) -> Result<PathBuf, UnitError> {
        let xml = self.render_xml(module, unit)?;
        let path = self.config_path(unit);

        filesystem::create_dir_all(&self.configs_dir)
            .and_then(|()| filesystem::write_file(&path, &xml))
            .map_err(|e| UnitError::ConfigGeneration {
                error: e.to_string(),
            })?;

        tracing::debug!("Wrote compiler config {}", path.display());
        Ok(path)
    }
}

/// Locate the file a unit's entry point refers to
///
/// Stylesheet units carry a path, absolute or relative to a source root or
/// the module directory. Other units carry a class name that is looked up
/// under the module's source roots.
fn entry_file(module: &Module, unit: &CompileUnit) -> Result<PathBuf, UnitError> {
    if unit.main_class.is_empty() {
        return Err(UnitError::ConfigGeneration {
            error: format!("Main class is not set for {}", unit.display_name()),
        });
    }

    let as_path = Path::new(&unit.main_class);
    if as_path.is_absolute() {
        return Ok(as_path.to_path_buf());
    }

    let is_source_file = as_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "css" || SOURCE_EXTENSIONS.contains(&ext));
    let found = if is_source_file {
        module
            .source_roots
            .iter()
            .chain(std::iter::once(&module.dir))
            .map(|root| root.join(as_path))
            .find(|candidate| candidate.is_file())
    } else {
        let relative = unit.main_class.replace('.', "/");
        let relative = &relative;
        module
            .source_roots
            .iter()
            .flat_map(|root| {
                SOURCE_EXTENSIONS
                    .iter()
                    .map(move |ext| root.join(format!("{relative}.{ext}")))
            })
            .find(|candidate| candidate.is_file())
    };

    found.ok_or_else(|| UnitError::ConfigGeneration {
        error: format!(
            "Main class '{}' not found in source roots of module '{}'",
            unit.main_class, module.name
        ),
    })
}

fn push_element(xml: &mut String, indent: usize, tag: &str, value: &str) {
    let _ = writeln!(xml, "{:indent$}<{tag}>{}</{tag}>", "", escape(value));
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
