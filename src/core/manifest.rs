//! Manifest (flexbuild.toml) parsing
//!
//! The manifest describes the project: its SDKs, its modules and every
//! module's build configurations. String values support environment
//! variable substitution using ${VAR} syntax.
//!
//! Relative paths are resolved against the module directory, which is
//! itself relative to the project directory.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::context::SdkKind;
use crate::core::options::FLEX_SDK_MACRO;
use crate::core::unit::{
    BuildTarget, CompileUnit, CompilerOptions, Module, OutputKind, ResourceFilesMode,
    RlmDescriptor, TargetPlatform,
};
use crate::error::ProjectError;

/// The project manifest (flexbuild.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Manifest {
    /// Project configuration
    pub project: ProjectConfig,

    /// SDKs by name
    #[serde(default)]
    pub sdks: BTreeMap<String, SdkConfig>,

    /// Modules
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Project-level free-form compiler options
    #[serde(default)]
    pub additional_options: String,

    /// Java binary used to run the compilers (detected when unset)
    #[serde(default)]
    pub java: Option<PathBuf>,

    /// Compiler JVM maximum heap, e.g. `1g`
    #[serde(default)]
    pub compiler_heap: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            additional_options: String::new(),
            java: None,
            compiler_heap: None,
        }
    }
}

/// SDK declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SdkConfig {
    /// SDK home directory
    pub home: PathBuf,

    /// Version string; read from the SDK description file when unset
    #[serde(default)]
    pub version: Option<String>,

    /// Packaging flavour
    #[serde(default)]
    pub kind: SdkKind,

    /// Additional compiler classpath entries
    #[serde(default)]
    pub classpath: Vec<PathBuf>,
}

/// Module declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleConfig {
    /// Module name
    pub name: String,

    /// Module directory, relative to the project
    #[serde(default = "default_module_dir")]
    pub dir: PathBuf,

    /// Source roots, relative to the module directory
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<PathBuf>,

    /// Content roots, relative to the module directory (module dir if empty)
    #[serde(default)]
    pub content_roots: Vec<PathBuf>,

    /// Module-level free-form compiler options
    #[serde(default)]
    pub additional_options: String,

    /// Build configurations
    #[serde(default)]
    pub configurations: Vec<ConfigurationConfig>,
}

fn default_module_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("src")]
}

/// Build configuration declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigurationConfig {
    /// Configuration name
    pub name: String,

    /// Artifact kind
    #[serde(default)]
    pub kind: OutputKind,

    /// Target platform
    #[serde(default)]
    pub platform: TargetPlatform,

    /// Main class
    #[serde(default)]
    pub main_class: String,

    /// Output folder, relative to the module directory
    pub output_folder: PathBuf,

    /// Output file name
    pub output_file: String,

    /// SDK name
    #[serde(default)]
    pub sdk: Option<String>,

    /// Unit-level free-form compiler options
    #[serde(default)]
    pub additional_options: String,

    /// Additional config file, relative to the module directory
    #[serde(default)]
    pub additional_config_file: Option<PathBuf>,

    /// Resource file copying mode
    #[serde(default)]
    pub resource_files_mode: ResourceFilesMode,

    /// Generate an HTML wrapper
    #[serde(default)]
    pub use_html_wrapper: bool,

    /// Runtime stylesheets, relative to the module directory
    #[serde(default)]
    pub css_files: Vec<PathBuf>,

    /// Runtime-loaded modules
    #[serde(default)]
    pub rlms: Vec<RlmDescriptor>,
}

/// Substitute environment variables in a string using ${VAR} syntax.
///
/// Unset variables become empty. `${FLEX_SDK}` is an option macro, not an
/// environment variable, and is left untouched.
///
/// # Examples
/// ```
/// use flexbuild::core::manifest::substitute_env_vars;
///
/// std::env::set_var("FLEXBUILD_DOC_VAR", "hello");
/// let result = substitute_env_vars("prefix_${FLEXBUILD_DOC_VAR}_suffix").unwrap();
/// assert_eq!(result, "prefix_hello_suffix");
/// std::env::remove_var("FLEXBUILD_DOC_VAR");
/// ```
pub fn substitute_env_vars(input: &str) -> Result<String, String> {
    let re =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| format!("Invalid regex: {e}"))?;

    let mut last_end = 0;
    let mut output = String::new();

    for cap in re.captures_iter(input) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };

        output.push_str(&input[last_end..full_match.start()]);
        if full_match.as_str() == FLEX_SDK_MACRO {
            output.push_str(FLEX_SDK_MACRO);
        } else {
            output.push_str(&std::env::var(&cap[1]).unwrap_or_default());
        }
        last_end = full_match.end();
    }

    output.push_str(&input[last_end..]);
    Ok(output)
}

/// Recursively substitute environment variables in a TOML value
fn substitute_in_value(value: &mut toml::Value) -> Result<(), String> {
    match value {
        toml::Value::String(s) => {
            *s = substitute_env_vars(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr.iter_mut() {
                substitute_in_value(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                substitute_in_value(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        normalize(&base.join(path))
    }
}

/// Drop `.` components so paths compare cleanly against roots
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}

impl Manifest {
    /// Parse from TOML string, substituting environment variables
    pub fn from_toml(content: &str) -> Result<Self, ProjectError> {
        let mut value: toml::Value =
            toml::from_str(content).map_err(|e| ProjectError::Parse(e.to_string()))?;
        substitute_in_value(&mut value).map_err(ProjectError::Substitution)?;
        value
            .try_into()
            .map_err(|e: toml::de::Error| ProjectError::Parse(e.to_string()))
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load the manifest at `path`
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        if !path.is_file() {
            return Err(ProjectError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ProjectError::Parse(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Find a module declaration by name
    pub fn module(&self, name: &str) -> Result<&ModuleConfig, ProjectError> {
        self.modules
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ProjectError::ModuleNotFound {
                name: name.to_string(),
            })
    }

    /// Build targets for the selected module/configuration, in manifest order
    ///
    /// `None` selects everything at that level.
    pub fn select_targets(
        &self,
        project_dir: &Path,
        module: Option<&str>,
        configuration: Option<&str>,
    ) -> Result<Vec<BuildTarget>, ProjectError> {
        let modules: Vec<&ModuleConfig> = match module {
            Some(name) => vec![self.module(name)?],
            None => self.modules.iter().collect(),
        };

        let mut targets = Vec::new();
        for module_config in modules {
            let module = module_config.to_module(project_dir);
            let configs: Vec<&ConfigurationConfig> = match configuration {
                Some(name) => {
                    let found = module_config
                        .configurations
                        .iter()
                        .find(|c| c.name == name)
                        .ok_or_else(|| ProjectError::ConfigurationNotFound {
                            module: module_config.name.clone(),
                            config: name.to_string(),
                        })?;
                    vec![found]
                }
                None => module_config.configurations.iter().collect(),
            };

            for config in configs {
                targets.push(BuildTarget::new(
                    module.clone(),
                    config.to_unit(&module.name, &module.dir),
                ));
            }
        }
        Ok(targets)
    }
}

impl ModuleConfig {
    /// Resolve into a [`Module`] rooted at `project_dir`
    pub fn to_module(&self, project_dir: &Path) -> Module {
        let dir = resolve(project_dir, &self.dir);
        let content_roots = if self.content_roots.is_empty() {
            vec![dir.clone()]
        } else {
            self.content_roots.iter().map(|r| resolve(&dir, r)).collect()
        };
        Module {
            name: self.name.clone(),
            source_roots: self.source_roots.iter().map(|r| resolve(&dir, r)).collect(),
            content_roots,
            dir,
            project_dir: project_dir.to_path_buf(),
            additional_options: self.additional_options.clone(),
        }
    }
}

impl ConfigurationConfig {
    /// Resolve into the main [`CompileUnit`] of a build target
    pub fn to_unit(&self, module: &str, module_dir: &Path) -> CompileUnit {
        CompileUnit {
            name: self.name.clone(),
            module: module.to_string(),
            kind: self.kind,
            platform: self.platform,
            output_folder: resolve(module_dir, &self.output_folder),
            output_file_name: self.output_file.clone(),
            main_class: self.main_class.clone(),
            compiler_options: CompilerOptions {
                additional_options: self.additional_options.clone(),
                additional_config_file: self
                    .additional_config_file
                    .as_ref()
                    .map(|p| resolve(module_dir, p)),
                resource_files_mode: self.resource_files_mode,
            },
            rlms: self.rlms.clone(),
            css_files: self.css_files.iter().map(|p| resolve(module_dir, p)).collect(),
            sdk: self.sdk.clone(),
            temporary: false,
            optimize_for: String::new(),
            use_html_wrapper: self.use_html_wrapper,
        }
    }
}
