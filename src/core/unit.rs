//! Compile unit data model
//!
//! A compile unit is one build configuration instance: everything the
//! external compiler needs to produce a single artifact.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Kind of artifact a compile unit produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputKind {
    /// Standalone application (`mxmlc`)
    #[default]
    Application,
    /// Component library (`compc`)
    Library,
    /// Module loaded by an application at runtime
    RuntimeLoadedModule,
}

impl OutputKind {
    /// Whether the compiler's library builder handles this kind
    pub fn is_library(self) -> bool {
        self == Self::Library
    }
}

/// Platform the artifact runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TargetPlatform {
    /// Browser (Flash Player)
    #[default]
    Web,
    /// AIR desktop
    Desktop,
    /// AIR mobile
    Mobile,
}

/// How resource files from source roots are copied to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceFilesMode {
    /// Copy every non-source file
    #[default]
    All,
    /// Copy only files matching the resource patterns
    ResourcePatterns,
    /// Copy nothing
    None,
}

/// Compiler options owned by a single compile unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompilerOptions {
    /// Free-form command line options, space separated
    #[serde(default)]
    pub additional_options: String,

    /// User-specified config file loaded after the generated one
    #[serde(default)]
    pub additional_config_file: Option<PathBuf>,

    /// Resource file copying mode
    #[serde(default)]
    pub resource_files_mode: ResourceFilesMode,
}

/// Runtime-loaded module declared by an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlmDescriptor {
    /// Fully qualified main class of the module
    pub main_class: String,

    /// Output file path relative to the application's output folder
    pub output_file: String,

    /// Optimize the module for the owning application
    #[serde(default)]
    pub optimize: bool,
}

/// Module owning one or more build configurations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Module {
    /// Module name
    pub name: String,

    /// Module directory
    pub dir: PathBuf,

    /// Project directory
    pub project_dir: PathBuf,

    /// Source roots (absolute)
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,

    /// Content roots (absolute)
    #[serde(default)]
    pub content_roots: Vec<PathBuf>,

    /// Module-level free-form compiler options
    #[serde(default)]
    pub additional_options: String,
}

impl Module {
    /// Path of `dir` relative to the first source root containing it
    pub fn relative_to_source_root(&self, dir: &Path) -> Option<PathBuf> {
        relative_to_any(&self.source_roots, dir)
    }

    /// Path of `dir` relative to the first content root containing it
    pub fn relative_to_content_root(&self, dir: &Path) -> Option<PathBuf> {
        relative_to_any(&self.content_roots, dir)
    }
}

fn relative_to_any(roots: &[PathBuf], dir: &Path) -> Option<PathBuf> {
    roots
        .iter()
        .find_map(|root| dir.strip_prefix(root).ok().map(Path::to_path_buf))
}

/// One build configuration instance to compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileUnit {
    /// Build configuration name
    pub name: String,

    /// Owning module name
    pub module: String,

    /// Artifact kind
    pub kind: OutputKind,

    /// Target platform
    #[serde(default)]
    pub platform: TargetPlatform,

    /// Folder the artifact is written to
    pub output_folder: PathBuf,

    /// Artifact file name
    pub output_file_name: String,

    /// Main class, or stylesheet path for runtime stylesheet units
    pub main_class: String,

    /// Compiler options (owned, never shared between units)
    #[serde(default)]
    pub compiler_options: CompilerOptions,

    /// Runtime-loaded modules declared by this unit
    #[serde(default)]
    pub rlms: Vec<RlmDescriptor>,

    /// Stylesheets to compile into standalone artifacts
    #[serde(default)]
    pub css_files: Vec<PathBuf>,

    /// SDK reference
    #[serde(default)]
    pub sdk: Option<String>,

    /// Generated for one build only
    #[serde(default)]
    pub temporary: bool,

    /// Application this module is optimized for (empty for none)
    #[serde(default)]
    pub optimize_for: String,

    /// Generate an HTML wrapper next to the artifact
    #[serde(default)]
    pub use_html_wrapper: bool,
}

impl CompileUnit {
    /// Create a non-temporary unit with default options
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        kind: OutputKind,
        output_folder: impl Into<PathBuf>,
        output_file_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            kind,
            platform: TargetPlatform::Web,
            output_folder: output_folder.into(),
            output_file_name: output_file_name.into(),
            main_class: String::new(),
            compiler_options: CompilerOptions::default(),
            rlms: Vec::new(),
            css_files: Vec::new(),
            sdk: None,
            temporary: false,
            optimize_for: String::new(),
            use_html_wrapper: false,
        }
    }

    /// Set the main class
    #[must_use]
    pub fn with_main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = main_class.into();
        self
    }

    /// Set the SDK reference
    #[must_use]
    pub fn with_sdk(mut self, sdk: impl Into<String>) -> Self {
        self.sdk = Some(sdk.into());
        self
    }

    /// Add a runtime-loaded module
    #[must_use]
    pub fn with_rlm(mut self, rlm: RlmDescriptor) -> Self {
        self.rlms.push(rlm);
        self
    }

    /// Add a runtime stylesheet
    #[must_use]
    pub fn with_css_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.css_files.push(path.into());
        self
    }

    /// Set the compiler options
    #[must_use]
    pub fn with_compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler_options = options;
        self
    }

    /// Full path of the artifact this unit produces
    pub fn output_file_path(&self) -> PathBuf {
        self.output_folder.join(&self.output_file_name)
    }

    /// Whether RLMs and runtime stylesheets are compiled alongside this unit
    pub fn supports_secondary_artifacts(&self) -> bool {
        self.kind == OutputKind::Application && self.platform == TargetPlatform::Web
    }

    /// Label attributing diagnostics to this unit
    ///
    /// `[App]`, `[App - mod.ModuleA]` for derived units, with
    /// ` (module web)` appended when the unit and module names differ.
    pub fn display_name(&self) -> String {
        let mut postfix = String::new();
        if self.temporary {
            postfix.push_str(" - ");
            postfix.push_str(&self.specifier());
        }
        if self.name != self.module {
            postfix.push_str(&format!(" (module {})", self.module));
        }
        format!("[{}{postfix}]", self.name)
    }

    fn specifier(&self) -> String {
        match self.kind {
            OutputKind::RuntimeLoadedModule => self.main_class.clone(),
            _ => Path::new(&self.main_class)
                .file_name()
                .map_or_else(|| self.main_class.clone(), |n| n.to_string_lossy().into_owned()),
        }
    }
}

/// Module and main build configuration to compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Owning module
    pub module: Module,

    /// Main build configuration
    pub main: CompileUnit,
}

impl BuildTarget {
    /// Create a build target
    pub fn new(module: Module, main: CompileUnit) -> Self {
        Self { module, main }
    }

    /// Stable identifier used for incremental state
    pub fn id(&self) -> String {
        format!("{}/{}", self.module.name, self.main.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> CompileUnit {
        CompileUnit::new("App", "web", OutputKind::Application, "/out", "App.swf")
            .with_main_class("com.example.App")
    }

    #[test]
    fn test_output_file_path_joins_folder_and_name() {
        assert_eq!(app().output_file_path(), PathBuf::from("/out/App.swf"));
    }

    #[test]
    fn test_display_name_main_unit_with_module_postfix() {
        assert_eq!(app().display_name(), "[App (module web)]");
    }

    #[test]
    fn test_display_name_same_name_as_module() {
        let unit = CompileUnit::new("web", "web", OutputKind::Library, "/out", "web.swc");
        assert_eq!(unit.display_name(), "[web]");
    }

    #[test]
    fn test_display_name_temporary_rlm() {
        let mut unit = app();
        unit.temporary = true;
        unit.kind = OutputKind::RuntimeLoadedModule;
        unit.main_class = "mod.ModuleA".to_string();
        assert_eq!(unit.display_name(), "[App - mod.ModuleA (module web)]");
    }

    #[test]
    fn test_display_name_temporary_stylesheet_uses_file_name() {
        let mut unit = app();
        unit.temporary = true;
        unit.main_class = "/src/styles/skin.css".to_string();
        assert_eq!(unit.display_name(), "[App - skin.css (module web)]");
    }

    #[test]
    fn test_secondary_artifacts_only_for_web_applications() {
        assert!(app().supports_secondary_artifacts());

        let mut lib = app();
        lib.kind = OutputKind::Library;
        assert!(!lib.supports_secondary_artifacts());

        let mut desktop = app();
        desktop.platform = TargetPlatform::Desktop;
        assert!(!desktop.supports_secondary_artifacts());
    }

    #[test]
    fn test_relative_to_source_root() {
        let module = Module {
            name: "web".to_string(),
            source_roots: vec![PathBuf::from("/p/web/src")],
            content_roots: vec![PathBuf::from("/p/web")],
            ..Default::default()
        };
        assert_eq!(
            module.relative_to_source_root(Path::new("/p/web/src/styles")),
            Some(PathBuf::from("styles"))
        );
        assert_eq!(module.relative_to_source_root(Path::new("/p/web/assets")), None);
        assert_eq!(
            module.relative_to_content_root(Path::new("/p/web/assets")),
            Some(PathBuf::from("assets"))
        );
    }
}
