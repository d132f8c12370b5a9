//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Lay out the sample project: manifest, SDK home and sources
    ///
    /// The manifest declares module `web` with configuration `App`, one RLM
    /// (`mod.ModuleA` -> `modules/a.swf`) and one stylesheet
    /// (`src/styles/skin.css`).
    pub fn with_sample(self) -> Self {
        self.create_file(
            "sdk/flex-sdk-description.xml",
            "<flex-sdk-description><version>4.6.0</version><build>23201</build></flex-sdk-description>",
        );
        self.create_file("web/src/com/shop/App.mxml", "<s:Application/>");
        self.create_file("web/src/mod/ModuleA.as", "package mod { public class ModuleA {} }");
        self.create_file("web/src/styles/skin.css", "Button { color: #333333; }");
        self.create_file("flexbuild.toml", &sample_manifest(&self.path().join("sdk")));
        self
    }

    /// Install an executable shell script standing in for `java`
    #[cfg(unix)]
    pub fn fake_java(&self, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.dir.path().join("bin/java");
        self.create_file("bin/java", &format!("#!/bin/sh\n{body}\n"));
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        path
    }

    /// Number of times a `fake_java` script built with [`COMPILE_SCRIPT`]
    /// ran
    pub fn invocations(&self) -> usize {
        if !self.file_exists("invocations.log") {
            return 0;
        }
        self.read_file("invocations.log").lines().count()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample manifest TOML with the SDK at `sdk_home`
#[allow(dead_code)]
pub fn sample_manifest(sdk_home: &std::path::Path) -> String {
    format!(
        r#"
[project]
name = "shop"

[sdks.flex]
home = "{}"

[[modules]]
name = "web"
dir = "web"

[[modules.configurations]]
name = "App"
main_class = "com.shop.App"
output_folder = "bin"
output_file = "App.swf"
sdk = "flex"
css_files = ["src/styles/skin.css", "src/styles/missing.css"]

[[modules.configurations.rlms]]
main_class = "mod.ModuleA"
output_file = "modules/a.swf"
optimize = true
"#,
        sdk_home.display()
    )
}

/// Stand-in compiler: logs the run, then writes the `<output>` named in
/// the first loaded config file
#[allow(dead_code)]
pub const COMPILE_SCRIPT: &str = r#"
echo run >> "$(dirname "$0")/../invocations.log"
cfg=""
for arg in "$@"; do
  case "$arg" in
    -load-config=*) [ -z "$cfg" ] && cfg="${arg#-load-config=}" ;;
  esac
done
out=$(sed -n 's:.*<output>\(.*\)</output>.*:\1:p' "$cfg")
mkdir -p "$(dirname "$out")"
printf swf > "$out"
echo "$out (3 bytes)"
"#;
