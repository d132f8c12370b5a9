//! Free-form compiler option handling
//!
//! Additional options are plain strings typed by the user at project,
//! module and build configuration level. They are split on single spaces;
//! quoted arguments containing spaces are not supported.

use std::path::{Path, PathBuf};

/// Macro for the module directory
pub const MODULE_DIR_MACRO: &str = "$MODULE_DIR$";

/// Macro for the project directory
pub const PROJECT_DIR_MACRO: &str = "$PROJECT_DIR$";

/// Macro for the user's home directory
pub const USER_HOME_MACRO: &str = "$USER_HOME$";

/// Macro for the SDK home directory
pub const FLEX_SDK_MACRO: &str = "${FLEX_SDK}";

/// Values substituted for path macros in option strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroContext {
    /// Module directory
    pub module_dir: PathBuf,
    /// Project directory
    pub project_dir: PathBuf,
    /// SDK home directory
    pub sdk_home: PathBuf,
    /// User home directory, if known
    pub user_home: Option<PathBuf>,
}

impl MacroContext {
    /// Create a context with the user's home directory detected
    pub fn new(module_dir: &Path, project_dir: &Path, sdk_home: &Path) -> Self {
        Self {
            module_dir: module_dir.to_path_buf(),
            project_dir: project_dir.to_path_buf(),
            sdk_home: sdk_home.to_path_buf(),
            user_home: dirs::home_dir(),
        }
    }

    /// Replace every known macro in `option`
    pub fn expand(&self, option: &str) -> String {
        let mut expanded = option
            .replace(MODULE_DIR_MACRO, &slashed(&self.module_dir))
            .replace(PROJECT_DIR_MACRO, &slashed(&self.project_dir))
            .replace(FLEX_SDK_MACRO, &slashed(&self.sdk_home));
        if let Some(home) = &self.user_home {
            expanded = expanded.replace(USER_HOME_MACRO, &slashed(home));
        }
        expanded
    }
}

fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Split an option string on single spaces, dropping empty pieces
pub fn split_options(options: &str) -> Vec<&str> {
    options.split(' ').filter(|s| !s.is_empty()).collect()
}

/// Split and macro-expand an option string
pub fn expand_options(options: &str, ctx: &MacroContext) -> Vec<String> {
    split_options(options)
        .into_iter()
        .map(|s| ctx.expand(s))
        .collect()
}

/// Remove every occurrence of the named options from an option string
///
/// Handles `-name`, `-name=value`, `-name+=value` and `+name=value`.
/// A bare `-name` also consumes the values following it up to the next
/// option.
pub fn remove_options(options: &str, names: &[&str]) -> String {
    let mut kept = Vec::new();
    let mut skipping_values = false;

    for token in split_options(options) {
        let is_option = token.starts_with('-') || token.starts_with('+');
        if skipping_values {
            if !is_option {
                continue;
            }
            skipping_values = false;
        }

        if is_option {
            let body = token.trim_start_matches(['-', '+']);
            let (name, has_value) = match body.find(['=', '+']) {
                Some(idx) => (&body[..idx], true),
                None => (body, false),
            };
            if names.contains(&name) {
                skipping_values = !has_value;
                continue;
            }
        }
        kept.push(token);
    }

    kept.join(" ")
}
