//! Default configuration values

/// Project manifest file name
pub const MANIFEST_FILE: &str = "flexbuild.toml";

/// Per-project state directory
pub const STATE_DIR: &str = ".flexbuild";

/// Incremental build state file inside [`STATE_DIR`]
pub const STATE_FILE: &str = "state.json";

/// Generated compiler config directory inside [`STATE_DIR`]
pub const CONFIGS_DIR: &str = "configs";

/// Extension of compiled artifacts
pub const ARTIFACT_EXTENSION: &str = "swf";

/// First SDK major version shipping the `Mxmlc` entry point
pub const MODERN_COMPILER_MAJOR_VERSION: u64 = 4;

/// Application compiler entry point for modern SDKs
pub const MXMLC_ENTRY: &str = "flex2.tools.Mxmlc";

/// Application compiler entry point for legacy SDKs
pub const LEGACY_MXMLC_ENTRY: &str = "flex2.tools.Compiler";

/// Library builder entry point
pub const COMPC_ENTRY: &str = "flex2.tools.Compc";

/// Default maximum heap for the compiler JVM
pub const DEFAULT_COMPILER_HEAP: &str = "512m";

/// SDK description file holding the version string
pub const SDK_DESCRIPTION_FILE: &str = "flex-sdk-description.xml";
