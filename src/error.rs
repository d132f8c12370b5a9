//! Error types for flexbuild
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a single compile unit before any compiler process exists.
///
/// Every variant maps the unit's outcome to Failed.
#[derive(Error, Debug)]
pub enum UnitError {
    /// The config provisioner could not render the unit's config file
    #[error("Failed to generate compiler configuration: {error}")]
    ConfigGeneration { error: String },

    /// The user-specified additional config file does not exist
    #[error(
        "Additional compiler configuration file '{path}' not found for build configuration '{unit}' of module '{module}'"
    )]
    MissingAdditionalConfig {
        path: PathBuf,
        unit: String,
        module: String,
    },

    /// The output artifact cannot be written
    #[error("Failed to create file '{path}': {error}")]
    OutputPathNotCreatable { path: PathBuf, error: String },

    /// The unit refers to an SDK that cannot be resolved
    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),

    /// The compiler process could not be started
    #[error("Failed to start compiler process '{program}': {error}")]
    ProcessSpawn { program: String, error: String },
}

/// SDK lookup errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdkError {
    /// No SDK is registered under the name
    #[error("SDK '{name}' is not configured")]
    NotFound { name: String },

    /// Unit has no SDK reference at all
    #[error("No SDK set for build configuration '{unit}'")]
    NotSet { unit: String },

    /// SDK home directory does not exist
    #[error("SDK '{name}' home directory not found: {home}")]
    HomeNotFound { name: String, home: PathBuf },

    /// Version string could not be determined
    #[error("Unable to determine version of SDK '{name}'")]
    UnknownVersion { name: String },
}

/// Project manifest errors
#[derive(Error, Debug)]
pub enum ProjectError {
    /// Manifest file not found
    #[error("Manifest not found at '{path}'")]
    ManifestNotFound { path: PathBuf },

    /// Manifest could not be parsed
    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    /// Module not present in the manifest
    #[error("Module '{name}' not found in manifest")]
    ModuleNotFound { name: String },

    /// Build configuration not present in the module
    #[error("Build configuration '{config}' not found in module '{module}'")]
    ConfigurationNotFound { module: String, config: String },

    /// Environment variable substitution failed
    #[error("Environment variable substitution failed: {0}")]
    Substitution(String),
}

/// Incremental state store errors
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to read the state file
    #[error("Failed to read build state '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to write the state file
    #[error("Failed to write build state '{path}': {error}")]
    Write { path: PathBuf, error: String },

    /// State file content is invalid
    #[error("Corrupt build state '{path}': {error}")]
    Corrupt { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Top-level flexbuild error type
#[derive(Error, Debug)]
pub enum FlexbuildError {
    /// Project manifest error
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    /// Compile unit error
    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),

    /// SDK error
    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),

    /// Build state error
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
