//! Collaborators of the build orchestrator
//!
//! The orchestrator does not know how configs are rendered, where SDKs live
//! or how changed files are tracked. These traits are the seams; the
//! concrete implementations live in [`crate::infra`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::unit::{BuildTarget, CompileUnit, Module};
use crate::error::{SdkError, StateError, UnitError};

/// Renders a compile unit into the config file the compiler loads
pub trait ConfigProvisioner: Send + Sync {
    /// Write the unit's primary config file and return its path
    fn render(&self, module: &Module, unit: &CompileUnit) -> Result<PathBuf, UnitError>;
}

/// Tracks changed sources between builds
pub trait IncrementalContext: Send + Sync {
    /// Source paths changed since the target's last successful build
    fn dirty_paths(&self, target: &BuildTarget) -> Result<BTreeSet<PathBuf>, StateError>;

    /// Register a built artifact with the sources that produced it
    fn record(&self, artifact: &Path, contributing: &BTreeSet<PathBuf>) -> Result<(), StateError>;
}

/// SDK packaging flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SdkKind {
    /// Standard Flex SDK layout with compiler jars under `lib/`
    #[default]
    Flex,
    /// Custom layout; the classpath is configured explicitly
    Custom,
}

/// Resolved SDK capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdkDescriptor {
    /// SDK name as referenced by build configurations
    pub name: String,
    /// SDK home directory
    pub home: PathBuf,
    /// Version string, e.g. `4.6.0.23201`
    pub version: String,
    /// Packaging flavour
    pub kind: SdkKind,
    /// Additional classpath entries for the compiler
    pub classpath: Vec<PathBuf>,
}

/// Resolves SDK references
pub trait SdkLookup: Send + Sync {
    /// Resolve an SDK by name
    fn resolve(&self, name: &str) -> Result<SdkDescriptor, SdkError>;
}
