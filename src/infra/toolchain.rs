//! Toolchain management
//!
//! Locates the Java runtime the SDK compilers run on.

use std::path::PathBuf;

use crate::config::defaults::DEFAULT_COMPILER_HEAP;

/// Java runtime used to launch SDK compilers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaToolchain {
    /// Path to the java binary
    java_path: PathBuf,
    /// Maximum heap passed as `-Xmx`
    heap: String,
}

impl JavaToolchain {
    /// Create a new Java toolchain wrapper
    pub fn new(java_path: PathBuf) -> Self {
        Self {
            java_path,
            heap: DEFAULT_COMPILER_HEAP.to_string(),
        }
    }

    /// Locate java: `JAVA_HOME/bin/java`, then `PATH`, then plain `java`
    pub fn detect() -> Self {
        let from_home = std::env::var_os("JAVA_HOME")
            .map(|home| PathBuf::from(home).join("bin").join(java_binary_name()))
            .filter(|p| p.is_file());

        let java = from_home
            .or_else(|| which::which("java").ok())
            .unwrap_or_else(|| PathBuf::from("java"));
        tracing::debug!("Using java at {}", java.display());
        Self::new(java)
    }

    /// Set the maximum heap size
    #[must_use]
    pub fn with_heap(mut self, heap: impl Into<String>) -> Self {
        self.heap = heap.into();
        self
    }

    /// Get the path to the java binary
    pub fn java_path(&self) -> &PathBuf {
        &self.java_path
    }

    /// Get the maximum heap size
    pub fn heap(&self) -> &str {
        &self.heap
    }
}

impl Default for JavaToolchain {
    fn default() -> Self {
        Self::new(PathBuf::from("java"))
    }
}

fn java_binary_name() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}
