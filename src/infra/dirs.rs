//! Platform-specific directory management
//!
//! Provides the cache directory and the compiler work directory.
//!
//! Environment variables can override default directories:
//! - `FLEXBUILD_CACHE_DIR` - Override cache directory
//! - `FLEXBUILD_WORK_DIR` - Override compiler work directory

use std::env;
use std::path::PathBuf;

/// Environment variable names for directory overrides
pub const ENV_CACHE_DIR: &str = "FLEXBUILD_CACHE_DIR";
pub const ENV_WORK_DIR: &str = "FLEXBUILD_WORK_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "flexbuild";

/// Subdirectory the compiler runs in
const COMPILER_WORK_SUBDIR: &str = "compiler-work";

/// Platform-specific directory provider for flexbuild
#[derive(Debug, Clone)]
pub struct FlexbuildDirs {
    cache_dir: PathBuf,
    work_dir: PathBuf,
}

impl FlexbuildDirs {
    /// Create a new `FlexbuildDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        let cache_dir = Self::resolve_cache_dir();
        let work_dir = env::var(ENV_WORK_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| cache_dir.join(COMPILER_WORK_SUBDIR));
        Self {
            cache_dir,
            work_dir,
        }
    }

    /// Get the cache directory path
    ///
    /// - Linux: `$XDG_CACHE_HOME/flexbuild` or `~/.cache/flexbuild`
    /// - macOS: `~/Library/Caches/flexbuild`
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    /// Get the compiler work directory
    ///
    /// Every compiler process runs with this as its working directory.
    #[must_use]
    pub fn compiler_work_dir(&self) -> PathBuf {
        self.work_dir.clone()
    }

    /// Resolve cache directory from environment or platform default
    fn resolve_cache_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CACHE_DIR) {
            return PathBuf::from(path);
        }

        dirs::cache_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".cache").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".cache").join(APP_NAME))
            })
    }
}

impl Default for FlexbuildDirs {
    fn default() -> Self {
        Self::new()
    }
}
