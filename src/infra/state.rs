//! Incremental build state
//!
//! Source fingerprints (SHA-256 of file contents) are stored per artifact in
//! `<project>/.flexbuild/state.json`. A source is dirty when it is new, its
//! contents changed, or it was deleted since the artifact was last recorded.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::config::defaults::{STATE_DIR, STATE_FILE};
use crate::core::context::IncrementalContext;
use crate::core::unit::BuildTarget;
use crate::error::StateError;
use crate::infra::filesystem;

const STATE_VERSION: u32 = 1;

/// On-disk state file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BuildState {
    /// Format version
    #[serde(default)]
    pub version: u32,

    /// Source fingerprints keyed by artifact path
    #[serde(default)]
    pub artifacts: BTreeMap<PathBuf, BTreeMap<PathBuf, String>>,
}

/// File-backed [`IncrementalContext`]
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    /// Hashes computed while collecting dirty paths, reused by `record`
    hashes: Mutex<HashMap<PathBuf, String>>,
    /// Serializes read-modify-write cycles of the state file
    lock: Mutex<()>,
}

impl StateStore {
    /// Store backed by the state file at `path`
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            hashes: Mutex::new(HashMap::new()),
            lock: Mutex::new(()),
        }
    }

    /// Store backed by the project's state file
    pub fn for_project(project_dir: &Path) -> Self {
        Self::new(project_dir.join(STATE_DIR).join(STATE_FILE))
    }

    /// State file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state file; a missing file is empty state
    pub fn load(&self) -> Result<BuildState, StateError> {
        if !self.path.exists() {
            return Ok(BuildState {
                version: STATE_VERSION,
                ..BuildState::default()
            });
        }

        let content = filesystem::read_file(&self.path).map_err(|e| StateError::Read {
            path: self.path.clone(),
            error: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| StateError::Corrupt {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }

    fn save(&self, state: &BuildState) -> Result<(), StateError> {
        let write_error = |error: String| StateError::Write {
            path: self.path.clone(),
            error,
        };

        if let Some(parent) = self.path.parent() {
            filesystem::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(state).map_err(|e| write_error(e.to_string()))?;
        filesystem::write_file(&self.path, &content).map_err(|e| write_error(e.to_string()))
    }

    fn fingerprint(&self, path: &Path) -> Result<String, StateError> {
        let content = std::fs::read(path).map_err(|e| StateError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        let hash = hex::encode(Sha256::digest(&content));

        self.hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), hash.clone());
        Ok(hash)
    }

    fn cached_fingerprint(&self, path: &Path) -> Option<String> {
        self.hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

/// Every file under the target module's source roots
fn source_files(target: &BuildTarget) -> BTreeSet<PathBuf> {
    target
        .module
        .source_roots
        .iter()
        .filter(|root| root.exists())
        .flat_map(|root| {
            walkdir::WalkDir::new(root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(walkdir::DirEntry::into_path)
        })
        .collect()
}

impl IncrementalContext for StateStore {
    fn dirty_paths(&self, target: &BuildTarget) -> Result<BTreeSet<PathBuf>, StateError> {
        let state = self.load()?;
        let artifact = target.main.output_file_path();
        let recorded = state.artifacts.get(&artifact);

        let mut dirty = BTreeSet::new();
        let current = source_files(target);
        for path in &current {
            let hash = self.fingerprint(path)?;
            if recorded.and_then(|r| r.get(path)) != Some(&hash) {
                dirty.insert(path.clone());
            }
        }

        if let Some(recorded) = recorded {
            dirty.extend(
                recorded
                    .keys()
                    .filter(|path| !current.contains(*path))
                    .cloned(),
            );
        }

        tracing::debug!(
            "{}: {} of {} sources dirty",
            target.id(),
            dirty.len(),
            current.len()
        );
        Ok(dirty)
    }

    fn record(&self, artifact: &Path, contributing: &BTreeSet<PathBuf>) -> Result<(), StateError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.load()?;
        state.version = STATE_VERSION;

        let entry = state.artifacts.entry(artifact.to_path_buf()).or_default();
        for path in contributing {
            if path.is_file() {
                let hash = match self.cached_fingerprint(path) {
                    Some(hash) => hash,
                    None => self.fingerprint(path)?,
                };
                entry.insert(path.clone(), hash);
            } else {
                entry.remove(path);
            }
        }

        tracing::info!(
            "Recorded {} sources for {}",
            contributing.len(),
            artifact.display()
        );
        self.save(&state)
    }
}
