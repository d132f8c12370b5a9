//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::Path;

use crate::error::{FilesystemError, UnitError};

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Make sure the compiler will be able to write `path`
///
/// Creates missing parent directories. Fails when a directory occupies
/// the path, the existing file is read-only, or the parent is not writable.
pub fn ensure_can_create_file(path: &Path) -> Result<(), UnitError> {
    let not_creatable = |error: String| UnitError::OutputPathNotCreatable {
        path: path.to_path_buf(),
        error,
    };

    if path.is_dir() {
        return Err(not_creatable("a directory exists at this path".to_string()));
    }

    if let Ok(meta) = std::fs::metadata(path) {
        if meta.permissions().readonly() {
            return Err(not_creatable("file is read-only".to_string()));
        }
        return Ok(());
    }

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| not_creatable("path has no parent directory".to_string()))?;

    create_dir_all(parent).map_err(|e| not_creatable(e.to_string()))?;

    let meta = std::fs::metadata(parent).map_err(|e| not_creatable(e.to_string()))?;
    if meta.permissions().readonly() {
        return Err(not_creatable(format!(
            "directory '{}' is read-only",
            parent.display()
        )));
    }
    Ok(())
}
