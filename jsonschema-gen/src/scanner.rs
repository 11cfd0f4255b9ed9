//! Source file scanner for discovering Go files.
//!
//! Walks a workspace recursively and loads every file with the source
//! extension. Ignore files are not honored: the workspace is a private copy
//! and every source in it has to be visited.

use crate::error::ScanError;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Extension of Go source files.
pub const SOURCE_EXTENSION: &str = "go";

/// A discovered source file with its content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path to the file.
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// File content.
    pub content: String,
}

/// Scanner for discovering Go source files.
#[derive(Debug)]
pub struct SourceScanner {
    /// Root directory to scan.
    root: PathBuf,
}

impl SourceScanner {
    /// Create a new scanner for the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scan the directory and return all matching files.
    pub fn scan(&self) -> Result<Vec<SourceFile>, ScanError> {
        if !self.root.exists() {
            return Err(ScanError::not_found(self.root.clone()));
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            if path.extension().map_or(true, |ext| ext != SOURCE_EXTENSION) {
                continue;
            }

            let content = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

            files.push(SourceFile {
                path: path.to_path_buf(),
                relative_path: self.relative_path(path),
                content,
            });
        }

        Ok(files)
    }

    /// Get the relative path from root.
    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
