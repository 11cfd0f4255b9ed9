//! Per-invocation temporary workspace.
//!
//! The workspace lives inside the target package's directory so the child
//! build resolves it as part of the target module. Its name carries a random
//! suffix, so concurrent runs on the same package never share a directory.
//! It is removed when dropped unless it was asked to be kept.

use crate::error::MaterializeError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Default workspace name prefix.
pub const DEFAULT_PREFIX: &str = "jsonschema-gen";

/// A scoped temporary workspace directory.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
    name: String,
    keep: bool,
}

impl TempWorkspace {
    /// Create a fresh workspace named `<prefix>-<random>` inside `parent`.
    pub fn create(parent: &Path, prefix: &str, keep: bool) -> Result<Self, MaterializeError> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-", prefix))
            .rand_bytes(8)
            .tempdir_in(parent)
            .map_err(|e| MaterializeError::CreateWorkspace {
                parent: parent.to_path_buf(),
                source: e,
            })?;

        let path = dir.path().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(path = %path.display(), keep, "created workspace");

        Ok(Self {
            dir: Some(dir),
            path,
            name,
            keep,
        })
    }

    /// Directory of the workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name, used as the workspace element of the vendor namespace.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        if self.keep {
            let path = dir.keep();
            tracing::info!(path = %path.display(), "kept workspace");
        } else if let Err(e) = dir.close() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove workspace");
        } else {
            tracing::debug!(path = %self.path.display(), "removed workspace");
        }
    }
}
