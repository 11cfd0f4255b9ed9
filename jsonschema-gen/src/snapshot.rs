//! Vendored snapshot access and materialization.
//!
//! The snapshot is a read-only tree holding the entry-point template and the
//! vendored schema library with all of its dependencies. The release binary
//! carries it compiled in ([`EmbeddedSnapshot`]); a tree on disk
//! ([`DirSnapshot`]) can stand in for it.

use crate::error::MaterializeError;
use crate::manifest::VENDOR_DIR;
use crate::scanner::SOURCE_EXTENSION;
use include_dir::{include_dir, Dir, DirEntry};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

static ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// One entry of a snapshot, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEntry {
    Dir(PathBuf),
    File(PathBuf),
}

/// A read-only tree of files that can be copied into a workspace.
pub trait Snapshot {
    /// All entries, each directory listed before anything inside it.
    fn entries(&self) -> Result<Vec<SnapshotEntry>, MaterializeError>;

    /// Contents of the file at `path`, relative to the snapshot root.
    fn read_file(&self, path: &Path) -> Result<Cow<'_, [u8]>, MaterializeError>;
}

/// The snapshot compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSnapshot {
    root: &'static Dir<'static>,
}

impl EmbeddedSnapshot {
    pub fn new() -> Self {
        Self { root: &ASSETS }
    }
}

impl Default for EmbeddedSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot for EmbeddedSnapshot {
    fn entries(&self) -> Result<Vec<SnapshotEntry>, MaterializeError> {
        fn collect(dir: &Dir<'_>, out: &mut Vec<SnapshotEntry>) {
            for entry in dir.entries() {
                match entry {
                    DirEntry::Dir(sub) => {
                        out.push(SnapshotEntry::Dir(sub.path().to_path_buf()));
                        collect(sub, out);
                    }
                    DirEntry::File(file) => out.push(SnapshotEntry::File(file.path().to_path_buf())),
                }
            }
        }

        let mut out = Vec::new();
        collect(self.root, &mut out);
        Ok(out)
    }

    fn read_file(&self, path: &Path) -> Result<Cow<'_, [u8]>, MaterializeError> {
        self.root
            .get_file(path)
            .map(|f| Cow::Borrowed(f.contents()))
            .ok_or_else(|| MaterializeError::MissingEntry {
                path: path.to_path_buf(),
            })
    }
}

/// A snapshot read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSnapshot {
    root: PathBuf,
}

impl DirSnapshot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Snapshot for DirSnapshot {
    fn entries(&self) -> Result<Vec<SnapshotEntry>, MaterializeError> {
        if !self.root.is_dir() {
            return Err(MaterializeError::MissingEntry {
                path: self.root.clone(),
            });
        }

        let mut out = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry =
                entry.map_err(|e| MaterializeError::read_snapshot(&self.root, e.into()))?;
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or(entry.path())
                .to_path_buf();

            if entry.file_type().is_dir() {
                out.push(SnapshotEntry::Dir(relative));
            } else {
                out.push(SnapshotEntry::File(relative));
            }
        }
        Ok(out)
    }

    fn read_file(&self, path: &Path) -> Result<Cow<'_, [u8]>, MaterializeError> {
        let full = self.root.join(path);
        match std::fs::read(&full) {
            Ok(bytes) => Ok(Cow::Owned(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(MaterializeError::MissingEntry {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => Err(MaterializeError::read_snapshot(full, e)),
        }
    }
}

/// Copy every entry of `snapshot` under `dest`, byte for byte.
///
/// Returns the number of files written. Written files are left writable so
/// the import rewriter can update them in place.
pub fn materialize(snapshot: &dyn Snapshot, dest: &Path) -> Result<usize, MaterializeError> {
    let mut files = 0;

    for entry in snapshot.entries()? {
        match entry {
            SnapshotEntry::Dir(path) => create_dir(&dest.join(path))?,
            SnapshotEntry::File(path) => {
                let target = dest.join(&path);
                if let Some(parent) = target.parent() {
                    create_dir(parent)?;
                }
                let data = snapshot.read_file(&path)?;
                std::fs::write(&target, &data).map_err(|e| MaterializeError::WriteFile {
                    path: target.clone(),
                    source: e,
                })?;
                tracing::trace!(path = %target.display(), bytes = data.len(), "copied snapshot file");
                files += 1;
            }
        }
    }

    tracing::debug!(files, dest = %dest.display(), "materialized snapshot");
    Ok(files)
}

/// Number of Go source files in the snapshot's vendor tree.
///
/// Zero means the packaging step never filled `vendored/`, and any program
/// importing a vendored package cannot build.
pub fn vendored_sources(snapshot: &dyn Snapshot) -> Result<usize, MaterializeError> {
    let count = snapshot
        .entries()?
        .iter()
        .filter(|entry| match entry {
            SnapshotEntry::File(path) => {
                path.starts_with(VENDOR_DIR)
                    && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
            }
            SnapshotEntry::Dir(_) => false,
        })
        .count();
    Ok(count)
}

fn create_dir(path: &Path) -> Result<(), MaterializeError> {
    std::fs::create_dir_all(path).map_err(|e| MaterializeError::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })
}
