//! Dependency manifest parsing.
//!
//! The packaging step writes `vendored/deps.txt`, one module path per line,
//! naming every dependency flattened into the vendor tree. Names are checked
//! up front so that no replacement can overlap another.

use crate::error::ManifestError;
use std::path::Path;

/// Directory of the vendor tree inside the snapshot and the workspace.
pub const VENDOR_DIR: &str = "vendored";

/// Manifest file name inside [`VENDOR_DIR`].
pub const MANIFEST_FILE: &str = "deps.txt";

/// Validated list of vendored dependency module paths, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyManifest {
    names: Vec<String>,
}

impl DependencyManifest {
    /// Parse manifest text, skipping blank lines.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let mut names: Vec<String> = Vec::new();

        for line in content.lines() {
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            if !is_valid_name(name) {
                return Err(ManifestError::InvalidName {
                    name: name.to_string(),
                });
            }
            if names.iter().any(|n| n == name) {
                return Err(ManifestError::Duplicate {
                    name: name.to_string(),
                });
            }
            names.push(name.to_string());
        }

        for name in &names {
            if let Some(other) = names.iter().find(|o| *o != name && o.contains(name.as_str())) {
                return Err(ManifestError::Ambiguous {
                    name: name.clone(),
                    other: other.clone(),
                });
            }
        }

        Ok(Self { names })
    }

    /// Read `vendored/deps.txt` from a materialized workspace.
    pub fn load(workspace: &Path) -> Result<Self, ManifestError> {
        let path = workspace.join(VENDOR_DIR).join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| ManifestError::Read {
            path: path.clone(),
            source: e,
        })?;
        let manifest = Self::parse(&content)?;
        tracing::debug!(dependencies = manifest.len(), path = %path.display(), "loaded manifest");
        Ok(manifest)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The dependency whose namespace contains `import_path`, if any.
    pub fn covering(&self, import_path: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|name| {
                import_path
                    .strip_prefix(name.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
            .map(String::as_str)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.starts_with('/')
        && !name.ends_with('/')
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '"' | '`' | '\'' | '\\'))
}
