//! Re-homing of vendored import paths.
//!
//! Every vendored dependency is moved under a namespace nested inside the
//! target package, `<import_path>/<workspace>/vendored/<dependency>`, so the
//! child build never resolves it against the caller's own dependency graph.
//! Occurrences are replaced only on import-path boundaries, in a single pass,
//! so replaced text is never matched again.

use crate::error::RewriteError;
use crate::manifest::{DependencyManifest, VENDOR_DIR};
use crate::scanner::SourceScanner;
use std::path::Path;

/// Namespace the vendored tree is re-homed under.
pub fn vendor_prefix(import_path: &str, workspace_name: &str) -> String {
    format!("{}/{}/{}", import_path, workspace_name, VENDOR_DIR)
}

/// Summary of a tree rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Source files visited.
    pub files_scanned: usize,
    /// Source files that changed.
    pub files_rewritten: usize,
    /// Total replaced occurrences.
    pub replacements: usize,
}

/// Rewrites dependency import paths to their workspace-local namespace.
#[derive(Debug, Clone)]
pub struct ImportRewriter {
    manifest: DependencyManifest,
    /// Dependency names, longest first.
    names: Vec<String>,
    prefix: String,
}

impl ImportRewriter {
    pub fn new(manifest: &DependencyManifest, prefix: impl Into<String>) -> Self {
        let mut names = manifest.names().to_vec();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Self {
            manifest: manifest.clone(),
            names,
            prefix: prefix.into(),
        }
    }

    /// Fail if the target package itself lives under a dependency's namespace.
    ///
    /// Its import in the entry point would be rewritten along with the
    /// vendored ones.
    pub fn check_target(&self, import_path: &str) -> Result<(), RewriteError> {
        match self.manifest.covering(import_path) {
            Some(dependency) => Err(RewriteError::TargetCollision {
                import_path: import_path.to_string(),
                dependency: dependency.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Rewrite `text`, returning the new text and the number of replacements.
    pub fn rewrite_text(&self, text: &str) -> (String, usize) {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut count = 0;
        let mut i = 0;

        while i < bytes.len() {
            let boundary_before = i == 0 || !(is_path_byte(bytes[i - 1]) || bytes[i - 1] == b'/');
            let matched = if boundary_before {
                self.names.iter().find(|name| {
                    let end = i + name.len();
                    bytes[i..].starts_with(name.as_bytes())
                        && bytes.get(end).map_or(true, |&b| !is_path_byte(b))
                })
            } else {
                None
            };

            match matched {
                Some(name) => {
                    out.push_str(&text[copied..i]);
                    out.push_str(&self.prefix);
                    out.push('/');
                    out.push_str(name);
                    i += name.len();
                    copied = i;
                    count += 1;
                }
                None => i += 1,
            }
        }

        out.push_str(&text[copied..]);
        (out, count)
    }

    /// Rewrite every Go source under `root` in place.
    pub fn rewrite_tree(&self, root: &Path) -> Result<RewriteStats, RewriteError> {
        let files = SourceScanner::new(root).scan().map_err(RewriteError::Scan)?;
        let mut stats = RewriteStats {
            files_scanned: files.len(),
            ..Default::default()
        };

        for file in files {
            let (rewritten, count) = self.rewrite_text(&file.content);
            if count == 0 {
                continue;
            }

            std::fs::write(&file.path, rewritten).map_err(|e| RewriteError::Write {
                path: file.path.clone(),
                source: e,
            })?;
            tracing::trace!(file = %file.relative_path.display(), count, "rewrote imports");

            stats.files_rewritten += 1;
            stats.replacements += count;
        }

        tracing::debug!(
            scanned = stats.files_scanned,
            rewritten = stats.files_rewritten,
            replacements = stats.replacements,
            prefix = %self.prefix,
            "rewrote vendored imports"
        );
        Ok(stats)
    }
}

/// Bytes that can continue an import path element.
///
/// Non-ASCII bytes count as path bytes so identifiers with Unicode letters
/// are never split.
fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_' | b'~') || b >= 0x80
}
