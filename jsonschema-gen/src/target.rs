//! Target descriptor construction.
//!
//! Combines the source file's package clause, the owning module and the
//! requested type name into the single value the entry-point template is
//! rendered from.

use crate::error::DiscoveryError;
use crate::module::{GoModule, GoVersion};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

/// Everything known about the type a schema is requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Module path declared in `go.mod`.
    pub module_name: String,
    /// Directory containing `go.mod`.
    pub module_root: PathBuf,
    /// Package clause of the source file.
    pub package_name: String,
    /// Slash-separated directory of the file relative to the module root, empty at the root.
    pub relative_path: String,
    /// Import path of the package the file belongs to.
    pub import_path: String,
    /// Type to reflect.
    pub type_name: String,
    /// Base name of the source file.
    pub file_name: String,
    /// Absolute path of the source file.
    pub file_path: PathBuf,
}

impl TargetDescriptor {
    /// Build the descriptor for `type_name` declared in `file`.
    pub fn build(
        file: &Path,
        type_name: &str,
        min_version: &GoVersion,
    ) -> Result<Self, DiscoveryError> {
        if !is_go_identifier(type_name) {
            return Err(DiscoveryError::InvalidTypeName {
                name: type_name.to_string(),
            });
        }

        let file_path = std::fs::canonicalize(file).map_err(|e| DiscoveryError::ResolvePath {
            path: file.to_path_buf(),
            source: e,
        })?;
        let file_dir = file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| file_path.clone());
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let package_name = parse_package_name(&file_path)?;
        let module = GoModule::locate(&file_dir, min_version)?;

        let relative_path = relative_import_path(&module.root, &file_dir);
        let import_path = join_import_path(&module.name, &relative_path);

        tracing::debug!(
            import_path = %import_path,
            package = %package_name,
            type_name = %type_name,
            "built target descriptor"
        );

        Ok(Self {
            module_name: module.name,
            module_root: module.root,
            package_name,
            relative_path,
            import_path,
            type_name: type_name.to_string(),
            file_name,
            file_path,
        })
    }

    /// Look up a descriptor field by its template name.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "ModuleName" => self.module_name.clone(),
            "PackageName" => self.package_name.clone(),
            "RelativePath" => self.relative_path.clone(),
            "ImportName" | "ImportPath" => self.import_path.clone(),
            "TypeName" => self.type_name.clone(),
            "FileName" => self.file_name.clone(),
            "FilePath" => self.file_path.display().to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// Read the package name from the first `package` clause in `file`.
pub fn parse_package_name(file: &Path) -> Result<String, DiscoveryError> {
    let handle = File::open(file).map_err(|e| DiscoveryError::read(file, e))?;

    for line in BufReader::new(handle).lines() {
        let line = line.map_err(|e| DiscoveryError::read(file, e))?;
        if let Some(rest) = line.strip_prefix("package ") {
            let name = rest.split("//").next().unwrap_or(rest).trim();
            if !name.is_empty() {
                return Ok(name.to_string());
            }
        }
    }

    Err(DiscoveryError::PackageNotFound {
        file: file.to_path_buf(),
    })
}

/// Slash-separated path from `root` to `dir`, or empty if they are the same.
pub fn relative_import_path(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(Path::new(""));
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a module path and a relative package path.
pub fn join_import_path(module_name: &str, relative_path: &str) -> String {
    if relative_path.is_empty() {
        module_name.to_string()
    } else {
        format!("{}/{}", module_name, relative_path)
    }
}

/// Whether `name` is a valid Go identifier.
pub fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    }
}
