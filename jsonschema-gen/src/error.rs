//! Error types for the generator.
//!
//! Every stage of the pipeline has its own error enum. They all roll up into
//! [`GenError`], whose `Display` text is what ends up in the `error` field of
//! the reported failure object.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations.
pub type GenResult<T> = Result<T, GenError>;

/// Main error type for a generator run.
#[derive(Debug, Error)]
pub enum GenError {
    /// Module, package or type discovery failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Copying the snapshot into the workspace failed.
    #[error("Failed to materialize workspace: {0}")]
    Materialize(#[from] MaterializeError),

    /// Rendering the entry-point template failed.
    #[error("Failed to render entry point: {0}")]
    Template(#[from] TemplateError),

    /// The dependency manifest could not be used.
    #[error("Invalid dependency manifest: {0}")]
    Manifest(#[from] ManifestError),

    /// Rewriting vendored imports failed.
    #[error("Failed to rewrite imports: {0}")]
    Rewrite(#[from] RewriteError),

    /// The schema program could not be run or failed.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Error while locating the module, reading the package or checking the request.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The source path could not be resolved.
    #[error("Failed to resolve {path}: {source}")]
    ResolvePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `go.mod` above the source file.
    #[error("go.mod not found for file {dir}")]
    ModuleNotFound { dir: PathBuf },

    /// Reading a file failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `go.mod` has no module directive.
    #[error("module name not found in {path}")]
    ModuleNameMissing { path: PathBuf },

    /// `go.mod` has no go directive.
    #[error("go directive not found in {path}, go mod version must be at least {min}")]
    GoVersionMissing { path: PathBuf, min: String },

    /// The go directive could not be parsed.
    #[error("invalid go version '{version}' in {path}")]
    InvalidGoVersion { path: PathBuf, version: String },

    /// The module targets a toolchain older than the supported floor.
    #[error("go mod version must be at least {min} (found {found})")]
    GoVersionTooOld { found: String, min: String },

    /// The source file has no package clause.
    #[error("package name not found in file {file}")]
    PackageNotFound { file: PathBuf },

    /// The requested type name is not a Go identifier.
    #[error("'{name}' is not a valid Go type name")]
    InvalidTypeName { name: String },
}

/// Error while creating the workspace or copying the snapshot into it.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// Failed to create the temporary workspace.
    #[error("Failed to create workspace in {parent}: {source}")]
    CreateWorkspace {
        parent: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read an entry of the snapshot.
    #[error("Failed to read snapshot entry {path}: {source}")]
    ReadSnapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot entry requested but not present.
    #[error("Snapshot entry not found: {path}")]
    MissingEntry { path: PathBuf },

    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest names dependencies the snapshot does not carry.
    #[error(
        "Snapshot lists {dependencies} vendored dependencies but has no Go sources \
         under vendored/; package the vendor tree into assets/vendored or pass --snapshot-dir"
    )]
    EmptyVendorTree { dependencies: usize },
}

/// Error rendering the entry-point template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template is not valid UTF-8.
    #[error("template {name} is not valid UTF-8")]
    NotUtf8 { name: String },

    /// A `{{` without a matching `}}`.
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },

    /// A placeholder naming a field the descriptor does not have.
    #[error("unknown placeholder '{placeholder}'")]
    UnknownField { placeholder: String },
}

/// Error reading or validating the dependency manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// IO error reading the manifest.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A name listed twice.
    #[error("dependency '{name}' is listed more than once")]
    Duplicate { name: String },

    /// A name that cannot be an import path.
    #[error("'{name}' is not a valid dependency import path")]
    InvalidName { name: String },

    /// One name occurs inside another, so replacements could overlap.
    #[error("dependency '{name}' occurs inside '{other}'")]
    Ambiguous { name: String, other: String },
}

/// Error during source file scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Directory does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// IO error during scanning.
    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from ignore crate walker.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error rewriting vendored import paths.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Source discovery failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Failed to write a rewritten file back.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target package lives under a vendored dependency's namespace.
    #[error("target package {import_path} collides with vendored dependency {dependency}")]
    TargetCollision {
        import_path: String,
        dependency: String,
    },
}

/// Error running the synthesized program.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The toolchain binary could not be started.
    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but did not succeed.
    #[error("{message}")]
    Failed { message: String },
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DiscoveryError {
    /// Create a read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

impl MaterializeError {
    /// Create a snapshot read error.
    pub fn read_snapshot(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadSnapshot {
            path: path.into(),
            source,
        }
    }
}

impl ScanError {
    /// Create a directory not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
