//! # jsonschema-gen
//!
//! Library behind the `jsonschema-gen` CLI, which prints the JSON Schema of a
//! Go type without the type's module depending on a schema library.
//!
//! A throwaway `main.go` is synthesized next to the source file. It imports
//! the target package and a vendored copy of the schema library, whose import
//! paths are rewritten to live under the target package so they cannot clash
//! with the module's own dependencies. The program is run with `go run` and
//! its output relayed.
//!
//! ## Architecture
//!
//! - [`module`] - Module root discovery and `go.mod` parsing
//! - [`target`] - Target descriptor construction
//! - [`template`] - Entry-point synthesis
//! - [`snapshot`] - Embedded snapshot and materialization
//! - [`manifest`] - Dependency manifest parsing
//! - [`scanner`] - Source file discovery
//! - [`rewriter`] - Import path rewriting
//! - [`workspace`] - Temporary workspace lifecycle
//! - [`executor`] - Isolated `go run`
//! - [`reporter`] - Output and error reporting
//! - [`pipeline`] - Stage wiring
//! - [`config`] - Configuration management and TOML parsing
//! - [`error`] - Error types and handling

pub mod config;
pub mod error;
pub mod executor;
pub mod manifest;
pub mod module;
pub mod pipeline;
pub mod reporter;
pub mod rewriter;
pub mod scanner;
pub mod snapshot;
pub mod target;
pub mod template;
pub mod workspace;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use error::{GenError, GenResult};
pub use pipeline::{Pipeline, PreparedRun};
pub use snapshot::{DirSnapshot, EmbeddedSnapshot, Snapshot};
pub use target::TargetDescriptor;
