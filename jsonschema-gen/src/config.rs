//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `jsonschema-gen.toml` files
//! and merging with command-line arguments.

use crate::error::ConfigError;
use crate::executor::DEFAULT_GO_BINARY;
use crate::module::{GoVersion, MIN_GO_VERSION};
use crate::workspace::DEFAULT_PREFIX;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "jsonschema-gen.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain configuration.
    pub go: GoConfig,

    /// Temporary workspace configuration.
    pub workspace: WorkspaceConfig,

    /// Snapshot source.
    pub snapshot: SnapshotConfig,

    /// Module requirements.
    pub module: ModuleConfig,
}

/// Toolchain configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoConfig {
    /// Binary used to run the synthesized program.
    pub binary: String,

    /// Extra environment variables for the child process.
    pub env: BTreeMap<String, String>,
}

/// Temporary workspace configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory name prefix.
    pub prefix: String,

    /// Leave the workspace on disk after the run.
    pub keep: bool,
}

/// Snapshot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Read the snapshot from this directory instead of the embedded one.
    pub dir: Option<PathBuf>,
}

/// Module requirements.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Oldest accepted `go` directive.
    pub min_go_version: String,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_GO_BINARY.to_string(),
            env: BTreeMap::new(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            keep: false,
        }
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            min_go_version: MIN_GO_VERSION.to_string(),
        }
    }
}

impl Config {
    /// Parsed minimum go version.
    pub fn min_go_version(&self) -> Result<GoVersion, ConfigError> {
        self.module
            .min_go_version
            .parse()
            .map_err(|e: crate::module::InvalidVersion| {
                ConfigError::invalid_value("module.min_go_version", e.to_string())
            })
    }

    /// Check values that would otherwise fail late in the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.min_go_version()?;

        if self.go.binary.trim().is_empty() {
            return Err(ConfigError::invalid_value("go.binary", "must not be empty"));
        }

        // The prefix becomes an import path element, and the go tool skips
        // directories starting with '.' or '_'.
        let prefix = &self.workspace.prefix;
        let valid_prefix = !prefix.is_empty()
            && !prefix.starts_with(['.', '_'])
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid_prefix {
            return Err(ConfigError::invalid_value(
                "workspace.prefix",
                format!("'{}' is not a valid directory name for a Go package", prefix),
            ));
        }

        Ok(())
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// An explicit path must exist. Without one, `jsonschema-gen.toml` in the
    /// current directory is used when present, defaults otherwise. A relative
    /// `[snapshot] dir` is resolved against the file's directory.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(ConfigError::not_found(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILENAME);
                if !default.exists() {
                    return Ok(Config::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path.clone(), e.to_string()))?;

        // A relative snapshot dir is relative to the file naming it.
        if let (Some(dir), Some(base)) = (config.snapshot.dir.as_mut(), config_path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }

        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref go) = args.go {
            config.go.binary = go.clone();
        }

        if let Some(keep) = args.keep_workspace {
            config.workspace.keep = keep;
        }

        if let Some(ref dir) = args.snapshot_dir {
            config.snapshot.dir = Some(dir.clone());
        }

        config
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Toolchain binary override.
    pub go: Option<String>,

    /// Keep workspace override.
    pub keep_workspace: Option<bool>,

    /// Snapshot directory override.
    pub snapshot_dir: Option<PathBuf>,
}
