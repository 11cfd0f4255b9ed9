//! The generation pipeline.
//!
//! Locate module → build descriptor → synthesize entry point → materialize
//! snapshot → rewrite imports → run. Every stage returns its error upward;
//! nothing is retried. The workspace is owned by [`PreparedRun`] and removed
//! when it is dropped, on success and failure alike.

use crate::config::Config;
use crate::error::{GenResult, MaterializeError};
use crate::executor::GoRunner;
use crate::manifest::DependencyManifest;
use crate::rewriter::{vendor_prefix, ImportRewriter, RewriteStats};
use crate::snapshot::{materialize, vendored_sources, Snapshot};
use crate::target::TargetDescriptor;
use crate::template::write_entry_point;
use crate::workspace::TempWorkspace;
use std::path::{Path, PathBuf};

/// A workspace ready to run.
#[derive(Debug)]
pub struct PreparedRun {
    pub target: TargetDescriptor,
    pub workspace: TempWorkspace,
    pub entry_point: PathBuf,
    pub manifest: DependencyManifest,
    pub rewrite: RewriteStats,
    /// Go files in the materialized vendor tree.
    pub vendored_sources: usize,
}

/// Schema generation for one file and type at a time.
pub struct Pipeline<'a> {
    config: &'a Config,
    snapshot: &'a dyn Snapshot,
    runner: GoRunner,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, snapshot: &'a dyn Snapshot) -> Self {
        let runner = GoRunner::new(config.go.binary.clone()).with_env(config.go.env.clone());
        Self {
            config,
            snapshot,
            runner,
        }
    }

    /// Generate the schema for `type_name` declared in `file`.
    pub fn generate(&self, file: &Path, type_name: &str) -> GenResult<Vec<u8>> {
        let prepared = self.prepare(file, type_name)?;
        self.execute(prepared)
    }

    /// Build the workspace without running anything.
    #[tracing::instrument(skip(self, file), fields(file = %file.display()))]
    pub fn prepare(&self, file: &Path, type_name: &str) -> GenResult<PreparedRun> {
        let min_version = self.config.min_go_version()?;
        let target = TargetDescriptor::build(file, type_name, &min_version)?;

        let parent = target
            .file_path
            .parent()
            .unwrap_or(target.module_root.as_path())
            .to_path_buf();
        let workspace = TempWorkspace::create(
            &parent,
            &self.config.workspace.prefix,
            self.config.workspace.keep,
        )?;

        let entry_point = write_entry_point(self.snapshot, &target, workspace.path())?;
        materialize(self.snapshot, workspace.path())?;
        let sources = vendored_sources(self.snapshot)?;

        let manifest = DependencyManifest::load(workspace.path())?;
        if manifest.is_empty() {
            tracing::warn!("dependency manifest is empty, nothing will be rewritten");
        }

        let rewriter = ImportRewriter::new(
            &manifest,
            vendor_prefix(&target.import_path, workspace.name()),
        );
        rewriter.check_target(&target.import_path)?;
        let rewrite = rewriter.rewrite_tree(workspace.path())?;

        Ok(PreparedRun {
            target,
            workspace,
            entry_point,
            manifest,
            rewrite,
            vendored_sources: sources,
        })
    }

    /// Run a prepared workspace, consuming it.
    #[tracing::instrument(skip_all, fields(type_name = %prepared.target.type_name))]
    pub fn execute(&self, prepared: PreparedRun) -> GenResult<Vec<u8>> {
        if !prepared.manifest.is_empty() && prepared.vendored_sources == 0 {
            return Err(MaterializeError::EmptyVendorTree {
                dependencies: prepared.manifest.len(),
            }
            .into());
        }

        let output = self
            .runner
            .run(&prepared.entry_point, prepared.workspace.path())?;
        tracing::info!(bytes = output.len(), "generated schema");
        Ok(output)
    }
}
