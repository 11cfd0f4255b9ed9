//! Isolated execution of the synthesized program.
//!
//! The program is run with `go run` from inside the workspace. Workspace
//! mode is switched off and module mode forced to `auto` so imports resolve
//! only against the rewritten vendor tree and the target module, never
//! against a `go.work` the caller happens to sit in.

use crate::error::ExecError;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Instant;

/// Default toolchain binary.
pub const DEFAULT_GO_BINARY: &str = "go";

/// Environment forced on the child regardless of the caller's environment.
pub const ISOLATION_ENV: [(&str, &str); 2] = [("GOWORK", "off"), ("GO111MODULE", "auto")];

/// Runs entry points with the Go toolchain.
#[derive(Debug, Clone)]
pub struct GoRunner {
    binary: String,
    env: BTreeMap<String, String>,
}

impl Default for GoRunner {
    fn default() -> Self {
        Self::new(DEFAULT_GO_BINARY)
    }
}

impl GoRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            env: BTreeMap::new(),
        }
    }

    /// Extra variables for the child. The isolation variables still win.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Build the `go run` command for `entry_point` inside `workdir`.
    pub fn command(&self, entry_point: &Path, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("run")
            .arg(entry_point)
            .current_dir(workdir)
            .envs(&self.env)
            .envs(ISOLATION_ENV)
            .stdin(Stdio::null());
        cmd
    }

    /// Run `entry_point` to completion and return its standard output.
    ///
    /// Blocks until the child exits. Standard output and standard error are
    /// buffered separately, never streamed.
    pub fn run(&self, entry_point: &Path, workdir: &Path) -> Result<Vec<u8>, ExecError> {
        let started = Instant::now();
        let output = self
            .command(entry_point, workdir)
            .output()
            .map_err(|e| ExecError::Spawn {
                binary: self.binary.clone(),
                source: e,
            })?;

        tracing::debug!(
            status = %output.status,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "schema program finished"
        );

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let mut message = status_message(output.status);
            if !stderr.is_empty() {
                message.push('\n');
                message.push_str(&stderr);
            }
            return Err(ExecError::Failed { message });
        }
        if !stderr.is_empty() {
            return Err(ExecError::Failed {
                message: stderr.into_owned(),
            });
        }

        Ok(output.stdout)
    }
}

/// Short description of a failed exit status.
fn status_message(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => status.to_string(),
    }
}
