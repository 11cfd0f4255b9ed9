//! # jsonschema-gen
//!
//! Prints the JSON Schema of a Go type.
//!
//! ## Usage
//!
//! ```bash
//! jsonschema-gen --file ./pkg/models.go --type User
//!
//! # Keep the generated workspace around for inspection
//! JSONSCHEMA_GEN_LOG=debug jsonschema-gen -f ./pkg/models.go -t User --keep-workspace
//! ```
//!
//! On success the schema is written to standard output. On failure a single
//! `{"error": "..."}` object is written to standard error and the exit status
//! is 1.

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use jsonschema_gen::{
    config::{CliArgs, ConfigManager},
    error::GenResult,
    reporter::{report_failure, report_success},
    DirSnapshot, EmbeddedSnapshot, Pipeline, Snapshot,
};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "JSONSCHEMA_GEN_LOG";

#[derive(Parser)]
#[command(name = "jsonschema-gen")]
#[command(author, version, about = "Generate a JSON Schema for a Go type", long_about = None)]
struct Cli {
    /// Path to the Go source file declaring the type
    #[arg(short, long)]
    file: PathBuf,

    /// Name of the type to generate the schema for
    #[arg(short = 't', long = "type", value_name = "NAME")]
    type_name: String,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Go toolchain binary
    #[arg(long, value_name = "BIN")]
    go: Option<String>,

    /// Leave the temporary workspace on disk
    #[arg(long)]
    keep_workspace: bool,

    /// Use a snapshot directory instead of the embedded one
    #[arg(long, value_name = "DIR")]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let reported = match run(cli) {
        Ok(schema) => report_success(&mut io::stdout().lock(), &schema),
        Err(e) => {
            tracing::debug!(error = ?e, "generation failed");
            let _ = report_failure(&mut io::stderr().lock(), &e.to_string());
            return ExitCode::FAILURE;
        }
    };

    match reported {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = report_failure(&mut io::stderr().lock(), &e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> GenResult<Vec<u8>> {
    let config = ConfigManager::load(cli.config.as_deref())?;
    let config = ConfigManager::merge_cli_args(
        config,
        &CliArgs {
            go: cli.go,
            keep_workspace: cli.keep_workspace.then_some(true),
            snapshot_dir: cli.snapshot_dir,
        },
    );
    config.validate()?;

    let embedded = EmbeddedSnapshot::new();
    let on_disk = config.snapshot.dir.as_ref().map(DirSnapshot::new);
    let snapshot: &dyn Snapshot = match on_disk {
        Some(ref dir) => dir,
        None => &embedded,
    };

    Pipeline::new(&config, snapshot).generate(&cli.file, &cli.type_name)
}

/// Diagnostics go to standard error and are off unless `JSONSCHEMA_GEN_LOG` is set,
/// so the error-object contract on standard error holds by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
