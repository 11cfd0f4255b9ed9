//! Integration tests for jsonschema-gen.
//!
//! Workspace preparation is checked against an on-disk fixture snapshot whose
//! "schema library" is a tiny reflection package. Scenarios that run the
//! program need the Go toolchain and are skipped when `go` is not on PATH.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use jsonschema_gen::{
    config::Config,
    error::{DiscoveryError, ExecError, GenError, MaterializeError, RewriteError},
    manifest::VENDOR_DIR,
    reporter::ErrorReport,
    DirSnapshot, EmbeddedSnapshot, Pipeline,
};

const GO_MOD: &str = "module example.com/app\n\ngo 1.20\n";

const MODELS: &str = r#"package models

// User is a person using the app.
type User struct {
	Name string
	Age  int
}
"#;

/// Get the path to the fixture snapshot.
fn fixture_snapshot() -> DirSnapshot {
    DirSnapshot::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/snapshot"))
}

/// Create a temporary Go module with the given files.
fn create_module(go_mod: Option<&str>, files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::Builder::new().prefix("module").tempdir().unwrap();
    if let Some(go_mod) = go_mod {
        fs::write(dir.path().join("go.mod"), go_mod).unwrap();
    }
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

fn app_module() -> TempDir {
    create_module(Some(GO_MOD), &[("pkg/models.go", MODELS)])
}

fn go_available() -> bool {
    Command::new("go")
        .arg("version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Configuration for runs that invoke the toolchain.
fn go_config() -> Config {
    let mut config = Config::default();
    let has_cache = ["GOCACHE", "XDG_CACHE_HOME", "HOME"]
        .iter()
        .any(|var| std::env::var_os(var).is_some());
    if !has_cache {
        let cache = std::env::temp_dir().join("jsonschema-gen-test-gocache");
        config
            .go
            .env
            .insert("GOCACHE".to_string(), cache.to_string_lossy().into_owned());
    }
    config
}

/// Write an executable shell script standing in for the toolchain.
#[cfg(unix)]
fn fake_toolchain(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-go");
    fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn workspaces_in(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with("jsonschema-gen-"))
        })
        .collect()
}

// =============================================================================
// Preparation Tests
// =============================================================================

#[test]
fn test_prepare_builds_workspace_next_to_source() {
    let module = app_module();
    let config = Config::default();
    let snapshot = fixture_snapshot();

    let prepared = Pipeline::new(&config, &snapshot)
        .prepare(&module.path().join("pkg/models.go"), "User")
        .unwrap();

    assert_eq!(prepared.target.import_path, "example.com/app/pkg");
    assert_eq!(
        prepared.workspace.path().parent().unwrap(),
        fs::canonicalize(module.path().join("pkg")).unwrap()
    );
    assert!(prepared.entry_point.is_file());
    assert!(prepared
        .workspace
        .path()
        .join("vendored/example.org/fakeschema/schema.go")
        .is_file());
    assert_eq!(prepared.manifest.names(), ["example.org/fakeschema"]);
}

#[test]
fn test_prepare_leaves_target_import_untouched() {
    let module = app_module();
    let config = Config::default();
    let snapshot = fixture_snapshot();

    let prepared = Pipeline::new(&config, &snapshot)
        .prepare(&module.path().join("pkg/models.go"), "User")
        .unwrap();
    let main = fs::read_to_string(&prepared.entry_point).unwrap();

    assert!(main.contains("\ttarget \"example.com/app/pkg\"\n"));
    assert!(main.contains("new(target.User)"));
}

#[test]
fn test_prepare_rehomes_vendored_imports() {
    let module = app_module();
    let config = Config::default();
    let snapshot = fixture_snapshot();

    let prepared = Pipeline::new(&config, &snapshot)
        .prepare(&module.path().join("pkg/models.go"), "User")
        .unwrap();
    let main = fs::read_to_string(&prepared.entry_point).unwrap();
    let expected = format!(
        "\"example.com/app/pkg/{}/{}/example.org/fakeschema\"",
        prepared.workspace.name(),
        VENDOR_DIR
    );

    assert!(main.contains(&expected), "entry point:\n{}", main);
    assert!(!main.contains("\t\"example.org/fakeschema\""));
    assert_eq!(prepared.rewrite.replacements, 1);
    assert_eq!(prepared.rewrite.files_rewritten, 1);
}

#[test]
fn test_prepare_with_embedded_snapshot() {
    let module = app_module();
    let config = Config::default();
    let snapshot = EmbeddedSnapshot::new();

    let prepared = Pipeline::new(&config, &snapshot)
        .prepare(&module.path().join("pkg/models.go"), "User")
        .unwrap();
    let main = fs::read_to_string(&prepared.entry_point).unwrap();

    assert!(main.contains(&format!(
        "\"example.com/app/pkg/{}/vendored/github.com/invopop/jsonschema\"",
        prepared.workspace.name()
    )));
    assert!(main.contains("target \"example.com/app/pkg\""));
}

#[test]
fn test_workspace_removed_when_prepared_run_dropped() {
    let module = app_module();
    let config = Config::default();
    let snapshot = fixture_snapshot();

    let prepared = Pipeline::new(&config, &snapshot)
        .prepare(&module.path().join("pkg/models.go"), "User")
        .unwrap();
    let path = prepared.workspace.path().to_path_buf();
    assert!(path.is_dir());

    drop(prepared);
    assert!(!path.exists());
}

#[test]
fn test_workspace_removed_after_failed_run() {
    let module = app_module();
    let mut config = Config::default();
    config.go.binary = "definitely-not-a-go-toolchain".to_string();
    let snapshot = fixture_snapshot();

    let err = Pipeline::new(&config, &snapshot)
        .generate(&module.path().join("pkg/models.go"), "User")
        .unwrap_err();

    assert!(matches!(err, GenError::Exec(ExecError::Spawn { .. })));
    assert!(workspaces_in(&module.path().join("pkg")).is_empty());
}

#[test]
fn test_kept_workspace_survives_failed_run() {
    let module = app_module();
    let mut config = Config::default();
    config.go.binary = "definitely-not-a-go-toolchain".to_string();
    config.workspace.keep = true;
    let snapshot = fixture_snapshot();

    let result = Pipeline::new(&config, &snapshot)
        .generate(&module.path().join("pkg/models.go"), "User");

    assert!(result.is_err());
    assert_eq!(workspaces_in(&module.path().join("pkg")).len(), 1);
}

#[test]
fn test_snapshot_without_vendored_sources_fails_before_running() {
    let module = app_module();
    let snapshot_dir = TempDir::new().unwrap();
    fs::copy(
        fixture_snapshot().root().join("main.templ"),
        snapshot_dir.path().join("main.templ"),
    )
    .unwrap();
    fs::create_dir(snapshot_dir.path().join(VENDOR_DIR)).unwrap();
    fs::write(
        snapshot_dir.path().join(VENDOR_DIR).join("deps.txt"),
        "example.org/fakeschema\n",
    )
    .unwrap();

    let mut config = Config::default();
    config.go.binary = "definitely-not-a-go-toolchain".to_string();
    let snapshot = DirSnapshot::new(snapshot_dir.path());

    let err = Pipeline::new(&config, &snapshot)
        .generate(&module.path().join("pkg/models.go"), "User")
        .unwrap_err();

    assert!(matches!(
        err,
        GenError::Materialize(MaterializeError::EmptyVendorTree { dependencies: 1 })
    ));
    assert!(err.to_string().contains("--snapshot-dir"));
    assert!(workspaces_in(&module.path().join("pkg")).is_empty());
}

#[test]
fn test_concurrent_preparations_use_distinct_workspaces() {
    let module = app_module();
    let config = Config::default();
    let snapshot = fixture_snapshot();
    let pipeline = Pipeline::new(&config, &snapshot);
    let file = module.path().join("pkg/models.go");

    let a = pipeline.prepare(&file, "User").unwrap();
    let b = pipeline.prepare(&file, "User").unwrap();

    assert_ne!(a.workspace.path(), b.workspace.path());
    // Each entry point refers to its own vendored copy.
    let main_a = fs::read_to_string(&a.entry_point).unwrap();
    let main_b = fs::read_to_string(&b.entry_point).unwrap();
    assert!(main_a.contains(a.workspace.name()));
    assert!(!main_a.contains(b.workspace.name()));
    assert!(main_b.contains(b.workspace.name()));
}

// =============================================================================
// Discovery Failure Tests
// =============================================================================

#[test]
fn test_missing_module_file() {
    let module = create_module(None, &[("pkg/models.go", MODELS)]);
    let config = Config::default();
    let snapshot = fixture_snapshot();

    let err = Pipeline::new(&config, &snapshot)
        .generate(&module.path().join("pkg/models.go"), "User")
        .unwrap_err();

    assert!(matches!(
        err,
        GenError::Discovery(DiscoveryError::ModuleNotFound { .. })
    ));
    assert!(err.to_string().contains("go.mod not found"));
}

#[test]
fn test_module_version_below_floor() {
    let module = create_module(
        Some("module example.com/app\n\ngo 1.16\n"),
        &[("pkg/models.go", MODELS)],
    );
    let config = Config::default();
    let snapshot = fixture_snapshot();

    let err = Pipeline::new(&config, &snapshot)
        .generate(&module.path().join("pkg/models.go"), "User")
        .unwrap_err();

    assert!(matches!(
        err,
        GenError::Discovery(DiscoveryError::GoVersionTooOld { .. })
    ));
    assert!(err.to_string().contains("at least 1.18"));
    assert!(workspaces_in(&module.path().join("pkg")).is_empty());
}

#[test]
fn test_lexically_small_version_is_accepted() {
    // "1.100" sorts before "1.18" as a string.
    let module = create_module(
        Some("module example.com/app\n\ngo 1.100\n"),
        &[("pkg/models.go", MODELS)],
    );
    let config = Config::default();
    let snapshot = fixture_snapshot();

    let prepared = Pipeline::new(&config, &snapshot)
        .prepare(&module.path().join("pkg/models.go"), "User")
        .unwrap();
    assert_eq!(prepared.target.module_name, "example.com/app");
}

#[test]
fn test_target_inside_vendored_namespace_is_rejected() {
    let module = create_module(
        Some("module example.org/fakeschema\n\ngo 1.20\n"),
        &[("sub/models.go", "package sub\n\ntype User struct{}\n")],
    );
    let config = Config::default();
    let snapshot = fixture_snapshot();

    let err = Pipeline::new(&config, &snapshot)
        .generate(&module.path().join("sub/models.go"), "User")
        .unwrap_err();

    assert!(matches!(
        err,
        GenError::Rewrite(RewriteError::TargetCollision { .. })
    ));
    assert!(workspaces_in(&module.path().join("sub")).is_empty());
}

// =============================================================================
// Binary Tests
// =============================================================================

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jsonschema-gen"));
    cmd.env_remove("JSONSCHEMA_GEN_LOG");
    cmd
}

#[test]
fn test_binary_usage_error_exits_one() {
    let output = binary().arg("--file").arg("x.go").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_binary_reports_structured_error() {
    let module = create_module(None, &[("models.go", MODELS)]);

    let output = binary()
        .arg("--file")
        .arg(module.path().join("models.go"))
        .arg("--type")
        .arg("User")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let report: ErrorReport = serde_json::from_slice(&output.stderr).unwrap();
    assert!(report.error.contains("go.mod not found"));
}

#[cfg(unix)]
#[test]
fn test_binary_relays_program_output_verbatim() {
    let module = app_module();
    let tools = TempDir::new().unwrap();
    let go = fake_toolchain(
        tools.path(),
        r#"[ "$1" = run ] && [ -f "$2" ] || exit 64
printf '{\n  "type": "object",\n  "title": "caf\303\251"\n}'
"#,
    );

    let output = binary()
        .current_dir(module.path())
        .arg("-f")
        .arg(module.path().join("pkg/models.go"))
        .arg("-t")
        .arg("User")
        .arg("--go")
        .arg(&go)
        .arg("--snapshot-dir")
        .arg(fixture_snapshot().root())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stderr.is_empty());
    assert_eq!(
        output.stdout,
        "{\n  \"type\": \"object\",\n  \"title\": \"café\"\n}".as_bytes()
    );
    assert!(workspaces_in(&module.path().join("pkg")).is_empty());
}

#[cfg(unix)]
#[test]
fn test_binary_reports_program_failure() {
    let module = app_module();
    let tools = TempDir::new().unwrap();
    let go = fake_toolchain(
        tools.path(),
        "printf '{}'\necho './main.go:9: undefined: target.Missing' >&2\nexit 2\n",
    );

    let output = binary()
        .current_dir(module.path())
        .arg("-f")
        .arg(module.path().join("pkg/models.go"))
        .arg("-t")
        .arg("Missing")
        .arg("--go")
        .arg(&go)
        .arg("--snapshot-dir")
        .arg(fixture_snapshot().root())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    // One JSON object on one line.
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.matches('\n').count(), 1, "{}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stderr).unwrap();
    assert_eq!(value.as_object().unwrap().len(), 1);
    assert_eq!(
        value["error"],
        "exit status 2\n./main.go:9: undefined: target.Missing\n"
    );
    assert!(workspaces_in(&module.path().join("pkg")).is_empty());
}

// =============================================================================
// End-to-End Tests (require the Go toolchain)
// =============================================================================

#[test]
fn test_end_to_end_schema() {
    if !go_available() {
        eprintln!("skipping: go toolchain not found");
        return;
    }

    let module = app_module();
    let config = go_config();
    let snapshot = fixture_snapshot();

    let output = Pipeline::new(&config, &snapshot)
        .generate(&module.path().join("pkg/models.go"), "User")
        .unwrap();

    let schema: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["Name"]["type"], "string");
    assert_eq!(schema["properties"]["Age"]["type"], "integer");
    assert!(workspaces_in(&module.path().join("pkg")).is_empty());
}

#[test]
fn test_end_to_end_is_idempotent() {
    if !go_available() {
        eprintln!("skipping: go toolchain not found");
        return;
    }

    let module = app_module();
    let config = go_config();
    let snapshot = fixture_snapshot();
    let pipeline = Pipeline::new(&config, &snapshot);
    let file = module.path().join("pkg/models.go");

    let first = pipeline.generate(&file, "User").unwrap();
    let second = pipeline.generate(&file, "User").unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_end_to_end_unknown_type() {
    if !go_available() {
        eprintln!("skipping: go toolchain not found");
        return;
    }

    let module = app_module();
    let config = go_config();
    let snapshot = fixture_snapshot();

    let err = Pipeline::new(&config, &snapshot)
        .generate(&module.path().join("pkg/models.go"), "Missing")
        .unwrap_err();

    assert!(matches!(err, GenError::Exec(ExecError::Failed { .. })));
    let message = err.to_string();
    assert!(message.starts_with("exit status"), "{}", message);
    assert!(message.contains("Missing"), "{}", message);

    let report: serde_json::Value =
        serde_json::from_str(&ErrorReport::new(message).to_json()).unwrap();
    assert_eq!(report.as_object().unwrap().len(), 1);
    assert!(workspaces_in(&module.path().join("pkg")).is_empty());
}

#[test]
fn test_end_to_end_binary() {
    if !go_available() {
        eprintln!("skipping: go toolchain not found");
        return;
    }

    let module = app_module();
    let mut cmd = binary();
    for (key, value) in &go_config().go.env {
        cmd.env(key, value);
    }

    let output = cmd
        .arg("-f")
        .arg(module.path().join("pkg/models.go"))
        .arg("-t")
        .arg("User")
        .arg("--snapshot-dir")
        .arg(fixture_snapshot().root())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stderr.is_empty());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["properties"]["Age"]["type"], "integer");
}
