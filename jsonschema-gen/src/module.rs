//! Module root discovery and `go.mod` parsing.
//!
//! The locator walks upward from a directory until it finds a `go.mod`, then
//! reads the module path and the `go` directive out of it. The directive is
//! compared against a minimum supported version structurally, so `1.9` sorts
//! before `1.18`.

use crate::error::DiscoveryError;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the module declaration file.
pub const MODULE_FILE: &str = "go.mod";

/// Oldest `go` directive the vendored schema library can be built with.
pub const MIN_GO_VERSION: &str = "1.18";

/// A Go language version as written in a `go` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Prerelease suffix such as `rc1` or `beta2`.
    pub pre: Option<String>,
}

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVersion(pub String);

impl fmt::Display for InvalidVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid go version '{}'", self.0)
    }
}

impl std::error::Error for InvalidVersion {}

impl FromStr for GoVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersion(s.to_string());
        let s = s.trim();

        // Split off a prerelease suffix: "1.22rc1" -> ("1.22", "rc1").
        let split = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        let (numeric, pre) = s.split_at(split);
        if numeric.is_empty() || numeric.ends_with('.') {
            return Err(invalid());
        }
        if !pre.is_empty() && !pre.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }

        let mut parts = numeric.split('.').map(|p| p.parse::<u64>());
        let major = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
        let minor = parts.next().transpose().map_err(|_| invalid())?.unwrap_or(0);
        let patch = parts.next().transpose().map_err(|_| invalid())?.unwrap_or(0);
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            major,
            minor,
            patch,
            pre: (!pre.is_empty()).then(|| pre.to_string()),
        })
    }
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                // A release is newer than any of its prereleases.
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        if let Some(ref pre) = self.pre {
            write!(f, "{}", pre)?;
        }
        Ok(())
    }
}

/// The raw directives read from a `go.mod` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDecl {
    /// Module path from the `module` directive.
    pub name: Option<String>,
    /// Version from the `go` directive, unparsed.
    pub go_version: Option<String>,
}

/// A located Go module whose declaration passed validation.
#[derive(Debug, Clone)]
pub struct GoModule {
    /// Directory containing `go.mod`.
    pub root: PathBuf,
    /// Declared module path.
    pub name: String,
    /// Declared language version.
    pub go_version: GoVersion,
}

impl GoModule {
    /// Locate the module owning `dir` and validate its declaration.
    pub fn locate(dir: &Path, min_version: &GoVersion) -> Result<Self, DiscoveryError> {
        let root = find_module_root(dir).ok_or_else(|| DiscoveryError::ModuleNotFound {
            dir: dir.to_path_buf(),
        })?;
        let path = root.join(MODULE_FILE);
        let decl = parse_module_file(&path)?;

        let name = decl
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DiscoveryError::ModuleNameMissing { path: path.clone() })?;

        let raw_version = decl
            .go_version
            .ok_or_else(|| DiscoveryError::GoVersionMissing {
                path: path.clone(),
                min: min_version.to_string(),
            })?;
        let go_version: GoVersion =
            raw_version
                .parse()
                .map_err(|_| DiscoveryError::InvalidGoVersion {
                    path: path.clone(),
                    version: raw_version.clone(),
                })?;

        if go_version < *min_version {
            return Err(DiscoveryError::GoVersionTooOld {
                found: raw_version,
                min: min_version.to_string(),
            });
        }

        tracing::debug!(root = %root.display(), module = %name, go = %go_version, "located module");

        Ok(Self {
            root,
            name,
            go_version,
        })
    }
}

/// Walk upward from `dir` until a directory containing `go.mod` is found.
pub fn find_module_root(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .find(|candidate| candidate.join(MODULE_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Read the `module` and `go` directives from a `go.mod` file.
pub fn parse_module_file(path: &Path) -> Result<ModuleDecl, DiscoveryError> {
    let content = std::fs::read_to_string(path).map_err(|e| DiscoveryError::read(path, e))?;
    Ok(parse_module_decl(&content))
}

/// Scan `go.mod` content line by line, stopping once both directives are seen.
pub fn parse_module_decl(content: &str) -> ModuleDecl {
    let mut decl = ModuleDecl::default();

    for line in content.lines() {
        if let Some(value) = directive(line, "module") {
            decl.name = Some(value.trim_matches('"').to_string());
        } else if let Some(value) = directive(line, "go") {
            decl.go_version = Some(value.to_string());
        }

        if decl.name.is_some() && decl.go_version.is_some() {
            break;
        }
    }

    decl
}

/// Returns the trimmed argument of `keyword` if `line` is that directive.
fn directive<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let rest = rest.split("//").next().unwrap_or(rest);
    Some(rest.trim())
}
