//! Entry-point program synthesis.
//!
//! The snapshot ships a fixed `main.templ` whose `{{.Field}}` placeholders are
//! filled from the [`TargetDescriptor`]. The rendered program imports the
//! target package, reflects the requested type and prints its schema.

use crate::error::{GenResult, MaterializeError, TemplateError};
use crate::snapshot::Snapshot;
use crate::target::TargetDescriptor;
use std::path::{Path, PathBuf};

/// Name of the template inside the snapshot.
pub const TEMPLATE_FILE: &str = "main.templ";

/// Name of the synthesized program inside the workspace.
pub const ENTRY_POINT_FILE: &str = "main.go";

/// Substitute every `{{.Field}}` placeholder in `template`.
pub fn render(template: &str, target: &TargetDescriptor) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let end = after_open
            .find("}}")
            .ok_or(TemplateError::Unterminated {
                offset: offset + start,
            })?;

        let placeholder = after_open[..end].trim();
        let value = placeholder
            .strip_prefix('.')
            .and_then(|field| target.field(field))
            .ok_or_else(|| TemplateError::UnknownField {
                placeholder: placeholder.to_string(),
            })?;
        out.push_str(&value);

        let consumed = start + 2 + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Render the snapshot's template for `target` and write it into `workspace`.
///
/// Returns the path of the written entry point.
pub fn write_entry_point(
    snapshot: &dyn Snapshot,
    target: &TargetDescriptor,
    workspace: &Path,
) -> GenResult<PathBuf> {
    let raw = snapshot.read_file(Path::new(TEMPLATE_FILE))?;
    let template = std::str::from_utf8(&raw).map_err(|_| TemplateError::NotUtf8 {
        name: TEMPLATE_FILE.to_string(),
    })?;
    let program = render(template, target)?;

    let path = workspace.join(ENTRY_POINT_FILE);
    std::fs::write(&path, program).map_err(|e| MaterializeError::WriteFile {
        path: path.clone(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), "wrote entry point");
    Ok(path)
}
