//! Result reporting.
//!
//! Success relays the schema program's standard output untouched. Every
//! failure, whatever stage it came from, becomes one `{"error": ...}` object
//! on standard error.

use serde::{Deserialize, Serialize};
use std::io::Write;

/// The failure object written to standard error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Compact JSON encoding, without trailing newline.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"error":"unknown error"}"#))
    }
}

/// Write the captured schema bytes verbatim.
pub fn report_success(out: &mut impl Write, payload: &[u8]) -> std::io::Result<()> {
    out.write_all(payload)?;
    out.flush()
}

/// Write the error object followed by a newline.
pub fn report_failure(err: &mut impl Write, message: &str) -> std::io::Result<()> {
    let report = ErrorReport::new(message);
    writeln!(err, "{}", report.to_json())?;
    err.flush()
}
