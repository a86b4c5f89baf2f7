//! Checking the compiler's diagnostics against what a test expects.
//!
//! The compiler prints one diagnostic per stderr line:
//!
//! ```text
//! Error|/tmp/scratch/foo.c3|5|12|expected ';'
//! ```

use std::path::Path;

use log::trace;

use crate::error::{Error, Result};
use crate::expect::{DiagKind, ExpectationKey, ExpectationSet};
use crate::outcome::Failure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub kind: DiagKind,
    pub file: String,
    pub line: u64,
    pub column: u64,
    pub message: String,
}

impl DiagnosticRecord {
    pub fn parse(line: &str) -> Result<DiagnosticRecord> {
        let malformed = || Error::MalformedDiagnostic(line.to_owned());
        let parts: Vec<&str> = line.splitn(6, '|').collect();
        if parts.len() != 5 {
            return Err(malformed());
        }
        let kind: DiagKind = parts[0].parse()?;
        let line_no = parts[2].trim().parse().map_err(|_| malformed())?;
        let column = parts[3].trim().parse().map_err(|_| malformed())?;
        Ok(DiagnosticRecord {
            kind,
            file: parts[1].to_owned(),
            line: line_no,
            column,
            message: parts[4].to_owned(),
        })
    }

    /// Only the base name of the reported file counts.
    pub fn key(&self) -> ExpectationKey {
        let file = Path::new(&self.file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.clone());
        ExpectationKey::new(file, self.line as i64)
    }
}

/// Runs every line of `stderr` past `expected`, consuming what matches.
///
/// Returns the unexpected diagnostics followed by the expectations that
/// were never met.  An empty list is a pass.
pub fn reconcile(stderr: &str, expected: &mut ExpectationSet) -> Result<Vec<Failure>> {
    let mut failures = vec![];
    for line in stderr.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let diag = DiagnosticRecord::parse(line)?;
        let key = diag.key();
        if expected.consume(diag.kind, &key, &diag.message) {
            trace!("matched {} at {}:{}", diag.kind.noun(), key.file, key.line);
            continue;
        }
        failures.push(Failure::UnexpectedDiagnostic {
            kind: diag.kind,
            file: key.file,
            line: diag.line,
            message: diag.message,
        });
    }
    for kind in [DiagKind::Error, DiagKind::Warning].iter().copied() {
        for (key, message) in expected.remaining(kind) {
            failures.push(Failure::MissingDiagnostic {
                kind,
                file: key.file.clone(),
                line: key.line,
                expected: message.to_owned(),
            });
        }
    }
    Ok(failures)
}
