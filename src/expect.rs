//! Expected diagnostics, keyed by file and line.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The only two kinds of diagnostic the compiler reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DiagKind {
    Error,
    Warning,
}

impl DiagKind {
    /// Lowercase name, for "Unexpected error in ..." style messages.
    pub fn noun(self) -> &'static str {
        match self {
            DiagKind::Error => "error",
            DiagKind::Warning => "warning",
        }
    }
}

impl FromStr for DiagKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Error" => Ok(DiagKind::Error),
            "Warning" => Ok(DiagKind::Warning),
            other => Err(Error::UnknownDiagnosticKind(other.to_owned())),
        }
    }
}

impl fmt::Display for DiagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagKind::Error => write!(f, "Error"),
            DiagKind::Warning => write!(f, "Warning"),
        }
    }
}

/// Where a diagnostic is expected: base name of the emitted file, and the
/// line number the compiler will report for it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpectationKey {
    pub file: String,
    pub line: i64,
}

impl ExpectationKey {
    pub fn new(file: impl Into<String>, line: i64) -> Self {
        ExpectationKey {
            file: file.into(),
            line,
        }
    }
}

/// All the diagnostics a test still expects to see.
///
/// Each key holds at most one expectation per kind.  Recording a second one
/// at the same key replaces the first, so the last directive wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectationSet {
    errors: BTreeMap<ExpectationKey, String>,
    warnings: BTreeMap<ExpectationKey, String>,
}

impl ExpectationSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: DiagKind) -> &BTreeMap<ExpectationKey, String> {
        match kind {
            DiagKind::Error => &self.errors,
            DiagKind::Warning => &self.warnings,
        }
    }

    fn map_mut(&mut self, kind: DiagKind) -> &mut BTreeMap<ExpectationKey, String> {
        match kind {
            DiagKind::Error => &mut self.errors,
            DiagKind::Warning => &mut self.warnings,
        }
    }

    /// Records an expectation, returning the one it replaced if any.
    pub fn expect(
        &mut self,
        kind: DiagKind,
        key: ExpectationKey,
        message: impl Into<String>,
    ) -> Option<String> {
        self.map_mut(kind).insert(key, message.into())
    }

    pub fn get(&self, kind: DiagKind, key: &ExpectationKey) -> Option<&str> {
        self.map(kind).get(key).map(String::as_str)
    }

    /// Checks a diagnostic off.  It only counts if the expected text is a
    /// substring of the actual message; on a match the expectation is removed.
    pub fn consume(&mut self, kind: DiagKind, key: &ExpectationKey, message: &str) -> bool {
        let map = self.map_mut(kind);
        match map.get(key) {
            Some(expected) if message.contains(expected.as_str()) => {
                map.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Whatever of the given kind hasn't been checked off, in key order.
    pub fn remaining(&self, kind: DiagKind) -> impl Iterator<Item = (&ExpectationKey, &str)> {
        self.map(kind).iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self, kind: DiagKind) -> usize {
        self.map(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}
