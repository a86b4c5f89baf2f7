//! Files a test produces: either sources handed to the compiler, or
//! expectations about files the compiler writes.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKind {
    /// Written to the scratch directory and compiled.
    Target {
        /// Added to a 0-based source line index to get the line number the
        /// compiler reports for the emitted file.
        line_offset: i64,
        lines: Vec<String>,
    },
    /// Never written.  The compiler is expected to produce a file at this
    /// path, which is then searched for these fragments.
    Sink { fragments: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Relative to the scratch directory.
    pub path: PathBuf,
    pub kind: OutputKind,
}

impl OutputFile {
    pub fn target(path: impl Into<PathBuf>, line_offset: i64) -> Self {
        OutputFile {
            path: path.into(),
            kind: OutputKind::Target {
                line_offset,
                lines: vec![],
            },
        }
    }

    pub fn sink(path: impl Into<PathBuf>) -> Self {
        OutputFile {
            path: path.into(),
            kind: OutputKind::Sink { fragments: vec![] },
        }
    }

    pub fn is_target(&self) -> bool {
        matches!(self.kind, OutputKind::Target { .. })
    }

    /// Base name, which is what diagnostics are keyed by.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Sinks have no offset of their own; their lines are keyed by source index.
    pub fn line_offset(&self) -> i64 {
        match self.kind {
            OutputKind::Target { line_offset, .. } => line_offset,
            OutputKind::Sink { .. } => 0,
        }
    }

    /// Appends one source line, verbatim.
    pub fn push(&mut self, line: &str) {
        match &mut self.kind {
            OutputKind::Target { lines, .. } => lines.push(line.to_owned()),
            OutputKind::Sink { fragments } => fragments.push(line.to_owned()),
        }
    }

    /// Expected fragments of a sink; a target has none.
    pub fn fragments(&self) -> &[String] {
        match &self.kind {
            OutputKind::Sink { fragments } => fragments,
            OutputKind::Target { .. } => &[],
        }
    }

    /// Where this file lives under `dir`.  Only the plain names in `path`
    /// are kept, so a root, prefix or `..` can't lead out of `dir`.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        let mut dest = dir.to_path_buf();
        for part in self.path.components() {
            if let Component::Normal(name) = part {
                dest.push(name);
            }
        }
        dest
    }

    /// Writes a target into `dir`, returning where it went.  Sinks are left
    /// alone and return `None`.
    pub fn emit(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let lines = match &self.kind {
            OutputKind::Target { lines, .. } => lines,
            OutputKind::Sink { .. } => return Ok(None),
        };
        let dest = self.path_in(dir);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let mut contents = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        fs::write(&dest, contents).map_err(|e| Error::io(&dest, e))?;
        debug!("wrote {} ({} lines)", dest.display(), lines.len());
        Ok(Some(dest))
    }
}
