//! A test file, read whole into memory.

use std::path::{Path, PathBuf};

use crate::config::RunnerConfig;
use crate::error::{Error, Result};

/// Leading marker on the first line of a test that is skipped by default.
pub const SKIP_MARKER: &str = "// #skip";

/// How a test file is interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// One source file, compiled as-is; only trailing directives.
    Single,
    /// Header directives may split the file into several emitted files
    /// and expected-output sinks.
    Template,
}

impl Mode {
    /// Picks the mode from the file extension, `None` if it isn't a test file at all.
    pub fn from_path(path: &Path, cfg: &RunnerConfig) -> Option<Mode> {
        let ext = path.extension()?.to_str()?;
        if ext == cfg.single_ext {
            Some(Mode::Single)
        } else if ext == cfg.template_ext {
            Some(Mode::Template)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestCase {
    pub path: PathBuf,
    /// Base name of `path`.
    pub name: String,
    pub lines: Vec<String>,
    pub mode: Mode,
    pub skipped: bool,
}

impl TestCase {
    pub fn load(path: &Path, mode: Mode) -> Result<TestCase> {
        let src = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        TestCase::from_source(path, mode, &src)
    }

    pub fn from_source(path: &Path, mode: Mode, src: &str) -> Result<TestCase> {
        let lines: Vec<String> = src.lines().map(str::to_owned).collect();
        if lines.is_empty() {
            return Err(Error::EmptyTestFile(path.to_owned()));
        }
        let skipped = lines[0].starts_with(SKIP_MARKER);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(TestCase {
            path: path.to_owned(),
            name,
            lines,
            mode,
            skipped,
        })
    }

    /// File name with the extension stripped, used to name the implicit
    /// output file of a template.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}
