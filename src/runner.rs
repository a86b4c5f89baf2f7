//! Finds tests, runs them one after another, keeps count.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;

use crate::compiler::Compiler;
use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::fragment;
use crate::outcome::{self, Failure, TestOutcome};
use crate::parse;
use crate::reconcile;
use crate::source::{Mode, TestCase};

/// Name of the per-test directory inside the scratch root.
const SCRATCH_SUBDIR: &str = "c3test";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Every test file found, skipped ones included.
    pub tests: usize,
    pub passed: usize,
    pub skipped: usize,
}

impl Stats {
    /// Tests that were run at all.
    pub fn ran(&self) -> usize {
        self.tests - self.skipped
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.ran()
    }

    pub fn summary(&self) -> String {
        let pct = 100.0 * self.passed as f64 / self.ran().max(1) as f64;
        format!(
            "Found {} tests: {:.1}% ({} / {}) passed ({} skipped).",
            self.tests,
            pct,
            self.passed,
            self.ran(),
            self.skipped
        )
    }
}

/// Runs tests and writes a transcript of how they went to `out`.
pub struct Runner<W: Write> {
    cfg: RunnerConfig,
    compiler: Compiler,
    /// Private to this run, deleted when the runner is dropped.
    scratch: TempDir,
    out: W,
    pub stats: Stats,
}

impl<W: Write> Runner<W> {
    pub fn new(mut cfg: RunnerConfig, out: W) -> Result<Self> {
        if !cfg.compiler.is_file() {
            return Err(Error::InvalidCompiler(cfg.compiler.clone()));
        }
        // The compiler runs from inside the scratch directory.
        let compiler = fs::canonicalize(&cfg.compiler).map_err(|e| Error::io(&cfg.compiler, e))?;
        cfg.compiler = compiler;
        let scratch = tempfile::Builder::new()
            .prefix("conftest")
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        info!("scratch directory is {}", scratch.path().display());
        let compiler = Compiler::new(cfg.compiler.clone(), cfg.timeout);
        Ok(Runner {
            cfg,
            compiler,
            scratch,
            out,
            stats: Stats::default(),
        })
    }

    /// Runs a single test file, or every test file under a directory.
    pub fn run_path(&mut self, path: &Path) -> Result<()> {
        if path.is_file() {
            self.run_file(path).map(|_| ())
        } else if path.is_dir() {
            self.run_dir(path)
        } else {
            Err(Error::InvalidTestPath(path.to_owned()))
        }
    }

    fn run_dir(&mut self, dir: &Path) -> Result<()> {
        let mut entries = fs::read_dir(dir)
            .and_then(|rd| rd.map(|e| e.map(|e| e.path())).collect::<Result<Vec<_>, _>>())
            .map_err(|e| Error::io(dir, e))?;
        // read_dir order is whatever the filesystem likes.
        entries.sort();
        for entry in entries {
            if entry.is_dir() {
                self.run_dir(&entry)?;
            } else if entry.is_file() {
                self.run_file(&entry)?;
            }
        }
        Ok(())
    }

    /// Runs one file.  Returns `None` if it isn't a test file at all.
    pub fn run_file(&mut self, path: &Path) -> Result<Option<TestOutcome>> {
        let mode = match Mode::from_path(path, &self.cfg) {
            Some(mode) => mode,
            None => {
                debug!("ignoring {}", path.display());
                return Ok(None);
            }
        };
        let dir = self.reset_scratch()?;
        // Tests so far that didn't pass, skipped ones included.
        let not_passed = self.stats.tests - self.stats.passed;
        self.stats.tests += 1;
        let case = TestCase::load(path, mode)?;
        write!(
            self.out,
            "- {}/{} {}:",
            self.stats.tests,
            not_passed,
            path.display()
        )?;

        if case.skipped != self.cfg.run_skipped {
            self.stats.skipped += 1;
            writeln!(self.out, " *SKIPPED*")?;
            return Ok(Some(TestOutcome::Skipped));
        }

        let outcome = self.run_case(&case, &dir)?;
        match &outcome {
            TestOutcome::Passed => {
                self.stats.passed += 1;
                writeln!(self.out, " Passed.")?;
            }
            TestOutcome::Failed(failures) => {
                writeln!(self.out, " Failed.")?;
                write!(self.out, "{}", outcome::transcript(failures))?;
            }
            TestOutcome::Skipped => unreachable!("skips are decided before running"),
        }
        Ok(Some(outcome))
    }

    /// Parse, emit, compile, check.  `dir` must be empty.
    pub fn run_case(&self, case: &TestCase, dir: &Path) -> Result<TestOutcome> {
        let mut parsed = parse::parse(case)?;

        let mut targets: Vec<PathBuf> = vec![];
        for file in &parsed.files {
            if let Some(dest) = file.emit(dir)? {
                targets.push(dest);
            }
        }

        let output = self.compiler.run(&parsed.config, &targets, dir)?;
        if !output.ran() {
            warn!("{} crashed on {}", self.compiler.path().display(), case.name);
            return Ok(TestOutcome::Failed(vec![Failure::CompilerCrashed {
                code: output.code,
                stderr: output.stderr,
            }]));
        }

        let failures = reconcile::reconcile(&output.stderr, &mut parsed.expectations)?;
        if !failures.is_empty() || case.mode == Mode::Single {
            return Ok(TestOutcome::from_failures(failures));
        }

        for sink in parsed.sinks() {
            if let Some(failure) = fragment::check_sink(sink, dir, &case.name)? {
                // One bad file is enough to tell.
                return Ok(TestOutcome::Failed(vec![failure]));
            }
        }
        Ok(TestOutcome::Passed)
    }

    /// Wipes the per-test directory and makes a fresh one.
    fn reset_scratch(&self) -> Result<PathBuf> {
        let dir = self.scratch.path().join(SCRATCH_SUBDIR);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }
        fs::create_dir(&dir).map_err(|e| Error::io(&dir, e))?;
        Ok(dir)
    }

    pub fn into_output(self) -> W {
        self.out
    }
}
