//! Settings, both for the whole run and for a single test.

use std::path::PathBuf;
use std::time::Duration;

/// How long one compiler invocation may take before the run is aborted.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for a whole run, from the command line.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub compiler: PathBuf,
    /// Run only the tests marked as skipped, instead of only the unmarked ones.
    pub run_skipped: bool,
    pub timeout: Duration,
    /// Extension of single-file tests.
    pub single_ext: String,
    /// Extension of template tests.
    pub template_ext: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            compiler: PathBuf::new(),
            run_skipped: false,
            timeout: DEFAULT_TIMEOUT,
            single_ext: "c3".to_owned(),
            template_ext: "c3t".to_owned(),
        }
    }
}

/// Compiler settings for one test, filled in by directives while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub safe: bool,
    pub debug_info: bool,
    pub target_arch: Option<String>,
    pub silence_deprecation: bool,
    /// Passed to the compiler in the order they were declared.
    pub extra_options: Vec<String>,
}
