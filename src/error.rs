//! Errors that abort the whole run.
//!
//! These mean the test suite or the compiler's side of the protocol is
//! broken, as opposed to a single test failing.  Per-test failures live
//! in `outcome`.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Reading or writing some file went wrong.
    Io { path: PathBuf, source: io::Error },
    EmptyTestFile(PathBuf),
    UnknownHeaderDirective {
        path: PathBuf,
        /// 0-based index into the test file.
        line: usize,
        content: String,
    },
    UnknownTrailingDirective {
        path: PathBuf,
        line: usize,
        content: String,
    },
    /// A stderr line that isn't `kind|file|line|column|message`.
    MalformedDiagnostic(String),
    UnknownDiagnosticKind(String),
    /// The compiler produced an expected-output file we then couldn't read.
    UnreadableOutput { path: PathBuf, source: io::Error },
    Spawn { compiler: PathBuf, source: io::Error },
    CompilerTimeout { compiler: PathBuf, limit: Duration },
    InvalidCompiler(PathBuf),
    InvalidTestPath(PathBuf),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// The test file and 0-based line this error points at, if any.
    pub fn location(&self) -> Option<(&PathBuf, usize)> {
        match self {
            Error::UnknownHeaderDirective { path, line, .. }
            | Error::UnknownTrailingDirective { path, line, .. } => Some((path, *line)),
            _ => None,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. }
            | Error::UnreadableOutput { source, .. }
            | Error::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io { path, source } if path.as_os_str().is_empty() => write!(f, "{}", source),
            Error::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            Error::EmptyTestFile(path) => {
                write!(f, "Error in file {}: File was empty", path.display())
            }
            Error::UnknownHeaderDirective {
                path,
                line,
                content,
            } => write!(
                f,
                "Error in file {}: unknown header directive on line {}: {}",
                path.display(),
                line + 1,
                content
            ),
            Error::UnknownTrailingDirective {
                path,
                line,
                content,
            } => write!(
                f,
                "Error in file {}: unknown trailing directive on line {}: {}",
                path.display(),
                line + 1,
                content
            ),
            Error::MalformedDiagnostic(line) => write!(f, "Illegal error result: {}", line),
            Error::UnknownDiagnosticKind(kind) => write!(f, "Unknown type: {}", kind),
            Error::UnreadableOutput { path, source } => {
                write!(f, "Could not read {}: {}", path.display(), source)
            }
            Error::Spawn { compiler, source } => {
                write!(f, "Could not run {}: {}", compiler.display(), source)
            }
            Error::CompilerTimeout { compiler, limit } => write!(
                f,
                "{} did not finish within {}s",
                compiler.display(),
                limit.as_secs()
            ),
            Error::InvalidCompiler(path) => {
                write!(f, "Error: Invalid path to compiler: {}", path.display())
            }
            Error::InvalidTestPath(path) => {
                write!(f, "Error: Invalid path to tests: {}", path.display())
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
