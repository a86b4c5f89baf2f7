//! How a single test went.

use std::fmt;

use crate::expect::DiagKind;

/// Something that makes one test fail, without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The compiler reported something nobody asked for, or not what was
    /// asked for at that spot.
    UnexpectedDiagnostic {
        kind: DiagKind,
        file: String,
        line: u64,
        message: String,
    },
    /// An expectation that nothing matched.
    MissingDiagnostic {
        kind: DiagKind,
        file: String,
        line: i64,
        expected: String,
    },
    /// The compiler exited with something other than 0 or 1.
    CompilerCrashed { code: Option<i32>, stderr: String },
    /// A file named by an `expect:` directive was never produced.
    MissingOutput { file: String },
    /// A produced file didn't contain an expected fragment, at least not
    /// after the fragments before it.
    MissingFragment {
        file: String,
        fragment: String,
        actual: String,
        test: String,
    },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::UnexpectedDiagnostic {
                kind,
                file,
                line,
                message,
            } => write!(
                f,
                "Unexpected {} in {} line {}:\"{}\"",
                kind.noun(),
                file,
                line,
                message
            ),
            Failure::MissingDiagnostic {
                file,
                line,
                expected,
                ..
            } => write!(f, "{} line: {} expected: \"{}\"", file, line, expected),
            Failure::CompilerCrashed { code, stderr } => match code {
                Some(code) => write!(f, "Error ({}): {}", code, stderr),
                None => write!(f, "Error (killed by signal): {}", stderr),
            },
            Failure::MissingOutput { file } => write!(f, "Did not compile file {}", file),
            Failure::MissingFragment {
                file,
                fragment,
                actual,
                test,
            } => {
                writeln!(f, "{} did not contain: \"{}\"", file, fragment)?;
                writeln!(
                    f,
                    "\n\n\n---------------------------------------------------> {}\n\n",
                    file
                )?;
                writeln!(f, "{}", actual)?;
                write!(
                    f,
                    "<---------------------------------------------------- {}\n",
                    test
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed(Vec<Failure>),
    /// Not run, because its skip marker didn't match the run mode.
    Skipped,
}

impl TestOutcome {
    pub fn from_failures(failures: Vec<Failure>) -> Self {
        if failures.is_empty() {
            TestOutcome::Passed
        } else {
            TestOutcome::Failed(failures)
        }
    }
}

/// Writes the failures of one test the way a person wants to read them:
/// unexpected diagnostics first, then the missed expectations grouped and
/// numbered per kind, then everything else.
pub fn transcript(failures: &[Failure]) -> String {
    let mut out = String::new();
    for failure in failures {
        if let Failure::UnexpectedDiagnostic { .. } = failure {
            out += &format!("{}\n", failure);
        }
    }
    for (kind, heading) in [
        (DiagKind::Error, "Expected errors that never occurred:"),
        (DiagKind::Warning, "Expected warnings that never occurred:"),
    ]
    .iter()
    {
        let missing: Vec<&Failure> = failures
            .iter()
            .filter(|f| matches!(f, Failure::MissingDiagnostic { kind: k, .. } if k == kind))
            .collect();
        if missing.is_empty() {
            continue;
        }
        out.push_str(heading);
        out.push('\n');
        for (num, failure) in missing.iter().enumerate() {
            out += &format!("{}. {}\n", num + 1, failure);
        }
    }
    for failure in failures {
        match failure {
            Failure::UnexpectedDiagnostic { .. } | Failure::MissingDiagnostic { .. } => (),
            other => out += &format!("{}\n", other),
        }
    }
    out
}
