//! Runs whole tests against `mockc`, a compiler that does what the test
//! file's `// mock-...:` annotations tell it to.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tempfile::TempDir;

use conftest::config::RunnerConfig;
use conftest::expect::DiagKind;
use conftest::outcome::{Failure, TestOutcome};
use conftest::runner::Runner;
use conftest::Error;

const MOCKC: &str = env!("CARGO_BIN_EXE_mockc");
const RUNNER: &str = env!("CARGO_BIN_EXE_runner");

fn config() -> RunnerConfig {
    RunnerConfig {
        compiler: PathBuf::from(MOCKC),
        timeout: Duration::from_secs(30),
        ..RunnerConfig::default()
    }
}

fn write(dir: &Path, name: &str, src: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, src).unwrap();
    path
}

/// Runs one file, returning how it went and what got printed.
fn run_one(
    cfg: RunnerConfig,
    name: &str,
    src: &str,
) -> (conftest::Result<Option<TestOutcome>>, String) {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), name, src);
    let mut runner = Runner::new(cfg, vec![]).unwrap();
    let res = runner.run_file(&path);
    let out = String::from_utf8(runner.into_output()).unwrap();
    (res, out)
}

#[test]
fn error_matches_by_substring() {
    let src = "module t;\n\
               \n\
               fn void main() {\n\
               \n\
               \tfoo(); // mock-error: 2 expected foo bar // #error: expected foo\n\
               }\n";
    let (res, out) = run_one(config(), "t.c3", src);
    assert_eq!(res.unwrap(), Some(TestOutcome::Passed));
    assert!(out.ends_with(" Passed.\n"), "{}", out);
}

#[test]
fn missing_error_is_reported() {
    let src = "module t;\n\n\n\n\tfoo(); // #error: expected foo\n";
    let (res, out) = run_one(config(), "t.c3", src);
    assert_eq!(
        res.unwrap(),
        Some(TestOutcome::Failed(vec![Failure::MissingDiagnostic {
            kind: DiagKind::Error,
            file: "t.c3".to_owned(),
            line: 5,
            expected: "expected foo".to_owned(),
        }]))
    );
    assert!(out.contains("Failed."));
    assert!(out.contains("Expected errors that never occurred:"));
    assert!(out.contains("1. t.c3 line: 5 expected: \"expected foo\""));
}

#[test]
fn unexpected_warning_fails() {
    let src = "module t;\nint x; // mock-warning: 5 unused variable 'x'\n";
    let (res, out) = run_one(config(), "t.c3", src);
    match res.unwrap() {
        Some(TestOutcome::Failed(failures)) => assert_eq!(
            failures,
            vec![Failure::UnexpectedDiagnostic {
                kind: DiagKind::Warning,
                file: "t.c3".to_owned(),
                line: 2,
                message: "unused variable 'x'".to_owned(),
            }]
        ),
        other => panic!("unexpected {:?}", other),
    }
    assert!(out.contains("Unexpected warning in t.c3 line 2:\"unused variable 'x'\""));
}

#[test]
fn template_fragments_match() {
    let src = "// #file: a.c3\n\
               module a;\n\
               // mock-emit: a.c3.out func main\n\
               // mock-emit: a.c3.out   local x\n\
               // mock-emit: a.c3.out   return 0\n\
               // #expect: a.c3.out\n\
               func main\n\
               \n\
               return 0\n";
    let (res, _) = run_one(config(), "frag.c3t", src);
    assert_eq!(res.unwrap(), Some(TestOutcome::Passed));
}

#[test]
fn template_missing_fragment() {
    let src = "// #file: a.c3\n\
               // mock-emit: a.c3.out func main\n\
               // #expect: a.c3.out\n\
               func main\n\
               return 0\n";
    let (res, out) = run_one(config(), "frag.c3t", src);
    match res.unwrap() {
        Some(TestOutcome::Failed(failures)) => {
            assert_eq!(failures.len(), 1);
            assert!(matches!(
                &failures[0],
                Failure::MissingFragment { fragment, actual, .. }
                    if fragment == "return 0" && actual == "func main"
            ));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(out.contains("a.c3.out did not contain: \"return 0\""));
    assert!(out.contains("> a.c3.out"));
}

#[test]
fn template_missing_output_file() {
    let src = "// #file: a.c3\nmodule a;\n// #expect: never.out\nanything\n";
    let (res, out) = run_one(config(), "nofile.c3t", src);
    assert_eq!(
        res.unwrap(),
        Some(TestOutcome::Failed(vec![Failure::MissingOutput {
            file: "never.out".to_owned()
        }]))
    );
    assert!(out.contains("Did not compile file never.out"));
}

#[test]
fn template_diagnostics_are_per_file() {
    let src = "// #file: a.c3\n\
               module a;\n\
               int x = y; // mock-error: 9 unknown symbol 'y' // #error: unknown symbol\n\
               // #file: b.c3\n\
               module b;\n\
               int z; // mock-warning: 5 unused 'z' // #warning: unused\n";
    let (res, _) = run_one(config(), "multi.c3t", src);
    assert_eq!(res.unwrap(), Some(TestOutcome::Passed));
}

#[test]
fn diagnostics_skip_fragment_checks() {
    let src = "// #file: a.c3\n\
               int x = y; // mock-error: 9 unknown symbol 'y'\n\
               // #expect: a.c3.out\n\
               never checked\n";
    let (res, _) = run_one(config(), "t.c3t", src);
    match res.unwrap() {
        Some(TestOutcome::Failed(failures)) => {
            assert_eq!(failures.len(), 1);
            assert!(matches!(failures[0], Failure::UnexpectedDiagnostic { .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn crashing_compiler_fails_the_test() {
    let src = "module t;\n// mock-exit: 2 internal error\nfoo(); // #error: never looked at\n";
    let (res, out) = run_one(config(), "t.c3", src);
    assert_eq!(
        res.unwrap(),
        Some(TestOutcome::Failed(vec![Failure::CompilerCrashed {
            code: Some(2),
            stderr: "internal error\n".to_owned(),
        }]))
    );
    assert!(out.contains("Error (2): internal error"));
}

#[test]
fn skipped_tests_are_not_run() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.c3", "// #skip\nfoo(); // #error: would fail\n");
    write(dir.path(), "b.c3", "module b;\n");
    let mut runner = Runner::new(config(), vec![]).unwrap();
    runner.run_path(dir.path()).unwrap();
    assert_eq!(runner.stats.tests, 2);
    assert_eq!(runner.stats.skipped, 1);
    assert_eq!(runner.stats.passed, 1);
    assert!(runner.stats.all_passed());
    assert_eq!(
        runner.stats.summary(),
        "Found 2 tests: 100.0% (1 / 1) passed (1 skipped)."
    );
    let out = String::from_utf8(runner.into_output()).unwrap();
    assert!(out.contains("a.c3: *SKIPPED*"));
    // Skipped tests count towards the not-passed number in the progress line.
    assert!(out.contains("- 2/1 "), "{}", out);
}

#[test]
fn skipped_only_mode() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.c3", "// #skip\nmodule a;\n");
    write(dir.path(), "b.c3", "module b;\n");
    let cfg = RunnerConfig {
        run_skipped: true,
        ..config()
    };
    let mut runner = Runner::new(cfg, vec![]).unwrap();
    runner.run_path(dir.path()).unwrap();
    assert_eq!(runner.stats.skipped, 1);
    assert_eq!(runner.stats.passed, 1);
    let out = String::from_utf8(runner.into_output()).unwrap();
    assert!(out.contains("b.c3: *SKIPPED*"));
    assert!(out.contains("a.c3: Passed."));
}

#[test]
fn directories_are_walked() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one/a.c3", "module a;\n");
    write(dir.path(), "one/two/b.c3t", "// #file: b.c3\nmodule b;\n");
    write(dir.path(), "one/notes.txt", "not a test // #bogus: yes\n");
    let mut runner = Runner::new(config(), vec![]).unwrap();
    runner.run_path(dir.path()).unwrap();
    assert_eq!(runner.stats.tests, 2);
    assert_eq!(runner.stats.passed, 2);
}

#[test]
fn unknown_directive_aborts() {
    let (res, _) = run_one(config(), "t.c3t", "// #file: a.c3\n// #bogus: yes\n");
    assert!(matches!(
        res,
        Err(Error::UnknownHeaderDirective { line: 1, .. })
    ));
}

#[test]
fn malformed_diagnostic_aborts() {
    // A message with a pipe in it is one field too many.
    let src = "x(); // mock-error: 1 a|b\n";
    let (res, _) = run_one(config(), "t.c3", src);
    assert!(matches!(res, Err(Error::MalformedDiagnostic(_))));
}

#[test]
fn slow_compiler_times_out() {
    let cfg = RunnerConfig {
        timeout: Duration::from_millis(200),
        ..config()
    };
    let (res, _) = run_one(cfg, "t.c3", "// mock-sleep: 5000\n");
    assert!(matches!(res, Err(Error::CompilerTimeout { .. })));
}

#[test]
fn absolute_file_stays_in_scratch() {
    let outside = TempDir::new().unwrap();
    let escaped = outside.path().join("escaped.c3");
    let src = format!(
        "// #file: {}\nmodule escaped;\nint x = y; // mock-error: 9 unknown 'y' // #error: unknown\n",
        escaped.display()
    );
    let (res, _) = run_one(config(), "abs.c3t", &src);
    assert_eq!(res.unwrap(), Some(TestOutcome::Passed));
    assert!(!escaped.exists());
}

#[test]
fn invalid_test_path() {
    let mut runner = Runner::new(config(), vec![]).unwrap();
    let res = runner.run_path(Path::new("/no/such/tests/anywhere"));
    assert!(matches!(res, Err(Error::InvalidTestPath(_))));
}

#[test]
fn binary_exit_codes() {
    let dir = TempDir::new().unwrap();
    let good = write(dir.path(), "good/a.c3", "module a;\n");
    let bad = write(dir.path(), "bad/a.c3", "foo(); // #error: nope\n");

    let out = Command::new(RUNNER).arg(MOCKC).arg(&good).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Found 1 tests: 100.0% (1 / 1) passed (0 skipped)."));

    let out = Command::new(RUNNER).arg(MOCKC).arg(&bad).output().unwrap();
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Found 1 tests: 0.0% (0 / 1) passed (0 skipped)."));

    let out = Command::new(RUNNER)
        .arg(dir.path().join("no-compiler-here"))
        .arg(&good)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid path to compiler"));
}

#[test]
fn relative_compiler_path() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("bin")).unwrap();
    fs::copy(MOCKC, dir.path().join("bin").join("mockc")).unwrap();
    let test = write(dir.path(), "tests/a.c3", "x(); // mock-error: 1 oops // #error: oops\n");

    let out = Command::new(RUNNER)
        .current_dir(dir.path())
        .arg("./bin/mockc")
        .arg(&test)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "stdout={} stderr={}",
        stdout,
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(stdout.contains("a.c3: Passed."));
}
