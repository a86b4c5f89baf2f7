//! A stand-in compiler for testing the runner.
//!
//! Takes the same command line as the real thing, ignores the flags, and
//! reads `// mock-...:` annotations out of the files it's asked to compile:
//!
//! ```text
//! int x = y;  // mock-error: 9 unknown symbol 'y'
//! int z;      // mock-warning: 5 unused variable 'z'
//! // mock-emit: out.ll define i32 @main()
//! // mock-exit: 3 internal compiler error
//! // mock-sleep: 5000
//! ```
//!
//! Diagnostics go to stderr as `Kind|file|line|column|message`.  Exits 1 if
//! it reported any errors, 0 otherwise, unless told differently.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;

use log::debug;

const PREFIX: &str = "// mock-";

/// All the `// mock-key: value` annotations on a line.
fn annotations(line: &str) -> Vec<(&str, &str)> {
    let mut found = vec![];
    let mut rest = line;
    while let Some(start) = rest.find(PREFIX) {
        let after = &rest[start + PREFIX.len()..];
        let end = after.find("// ").unwrap_or_else(|| after.len());
        if let Some((key, value)) = after[..end].split_once(':') {
            found.push((key.trim(), value.trim()));
        }
        rest = &after[end..];
    }
    found
}

/// Picks the input files out of a compiler command line.  Tests can pass
/// arbitrary `opt:` flags through, so anything dash-led is dropped rather
/// than parsed.
fn input_files(args: &[String]) -> Vec<PathBuf> {
    let mut files = vec![];
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            // The only flags that take a separate value.
            "--target" | "--test" => {
                args.next();
            }
            a if a.starts_with('-') => (),
            a => files.push(PathBuf::from(a)),
        }
    }
    files
}

/// Splits off the first word.
fn word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (s, ""),
    }
}

#[derive(Default)]
struct Mock {
    errors: usize,
    exit: Option<(i32, String)>,
    sleep: Duration,
}

impl Mock {
    fn compile(&mut self, path: &Path, stderr: &mut dyn Write) -> io::Result<()> {
        let src = fs::read_to_string(path)?;
        for (idx, line) in src.lines().enumerate() {
            for (key, value) in annotations(line) {
                debug!("{}:{}: {} {:?}", path.display(), idx + 1, key, value);
                match key {
                    "error" | "warning" => {
                        let kind = if key == "error" { "Error" } else { "Warning" };
                        let (col, msg) = word(value);
                        writeln!(stderr, "{}|{}|{}|{}|{}", kind, path.display(), idx + 1, col, msg)?;
                        if key == "error" {
                            self.errors += 1;
                        }
                    }
                    "emit" => {
                        let (file, text) = word(value);
                        let mut out = OpenOptions::new().create(true).append(true).open(file)?;
                        writeln!(out, "{}", text)?;
                    }
                    "exit" => {
                        let (code, msg) = word(value);
                        let code = code.parse().unwrap_or(2);
                        self.exit = Some((code, msg.to_owned()));
                    }
                    "sleep" => {
                        self.sleep += Duration::from_millis(value.parse().unwrap_or(0));
                    }
                    _ => (),
                }
            }
        }
        Ok(())
    }
}

fn main() {
    pretty_env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let files = input_files(&args);

    let mut mock = Mock::default();
    let stderr = io::stderr();
    for file in &files {
        if let Err(e) = mock.compile(file, &mut stderr.lock()) {
            eprintln!("mockc: {}: {}", file.display(), e);
            process::exit(101);
        }
    }
    thread::sleep(mock.sleep);
    if let Some((code, msg)) = mock.exit {
        eprintln!("{}", msg);
        process::exit(code);
    }
    process::exit(if mock.errors > 0 { 1 } else { 0 });
}
