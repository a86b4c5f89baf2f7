//! Searching compiler-produced files for expected fragments.
//!
//! Fragments are looked for in order, each one as a substring of some line
//! after the line the previous fragment was found on.  They don't need to be
//! on adjacent lines and anything after the last one is ignored.  Blank
//! fragments are ignored as well.
//!
//! A fragment starting with `??` is an alternative to the one before it:
//!
//! ```text
//! call void @foo(i32 1)
//! ?? call void @foo(i32 noundef 1)
//! ```
//!
//! A line with the alternative on it satisfies both fragments.  A line with
//! the first one only satisfies that one, and the `??` line is then looked
//! for as written, marker and all.

use std::fs;
use std::io;
use std::path::Path;

use log::trace;

use crate::error::{Error, Result};
use crate::outcome::Failure;
use crate::output::OutputFile;

pub const ALT_MARKER: &str = "??";

/// The text of an alternative fragment, if this is one.
pub fn alternative(fragment: &str) -> Option<&str> {
    fragment
        .trim()
        .strip_prefix(ALT_MARKER)
        .map(|alt| alt.trim_start())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State<'a> {
    /// Only the fragment itself will do.
    MatchPrimary(&'a str),
    /// The fragment, or the alternative right after it, which counts for both.
    MatchEither { primary: &'a str, alt: &'a str },
}

impl<'a> State<'a> {
    fn at(expected: &'a [String], idx: usize) -> State<'a> {
        let primary = expected[idx].trim();
        match expected.get(idx + 1).and_then(|next| alternative(next)) {
            Some(alt) => State::MatchEither { primary, alt },
            None => State::MatchPrimary(primary),
        }
    }

    fn primary(&self) -> &'a str {
        match *self {
            State::MatchPrimary(p) => p,
            State::MatchEither { primary, .. } => primary,
        }
    }

    /// How many fragments `line` satisfies.
    fn step(&self, line: &str) -> usize {
        match *self {
            State::MatchPrimary(p) if line.contains(p) => 1,
            State::MatchEither { primary, .. } if line.contains(primary) => 1,
            State::MatchEither { alt, .. } if line.contains(alt) => 2,
            _ => 0,
        }
    }
}

/// Returns the first fragment that couldn't be found, or `None` if they
/// all were.
pub fn first_missing<'a, S: AsRef<str>>(expected: &'a [String], actual: &[S]) -> Option<&'a str> {
    let mut exp = 0;
    let mut act = 0;
    while exp < expected.len() {
        let fragment = expected[exp].trim();
        if fragment.is_empty() {
            exp += 1;
            continue;
        }
        let state = State::at(expected, exp);
        let line = match actual.get(act) {
            Some(line) => line.as_ref(),
            None => return Some(state.primary()),
        };
        let matched = state.step(line);
        if matched > 0 {
            trace!("fragment {:?} found on line {}", state, act + 1);
        }
        exp += matched;
        act += 1;
    }
    None
}

/// Checks one expected-output file against what the compiler wrote to `dir`.
pub fn check_sink(sink: &OutputFile, dir: &Path, test_name: &str) -> Result<Option<Failure>> {
    let path = sink.path_in(dir);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(Some(Failure::MissingOutput {
                file: sink.file_name(),
            }))
        }
        Err(source) => return Err(Error::UnreadableOutput { path, source }),
    };
    let lines: Vec<&str> = contents.lines().collect();
    Ok(
        first_missing(sink.fragments(), &lines).map(|fragment| Failure::MissingFragment {
            file: sink.file_name(),
            fragment: fragment.to_owned(),
            actual: lines.join("\n"),
            test: test_name.to_owned(),
        }),
    )
}
