//! Printing fatal errors.
//!
//! Errors that point into a test file get the offending line shown with
//! `codespan-reporting`; everything else is just its message.

use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::{self, termcolor::WriteColor};

use crate::error::Error;

/// Byte range of the 0-based `line` in `src`, without its line ending.
fn line_span(src: &str, line: usize) -> Option<Range<usize>> {
    let mut start = 0;
    for (idx, text) in src.split_inclusive('\n').enumerate() {
        if idx == line {
            let body = text.trim_end_matches(|c: char| c == '\n' || c == '\r');
            return Some(start..start + body.len());
        }
        start += text.len();
    }
    None
}

/// Writes `err` to `writer`.  `src` is the text of the test file the error
/// points into, if it has a location and the file could be read.
pub fn render(err: &Error, src: Option<&str>, writer: &mut dyn WriteColor) -> std::io::Result<()> {
    let located = err
        .location()
        .and_then(|(path, line)| Some((path, line_span(src?, line)?)));
    let (path, span) = match located {
        Some(found) => found,
        None => return writeln!(writer, "{}", err),
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(path.display().to_string(), src.unwrap_or_default().to_owned());
    let diag = Diagnostic::error()
        .with_message(err.to_string())
        .with_labels(vec![Label::primary(file_id, span).with_message("unknown directive")])
        .with_notes(vec![
            "header directives: safe, debuginfo, opt, target, deprecation, file, expect".to_owned(),
            "trailing directives: error, warning, target, deprecation".to_owned(),
        ]);
    term::emit(writer, &term::Config::default(), &files, &diag)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

/// Prints `err` to stderr, reading the test file again if it points into one.
pub fn emit(err: &Error) {
    use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

    let src = err
        .location()
        .and_then(|(path, _)| std::fs::read_to_string(path).ok());
    let writer = StandardStream::stderr(ColorChoice::Auto);
    if render(err, src.as_deref(), &mut writer.lock()).is_err() {
        eprintln!("{}", err);
    }
}
