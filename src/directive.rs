//! Directive syntax.
//!
//! A directive is a marker, a key, a colon and a value:
//!
//! ```text
//! // #target: x64          header directive, a line of its own
//! /* #file: lib.c3 */       header directive, block-comment form
//! foo(); // #error: bar     trailing directive, attached to code
//! ```
//!
//! Header directives configure the test and never end up in emitted files.
//! Trailing directives annotate the line they sit on, which is still emitted.
//! This module only knows about the syntax; what they do to a test being
//! parsed lives in `parse`.

/// Marks a directive, both header and trailing.
pub const MARKER: &str = "// #";
/// Alternative marker, only accepted for header directives.
pub const BLOCK_MARKER: &str = "/* #";
const BLOCK_END: &str = "*/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Safe(bool),
    DebugInfo(bool),
    Opt(String),
    Target(String),
    /// `true` means deprecation warnings are silenced.
    Deprecation(bool),
    File(String),
    Expect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trailing {
    Warning(String),
    Error(String),
    Target(String),
    Deprecation(bool),
}

/// If the whole line is a header directive, returns what follows the marker.
pub fn header_body(line: &str) -> Option<&str> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(MARKER) {
        Some(rest.trim())
    } else if let Some(rest) = line.strip_prefix(BLOCK_MARKER) {
        let rest = rest.trim();
        Some(rest.strip_suffix(BLOCK_END).unwrap_or(rest).trim())
    } else {
        None
    }
}

/// If the line carries a directive anywhere, returns the text after the first
/// marker, up to a second marker if there is one.
pub fn trailing_body(line: &str) -> Option<&str> {
    let start = line.find(MARKER)? + MARKER.len();
    let rest = &line[start..];
    let rest = match rest.find(MARKER) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(rest.trim())
}

fn split(body: &str) -> Option<(&str, &str)> {
    let (key, value) = body.split_once(':')?;
    Some((key, value.trim()))
}

/// `None` if the key isn't a header directive.
pub fn parse_header(body: &str) -> Option<Header> {
    let (key, value) = split(body)?;
    let d = match key {
        "safe" => Header::Safe(value == "yes"),
        "debuginfo" => Header::DebugInfo(value == "yes"),
        "opt" => Header::Opt(value.to_owned()),
        "target" => Header::Target(value.to_owned()),
        "deprecation" => Header::Deprecation(value == "no"),
        "file" => Header::File(value.to_owned()),
        "expect" => Header::Expect(value.to_owned()),
        _ => return None,
    };
    Some(d)
}

/// `None` if the key isn't a trailing directive.
pub fn parse_trailing(body: &str) -> Option<Trailing> {
    let (key, value) = split(body)?;
    let d = match key {
        "warning" => Trailing::Warning(value.to_owned()),
        "error" => Trailing::Error(value.to_owned()),
        "target" => Trailing::Target(value.to_owned()),
        "deprecation" => Trailing::Deprecation(value == "no"),
        _ => return None,
    };
    Some(d)
}
