//! Conformance test runner guts.
//!
//! Test files are compiler inputs annotated with directives saying what the
//! compiler should report and what it should generate:
//!
//! ```text
//! // #target: x64
//! // #file: main.c3
//! fn void main() {
//!     int x = y;      // #error: unknown symbol 'y'
//! }
//! // #expect: main.ll
//! define void @main
//! ```
//!
//! A test goes through `parse` to find the files to write and what to expect,
//! the files are handed to the `compiler`, and what comes back is checked by
//! `reconcile` (diagnostics) and `fragment` (generated files).  `runner`
//! strings it all together.
//#![deny(missing_docs)]

pub mod compiler;
pub mod config;
pub mod directive;
pub mod error;
pub mod expect;
pub mod fragment;
pub mod outcome;
pub mod output;
pub mod parse;
pub mod reconcile;
pub mod report;
pub mod runner;
pub mod source;

pub use crate::error::{Error, Result};
