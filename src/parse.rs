//! Turns a test file into the files to emit, the compiler settings and the
//! diagnostics to expect.
//!
//! Everything the directives change is kept in one `ParseState` that each
//! handler gets passed, so a single pass over the lines does it all.

use log::{debug, trace};

use crate::config::RunConfig;
use crate::directive::{self, Header, Trailing};
use crate::error::{Error, Result};
use crate::expect::{DiagKind, ExpectationKey, ExpectationSet};
use crate::output::OutputFile;
use crate::source::{Mode, TestCase};

/// Offset of the implicit output file: source index 0 is reported as line 1.
pub const DEFAULT_LINE_OFFSET: i64 = 1;

/// Extension given to the implicit output file of a template.
pub const TEMPLATE_OUTPUT_EXT: &str = "c3";

/// Everything a test needs to be compiled and checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTest {
    pub config: RunConfig,
    /// In declaration order.  Targets get compiled in this order too.
    pub files: Vec<OutputFile>,
    pub expectations: ExpectationSet,
}

impl ParsedTest {
    pub fn targets(&self) -> impl Iterator<Item = &OutputFile> {
        self.files.iter().filter(|f| f.is_target())
    }

    pub fn sinks(&self) -> impl Iterator<Item = &OutputFile> {
        self.files.iter().filter(|f| !f.is_target())
    }
}

struct ParseState<'a> {
    case: &'a TestCase,
    /// 0-based index of the line being looked at.
    line: usize,
    config: RunConfig,
    files: Vec<OutputFile>,
    /// Index into `files` of the file lines are going to, if one is open.
    current: Option<usize>,
    expectations: ExpectationSet,
}

impl<'a> ParseState<'a> {
    fn new(case: &'a TestCase) -> Self {
        ParseState {
            case,
            line: 0,
            config: RunConfig::default(),
            files: vec![],
            current: None,
            expectations: ExpectationSet::new(),
        }
    }

    /// Opens `file`, closing whatever was open before.
    fn open(&mut self, file: OutputFile) {
        trace!("{}: opening {}", self.case.name, file.path.display());
        self.files.push(file);
        self.current = Some(self.files.len() - 1);
    }

    /// The open file, opening the implicit one first if nothing is.
    fn current_or_default(&mut self) -> &mut OutputFile {
        let idx = match self.current {
            Some(idx) => idx,
            None => {
                let name = match self.case.mode {
                    Mode::Single => self.case.name.clone(),
                    Mode::Template => format!("{}.{}", self.case.stem(), TEMPLATE_OUTPUT_EXT),
                };
                self.open(OutputFile::target(name, DEFAULT_LINE_OFFSET));
                self.files.len() - 1
            }
        };
        &mut self.files[idx]
    }

    fn raw_line(&self) -> &'a str {
        let case = self.case;
        &case.lines[self.line]
    }

    fn header(&mut self, d: Header) {
        debug!("{}:{}: {:?}", self.case.name, self.line + 1, d);
        match d {
            Header::Safe(safe) => self.config.safe = safe,
            Header::DebugInfo(debug_info) => self.config.debug_info = debug_info,
            Header::Opt(opt) => self.config.extra_options.push(opt),
            Header::Target(arch) => self.config.target_arch = Some(arch),
            Header::Deprecation(silence) => self.config.silence_deprecation = silence,
            Header::File(path) => {
                // Lines after this one count from 1 in the emitted file.
                let offset = -(self.line as i64);
                self.open(OutputFile::target(path, offset));
            }
            Header::Expect(path) => self.open(OutputFile::sink(path)),
        }
    }

    fn trailing(&mut self, d: Trailing) {
        debug!("{}:{}: {:?}", self.case.name, self.line + 1, d);
        match d {
            Trailing::Warning(msg) => self.expect(DiagKind::Warning, msg),
            Trailing::Error(msg) => self.expect(DiagKind::Error, msg),
            Trailing::Target(arch) => self.config.target_arch = Some(arch),
            Trailing::Deprecation(silence) => self.config.silence_deprecation = silence,
        }
    }

    fn expect(&mut self, kind: DiagKind, msg: String) {
        let line = self.line as i64;
        let file = self.current_or_default();
        let key = ExpectationKey::new(file.file_name(), line + file.line_offset());
        if let Some(old) = self.expectations.expect(kind, key.clone(), msg) {
            debug!(
                "{}: {} at {}:{} replaces \"{}\"",
                self.case.name,
                kind.noun(),
                key.file,
                key.line,
                old
            );
        }
    }

    fn unknown_header(&self) -> Error {
        Error::UnknownHeaderDirective {
            path: self.case.path.clone(),
            line: self.line,
            content: self.raw_line().trim().to_owned(),
        }
    }

    fn unknown_trailing(&self) -> Error {
        Error::UnknownTrailingDirective {
            path: self.case.path.clone(),
            line: self.line,
            content: self.raw_line().trim().to_owned(),
        }
    }

    /// Interprets a trailing directive on the current line, if there is one.
    fn scan_trailing(&mut self) -> Result<()> {
        if let Some(body) = directive::trailing_body(self.raw_line()) {
            let d = directive::parse_trailing(body).ok_or_else(|| self.unknown_trailing())?;
            self.trailing(d);
        }
        Ok(())
    }

    fn single_line(&mut self) -> Result<()> {
        self.current_or_default();
        self.scan_trailing()?;
        let line = self.raw_line();
        self.current_or_default().push(line);
        Ok(())
    }

    fn template_line(&mut self) -> Result<()> {
        let line = self.raw_line();
        if let Some(body) = directive::header_body(line) {
            let d = directive::parse_header(body).ok_or_else(|| self.unknown_header())?;
            self.header(d);
            return Ok(());
        }
        self.current_or_default();
        self.scan_trailing()?;
        self.current_or_default().push(line);
        Ok(())
    }

    fn finish(self) -> ParsedTest {
        ParsedTest {
            config: self.config,
            files: self.files,
            expectations: self.expectations,
        }
    }
}

/// Parses a whole test.  If the test is marked as skipped its first line, the
/// marker, is dropped.
pub fn parse(case: &TestCase) -> Result<ParsedTest> {
    let mut state = ParseState::new(case);
    state.line = if case.skipped { 1 } else { 0 };
    while state.line < case.lines.len() {
        match case.mode {
            Mode::Single => state.single_line()?,
            Mode::Template => state.template_line()?,
        }
        state.line += 1;
    }
    Ok(state.finish())
}
