//! Program images hold one byte per line, written as a binary literal.
//! Everything after a `#` is a comment and blank lines are skipped.
//!
//! ```text
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//!
//! 00000001 # HLT
//! ```

use std::borrow::Cow;
use std::error;
use std::{fmt, str::Lines};

use super::{Byte, Memory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidAddress { address: usize },
    InvalidLiteral,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
            ParseErrorKind::InvalidLiteral => f.write_str("invalid literal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// One-based line of the program image the error was found on
    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct Parser<'a, const S: usize> {
    lines: Lines<'a>,
    line_nr: usize,
    position: usize,
    memory: Memory<S>,
}

impl<'a, const S: usize> Parser<'a, S> {
    /// Creates a new parser for `data` which will populate `memory` starting
    /// at address 0.
    pub fn new(data: &'a str, memory: Memory<S>) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            position: 0,
            memory,
        }
    }

    /// Consumes `self` and tries to parse all `self.data` into memory.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Memory<S>, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            log::debug!("Loaded {} byte(s) into memory", self.position);
            Ok(self.memory)
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line of [`Parser::lines`]. Each byte should
    /// be located on its own line.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let line = strip_comment(line);
        if line.is_empty() {
            // Comment or empty line; skip
            Some(Ok(()))
        } else {
            Some(self.parse_literal(line))
        }
    }

    /// Tries to parse a comment-free, trimmed line as a binary literal.
    ///
    /// # Examples
    ///
    /// - `10000010`
    /// - `1`
    fn parse_literal(&mut self, line: &str) -> Result<()> {
        if !line.bytes().all(|digit| digit == b'0' || digit == b'1') {
            return Err(ParseError::new(
                ParseErrorKind::InvalidLiteral,
                format!("`{}` is not a binary literal", line),
                self.line_nr,
            ));
        }

        let byte = Byte::from_str_radix(line, 2).map_err(|_| {
            ParseError::new(
                ParseErrorKind::InvalidLiteral,
                format!("`{}` does not fit into a byte", line),
                self.line_nr,
            )
        })?;

        log::trace!("[{}] Found byte literal 0b{:08b}", self.line_nr, byte);

        self.write_byte(byte)
    }

    /// Writes `byte` into memory at [`Parser::position`]. Then it increments
    /// the position by one.
    ///
    /// # Errors
    ///
    /// This will return an error if the image does not fit into memory.
    fn write_byte(&mut self, byte: Byte) -> Result<()> {
        self.memory
            .write_byte(self.position, byte)
            .map_err(|_| {
                ParseError::new(
                    ParseErrorKind::InvalidAddress {
                        address: self.position,
                    },
                    "program image does not fit into memory",
                    self.line_nr,
                )
            })?;
        self.position += 1;

        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(start) => &line[..start],
        None => line,
    }
    .trim()
}
