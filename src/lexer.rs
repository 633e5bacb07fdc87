//! Conversion of `.bib` source text into a flat token stream.
//!
//! The lexer is a small state machine. Outside of an entry, all text up to the next `@` which
//! starts an entry is skipped. The `@` must then introduce a preamble, a macro definition, a
//! comment, or a regular entry; a regular entry is followed by its type. Afterwards tokens are
//! produced until the closing `}` of the entry returns the lexer to its initial state.
//!
//! Within an entry, whitespace and commas are discarded. The remaining tokens are tried in a fixed
//! order: keys (`name =`), bare identifiers, numbers, braced values, quoted strings, the `#`
//! operator, and the closing `}`.
//!
//! ```
//! use bibdb::lexer::tokenize;
//! use bibdb::token::TokenKind;
//!
//! let tokens = tokenize("@book{key, title = {Title}}").unwrap();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [
//!         TokenKind::EntryStart,
//!         TokenKind::EntryType,
//!         TokenKind::Identifier,
//!         TokenKind::Key,
//!         TokenKind::Value,
//!         TokenKind::EntryEnd,
//!         TokenKind::Eof,
//!     ]
//! );
//! ```
mod balanced;
mod scan;

use std::borrow::Cow;

use memchr::memchr_iter;

use crate::error::{Error, ErrorCode, Position, Result};
use crate::token::{Location, Token, TokenKind};

/// Tokenize `source`. The returned stream always ends with exactly one [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(source).tokenize()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Skipping text between entries.
    Outside,
    /// Positioned at the `@` of a construct.
    EntryStart,
    /// Immediately after the `@` of a regular entry.
    EntryType,
    /// Inside the body of an entry.
    Fields,
}

/// Byte offsets of the start of every line, for converting positions into line and column.
#[derive(Debug)]
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(memchr_iter(b'\n', source.as_bytes()).map(|nl| nl + 1));
        Self { starts }
    }

    /// 0-based line and character column of the byte offset `pos`.
    fn locate(&self, source: &str, pos: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= pos) - 1;
        (line, source[self.starts[line]..pos].chars().count())
    }
}

/// A single-use lexer over one source string.
#[derive(Debug)]
pub struct Lexer<'s> {
    source: &'s str,
    pos: usize,
    state: State,
    lines: LineIndex,
    tokens: Vec<Token<'s>>,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: 0,
            state: State::Outside,
            lines: LineIndex::new(source),
            tokens: Vec::new(),
        }
    }

    /// Consume the lexer, producing the complete token stream.
    pub fn tokenize(mut self) -> Result<Vec<Token<'s>>> {
        while self.pos < self.source.len() {
            match self.state {
                State::Outside => {
                    self.pos = scan::next_entry(self.source, self.pos);
                    self.state = State::EntryStart;
                }
                State::EntryStart => self.entry_start()?,
                State::EntryType => self.entry_type()?,
                State::Fields => self.field()?,
            }
        }
        self.tokens.push(Token::eof());
        Ok(self.tokens)
    }

    fn entry_start(&mut self) -> Result<()> {
        let (source, pos) = (self.source, self.pos);
        if let Some((end, word)) = scan::command(source, pos, "preamble") {
            self.push(TokenKind::Preamble, word, end);
            self.state = State::Fields;
        } else if let Some((end, word)) = scan::command(source, pos, "string") {
            self.push(TokenKind::String, word, end);
            self.state = State::Fields;
        } else if let Some(end) = scan::comment(source, pos) {
            self.pos = end;
            self.state = State::Outside;
        } else if let Some(end) = scan::entry_start(source, pos) {
            self.push(TokenKind::EntryStart, "@", end);
            self.state = State::EntryType;
        } else {
            return Err(self.unrecognized());
        }
        Ok(())
    }

    fn entry_type(&mut self) -> Result<()> {
        match scan::entry_type(self.source, self.pos) {
            Some((end, word)) => {
                self.push(TokenKind::EntryType, word, end);
                self.state = State::Fields;
                Ok(())
            }
            None => Err(self.unrecognized()),
        }
    }

    fn field(&mut self) -> Result<()> {
        let (source, pos) = (self.source, self.pos);
        let Some(c) = source[pos..].chars().next() else {
            return Ok(());
        };

        if c.is_whitespace() {
            self.pos = scan::whitespace(source, pos);
            return Ok(());
        }
        if c == ',' {
            self.pos += 1;
            return Ok(());
        }

        let (kind, value, end) = Self::field_token(source, pos, c).ok_or_else(|| self.unrecognized())?;
        if kind == TokenKind::EntryEnd {
            self.state = State::Outside;
        }
        self.push(kind, value, end);
        Ok(())
    }

    fn field_token(source: &'s str, pos: usize, c: char) -> Option<(TokenKind, Cow<'s, str>, usize)> {
        if let Some((end, name)) = scan::key(source, pos) {
            return Some((TokenKind::Key, name.into(), end));
        }
        if let Some((end, word)) = scan::identifier(source, pos) {
            return Some((TokenKind::Identifier, word.into(), end));
        }
        if let Some((end, digits)) = scan::number(source, pos) {
            return Some((TokenKind::Number, digits.into(), end));
        }
        match c {
            '{' => balanced::balanced(source, pos + 1)
                .map(|(end, text)| (TokenKind::Value, trim(text), end)),
            '"' => balanced::quoted(source, pos + 1)
                .map(|(end, text)| (TokenKind::QuotedString, text, end)),
            '#' => Some((TokenKind::Hash, "#".into(), pos + 1)),
            '}' => Some((TokenKind::EntryEnd, "}".into(), pos + 1)),
            _ => None,
        }
    }

    /// Record a token covering the source from the current position to `end`.
    fn push(&mut self, kind: TokenKind, value: impl Into<Cow<'s, str>>, end: usize) {
        let (first_line, first_column) = self.lines.locate(self.source, self.pos);
        let (last_line, last_column) = self.lines.locate(self.source, end);
        let location = Location {
            first_line,
            first_column,
            last_line,
            last_column,
        };
        self.tokens.push(Token::new(kind, value, location));
        self.pos = end;
    }

    fn unrecognized(&self) -> Error {
        let (line, column) = self.lines.locate(self.source, self.pos);
        let snippet = self.source[self.pos..]
            .split('\n')
            .next()
            .unwrap_or_default()
            .to_owned();
        Error::syntax(
            ErrorCode::UnrecognizedToken { snippet },
            Some(Position::new(line + 1, column + 1)),
        )
    }
}

fn trim(text: Cow<'_, str>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim()),
        Cow::Owned(s) if s.trim().len() == s.len() => Cow::Owned(s),
        Cow::Owned(s) => Cow::Owned(s.trim().to_owned()),
    }
}
