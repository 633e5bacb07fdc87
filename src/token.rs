//! Tokens produced by the [lexer](crate::lexer).
use std::borrow::Cow;
use std::fmt;

/// The kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `@preamble{`
    Preamble,
    /// `@string{`
    String,
    /// `@` introducing a regular entry.
    EntryStart,
    /// The entry type following [`TokenKind::EntryStart`], along with its opening `{`.
    EntryType,
    /// A bare word: a citation key or a macro reference.
    Identifier,
    /// A run of ASCII digits.
    Number,
    /// A field name, along with the `=` which follows it.
    Key,
    /// Text delimited by balanced braces.
    Value,
    /// Text delimited by `"`.
    QuotedString,
    /// `}`
    EntryEnd,
    /// The `#` concatenation operator.
    Hash,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Preamble => "preamble",
            TokenKind::String => "string",
            TokenKind::EntryStart => "entry_start",
            TokenKind::EntryType => "entry_type",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Key => "key",
            TokenKind::Value => "value",
            TokenKind::QuotedString => "quoted_string",
            TokenKind::EntryEnd => "entry_end",
            TokenKind::Hash => "#",
            TokenKind::Eof => "eof",
        })
    }
}

/// The span of source text covered by a token.
///
/// Lines and columns are 0-based, and columns count characters rather than bytes. The end of
/// the span is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub first_line: usize,
    pub first_column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

/// A single lexical token.
///
/// The value borrows from the source whenever no normalization of the captured text was
/// required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub value: Cow<'s, str>,
    pub location: Option<Location>,
}

impl<'s> Token<'s> {
    pub fn new(kind: TokenKind, value: impl Into<Cow<'s, str>>, location: Location) -> Self {
        Self {
            kind,
            value: value.into(),
            location: Some(location),
        }
    }

    /// The terminating token of every token stream. It has no location.
    pub fn eof() -> Self {
        Self {
            kind: TokenKind::Eof,
            value: Cow::Borrowed(""),
            location: None,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
