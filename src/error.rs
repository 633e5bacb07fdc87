use std::fmt;

use thiserror::Error as ThisError;

use crate::token::TokenKind;

pub type Result<T> = std::result::Result<T, Error>;

/// A 1-based position in the source text, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The error type returned by every fallible operation in this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    position: Option<Position>,
}

/// The coarse kind of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// The input is not a well-formed bibliography: lexing or parsing failed.
    Syntax,
    /// A name string could not be decomposed.
    Name,
    /// A macro, entry, or field is not present.
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ErrorCode {
    #[error("unrecognised token \"{snippet}\"")]
    UnrecognizedToken { snippet: String },
    #[error("unexpected {found}; expecting {expected}")]
    UnexpectedToken {
        found: TokenKind,
        expected: &'static str,
    },
    #[error("too many commas in name \"{0}\"")]
    InvalidName(String),
    #[error("undefined macro \"{0}\"")]
    MissingMacro(String),
    #[error("field \"{0}\" not found")]
    MissingField(String),
    #[error("entry \"{0}\" not found")]
    MissingEntry(String),
}

impl Error {
    pub(crate) fn syntax(code: ErrorCode, position: Option<Position>) -> Self {
        Self { code, position }
    }

    pub(crate) fn lookup(code: ErrorCode) -> Self {
        Self {
            code,
            position: None,
        }
    }

    /// The underlying error code.
    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    /// The source position of the error, if it is known.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn classify(&self) -> Category {
        match self.code {
            ErrorCode::UnrecognizedToken { .. } | ErrorCode::UnexpectedToken { .. } => {
                Category::Syntax
            }
            ErrorCode::InvalidName(_) => Category::Name,
            ErrorCode::MissingMacro(_) | ErrorCode::MissingField(_) | ErrorCode::MissingEntry(_) => {
                Category::Lookup
            }
        }
    }

    pub fn is_syntax(&self) -> bool {
        self.classify() == Category::Syntax
    }

    pub fn is_lookup(&self) -> bool {
        self.classify() == Category::Lookup
    }
}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Self {
            code,
            position: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "{} - {}", position, self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for Error {}
