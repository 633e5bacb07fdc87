//! # bibdb
//! A parser for BibTeX and BibLaTeX bibliographies, producing a [`Database`] of entries with
//! case-insensitive field access, `@string` macro expansion, and `crossref` inheritance.
//!
//! Parsing runs in three stages: the [lexer] turns source text into a flat token stream, the
//! [parser] builds a syntax tree ([ast]) from the tokens, and the tree is reduced into a
//! [`Database`] by [resolving](resolve) every value against the macros defined so far. Name
//! fields, such as `author`, are rewritten into a canonical form by the [names] tokenizer.
//!
//! ```
//! let db = bibdb::parse(
//!     r#"@string{ch = "Chemicals"}
//!        @book{hobbes, author = {Thomas Hobbes}, title = ch # " and Entrails", month = apr}"#,
//! )
//! .unwrap();
//!
//! let entry = db.entry("Hobbes").unwrap();
//! assert_eq!(entry.get("Author").unwrap(), "Hobbes, Thomas");
//! assert_eq!(entry.get("title").unwrap(), "Chemicals and Entrails");
//! assert_eq!(entry.get("month").unwrap(), "April");
//! ```

/// Tokens produced by the lexer.
pub mod token;

/// Conversion of source text into tokens.
pub mod lexer;

/// The syntax tree.
pub mod ast;

/// Parsing of token streams into syntax trees and databases.
pub mod parser;

/// Expansion of values.
pub mod resolve;

/// The macro table.
pub mod macros;

/// Maps with case-insensitive keys.
pub mod keys;

/// Parsed bibliographies.
pub mod database;

/// Personal names.
pub mod names;

/// Brace-aware splitting of TeX strings.
pub mod tex;

/// Formatting of entries for display.
pub mod format;

/// Error types for parsing and lookups.
pub mod error;

#[cfg(feature = "syntax")]
pub mod syntax;

// re-exports
pub use database::{Database, Entry, EntryRef};
pub use error::{Category, Error, ErrorCode, Result};
pub use macros::MacroDictionary;
pub use names::Name;
pub use parser::{Config, Parser};

/// Parse `source` with the default [`Config`].
pub fn parse(source: &str) -> Result<Database> {
    Parser::default().parse(source)
}

/// Parse possibly malformed UTF-8 with the default [`Config`]. See [`Parser::parse_bytes`].
pub fn parse_bytes(bytes: &[u8]) -> Result<Database> {
    Parser::default().parse_bytes(bytes)
}
