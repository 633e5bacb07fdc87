//! Recursive-descent parsing of a token stream into [definitions](Definition), and reduction of
//! those definitions into a [`Database`].
//!
//! The grammar is
//! ```text
//! database    = (preamble | string | entry)* EOF
//! preamble    = PREAMBLE field_value? ENTRY_END
//! string      = STRING KEY field_value ENTRY_END
//! entry       = ENTRY_START ENTRY_TYPE (IDENTIFIER | NUMBER) (KEY field_value)* ENTRY_END
//! field_value = value (HASH field_value)?
//! value       = IDENTIFIER | NUMBER | VALUE | QUOTED_STRING
//! ```
//! Every grammar function takes a [`Cursor`] by value and returns the cursor positioned after
//! the consumed tokens, so that a failed alternative consumes nothing.
use std::borrow::Cow;

use tracing::{debug, warn};

use crate::ast::{Definition, EntryNode, KeyValue, Value};
use crate::database::{Database, Entry};
use crate::error::{Error, ErrorCode, Position, Result};
use crate::lexer::tokenize;
use crate::macros::MacroDictionary;
use crate::names::{is_name_field, normalize_name_list};
use crate::resolve::resolve;
use crate::token::{Token, TokenKind};

static EOF: Token<'static> = Token {
    kind: TokenKind::Eof,
    value: Cow::Borrowed(""),
    location: None,
};

/// A position in a token stream.
///
/// Reading past the end of the stream yields [`TokenKind::Eof`].
#[derive(Debug, Clone, Copy)]
struct Cursor<'t, 's> {
    tokens: &'t [Token<'s>],
    pos: usize,
}

impl<'t, 's> Cursor<'t, 's> {
    fn new(tokens: &'t [Token<'s>]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(self) -> &'t Token<'s> {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn advance(self) -> Self {
        Self {
            tokens: self.tokens,
            pos: self.pos + 1,
        }
    }

    /// Consume a token of the given kind, if it is next.
    fn accept(self, kind: TokenKind) -> Option<(&'t Token<'s>, Self)> {
        let token = self.peek();
        token.is(kind).then(|| (token, self.advance()))
    }

    /// Consume a token of the given kind, or fail.
    fn expect(self, kind: TokenKind, expecting: &'static str) -> Result<(&'t Token<'s>, Self)> {
        self.accept(kind)
            .ok_or_else(|| unexpected(self.peek(), expecting))
    }
}

fn unexpected(token: &Token<'_>, expecting: &'static str) -> Error {
    let position = token
        .location
        .map(|loc| Position::new(loc.first_line + 1, loc.first_column + 1));
    Error::syntax(
        ErrorCode::UnexpectedToken {
            found: token.kind,
            expected: expecting,
        },
        position,
    )
}

fn definition<'t, 's>(cursor: Cursor<'t, 's>) -> Result<Option<(Definition<'s>, Cursor<'t, 's>)>> {
    let token = cursor.peek();
    let parsed = match token.kind {
        TokenKind::Preamble => preamble(cursor.advance())?,
        TokenKind::String => string(cursor.advance())?,
        TokenKind::EntryStart => entry(cursor.advance())?,
        TokenKind::Eof => return Ok(None),
        _ => return Err(unexpected(token, "preamble, string, entry_start, or eof")),
    };
    Ok(Some(parsed))
}

fn preamble<'t, 's>(cursor: Cursor<'t, 's>) -> Result<(Definition<'s>, Cursor<'t, 's>)> {
    // the contents are optional
    let (contents, cursor) = if starts_value(cursor.peek().kind) {
        let (value, cursor) = field_value(cursor)?;
        (Some(value), cursor)
    } else {
        (None, cursor)
    };
    let (_, cursor) = cursor.expect(TokenKind::EntryEnd, "entry_end")?;
    Ok((Definition::Preamble { contents }, cursor))
}

fn string<'t, 's>(cursor: Cursor<'t, 's>) -> Result<(Definition<'s>, Cursor<'t, 's>)> {
    let (key, cursor) = cursor.expect(TokenKind::Key, "key")?;
    let (value, cursor) = field_value(cursor)?;
    let (_, cursor) = cursor.expect(TokenKind::EntryEnd, "entry_end")?;
    let definition = Definition::String {
        key: key.value.clone(),
        value,
    };
    Ok((definition, cursor))
}

fn entry<'t, 's>(cursor: Cursor<'t, 's>) -> Result<(Definition<'s>, Cursor<'t, 's>)> {
    let (entry_type, cursor) = cursor.expect(TokenKind::EntryType, "entry_type")?;
    let (key, mut cursor) = cursor
        .accept(TokenKind::Identifier)
        .or_else(|| cursor.accept(TokenKind::Number))
        .ok_or_else(|| unexpected(cursor.peek(), "identifier"))?;

    let mut fields = Vec::new();
    while let Some((field_key, next)) = cursor.accept(TokenKind::Key) {
        let (value, next) = field_value(next)?;
        fields.push(KeyValue {
            key: field_key.value.clone(),
            value,
        });
        cursor = next;
    }

    let (_, cursor) = cursor.expect(TokenKind::EntryEnd, "entry_end")?;
    let node = EntryNode {
        entry_type: entry_type.value.clone(),
        key: key.value.clone(),
        fields,
    };
    Ok((Definition::Entry(node), cursor))
}

fn starts_value(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier | TokenKind::Number | TokenKind::Value | TokenKind::QuotedString
    )
}

/// Parse `value (# value)*`, nesting concatenations to the right.
fn field_value<'t, 's>(cursor: Cursor<'t, 's>) -> Result<(Value<'s>, Cursor<'t, 's>)> {
    let (first, mut cursor) = value(cursor)?;
    let mut parts = vec![first];
    while let Some((_, next)) = cursor.accept(TokenKind::Hash) {
        let (part, next) = value(next)?;
        parts.push(part);
        cursor = next;
    }

    let mut parts = parts.into_iter().rev();
    let mut folded = parts.next().ok_or_else(|| unexpected(cursor.peek(), "value"))?;
    for lhs in parts {
        folded = Value::concat(lhs, folded);
    }
    Ok((folded, cursor))
}

fn value<'t, 's>(cursor: Cursor<'t, 's>) -> Result<(Value<'s>, Cursor<'t, 's>)> {
    let token = cursor.peek();
    let text = token.value.clone();
    let node = match token.kind {
        TokenKind::Identifier => Value::Literal(text),
        TokenKind::Number => Value::Number(text),
        TokenKind::Value | TokenKind::QuotedString => Value::Quoted(text),
        _ => {
            return Err(unexpected(
                token,
                "quoted_string, value, identifier, or number",
            ));
        }
    };
    Ok((node, cursor.advance()))
}

/// An iterator over the definitions in a token stream.
///
/// Iteration stops after the first error.
#[derive(Debug)]
pub struct Definitions<'t, 's> {
    cursor: Cursor<'t, 's>,
    done: bool,
}

impl<'t, 's> Definitions<'t, 's> {
    pub fn new(tokens: &'t [Token<'s>]) -> Self {
        Self {
            cursor: Cursor::new(tokens),
            done: false,
        }
    }
}

impl<'s> Iterator for Definitions<'_, 's> {
    type Item = Result<Definition<'s>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match definition(self.cursor) {
            Ok(Some((parsed, cursor))) => {
                self.cursor = cursor;
                Some(Ok(parsed))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Parse `source` into its syntax tree without resolving any values.
pub fn parse_definitions(source: &str) -> Result<Vec<Definition<'_>>> {
    let tokens = tokenize(source)?;
    Definitions::new(&tokens).collect()
}

/// Decode bytes which are expected to be UTF-8, replacing invalid sequences, removing a leading
/// byte order mark and normalizing line endings to `\n`.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    let text = match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
        Cow::Owned(s) => match s.strip_prefix('\u{feff}') {
            Some(stripped) => Cow::Owned(stripped.to_owned()),
            None => Cow::Owned(s),
        },
    };
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        text
    }
}

/// Options controlling how a [`Database`] is built from source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Rewrite name fields, such as `author`, into the canonical `von Last, Jr, First` form.
    pub normalize_names: bool,
    /// Fail the parse when a name field cannot be normalized. Otherwise, the field keeps its
    /// resolved value.
    pub strict_names: bool,
    /// Predefine the month macros `jan` to `dec`.
    pub month_macros: bool,
    /// The word separating names in a name field.
    pub conjunction: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalize_names: true,
            strict_names: true,
            month_macros: true,
            conjunction: "and".to_owned(),
        }
    }
}

impl Config {
    pub fn with_normalize_names(mut self, normalize_names: bool) -> Self {
        self.normalize_names = normalize_names;
        self
    }

    pub fn with_strict_names(mut self, strict_names: bool) -> Self {
        self.strict_names = strict_names;
        self
    }

    pub fn with_month_macros(mut self, month_macros: bool) -> Self {
        self.month_macros = month_macros;
        self
    }

    pub fn with_conjunction(mut self, conjunction: impl Into<String>) -> Self {
        self.conjunction = conjunction.into();
        self
    }
}

/// Builds a [`Database`] from `.bib` source text.
///
/// ```
/// use bibdb::Parser;
///
/// let db = Parser::default()
///     .parse("@string{pub = {MIT Press}}\n@book{Key, Publisher = pub, month = jan}")
///     .unwrap();
/// let entry = db.entry("key").unwrap();
/// assert_eq!(entry.get("publisher").unwrap(), "MIT Press");
/// assert_eq!(entry.get("month").unwrap(), "January");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: Config,
}

impl Parser {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse `source`. Any error aborts the whole parse.
    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn parse(&self, source: &str) -> Result<Database> {
        let tokens = tokenize(source)?;
        let mut database = if self.config.month_macros {
            Database::new()
        } else {
            Database::with_macros(MacroDictionary::default())
        };

        for definition in Definitions::new(&tokens) {
            match definition? {
                Definition::Preamble { contents } => {
                    let text = contents
                        .map(|value| resolve(&value, database.macros()))
                        .unwrap_or_default();
                    database.add_preamble(text);
                }
                Definition::String { key, value } => {
                    let expansion = resolve(&value, database.macros());
                    if let Some(previous) = database.add_macro(&*key, expansion) {
                        debug!("Macro '{}' redefined (was '{}')", key, previous);
                    }
                }
                Definition::Entry(node) => {
                    let entry = self.reduce(node, database.macros())?;
                    let cite_key = entry.cite_key().to_owned();
                    if !database.add_entry(entry) {
                        warn!(
                            "Duplicate citation key '{}'; keeping the first definition",
                            cite_key
                        );
                    }
                }
            }
        }

        debug!(
            "Parsed bibliography: {} entries, {} macros",
            database.len(),
            database.macros().len()
        );
        Ok(database)
    }

    /// Parse raw bytes, decoding them with [`decode`].
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Database> {
        self.parse(&decode(bytes))
    }

    /// Resolve the values of an entry node into a model entry.
    fn reduce(&self, node: EntryNode<'_>, macros: &MacroDictionary) -> Result<Entry> {
        let mut entry = Entry::new(node.entry_type, node.key);
        for KeyValue { key, value } in node.fields {
            let mut text = resolve(&value, macros);
            if self.config.normalize_names && is_name_field(&key) {
                match normalize_name_list(&text, &self.config.conjunction) {
                    Ok(normalized) => text = normalized,
                    Err(err) if !self.config.strict_names => {
                        warn!(
                            "Keeping field '{}' of '{}' as written: {}",
                            key,
                            entry.cite_key(),
                            err
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
            entry.insert(key, text);
        }
        Ok(entry)
    }
}
