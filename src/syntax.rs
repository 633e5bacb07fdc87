//! # Description of the bibliography syntax
//! This module gives an explicit description of the `.bib` dialect accepted by the
//! [lexer](crate::lexer) and [parser](crate::parser), in the form of a [pest](https://pest.rs)
//! grammar. The grammar is not used for parsing: it documents the accepted language, and the
//! tests check that it agrees with the parser.
//!
//! Whitespace is any Unicode whitespace. Inside of an entry, commas are skipped wherever
//! whitespace is.
//! ```ignore
//! ws = _{ WHITE_SPACE* }
//! sep = _{ (WHITE_SPACE | ",")* }
//! word_char = _{ ALPHABETIC | NUMBER | "_" }
//! ```
//!
//! ## Structure of a bibliography
//! ### Junk
//! Any text before, between, or after the constructs is ignored, up to an `@` followed by a word
//! and an opening brace.
//! ```ignore
//! entry_head = _{ "@" ~ word_char ~ (!("{" | "," | WHITE_SPACE) ~ ANY)* ~ ws ~ "{" }
//! junk = _{ (!entry_head ~ ANY)* }
//! ```
//!
//! ### Field tokens and values
//! 1. A field key is a word which does not start with a digit, followed by `=`.
//!    ```ignore
//!    key = @{ !NUMBER ~ word_char ~ (!("," | "=" | WHITE_SPACE) ~ ANY)* }
//!    field_key = _{ key ~ ws ~ "=" ~ ws }
//!    ```
//! 2. An identifier is a word which is followed by `,`, `#`, `}`, the end of input, or the end of
//!    the line. Identifiers may start with a digit, so `year = 2014,` holds an identifier; when
//!    used as a value, an identifier is looked up as a macro and otherwise stands for itself.
//!    ```ignore
//!    identifier_follow = _{ ws ~ ("," | "#" | "}" | EOI) | (!"\n" ~ WHITE_SPACE)* ~ "\n" }
//!    identifier = @{ word_char ~ (!("," | "}" | "#" | WHITE_SPACE) ~ ANY)* ~ &identifier_follow }
//!    number = @{ ASCII_DIGIT+ }
//!    ```
//! 3. A braced token is a sequence of characters such that the brackets `{}` are balanced.
//!    ```ignore
//!    balanced = _{ "{" ~ balanced* ~ "}" | !("{" | "}") ~ ANY }
//!    braced_text = @{ balanced* }
//!    braced = ${ "{" ~ braced_text ~ "}" }
//!    ```
//! 4. A quoted token is delimited by `"`. A `"` inside a balanced group does not end the token;
//!    an opening bracket which is never closed is kept as a literal character.
//!    ```ignore
//!    quoted_char = _{ "{" ~ balanced* ~ "}" | !"\"" ~ ANY }
//!    quoted_text = @{ quoted_char* }
//!    quoted = ${ "\"" ~ quoted_text ~ "\"" }
//!    ```
//! 5. A value is a sequence of tokens joined by `#`.
//!    ```ignore
//!    token = _{ identifier | number | braced | quoted }
//!    value = { token ~ (sep ~ "#" ~ sep ~ token)* }
//!    ```
//!
//! ### Constructs
//! 1. A comment is `@comment` followed by the rest of its line, which must not be empty.
//!    ```ignore
//!    comment = { "@" ~ ^"comment" ~ (!"\n" ~ ANY)+ }
//!    ```
//! 2. A preamble holds an optional value.
//!    ```ignore
//!    preamble = { "@" ~ ^"preamble" ~ ws ~ "{" ~ sep ~ (value ~ sep)? ~ "}" }
//!    ```
//! 3. A macro definition holds exactly one `name = value` pair.
//!    ```ignore
//!    macro_def = { "@" ~ ^"string" ~ ws ~ "{" ~ sep ~ field_key ~ value ~ sep ~ "}" }
//!    ```
//! 4. A regular entry has a type starting with a letter, a citation key, and any number of
//!    fields. The types `preamble` and `string` are reserved for the constructs above.
//!    ```ignore
//!    entry_type = @{ !((^"preamble" | ^"string") ~ ws ~ "{") ~ ALPHABETIC ~ (!("{" | "," | WHITE_SPACE) ~ ANY)* }
//!    entry_key = @{ identifier | number }
//!    field = { field_key ~ value }
//!    entry = { "@" ~ entry_type ~ ws ~ "{" ~ sep ~ entry_key ~ sep ~ (field ~ sep)* ~ "}" }
//!    ```
//!
//! ### Bibliography
//! ```ignore
//! construct = _{ preamble | macro_def | comment | entry }
//! bib = { SOI ~ junk ~ (construct ~ junk)* ~ EOI }
//! ```
//!
//! ## Grammar comparisons
//! 1. Only `{}` delimit constructs. The `()` delimiters accepted by BibTeX are not supported.
//! 2. There are no `%` comments: a `%` is an ordinary character.
//! 3. A `@comment` ends at the end of its line rather than at a closing bracket.
//! 4. Commas are separators and may appear anywhere between tokens, so `@book{key,, title = {T},}`
//!    is accepted.
use pest_derive::Parser;

/// A simple automatically derived pest parser.
#[derive(Parser)]
#[grammar = "syntax/bibtex.pest"] // relative to src
pub struct BibtexParser;
