//! Scanners for the individual token shapes.
//!
//! Every scanner takes the full input and a byte position, and on a match returns the position
//! immediately after the consumed text together with the captured value. A scanner which does
//! not match returns `None` and consumes nothing, so that the caller can try the next shape.
use memchr::{memchr, memchr_iter};

/// A "word" character: alphanumeric or `_`.
pub fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Skip a (possibly empty) run of whitespace.
pub fn whitespace(input: &str, pos: usize) -> usize {
    let rest = &input[pos..];
    pos + rest.len() - rest.trim_start().len()
}

/// Skip junk text until the next `@` which begins an entry, or the end of input.
///
/// The `@` itself is not consumed.
pub fn next_entry(input: &str, pos: usize) -> usize {
    memchr_iter(b'@', &input.as_bytes()[pos..])
        .map(|offset| pos + offset)
        .find(|&at| entry_start(input, at).is_some())
        .unwrap_or(input.len())
}

/// Match `@keyword{`, ignoring case and allowing whitespace before the brace.
///
/// Returns the keyword as written in the source.
pub fn command<'s>(input: &'s str, pos: usize, keyword: &str) -> Option<(usize, &'s str)> {
    let start = pos + 1;
    let end = start + keyword.len();
    let word = input.get(start..end)?;
    if !word.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let brace = whitespace(input, end);
    input[brace..]
        .starts_with('{')
        .then_some((brace + 1, word))
}

/// Match `@comment` followed by at least one more character on the same line. The remainder of
/// the line is consumed.
pub fn comment(input: &str, pos: usize) -> Option<usize> {
    let start = pos + 1;
    let end = start + "comment".len();
    if !input.get(start..end)?.eq_ignore_ascii_case("comment") {
        return None;
    }
    let line_end = memchr(b'\n', &input.as_bytes()[end..]).map_or(input.len(), |o| end + o);
    (line_end > end).then_some(line_end)
}

/// Match a word whose first character satisfies `first`, running up to the first `{`, `,` or
/// whitespace, and followed (possibly after whitespace) by `{`.
///
/// Returns the end of the word and the position after the brace.
fn braced_head(input: &str, start: usize, first: impl Fn(char) -> bool) -> Option<(usize, usize)> {
    let rest = &input[start..];
    if !rest.chars().next().is_some_and(first) {
        return None;
    }
    let word_end = start
        + rest
            .find(|c: char| c == '{' || c == ',' || c.is_whitespace())
            .unwrap_or(rest.len());
    let brace = whitespace(input, word_end);
    input[brace..]
        .starts_with('{')
        .then_some((word_end, brace + 1))
}

/// Match the `@` of a regular entry such as `@article{`. Only the `@` is consumed.
pub fn entry_start(input: &str, pos: usize) -> Option<usize> {
    input[pos..].starts_with('@').then_some(())?;
    braced_head(input, pos + 1, is_word).map(|_| pos + 1)
}

/// Match the entry type and its opening brace.
pub fn entry_type(input: &str, pos: usize) -> Option<(usize, &str)> {
    braced_head(input, pos, char::is_alphabetic).map(|(word_end, end)| (end, &input[pos..word_end]))
}

/// Match a field name followed by `=`, consuming whitespace on either side of the `=`.
pub fn key(input: &str, pos: usize) -> Option<(usize, &str)> {
    let rest = &input[pos..];
    let first = rest.chars().next()?;
    if !is_word(first) || first.is_numeric() {
        return None;
    }
    let name_end = pos
        + rest
            .find(|c: char| c == ',' || c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
    let eq = whitespace(input, name_end);
    if !input[eq..].starts_with('=') {
        return None;
    }
    Some((whitespace(input, eq + 1), &input[pos..name_end]))
}

/// Match a bare word.
///
/// The word must be followed, after optional whitespace, by one of `,`, `#`, `}` or the end of
/// input. A word at the end of a line is also accepted.
pub fn identifier(input: &str, pos: usize) -> Option<(usize, &str)> {
    let rest = &input[pos..];
    if !rest.chars().next().is_some_and(is_word) {
        return None;
    }
    let end = pos
        + rest
            .find(|c: char| matches!(c, ',' | '}' | '#') || c.is_whitespace())
            .unwrap_or(rest.len());
    let after = whitespace(input, end);
    let accepted = match input[after..].chars().next() {
        None | Some(',' | '#' | '}') => true,
        Some(_) => input[end..after].contains('\n'),
    };
    accepted.then_some((end, &input[pos..end]))
}

/// Consume a non-empty sequence of digits [0-9]+.
pub fn number(input: &str, pos: usize) -> Option<(usize, &str)> {
    let len = input[pos..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    (len > 0).then_some((pos + len, &input[pos..pos + len]))
}
