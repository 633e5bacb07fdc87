//! Brace-delimited and quote-delimited text.
//!
//! Newlines inside captured text are folded: a newline and the whitespace which follows it are
//! replaced by a single space, unless the run is immediately followed by the closing delimiter.
use std::borrow::Cow;

use memchr::memchr3;

use super::scan::whitespace;

/// Captured text which borrows from the source until an edit forces a copy.
struct Captured<'s> {
    input: &'s str,
    start: usize,
    owned: Option<String>,
}

impl<'s> Captured<'s> {
    fn new(input: &'s str, start: usize) -> Self {
        Self {
            input,
            start,
            owned: None,
        }
    }

    /// Replace `input[at..resume]` by `replacement`.
    fn splice(&mut self, at: usize, replacement: &str, resume: usize) {
        let buf = self.owned.get_or_insert_with(String::new);
        buf.push_str(&self.input[self.start..at]);
        buf.push_str(replacement);
        self.start = resume;
    }

    /// Fold the newline at `newline`, returning the position at which scanning resumes.
    fn fold_newline(&mut self, newline: usize, closing: char) -> usize {
        let resume = whitespace(self.input, newline);
        let replacement = if self.input[resume..].starts_with(closing) {
            ""
        } else {
            " "
        };
        self.splice(newline, replacement, resume);
        resume
    }

    fn finish(self, end: usize) -> Cow<'s, str> {
        match self.owned {
            None => Cow::Borrowed(&self.input[self.start..end]),
            Some(mut buf) => {
                buf.push_str(&self.input[self.start..end]);
                Cow::Owned(buf)
            }
        }
    }
}

/// Consume text with balanced brackets, beginning immediately after an opening `{`.
///
/// Returns the position after the matching `}` and the text between the brackets, or `None`
/// if the brackets are never closed.
pub fn balanced(input: &str, start: usize) -> Option<(usize, Cow<'_, str>)> {
    let bytes = input.as_bytes();
    let mut captured = Captured::new(input, start);
    let mut depth = 1usize;
    let mut pos = start;

    while let Some(offset) = memchr3(b'{', b'}', b'\n', &bytes[pos..]) {
        let found = pos + offset;
        match bytes[found] {
            b'{' => {
                depth += 1;
                pos = found + 1;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((found + 1, captured.finish(found)));
                }
                pos = found + 1;
            }
            _ => pos = captured.fold_newline(found, '}'),
        }
    }

    None
}

/// Consume a quoted string, beginning immediately after the opening `"`.
///
/// A `"` nested inside balanced brackets does not terminate the string. An opening bracket
/// which is never closed is kept as a literal character.
pub fn quoted(input: &str, start: usize) -> Option<(usize, Cow<'_, str>)> {
    let bytes = input.as_bytes();
    let mut captured = Captured::new(input, start);
    let mut pos = start;

    while let Some(offset) = memchr3(b'"', b'{', b'\n', &bytes[pos..]) {
        let found = pos + offset;
        match bytes[found] {
            b'"' => return Some((found + 1, captured.finish(found))),
            b'{' => match balanced(input, found + 1) {
                // the group was folded, so splice in the folded text; the closing `}` is
                // copied from the source
                Some((end, Cow::Owned(inner))) => {
                    captured.splice(found + 1, &inner, end - 1);
                    pos = end;
                }
                Some((end, Cow::Borrowed(_))) => pos = end,
                None => pos = found + 1,
            },
            _ => pos = captured.fold_newline(found, '"'),
        }
    }

    None
}
