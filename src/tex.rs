//! Splitting of TeX strings which respects brace groups.
//!
//! Text inside `{...}`, however deeply nested, is never split. `~` (a non-breaking space) is
//! treated as whitespace.
use unicase::UniCase;

/// Control sequences which stand for a single foreign letter, such as `\ae` or `\ss`.
const FOREIGN_LETTERS: [&str; 13] = [
    "ae", "AE", "oe", "OE", "aa", "AA", "o", "O", "l", "L", "ss", "i", "j",
];

pub fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '~'
}

fn skip_spaces(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    pos + rest.len() - rest.trim_start_matches(is_space).len()
}

/// Split `text` at every separator which is not enclosed in braces.
///
/// `separator(text, pos)` returns the end of a separator starting at `pos`, if there is one.
/// A separator at the very start of the string does not split. The parts are trimmed of
/// whitespace and `~`, and empty parts are dropped.
fn split_tex<'a>(text: &'a str, separator: impl Fn(&str, usize) -> Option<usize>) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut depth = 0isize;
    let mut start = 0;
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ if depth == 0 => {
                if let Some(end) = separator(text, pos).filter(|&end| end > pos) {
                    if pos > 0 {
                        parts.push(&text[start..pos]);
                        start = end;
                    }
                    pos = end;
                    continue;
                }
            }
            _ => {}
        }
        pos += c.len_utf8();
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(|part| part.trim_matches(is_space))
        .filter(|part| !part.is_empty())
        .collect()
}

/// Split at runs of whitespace and `~`.
///
/// ```
/// use bibdb::tex::split_words;
///
/// assert_eq!(
///     split_words("Jean Charles~Gabriel {de la} Vall{\\'e}e"),
///     ["Jean", "Charles", "Gabriel", "{de la}", "Vall{\\'e}e"]
/// );
/// ```
pub fn split_words(text: &str) -> Vec<&str> {
    split_tex(text, |text, pos| {
        let end = skip_spaces(text, pos);
        (end > pos).then_some(end)
    })
}

/// Split a name into its comma-separated parts, such as `von Last`, `Jr` and `First`.
pub fn split_name_parts(text: &str) -> Vec<&str> {
    split_tex(text, |text, pos| {
        text[pos..]
            .starts_with(',')
            .then(|| skip_spaces(text, pos + 1))
    })
}

/// Split a list of names, separated by the word `conjunction` (usually `and`).
///
/// The conjunction is matched ignoring case and must be a separate word: it must be surrounded
/// by whitespace or `~`, or end the string.
///
/// ```
/// use bibdb::tex::tokenize_list;
///
/// assert_eq!(tokenize_list("Chemicals and Entrails", "and"), ["Chemicals", "Entrails"]);
/// assert_eq!(tokenize_list("Chemicals {and} Entrails", "and"), ["Chemicals {and} Entrails"]);
/// assert_eq!(tokenize_list("Brand and Landers", "and"), ["Brand", "Landers"]);
/// ```
pub fn tokenize_list<'a>(text: &'a str, conjunction: &str) -> Vec<&'a str> {
    if conjunction.is_empty() {
        return split_tex(text, |_, _| None);
    }
    split_tex(text, |text, pos| {
        let word = skip_spaces(text, pos);
        let at_boundary = word > pos || text[..pos].chars().next_back().is_some_and(is_space);
        if !at_boundary {
            return None;
        }
        let end = word + conjunction.len();
        let candidate = text.get(word..end)?;
        if UniCase::new(candidate) != UniCase::new(conjunction) {
            return None;
        }
        let after = skip_spaces(text, end);
        (after > end || after == text.len()).then_some(after)
    })
}

/// The position after the group opened by the `{` at `open`, and the end of its contents.
fn group_end(text: &str, open: usize) -> (usize, usize) {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return (i + 1, i);
                }
            }
            _ => {}
        }
    }
    (text.len(), text.len())
}

/// Remove one pair of braces enclosing the whole of `text`, if there is one.
pub fn strip_braces(text: &str) -> &str {
    if text.starts_with('{') {
        let (after, inner_end) = group_end(text, 0);
        if after == text.len() && inner_end < text.len() {
            return &text[1..inner_end];
        }
    }
    text
}

fn first_letter_case(text: &str) -> Option<bool> {
    text.chars()
        .find(|c| c.is_alphabetic())
        .map(char::is_lowercase)
}

/// The case of a special character such as `{\'e}` or `{\AE}`, given the contents of its group
/// (starting with the backslash).
fn special_char_case(group: &str) -> Option<bool> {
    let command = group.strip_prefix('\\')?;
    let name_len = command
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(command.len());
    if name_len == 0 {
        // a control symbol, such as an accent `\'`
        let symbol_len = command.chars().next().map_or(0, char::len_utf8);
        return first_letter_case(&command[symbol_len..]);
    }
    let name = &command[..name_len];
    if FOREIGN_LETTERS.iter().any(|&letter| letter == name) {
        return first_letter_case(name);
    }
    first_letter_case(&command[name_len..])
}

/// Whether a word starts with a lowercase letter, in the sense used to detect the `von` part of a
/// name.
///
/// The first letter which is not enclosed in braces decides. A brace group which starts with a
/// control sequence, such as `{\'e}`, is a special character and counts as a letter with the
/// case of the character it stands for; other brace groups are skipped. A word without any
/// such letter is not lowercase.
///
/// ```
/// use bibdb::tex::is_lowercase_word;
///
/// assert!(is_lowercase_word("von"));
/// assert!(is_lowercase_word("{\\'e}tienne"));
/// assert!(!is_lowercase_word("{von} Neumann"));
/// assert!(!is_lowercase_word("Vall{\\'e}e"));
/// ```
pub fn is_lowercase_word(word: &str) -> bool {
    let mut pos = 0;
    while let Some(c) = word[pos..].chars().next() {
        match c {
            '{' => {
                let (after, inner_end) = group_end(word, pos);
                let inner = &word[pos + 1..inner_end.max(pos + 1)];
                if inner.starts_with('\\') {
                    if let Some(lower) = special_char_case(inner) {
                        return lower;
                    }
                }
                pos = after;
            }
            c if c.is_alphabetic() => return c.is_lowercase(),
            c => pos += c.len_utf8(),
        }
    }
    false
}
