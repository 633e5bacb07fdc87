//! Decomposition of personal names into their parts.
//!
//! Three forms are recognised, distinguished by the number of commas outside of braces:
//! ```text
//! First von Last
//! von Last, First
//! von Last, Jr, First
//! ```
//! as well as the BibLaTeX form `family=Last, given=First, prefix=von, suffix=Jr`.
//!
//! In the first form, the last word is the last name, and the rightmost run of lowercase words
//! before it starts the `von` part. In every form, the `von` part is the leading run of
//! lowercase words of the last name, but never its final word.
//!
//! In the comma forms, a part written as `{}` is empty. Rendering uses it where leaving a part
//! out would change how the name reads back, as in `Smith, Jr, {}`.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCode, Result};
use crate::tex::{is_lowercase_word, split_name_parts, split_words, strip_braces, tokenize_list};

/// The fields whose values are lists of names.
pub const NAME_FIELDS: [&str; 17] = [
    "author",
    "bookauthor",
    "commentator",
    "editor",
    "editora",
    "editorb",
    "editorc",
    "foreword",
    "holder",
    "introduction",
    "shortauthor",
    "shorteditor",
    "translator",
    "sortname",
    "namea",
    "nameb",
    "namec",
];

/// Whether `field` holds a list of names. Field names are compared ignoring case.
pub fn is_name_field(field: &str) -> bool {
    NAME_FIELDS
        .iter()
        .any(|name| name.eq_ignore_ascii_case(field))
}

/// A name split into its parts. Missing parts are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub first: String,
    pub middle: String,
    pub prefix: String,
    pub last: String,
    pub generation: String,
}

impl Name {
    /// The surname, or the whole name when there is no surname.
    pub fn last_or_first(&self) -> &str {
        if self.last.is_empty() {
            &self.first
        } else {
            &self.last
        }
    }

    fn set_given(&mut self, words: &[&str]) {
        if let Some((first, middle)) = words.split_first() {
            self.first = (*first).to_owned();
            self.middle = middle.join(" ");
        }
    }

    /// Set the `von` part and last name from the words of the last name.
    fn set_last(&mut self, words: &[&str]) {
        let prefix_len = words[..words.len().saturating_sub(1)]
            .iter()
            .take_while(|word| is_lowercase_word(word))
            .count();
        self.prefix = words[..prefix_len].join(" ");
        self.last = words[prefix_len..].join(" ");
    }
}

/// `First von Last`.
fn first_von_last(text: &str) -> Name {
    let mut words = split_words(text);
    let mut name = Name::default();
    let Some(last) = words.pop() else {
        return name;
    };
    if words.is_empty() {
        // a single name, such as `Aristotle`
        name.first = last.to_owned();
        return name;
    }

    // the von part starts at the rightmost run of lowercase words before the last name
    let mut von = words.len();
    if words.len() > 1 {
        if let Some(end) = words.iter().rposition(|word| is_lowercase_word(word)) {
            von = end;
            while von > 0 && is_lowercase_word(words[von - 1]) {
                von -= 1;
            }
        }
    }

    let mut last_words = words.split_off(von);
    last_words.push(last);
    name.set_given(&words);
    name.set_last(&last_words);
    name
}

/// Written in place of an empty part of a comma form.
const EMPTY_PART: &str = "{}";

fn comma_part(part: &str) -> &str {
    if part == EMPTY_PART { "" } else { part }
}

/// `von Last, Jr, First`, where the generation may be empty.
fn last_first(last: &str, generation: &str, first: &str) -> Name {
    let (last, generation, first) = (comma_part(last), comma_part(generation), comma_part(first));
    let mut name = Name::default();
    name.set_given(&split_words(first));
    name.set_last(&split_words(last));
    name.generation = split_words(generation).join(" ");
    name
}

/// `family=Last, given=First, prefix=von, suffix=Jr`. Unknown keys are ignored, but at least
/// one key must be known.
///
/// The prefix and family words are split with the same `von` rule as the comma forms.
fn key_value(parts: &[&str]) -> Option<Name> {
    let mut name = Name::default();
    let mut prefix = Vec::new();
    let mut family = Vec::new();
    let mut known = false;
    for part in parts {
        let (key, value) = part.split_once('=')?;
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
            return None;
        }
        let words = split_words(strip_braces(value.trim()));
        match key.to_ascii_lowercase().as_str() {
            "given" => name.set_given(&words),
            "family" => family = words,
            "prefix" => prefix = words,
            "suffix" => name.generation = words.join(" "),
            _ => continue,
        }
        known = true;
    }
    if !known {
        return None;
    }
    prefix.extend(family);
    name.set_last(&prefix);
    Some(name)
}

/// Split a single name into its parts.
///
/// ```
/// use bibdb::names::tokenize_name;
///
/// let name = tokenize_name("Willard van Orman Quine").unwrap();
/// assert_eq!(name.first, "Willard");
/// assert_eq!(name.prefix, "van");
/// assert_eq!(name.last, "Orman Quine");
///
/// assert!(tokenize_name("a, b, c, d").is_err());
/// ```
pub fn tokenize_name(text: &str) -> Result<Name> {
    let parts = split_name_parts(text);
    if let Some(name) = key_value(&parts) {
        return Ok(name);
    }
    match parts[..] {
        [] => Ok(Name::default()),
        [whole] => Ok(first_von_last(whole)),
        [last, first] => Ok(last_first(last, "", first)),
        [last, generation, first] => Ok(last_first(last, generation, first)),
        _ => Err(Error::from(ErrorCode::InvalidName(text.trim().to_owned()))),
    }
}

/// Split a list of names separated by `conjunction` and decompose each name.
pub fn parse_names(text: &str, conjunction: &str) -> Result<Vec<Name>> {
    tokenize_list(text, conjunction)
        .into_iter()
        .map(tokenize_name)
        .collect()
}

/// Rewrite a list of names in the canonical form, joined by ` and `.
///
/// ```
/// use bibdb::names::normalize_name_list;
///
/// assert_eq!(
///     normalize_name_list("Simon~Coddlington and van Houten, James", "and").unwrap(),
///     "Coddlington, Simon and van Houten, James"
/// );
/// ```
pub fn normalize_name_list(text: &str, conjunction: &str) -> Result<String> {
    let names = parse_names(text, conjunction)?;
    Ok(names
        .iter()
        .map(Name::to_string)
        .collect::<Vec<_>>()
        .join(" and "))
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        tokenize_name(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let given = join_nonempty(&self.first, &self.middle);
        let surname = join_nonempty(&self.prefix, &self.last);
        if surname.is_empty() && self.generation.is_empty() {
            // more than one word would be read back as `First Last`
            if self.middle.is_empty() {
                return f.write_str(&given);
            }
            return write!(f, "{EMPTY_PART}, {given}");
        }

        f.write_str(if surname.is_empty() { EMPTY_PART } else { &surname })?;
        if !self.generation.is_empty() {
            write!(f, ", {}", self.generation)?;
        }
        if !given.is_empty() {
            write!(f, ", {given}")
        } else if !self.generation.is_empty() || first_von_last(&surname) != *self {
            write!(f, ", {EMPTY_PART}")
        } else {
            Ok(())
        }
    }
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (_, true) => a.to_owned(),
        (true, false) => b.to_owned(),
        (false, false) => format!("{a} {b}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn name(first: &str, middle: &str, prefix: &str, last: &str, generation: &str) -> Name {
        Name {
            first: first.into(),
            middle: middle.into(),
            prefix: prefix.into(),
            last: last.into(),
            generation: generation.into(),
        }
    }

    fn assert_tokenizes(text: &str, expected: Name) {
        assert_eq!(tokenize_name(text).unwrap(), expected, "{text}");
    }

    #[test]
    fn test_simple() {
        let simon = name("Simon", "", "", "Coddlington", "");
        assert_tokenizes("Coddlington, Simon", simon.clone());
        assert_tokenizes("Coddlington,~Simon", simon.clone());
        assert_tokenizes("Simon Coddlington", simon.clone());
        assert_tokenizes("Simon~Coddlington", simon);
    }

    #[test]
    fn test_middle_names() {
        let simon = name("Simon", "P.", "", "Coddlington", "");
        assert_tokenizes("Coddlington, Simon P.", simon.clone());
        assert_tokenizes("Simon P. Coddlington", simon.clone());
        assert_tokenizes("Coddlington, Simon~P.", simon);
        assert_tokenizes(
            "Quine, Willard van Orman",
            name("Willard", "van Orman", "", "Quine", ""),
        );
        assert_tokenizes(
            "Willard van Orman Quine",
            name("Willard", "", "van", "Orman Quine", ""),
        );
    }

    #[test]
    fn test_single_name() {
        assert_tokenizes("Augustine", name("Augustine", "", "", "", ""));
        assert_tokenizes(
            "{Robert and Sons, Inc.}",
            name("{Robert and Sons, Inc.}", "", "", "", ""),
        );
        assert_tokenizes("", Name::default());
        assert_tokenizes("  ", Name::default());
    }

    #[test]
    fn test_generation() {
        assert_tokenizes(
            "Jones, Jr, James Earl",
            name("James", "Earl", "", "Jones", "Jr"),
        );
        assert_tokenizes(
            "Almodóvar Caballero, III, Pedro",
            name("Pedro", "", "", "Almodóvar Caballero", "III"),
        );
    }

    #[test]
    fn test_hyphenated() {
        assert_tokenizes("Sartre, Jean-Paul", name("Jean-Paul", "", "", "Sartre", ""));
        assert_tokenizes(
            "Jean Charles-Gabriel",
            name("Jean", "", "", "Charles-Gabriel", ""),
        );
    }

    #[test]
    fn test_prefixes() {
        let houten = name("James", "", "van", "Houten", "");
        assert_tokenizes("van Houten, James", houten.clone());
        assert_tokenizes("James van Houten", houten);

        let rissen = name("Gloria", "", "van auf der", "Rissen", "");
        assert_tokenizes("van auf der Rissen, Gloria", rissen.clone());
        assert_tokenizes("Gloria van auf der Rissen", rissen);

        assert_tokenizes(
            "von Berlichingen zu Hornberg, Johann Gottfried",
            name("Johann", "Gottfried", "von", "Berlichingen zu Hornberg", ""),
        );
        // the final word is never part of the prefix
        assert_tokenizes("van der, Jan", name("Jan", "", "van", "der", ""));
        assert_tokenizes("van der Berg", name("", "", "van der", "Berg", ""));
    }

    #[test]
    fn test_compound_names() {
        let pedro = name("Pedro", "", "", "{Almodóvar Caballero}", "");
        assert_tokenizes("Pedro {Almodóvar Caballero}", pedro.clone());
        assert_tokenizes("{Almodóvar Caballero}, Pedro", pedro);
        assert_tokenizes(
            "Almodóvar Caballero, Pedro",
            name("Pedro", "", "", "Almodóvar Caballero", ""),
        );
    }

    #[test]
    fn test_complex_names() {
        let poussin = name("Jean", "Charles Gabriel", "de la", "Vall{\\'e}e Poussin", "");
        assert_tokenizes(
            "de la Vall{\\'e}e~Poussin, Jean Charles~Gabriel",
            poussin.clone(),
        );
        assert_tokenizes("Jean Charles~Gabriel de la Vall{\\'e}e~Poussin", poussin);
        assert_tokenizes(
            "Jean Charles~Gabriel de la Vallée~Poussin",
            name("Jean", "Charles Gabriel", "de la", "Vallée Poussin", ""),
        );
        assert_tokenizes("T. Hobbes", name("T.", "", "", "Hobbes", ""));
    }

    #[test]
    fn test_key_value() {
        assert_tokenizes("given=T., family=Hobbes", name("T.", "", "", "Hobbes", ""));
        assert_tokenizes(
            "given=Hendrik D., family=Ettinger, prefix=van",
            name("Hendrik", "D.", "van", "Ettinger", ""),
        );
        assert_tokenizes(
            "family={Almodóvar Caballero}, given=Pedro, suffix=Jr, useprefix=true",
            name("Pedro", "", "", "Almodóvar Caballero", "Jr"),
        );
        assert_tokenizes("family=Smith, suffix=Jr", name("", "", "", "Smith", "Jr"));
        assert_tokenizes("family=de la Vega", name("", "", "de la", "Vega", ""));
        assert_tokenizes("given=Jan, prefix=van", name("Jan", "", "", "van", ""));
    }

    #[test]
    fn test_unknown_keys() {
        assert_tokenizes("Foo=Bar", name("Foo=Bar", "", "", "", ""));
        assert_tokenizes(
            "Smith=Jones, Anna",
            name("Anna", "", "", "Smith=Jones", ""),
        );
        assert_tokenizes("useprefix=true, given=Ada", name("Ada", "", "", "", ""));
    }

    #[test]
    fn test_empty_parts() {
        assert_tokenizes("Smith, Jr, {}", name("", "", "", "Smith", "Jr"));
        assert_tokenizes("{}, John Paul", name("John", "Paul", "", "", ""));
        assert_tokenizes("van Berg, {}", name("", "", "van", "Berg", ""));
        assert_tokenizes("{}, Jr, Ada", name("Ada", "", "", "", "Jr"));
    }

    #[test]
    fn test_too_many_parts() {
        let err = tokenize_name("a, b, c, d").unwrap_err();
        assert_eq!(err.code(), &ErrorCode::InvalidName("a, b, c, d".into()));
        assert!(tokenize_name("a, b, c, d, e").is_err());
        assert!("{a, b, c, d}".parse::<Name>().is_ok());
    }

    #[test]
    fn test_display() {
        let render = |s: &str| s.parse::<Name>().unwrap().to_string();
        assert_eq!(render("Simon~Coddlington"), "Coddlington, Simon");
        assert_eq!(render("Jean-Paul Sartre"), "Sartre, Jean-Paul");
        assert_eq!(render("Gloria van auf der Rissen"), "van auf der Rissen, Gloria");
        assert_eq!(
            render("de la Vall{\\'e}e~Poussin, Jean Charles~Gabriel"),
            "de la Vall{\\'e}e Poussin, Jean Charles Gabriel"
        );
        assert_eq!(render("Jones, Jr, James Earl"), "Jones, Jr, James Earl");
        assert_eq!(render("Augustine"), "Augustine");
        assert_eq!(render("van der Berg"), "van der Berg");
        assert_eq!(render("given={John Paul}"), "{}, John Paul");
        assert_eq!(render("given=Ada"), "Ada");
        assert_eq!(render("family=Smith, suffix=Jr"), "Smith, Jr, {}");
        assert_eq!(render("prefix=van, family=Berg"), "van Berg, {}");
        assert_eq!(render("family=Smith"), "Smith, {}");
        assert_eq!(render("Smith, Jr, {}"), "Smith, Jr, {}");
    }

    #[test]
    fn test_key_value_rendering() {
        for text in [
            "family=Smith, suffix=Jr",
            "prefix=van, family=Berg",
            "family=Smith",
            "given={John Paul}",
            "suffix=III",
            "given=Jan, prefix=van",
            "family=de la Vega, given=Ana",
            "prefix=Van, family=Berg, given=Jan",
        ] {
            let name = tokenize_name(text).unwrap();
            assert_eq!(tokenize_name(&name.to_string()).unwrap(), name, "{text}");
        }
    }

    #[test]
    fn test_name_fields() {
        assert!(is_name_field("author"));
        assert!(is_name_field("Editor"));
        assert!(is_name_field("NAMEC"));
        assert!(!is_name_field("title"));
        assert!(!is_name_field("authors"));
    }

    #[test]
    fn test_name_lists() {
        let names = parse_names("Karl Marx and Friedrich Engels", "and").unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[1].last, "Engels");
        assert!(parse_names("a, b, c, d and Smith", "and").is_err());
        assert_eq!(normalize_name_list("", "and").unwrap(), "");
        assert_eq!(
            normalize_name_list("Brand, Stewart and Ola Landers", "and").unwrap(),
            "Brand, Stewart and Landers, Ola"
        );
    }

    proptest! {
        #[test]
        fn no_panic(s in "\\PC*") {
            let _ = tokenize_name(&s);
        }

        #[test]
        fn rendering_is_idempotent(s in "([A-Za-z]{1,6}|[a-z]{1,4}|\\{[A-Za-z ]{1,8}\\})([ ~]([A-Za-z]{1,6}|[a-z]{1,4}|\\{[A-Za-z ]{1,8}\\})){0,4}(, ?[A-Za-z ]{1,10}){0,2}") {
            let name = tokenize_name(&s).unwrap();
            prop_assert_eq!(tokenize_name(&name.to_string()).unwrap(), name);
        }

        #[test]
        fn key_value_rendering_is_idempotent(
            parts in proptest::sample::subsequence(
                vec!["given", "family", "prefix", "suffix", "useprefix"], 1..=5,
            ),
            values in proptest::collection::vec("[A-Za-z]{1,6}( [a-z]{1,4})?( [A-Z][a-z]{0,5})?", 5),
        ) {
            let text = parts
                .iter()
                .zip(&values)
                .map(|(key, value)| format!("{key}={{{value}}}"))
                .collect::<Vec<_>>()
                .join(", ");
            let name = tokenize_name(&text).unwrap();
            prop_assert_eq!(tokenize_name(&name.to_string()).unwrap(), name);
        }
    }
}
