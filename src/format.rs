//! Presentation of entries for citation pickers and similar consumers.
use tracing::error;

use crate::database::EntryRef;
use crate::error::Result;
use crate::names::{Name, is_name_field, tokenize_name};
use crate::tex::tokenize_list;

/// Remove LaTeX commands and braces, keeping the text they enclose.
///
/// A command name runs up to the next brace or whitespace, and is dropped together with the
/// whitespace ending it. A control symbol such as the accent `\'` is dropped on its own.
///
/// ```
/// use bibdb::format::remove_latex_commands;
///
/// assert_eq!(remove_latex_commands("The \\emph{Critique} of {Pure} Reason"), "The Critique of Pure Reason");
/// assert_eq!(remove_latex_commands("Vall{\\'e}e \\LaTeX\\ Companion"), "Vallee Companion");
/// ```
pub fn remove_latex_commands(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' | '}' => {}
            '\\' => {
                if chars.next().is_some_and(char::is_alphabetic) {
                    while chars
                        .next_if(|&c| c != '{' && c != '}' && !c.is_whitespace())
                        .is_some()
                    {}
                    chars.next_if(|c| c.is_whitespace());
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Every name, rendered in full and joined by ` and `.
pub fn people_long(people: &[Name]) -> String {
    people
        .iter()
        .map(Name::to_string)
        .collect::<Vec<_>>()
        .join(" and ")
}

/// The surnames of one or two people joined by ` & `, or the first surname followed by
/// `, et al.` for more.
pub fn people_short(people: &[Name]) -> String {
    match people {
        [] | [_] | [_, _] => people
            .iter()
            .map(Name::last_or_first)
            .collect::<Vec<_>>()
            .join(" & "),
        [first, ..] => format!("{}, et al.", first.last_or_first()),
    }
}

/// An entry whose fields are looked up formatted for display.
#[derive(Debug, Clone, Copy)]
pub struct FormattedEntry<'db> {
    entry: EntryRef<'db>,
    conjunction: &'db str,
}

impl<'db> FormattedEntry<'db> {
    pub fn new(entry: EntryRef<'db>) -> Self {
        Self {
            entry,
            conjunction: "and",
        }
    }

    /// Split name lists at `conjunction` instead of `and`.
    pub fn with_conjunction(mut self, conjunction: &'db str) -> Self {
        self.conjunction = conjunction;
        self
    }

    pub fn entry(&self) -> EntryRef<'db> {
        self.entry
    }

    /// Look up the formatted value of `key`.
    ///
    /// `keyword` and `citekey` give the cite key. A name field gives the full names, or the short
    /// form when the key ends in `_short` (as in `author_short`). Names which cannot be read are
    /// skipped. Any other key is looked up with crossref fallback. LaTeX commands are removed
    /// from the result.
    pub fn get(&self, key: &str) -> Result<String> {
        if key.is_empty() {
            return Ok(String::new());
        }
        let key = key.to_lowercase();
        let (field, short) = match key.strip_suffix("_short") {
            Some(field) => (field, true),
            None => (key.as_str(), false),
        };

        if field == "keyword" || field == "citekey" {
            return Ok(self.entry.cite_key().to_owned());
        }

        let value = self.entry.get(field)?;
        if is_name_field(field) {
            let people = self.people(field, value);
            if people.is_empty() {
                return Ok(String::new());
            }
            let rendered = if short {
                people_short(&people)
            } else {
                people_long(&people)
            };
            return Ok(remove_latex_commands(&rendered));
        }
        Ok(remove_latex_commands(value))
    }

    fn people(&self, field: &str, value: &str) -> Vec<Name> {
        tokenize_list(value, self.conjunction)
            .into_iter()
            .filter_map(|text| match tokenize_name(text) {
                Ok(name) => Some(name),
                Err(err) => {
                    error!(
                        "Error handling field \"{}\" with value \"{}\": {}",
                        field, text, err
                    );
                    None
                }
            })
            .collect()
    }
}

impl<'db> From<EntryRef<'db>> for FormattedEntry<'db> {
    fn from(entry: EntryRef<'db>) -> Self {
        Self::new(entry)
    }
}
