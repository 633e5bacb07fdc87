use serde::{Deserialize, Serialize};

use crate::keys::CaseMap;

/// The built-in month macros, `jan` through `dec`.
pub const MONTH_MACROS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// A case-insensitive table of `@string` macros and their expansions.
///
/// Expansions are stored fully resolved: a macro which refers to another macro is expanded at
/// the point of definition.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroDictionary {
    map: CaseMap<String>,
}

impl MacroDictionary {
    /// A dictionary containing only the [month macros](MONTH_MACROS).
    pub fn with_months() -> Self {
        let mut macros = Self::default();
        macros.set_month_macros();
        macros
    }

    /// Set "month macros", such as `@string{apr = {April}}`, overwriting existing definitions.
    pub fn set_month_macros(&mut self) {
        for (name, expansion) in MONTH_MACROS {
            self.insert(name, expansion);
        }
    }

    /// Define a macro, returning the previous expansion if it was already defined.
    pub fn insert(&mut self, name: impl Into<String>, expansion: impl Into<String>) -> Option<String> {
        self.map.insert(name, expansion.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.map.remove(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over the definitions in the order in which they were first defined.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k, v.as_str()))
    }
}
