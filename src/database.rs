//! The queryable bibliography: [`Database`], [`Entry`] and the crossref-aware [`EntryRef`].
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ast::Value;
use crate::error::{Error, ErrorCode, Result};
use crate::keys::CaseMap;
use crate::macros::{MONTH_MACROS, MacroDictionary};

/// A single bibliography entry.
///
/// The entry type is stored in lowercase, while the citation key keeps its original spelling.
/// Field names are case-insensitive and iterated in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(deserialize_with = "lowercase")]
    entry_type: String,
    cite_key: String,
    fields: CaseMap<String>,
}

fn lowercase<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.to_lowercase())
}

impl Entry {
    pub fn new(entry_type: impl Into<String>, cite_key: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into().to_lowercase(),
            cite_key: cite_key.into(),
            fields: CaseMap::new(),
        }
    }

    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    pub fn cite_key(&self) -> &str {
        &self.cite_key
    }

    /// Look up a field of this entry only. See [`EntryRef::get`] for a lookup which follows
    /// `crossref`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Set a field, returning the previous value. Overwriting a field does not change its
    /// position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(field, value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    /// Iterate over `(field, value)` pairs in insertion order.
    pub fn fields(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> + ExactSizeIterator {
        self.fields.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Write `text` as a field value, preferring braces.
fn write_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    write!(f, "{}", Value::Quoted(Cow::Borrowed(text)))
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@{}{{{},", self.entry_type, self.cite_key)?;
        for (field, value) in self.fields() {
            write!(f, "  {field} = ")?;
            write_text(f, value)?;
            writeln!(f, ",")?;
        }
        f.write_str("}")
    }
}

/// An ordered, case-insensitive collection of entries together with the macros and preambles
/// of a bibliography.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    entries: CaseMap<Entry>,
    macros: MacroDictionary,
    preambles: Vec<String>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// An empty database whose macro table contains the month macros.
    pub fn new() -> Self {
        Self::with_macros(MacroDictionary::with_months())
    }

    pub fn with_macros(macros: MacroDictionary) -> Self {
        Self {
            entries: CaseMap::new(),
            macros,
            preambles: Vec::new(),
        }
    }

    /// Add an entry, unless an entry with the same citation key is already present. Returns
    /// whether the entry was added.
    pub fn add_entry(&mut self, entry: Entry) -> bool {
        let key = entry.cite_key.clone();
        self.entries.insert_new(key, entry)
    }

    /// Remove an entry, preserving the order of the remaining entries.
    pub fn remove(&mut self, cite_key: &str) -> Option<Entry> {
        self.entries.remove(cite_key)
    }

    /// Define a macro, returning the previous expansion if it was already defined.
    pub fn add_macro(&mut self, name: impl Into<String>, expansion: impl Into<String>) -> Option<String> {
        self.macros.insert(name, expansion)
    }

    pub fn get_macro(&self, name: &str) -> Result<&str> {
        self.macros
            .get(name)
            .ok_or_else(|| Error::lookup(ErrorCode::MissingMacro(name.to_owned())))
    }

    pub fn macros(&self) -> &MacroDictionary {
        &self.macros
    }

    pub fn add_preamble(&mut self, text: impl Into<String>) {
        self.preambles.push(text.into());
    }

    /// The preambles, concatenated.
    pub fn preamble(&self) -> String {
        self.preambles.concat()
    }

    pub fn preambles(&self) -> &[String] {
        &self.preambles
    }

    pub fn get(&self, cite_key: &str) -> Option<EntryRef<'_>> {
        self.entries.get(cite_key).map(|entry| EntryRef {
            entry,
            database: self,
        })
    }

    /// Like [`Database::get`], but a missing entry is an error.
    pub fn entry(&self, cite_key: &str) -> Result<EntryRef<'_>> {
        self.get(cite_key)
            .ok_or_else(|| Error::lookup(ErrorCode::MissingEntry(cite_key.to_owned())))
    }

    /// The entries for the requested keys, in the requested order. Keys without an entry are
    /// skipped.
    pub fn get_entries<I, K>(&self, cite_keys: I) -> Vec<EntryRef<'_>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        cite_keys
            .into_iter()
            .filter_map(|key| self.get(key.as_ref()))
            .collect()
    }

    pub fn contains_key(&self, cite_key: &str) -> bool {
        self.entries.contains_key(cite_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in the order in which they were added.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = EntryRef<'_>> + ExactSizeIterator {
        self.entries.values().map(|entry| EntryRef {
            entry,
            database: self,
        })
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.keys()
    }
}

impl<'db> IntoIterator for &'db Database {
    type Item = EntryRef<'db>;
    type IntoIter = Box<dyn Iterator<Item = EntryRef<'db>> + 'db>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for preamble in &self.preambles {
            f.write_str("@preamble{ ")?;
            write_text(f, preamble)?;
            f.write_str(" }\n")?;
        }
        for (name, expansion) in self.macros.iter() {
            if MONTH_MACROS.iter().any(|&(n, e)| n == name && e == expansion) {
                continue;
            }
            write!(f, "@string{{{name} = ")?;
            write_text(f, expansion)?;
            f.write_str("}\n")?;
        }
        for entry in self.entries.values() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    preambles: &'a [String],
    macros: &'a MacroDictionary,
    entries: Vec<&'a Entry>,
}

#[derive(Deserialize)]
struct Snapshot {
    preambles: Vec<String>,
    macros: MacroDictionary,
    entries: Vec<Entry>,
}

impl Serialize for Database {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        SnapshotRef {
            preambles: &self.preambles,
            macros: &self.macros,
            entries: self.entries.values().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Database {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let snapshot = Snapshot::deserialize(deserializer)?;
        let mut database = Database::with_macros(snapshot.macros);
        database.preambles = snapshot.preambles;
        for entry in snapshot.entries {
            database.add_entry(entry);
        }
        Ok(database)
    }
}

/// An entry together with the database which contains it.
///
/// Field lookups through this handle fall back to the entry named by the `crossref` field.
#[derive(Debug, Clone, Copy)]
pub struct EntryRef<'db> {
    entry: &'db Entry,
    database: &'db Database,
}

impl<'db> EntryRef<'db> {
    pub fn entry(&self) -> &'db Entry {
        self.entry
    }

    pub fn database(&self) -> &'db Database {
        self.database
    }

    /// Look up a field, following the chain of `crossref` fields for as long as the field is
    /// missing. The `crossref` field itself is never inherited.
    ///
    /// ```
    /// let db = bibdb::parse(
    ///     "@book{base, title = {T}, year = 2001}
    ///      @inbook{child, crossref = {base}, year = 2002}",
    /// )
    /// .unwrap();
    /// let child = db.entry("child").unwrap();
    /// assert_eq!(child.get("title").unwrap(), "T");
    /// assert_eq!(child.get("year").unwrap(), "2002");
    /// assert!(child.get("publisher").is_err());
    /// ```
    pub fn get(&self, field: &str) -> Result<&'db str> {
        let mut visited = vec![self.entry];
        let mut current = *self;
        loop {
            if let Some(value) = current.entry.get(field) {
                return Ok(value);
            }
            if field.eq_ignore_ascii_case("crossref") {
                break;
            }
            let Some(parent) = current.crossref() else {
                break;
            };
            if visited.iter().any(|seen| std::ptr::eq(*seen, parent.entry)) {
                break;
            }
            visited.push(parent.entry);
            current = parent;
        }
        Err(Error::lookup(ErrorCode::MissingField(field.to_owned())))
    }

    /// The entry named by the `crossref` field, if the field is set and names an entry in the
    /// same database.
    pub fn crossref(&self) -> Option<EntryRef<'db>> {
        self.entry
            .get("crossref")
            .and_then(|key| self.database.get(key))
    }
}

impl Deref for EntryRef<'_> {
    type Target = Entry;

    fn deref(&self) -> &Entry {
        self.entry
    }
}

impl fmt::Display for EntryRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entry.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(key: &str, fields: &[(&str, &str)]) -> Entry {
        let mut entry = Entry::new("Book", key);
        for (field, value) in fields {
            entry.insert(*field, *value);
        }
        entry
    }

    #[test]
    fn test_entry() {
        let mut entry = book("Key", &[("Title", "T"), ("year", "2000")]);
        assert_eq!(entry.entry_type(), "book");
        assert_eq!(entry.cite_key(), "Key");
        assert_eq!(entry.get("TITLE"), Some("T"));
        assert_eq!(entry.insert("title", "U"), Some("T".into()));
        assert_eq!(entry.fields().collect::<Vec<_>>(), [("Title", "U"), ("year", "2000")]);
        assert_eq!(entry.remove("Year"), Some("2000".into()));
        assert_eq!(entry.len(), 1);
    }

    #[test]
    fn test_add_entry() {
        let mut db = Database::new();
        assert!(db.add_entry(book("k", &[("title", "A")])));
        assert!(!db.add_entry(book("K", &[("title", "B")])));
        assert_eq!(db.len(), 1);
        assert_eq!(db.get("k").unwrap().get("title").unwrap(), "A");
        assert_eq!(db.keys().collect::<Vec<_>>(), ["k"]);
    }

    #[test]
    fn test_lookups() {
        let db = Database::new();
        assert!(db.get("missing").is_none());
        assert!(matches!(
            db.entry("missing").unwrap_err().code(),
            ErrorCode::MissingEntry(_)
        ));
        assert_eq!(db.get_macro("OCT").unwrap(), "October");
        assert!(matches!(
            db.get_macro("undefined").unwrap_err().code(),
            ErrorCode::MissingMacro(_)
        ));
    }

    #[test]
    fn test_get_entries() {
        let mut db = Database::new();
        for key in ["a", "b", "c"] {
            db.add_entry(book(key, &[]));
        }
        let keys: Vec<_> = db
            .get_entries(["c", "missing", "A"])
            .iter()
            .map(|e| e.cite_key().to_owned())
            .collect();
        assert_eq!(keys, ["c", "a"]);
        assert!(db.get_entries(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_remove() {
        let mut db = Database::new();
        for key in ["a", "b", "c"] {
            db.add_entry(book(key, &[]));
        }
        assert_eq!(db.remove("B").map(|e| e.cite_key().to_owned()), Some("b".into()));
        assert_eq!(
            db.iter().map(|e| e.entry().cite_key()).collect::<Vec<_>>(),
            ["a", "c"]
        );
    }

    #[test]
    fn test_crossref() {
        let mut db = Database::new();
        db.add_entry(book("base", &[("title", "T"), ("publisher", "P")]));
        db.add_entry(book("middle", &[("crossref", "Base"), ("year", "1999")]));
        db.add_entry(book("child", &[("crossref", "middle"), ("title", "Own")]));

        let child = db.entry("child").unwrap();
        assert_eq!(child.get("title").unwrap(), "Own");
        assert_eq!(child.get("year").unwrap(), "1999");
        assert_eq!(child.get("Publisher").unwrap(), "P");
        assert_eq!(child.get("crossref").unwrap(), "middle");
        assert!(matches!(
            child.get("isbn").unwrap_err().code(),
            ErrorCode::MissingField(_)
        ));
        assert_eq!(child.crossref().unwrap().cite_key(), "middle");
        assert!(db.entry("base").unwrap().crossref().is_none());

        // the direct lookup never follows crossref
        assert_eq!(child.entry().get("year"), None);
    }

    #[test]
    fn test_crossref_missing_target() {
        let mut db = Database::new();
        db.add_entry(book("child", &[("crossref", "nowhere")]));
        let child = db.entry("child").unwrap();
        assert!(child.crossref().is_none());
        assert!(child.get("title").unwrap_err().is_lookup());
    }

    #[test]
    fn test_crossref_cycle() {
        let mut db = Database::new();
        db.add_entry(book("a", &[("crossref", "b")]));
        db.add_entry(book("b", &[("crossref", "A"), ("year", "2000")]));
        db.add_entry(book("self", &[("crossref", "self")]));

        assert_eq!(db.entry("a").unwrap().get("year").unwrap(), "2000");
        assert!(db.entry("a").unwrap().get("title").is_err());
        assert!(db.entry("self").unwrap().get("title").is_err());
    }

    #[test]
    fn test_preamble() {
        let mut db = Database::new();
        assert_eq!(db.preamble(), "");
        db.add_preamble("a");
        db.add_preamble("");
        db.add_preamble("b");
        assert_eq!(db.preamble(), "ab");
        assert_eq!(db.preambles().len(), 3);
    }

    #[test]
    fn test_display() {
        let mut db = Database::new();
        db.add_preamble("\\def\\x{y}");
        db.add_macro("pub", "MIT Press");
        db.add_entry(book("k", &[("title", "A {B}"), ("note", "open { brace")]));
        assert_eq!(
            db.to_string(),
            "@preamble{ {\\def\\x{y}} }\n\
             @string{pub = {MIT Press}}\n\
             @book{k,\n  title = {A {B}},\n  note = \"open { brace\",\n}\n"
        );
    }

    #[test]
    fn test_serde_snapshot() {
        let mut db = Database::new();
        db.add_preamble("p");
        db.add_macro("pub", "MIT Press");
        db.add_entry(book("Second", &[("title", "B")]));
        db.add_entry(book("first", &[("title", "A"), ("crossref", "second")]));

        let json = serde_json::to_string(&db).unwrap();
        let restored: Database = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, db);
        assert_eq!(restored.keys().collect::<Vec<_>>(), ["Second", "first"]);
        assert_eq!(restored.entry("FIRST").unwrap().get("title").unwrap(), "A");
        assert_eq!(restored.get_macro("PUB").unwrap(), "MIT Press");
    }

    #[test]
    fn test_serde_duplicate_entries() {
        let json = r#"{
            "preambles": [],
            "macros": {},
            "entries": [
                {"entry_type": "book", "cite_key": "k", "fields": {"title": "A"}},
                {"entry_type": "book", "cite_key": "K", "fields": {"title": "B"}}
            ]
        }"#;
        let db: Database = serde_json::from_str(json).unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.entry("k").unwrap().get("title").unwrap(), "A");
        assert!(db.macros().is_empty());
    }

    #[test]
    fn test_serde_entry_type_case() {
        let json = r#"{"entry_type": "InBook", "cite_key": "Key", "fields": {"Title": "A"}}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.get("title"), Some("A"));
        assert_eq!(entry.entry_type(), "inbook");
        assert_eq!(entry.cite_key(), "Key");
    }
}
