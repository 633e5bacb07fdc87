//! An insertion-ordered map with case-insensitive string keys.
use indexmap::{Equivalent, IndexMap, map::Entry};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use unicase::UniCase;

/// A borrowed lookup key, so that queries do not need to allocate.
#[derive(Hash)]
struct CaseKey<'a>(UniCase<&'a str>);

impl Equivalent<UniCase<String>> for CaseKey<'_> {
    fn equivalent(&self, key: &UniCase<String>) -> bool {
        self.0 == *key
    }
}

fn lookup(key: &str) -> CaseKey<'_> {
    CaseKey(UniCase::new(key))
}

/// A map from case-insensitive keys to values, iterated in insertion order.
///
/// Keys retain the spelling with which they were first inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseMap<V> {
    map: IndexMap<UniCase<String>, V>,
}

impl<V> Default for CaseMap<V> {
    fn default() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }
}

impl<V> CaseMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.map.get(&lookup(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.map.get_mut(&lookup(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(&lookup(key))
    }

    /// Insert a value, returning the previous value if the key was already present. An existing
    /// key keeps both its position and its original spelling.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.map.insert(UniCase::new(key.into()), value)
    }

    /// Insert a value only if the key is not yet present. Returns whether the value was
    /// inserted.
    pub fn insert_new(&mut self, key: impl Into<String>, value: V) -> bool {
        match self.map.entry(UniCase::new(key.into())) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                true
            }
        }
    }

    /// Remove a key, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.map.shift_remove(&lookup(key))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &V)> + ExactSizeIterator {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.map.keys().map(|k| k.as_str())
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.map.values()
    }
}

impl<V: Serialize> Serialize for CaseMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

struct CaseMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for CaseMapVisitor<V> {
    type Value = CaseMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut map = CaseMap::new();

        while let Some((key, value)) = access.next_entry::<String, V>()? {
            map.insert(key, value);
        }

        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for CaseMap<V> {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CaseMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        let mut map = CaseMap::new();
        assert_eq!(map.insert("Title", 1), None);
        assert_eq!(map.get("title"), Some(&1));
        assert_eq!(map.get("TITLE"), Some(&1));
        assert!(map.contains_key("tItLe"));
        assert_eq!(map.get("author"), None);
        assert_eq!(map.get("Straße"), None);
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut map = CaseMap::new();
        map.insert("a", 1);
        map.insert("B", 2);
        map.insert("c", 3);
        assert_eq!(map.insert("b", 20), Some(2));
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            [("a", &1), ("B", &20), ("c", &3)]
        );
    }

    #[test]
    fn test_insert_new() {
        let mut map = CaseMap::new();
        assert!(map.insert_new("Key", "first"));
        assert!(!map.insert_new("KEY", "second"));
        assert_eq!(map.get("key"), Some(&"first"));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["Key"]);
    }

    #[test]
    fn test_remove() {
        let mut map = CaseMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("c", 3);
        assert_eq!(map.remove("A"), Some(1));
        assert_eq!(map.remove("a"), None);
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_unicode_keys() {
        let mut map = CaseMap::new();
        map.insert("Émile", 1);
        assert_eq!(map.get("émile"), Some(&1));
    }

    #[test]
    fn test_serde() {
        let mut map = CaseMap::new();
        map.insert("Zeta", 1);
        map.insert("alpha", 2);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Zeta":1,"alpha":2}"#);

        let back: CaseMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), ["Zeta", "alpha"]);
        assert_eq!(back.get("ZETA"), Some(&1));
    }
}
