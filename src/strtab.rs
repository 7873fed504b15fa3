//! The one associative container this crate has: a `HashMap` keyed on a
//! normalized spelling, used for reserved words, the symbol table, and macro
//! parameter maps. Normalization upper-cases ASCII unless case-sensitive
//! mode is active; the contract for non-ASCII bytes is explicitly left
//! unspecified by the original implementation, and this port preserves that
//! — they pass through `to_uppercase()` untouched unless Unicode defines an
//! uppercase mapping for them, which is whatever `char::to_uppercase` does.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Normalizes `name` per the table's case-sensitivity setting, retaining the
/// original spelling when `case_sensitive` is true.
pub fn normalize(name: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        name.to_owned()
    } else {
        name.to_uppercase()
    }
}

/// A string-keyed table whose lookup key is normalized on insert and on
/// query, but whose original spelling is retained alongside the value for
/// reporting (see [`StrTable::original_spelling`]).
#[derive(Debug)]
pub struct StrTable<V> {
    case_sensitive: bool,
    map: HashMap<String, (String, V)>,
}

impl<V> StrTable<V> {
    pub fn new(case_sensitive: bool) -> Self {
        StrTable { case_sensitive, map: HashMap::new() }
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn key(&self, name: &str) -> String {
        normalize(name, self.case_sensitive)
    }

    pub fn insert(&mut self, name: &str, value: V) -> Option<V> {
        let key = self.key(name);
        self.map.insert(key, (name.to_owned(), value)).map(|(_, v)| v)
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.map.get(&self.key(name)).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        let key = self.key(name);
        self.map.get_mut(&key).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&self.key(name))
    }

    pub fn original_spelling(&self, name: &str) -> Option<&str> {
        self.map.get(&self.key(name)).map(|(orig, _)| orig.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.map.remove(&self.key(name)).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.map.values().map(|(orig, v)| (orig.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Looks a borrowed key up in a plain `HashMap` without allocating a new
/// `String` for the normalized form, for call sites that already have one.
pub fn get_normalized<'a, V, Q>(map: &'a HashMap<String, V>, key: &Q) -> Option<&'a V>
where
    String: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
{
    map.get(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_lookup() {
        let mut t = StrTable::new(false);
        t.insert("Foo", 1);
        assert_eq!(t.get("FOO"), Some(&1));
        assert_eq!(t.get("foo"), Some(&1));
        assert_eq!(t.original_spelling("foo"), Some("Foo"));
    }

    #[test]
    fn case_sensitive_lookup() {
        let mut t = StrTable::new(true);
        t.insert("Foo", 1);
        assert_eq!(t.get("FOO"), None);
        assert_eq!(t.get("Foo"), Some(&1));
    }
}
