//! Case- and space-insensitive containers.
//!
//! TM1 treats `North America`, `northamerica` and `NORTH AMERICA` as the same
//! name. These containers compare keys the same way: lower-cased, with all
//! whitespace removed. Iteration yields entries in insertion order, using the
//! spelling of the most recent insert.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Folds a name to the form TM1 uses for comparisons.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_tuple<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| normalize_name(n.as_ref())).collect()
}

/// A map keyed by names, compared case- and space-insensitively.
#[derive(Clone)]
pub struct CaseAndSpaceInsensitiveMap<V> {
    entries: HashMap<String, (String, V)>,
    order: Vec<String>,
}

impl<V> CaseAndSpaceInsensitiveMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Inserts `value` under `key`, returning the previous value stored under
    /// an equivalent key.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let folded = normalize_name(&key);
        match self.entries.insert(folded.clone(), (key, value)) {
            Some((_, previous)) => Some(previous),
            None => {
                self.order.push(folded);
                None
            }
        }
    }

    /// Looks up the value stored under an equivalent key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(&normalize_name(key)).map(|(_, v)| v)
    }

    /// Mutable lookup under an equivalent key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(&normalize_name(key)).map(|(_, v)| v)
    }

    /// Returns `true` if an equivalent key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_name(key))
    }

    /// Removes the entry stored under an equivalent key.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let folded = normalize_name(key);
        let (_, value) = self.entries.remove(&folded)?;
        self.order.retain(|k| *k != folded);
        Some(value)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.order.iter().filter_map(move |folded| {
            self.entries
                .get(folded)
                .map(|(key, value)| (key.as_str(), value))
        })
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<V> Default for CaseAndSpaceInsensitiveMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for CaseAndSpaceInsensitiveMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: PartialEq> PartialEq for CaseAndSpaceInsensitiveMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(folded, (_, v))| other.entries.get(folded).is_some_and(|(_, o)| o == v))
    }
}

impl<V: Eq> Eq for CaseAndSpaceInsensitiveMap<V> {}

impl<K: Into<String>, V> FromIterator<(K, V)> for CaseAndSpaceInsensitiveMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for CaseAndSpaceInsensitiveMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<V> IntoIterator for CaseAndSpaceInsensitiveMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(mut self) -> Self::IntoIter {
        let entries: Vec<_> = self
            .order
            .iter()
            .filter_map(|folded| self.entries.remove(folded))
            .collect();
        entries.into_iter()
    }
}

impl<V: Serialize> Serialize for CaseAndSpaceInsensitiveMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A set of names, compared case- and space-insensitively.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CaseAndSpaceInsensitiveSet {
    inner: CaseAndSpaceInsensitiveMap<()>,
}

impl CaseAndSpaceInsensitiveSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value`; returns `false` if an equivalent name was already present.
    ///
    /// Re-inserting an equivalent name replaces the stored spelling.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.inner.insert(value, ()).is_none()
    }

    /// Returns `true` if an equivalent name is present.
    pub fn contains(&self, value: &str) -> bool {
        self.inner.contains_key(value)
    }

    /// Removes an equivalent name.
    pub fn remove(&mut self, value: &str) -> bool {
        self.inner.remove(value).is_some()
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over names in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.keys()
    }
}

impl fmt::Debug for CaseAndSpaceInsensitiveSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<S: Into<String>> FromIterator<S> for CaseAndSpaceInsensitiveSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for CaseAndSpaceInsensitiveSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl IntoIterator for CaseAndSpaceInsensitiveSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        let names: Vec<_> = self.inner.into_iter().map(|(name, ())| name).collect();
        names.into_iter()
    }
}

impl Serialize for CaseAndSpaceInsensitiveSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for name in self.iter() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

/// A map keyed by tuples of names (e.g. the row members of an MDX result),
/// each position compared case- and space-insensitively.
#[derive(Clone)]
pub struct CaseAndSpaceInsensitiveTuplesMap<V> {
    entries: HashMap<Vec<String>, (Vec<String>, V)>,
    order: Vec<Vec<String>>,
}

impl<V> CaseAndSpaceInsensitiveTuplesMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Inserts `value` under the tuple `key`, returning the previous value
    /// stored under an equivalent tuple.
    pub fn insert(&mut self, key: Vec<String>, value: V) -> Option<V> {
        let folded = normalize_tuple(&key);
        match self.entries.insert(folded.clone(), (key, value)) {
            Some((_, previous)) => Some(previous),
            None => {
                self.order.push(folded);
                None
            }
        }
    }

    /// Looks up the value stored under an equivalent tuple.
    pub fn get<S: AsRef<str>>(&self, key: &[S]) -> Option<&V> {
        self.entries.get(&normalize_tuple(key)).map(|(_, v)| v)
    }

    /// Returns `true` if an equivalent tuple is present.
    pub fn contains_key<S: AsRef<str>>(&self, key: &[S]) -> bool {
        self.entries.contains_key(&normalize_tuple(key))
    }

    /// Removes the entry stored under an equivalent tuple.
    pub fn remove<S: AsRef<str>>(&mut self, key: &[S]) -> Option<V> {
        let folded = normalize_tuple(key);
        let (_, value) = self.entries.remove(&folded)?;
        self.order.retain(|k| *k != folded);
        Some(value)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over `(tuple, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&[String], &V)> + '_ {
        self.order.iter().filter_map(move |folded| {
            self.entries
                .get(folded)
                .map(|(key, value)| (key.as_slice(), value))
        })
    }
}

impl<V> Default for CaseAndSpaceInsensitiveTuplesMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for CaseAndSpaceInsensitiveTuplesMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: PartialEq> PartialEq for CaseAndSpaceInsensitiveTuplesMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(folded, (_, v))| other.entries.get(folded).is_some_and(|(_, o)| o == v))
    }
}

impl<V> FromIterator<(Vec<String>, V)> for CaseAndSpaceInsensitiveTuplesMap<V> {
    fn from_iter<I: IntoIterator<Item = (Vec<String>, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V> IntoIterator for CaseAndSpaceInsensitiveTuplesMap<V> {
    type Item = (Vec<String>, V);
    type IntoIter = std::vec::IntoIter<(Vec<String>, V)>;

    fn into_iter(mut self) -> Self::IntoIter {
        let entries: Vec<_> = self
            .order
            .iter()
            .filter_map(|folded| self.entries.remove(folded))
            .collect();
        entries.into_iter()
    }
}

/// Serialized as a map whose keys are the tuple members joined with `, `.
impl<V: Serialize> Serialize for CaseAndSpaceInsensitiveTuplesMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(&k.join(", "), v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("North America"), "northamerica");
        assert_eq!(normalize_name(" NORTH\tAmerica "), "northamerica");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_map_lookup_ignores_case_and_spaces() {
        let mut map = CaseAndSpaceInsensitiveMap::new();
        assert_eq!(map.insert("North America", 1), None);
        assert_eq!(map.get("northamerica"), Some(&1));
        assert_eq!(map.get("NORTH AMERICA"), Some(&1));
        assert!(map.contains_key("North  America"));
        assert!(!map.contains_key("South America"));
    }

    #[test]
    fn test_map_reinsert_replaces_value_and_spelling() {
        let mut map = CaseAndSpaceInsensitiveMap::new();
        map.insert("Europe", 1);
        map.insert("Asia", 2);
        assert_eq!(map.insert("EUROPE", 3), Some(1));

        assert_eq!(map.len(), 2);
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("EUROPE", &3), ("Asia", &2)]);
    }

    #[test]
    fn test_map_remove_keeps_order() {
        let mut map: CaseAndSpaceInsensitiveMap<i32> =
            [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(map.remove("B"), Some(2));
        assert_eq!(map.remove("b"), None);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(
            map.into_iter().collect::<Vec<_>>(),
            vec![("a".to_string(), 1), ("c".to_string(), 3)]
        );
    }

    #[test]
    fn test_map_equality_uses_folded_keys() {
        let left: CaseAndSpaceInsensitiveMap<i32> =
            [("Total Year", 1), ("Q1", 2)].into_iter().collect();
        let right: CaseAndSpaceInsensitiveMap<i32> =
            [("q1", 2), ("totalyear", 1)].into_iter().collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_map_serializes_original_keys() {
        let map: CaseAndSpaceInsensitiveMap<&str> =
            [("Total Year", "Consolidated"), ("Jan", "Numeric")]
                .into_iter()
                .collect();
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"Total Year":"Consolidated","Jan":"Numeric"}"#
        );
    }

    #[test]
    fn test_set_semantics() {
        let mut set = CaseAndSpaceInsensitiveSet::new();
        assert!(set.insert("United States"));
        assert!(!set.insert("unitedstates"));
        assert!(set.insert("US"));
        assert_eq!(set.len(), 2);
        assert!(set.contains("UNITED STATES"));
        assert!(set.remove("us"));
        assert!(!set.contains("US"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["unitedstates"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["unitedstates"]"#);
    }

    #[test]
    fn test_tuples_map() {
        let mut map = CaseAndSpaceInsensitiveTuplesMap::new();
        map.insert(vec!["Region".to_string(), "North America".to_string()], 10);
        map.insert(vec!["Region".to_string(), "Europe".to_string()], 20);

        assert_eq!(map.get(&["region", "NORTHAMERICA"]), Some(&10));
        assert!(map.contains_key(&["Region", "europe"]));
        assert!(!map.contains_key(&["Europe"]));
        assert_eq!(map.remove(&["REGION", "EUROPE"]), Some(20));
        assert_eq!(map.len(), 1);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"Region, North America":10}"#
        );
    }
}
