//! Ordered map type for TOML tables.
//!
//! This module provides [`Table`], a wrapper around [`IndexMap`] that keeps
//! its entries in ascending key order (lexicographic over UTF-8 bytes) at all
//! times. Iteration order is therefore deterministic and independent of
//! insertion order, which keeps serialized output stable.
//!
//! ## Examples
//!
//! ```rust
//! use tomlet::{Table, Value};
//!
//! let mut table = Table::new();
//! table.insert("zebra".to_string(), Value::from(1));
//! table.insert("apple".to_string(), Value::from(2));
//!
//! let keys: Vec<_> = table.keys().cloned().collect();
//! assert_eq!(keys, vec!["apple", "zebra"]);
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// A string-keyed map of TOML values, iterated in ascending key order.
///
/// Every mutation keeps the underlying [`IndexMap`] sorted, so `iter`,
/// `keys` and `values` always walk the map in key order.
///
/// # Examples
///
/// ```rust
/// use tomlet::{Table, Value};
///
/// let mut table = Table::new();
/// table.insert("port".to_string(), Value::from(8080));
/// table.insert("host".to_string(), Value::from("localhost"));
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.get("port").and_then(Value::as_integer), Some(8080));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table(IndexMap<String, Value>);

impl Table {
    /// Creates an empty `Table`.
    #[must_use]
    pub fn new() -> Self {
        Table(IndexMap::new())
    }

    /// Creates an empty `Table` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Table(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, keeping the map sorted by key.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the entry keeps its position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tomlet::{Table, Value};
    ///
    /// let mut table = Table::new();
    /// assert!(table.insert("key".to_string(), Value::from(1)).is_none());
    /// assert!(table.insert("key".to_string(), Value::from(2)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        match self.0.binary_search_by(|k, _| k.as_str().cmp(&key)) {
            Ok(index) => Some(std::mem::replace(&mut self.0[index], value)),
            Err(index) => {
                self.0.shift_insert(index, key, value);
                None
            }
        }
    }

    /// Returns the value bound to `key`, or the value produced by `default`
    /// after inserting it at its sorted position.
    pub(crate) fn get_or_insert_with(
        &mut self,
        key: &str,
        default: impl FnOnce() -> Value,
    ) -> &mut Value {
        let index = match self.0.binary_search_by(|k, _| k.as_str().cmp(key)) {
            Ok(index) => index,
            Err(index) => {
                self.0.shift_insert(index, key.to_owned(), default());
                index
            }
        };
        &mut self.0[index]
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    #[must_use]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key from the map, preserving the order of the remaining
    /// entries, and returns its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in ascending order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values, in ascending key order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the entries, in ascending key order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Returns an iterator over the entries with mutable values.
    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.0.iter_mut()
    }
}

impl From<HashMap<String, Value>> for Table {
    fn from(map: HashMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, Value>> for Table {
    fn from(map: BTreeMap<String, Value>) -> Self {
        // Already sorted.
        Table(map.into_iter().collect())
    }
}

impl IntoIterator for Table {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Table {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map: IndexMap<String, Value> = iter.into_iter().collect();
        map.sort_unstable_keys();
        Table(map)
    }
}

impl Extend<(String, Value)> for Table {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_ascending_key_order() {
        let mut table = Table::new();
        for key in ["m", "z", "a", "q", "b"] {
            table.insert(key.to_string(), Value::from(0));
        }
        let keys: Vec<_> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "m", "q", "z"]);
    }

    #[test]
    fn insert_replaces_existing_value_in_place() {
        let mut table = Table::new();
        table.insert("a".to_string(), Value::from(1));
        table.insert("b".to_string(), Value::from(2));
        let old = table.insert("a".to_string(), Value::from(3));
        assert_eq!(old, Some(Value::from(1)));
        assert_eq!(table.get("a"), Some(&Value::from(3)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn order_is_byte_lexicographic() {
        let mut table = Table::new();
        table.insert("Z".to_string(), Value::from(0));
        table.insert("a".to_string(), Value::from(0));
        table.insert("10".to_string(), Value::from(0));
        let keys: Vec<_> = table.keys().map(String::as_str).collect();
        // ASCII: '1' < 'Z' < 'a'.
        assert_eq!(keys, vec!["10", "Z", "a"]);
    }

    #[test]
    fn from_iterator_sorts() {
        let table: Table = vec![
            ("b".to_string(), Value::from(1)),
            ("a".to_string(), Value::from(2)),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn remove_preserves_order() {
        let mut table = Table::new();
        for key in ["a", "b", "c"] {
            table.insert(key.to_string(), Value::from(0));
        }
        assert!(table.remove("b").is_some());
        let keys: Vec<_> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert!(table.remove("b").is_none());
    }

    #[test]
    fn get_or_insert_with_inserts_sorted() {
        let mut table = Table::new();
        table.insert("c".to_string(), Value::from(0));
        table.get_or_insert_with("a", || Value::from(1));
        let keys: Vec<_> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c"]);
        // Existing entries are returned untouched.
        *table.get_or_insert_with("c", || Value::from(9)) = Value::from(2);
        assert_eq!(table.get("c"), Some(&Value::from(2)));
    }
}
