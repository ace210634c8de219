//! Insertion-ordered string-keyed map
//!
//! Category names are looked up by string but displayed in the order they
//! were created. `OrderedMap` keeps a name list and a lookup table in step:
//! every key in `order` has an entry in `values` and vice versa.

use std::collections::HashMap;

/// A string-keyed map that iterates in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    order: Vec<String>,
    values: HashMap<String, V>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            values: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.values.get_mut(key)
    }

    /// Insert a new key at the end. Returns false (and leaves the map
    /// untouched) if the key is already present.
    pub fn insert(&mut self, key: String, value: V) -> bool {
        if self.values.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.values.insert(key, value);
        true
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let value = self.values.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (key, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.order
            .iter()
            .filter_map(|k| self.values.get(k).map(|v| (k.as_str(), v)))
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    /// Later duplicates of a key are dropped
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_follow_insertion_order() {
        let mut map = OrderedMap::new();
        map.insert("zeta".to_string(), 1);
        map.insert("alpha".to_string(), 2);
        map.insert("mid".to_string(), 3);

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_insert_existing_key_is_rejected() {
        let mut map = OrderedMap::new();
        assert!(map.insert("a".to_string(), 1));
        assert!(!map.insert("a".to_string(), 2));
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order_and_lookup_in_sync() {
        let mut map: OrderedMap<u32> = [("a", 1), ("b", 2), ("c", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        assert_eq!(map.remove("b"), Some(2));
        assert_eq!(map.remove("b"), None);
        assert!(!map.contains_key("b"));

        let pairs: Vec<(&str, &u32)> = map.iter().collect();
        assert_eq!(pairs, vec![("a", &1), ("c", &3)]);
    }
}
