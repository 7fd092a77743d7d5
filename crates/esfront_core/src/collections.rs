//! Insertion-ordered map.
//!
//! Per-function records are kept in the order the parser finishes the
//! functions, which is innermost first. Lookups go through an FxHash index.

use rustc_hash::FxHashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    slots: Vec<(K, V)>,
    positions: FxHashMap<K, usize>,
}

impl<K: Eq + Hash + Copy, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// Replaces the value of an existing key in place; the key keeps its
    /// original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.positions.get(&key) {
            Some(&slot) => Some(std::mem::replace(&mut self.slots[slot].1, value)),
            None => {
                self.positions.insert(key, self.slots.len());
                self.slots.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let slot = *self.positions.get(key)?;
        Some(&self.slots[slot].1)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().map(|(key, value)| (key, value))
    }
}

impl<K: Eq + Hash + Copy, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Copy, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
