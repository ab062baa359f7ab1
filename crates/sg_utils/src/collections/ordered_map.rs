use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;

use hashbrown::HashTable;

use crate::hash::FixedHashState;

// -----------------------------------------------------------------------------
// OrderedMap

/// A hash map that iterates in insertion order.
///
/// Entries live in a dense `Vec`, and a [`HashTable`] of indices provides
/// O(1) lookup. Overwriting a key keeps its original position; removal
/// shifts later entries down.
///
/// Equality ignores order, as with ordinary hash maps.
///
/// # Examples
///
/// ```
/// use sg_utils::collections::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert("b", 2);
/// map.insert("a", 1);
/// map.insert("b", 3);
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, ["b", "a"]);
/// assert_eq!(map.get("b"), Some(&3));
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
    indices: HashTable<usize>,
}

impl<K, V> Default for OrderedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty `OrderedMap`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            indices: HashTable::new(),
        }
    }

    /// Creates an empty `OrderedMap` with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            indices: HashTable::with_capacity(capacity),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.indices.clear();
    }

    /// Returns the entry at insertion position `index`.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(|(k, v)| (k, v))
    }

    /// Iterates over entries in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> + DoubleEndedIterator {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over entries in insertion order, with mutable values.
    #[inline]
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (&K, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    /// Iterates over keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates over values in insertion order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Hash + Eq, V> OrderedMap<K, V> {
    #[inline]
    fn hash_of<Q: Hash + ?Sized>(key: &Q) -> u64 {
        FixedHashState.hash_one(key)
    }

    fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entries = &self.entries;
        self.indices
            .find(Self::hash_of(key), |&i| entries[i].0.borrow() == key)
            .copied()
    }

    /// Inserts a key-value pair.
    ///
    /// If the key was present its value is replaced in place and the old
    /// value returned; otherwise the entry is appended.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(index) = self.index_of(&key) {
            return Some(mem::replace(&mut self.entries[index].1, value));
        }

        let index = self.entries.len();
        let entries = &self.entries;
        self.indices.insert_unique(Self::hash_of(&key), index, |&i| {
            Self::hash_of(&entries[i].0)
        });
        self.entries.push((key, value));
        None
    }

    /// Returns a reference to the value for `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_of(key).map(|i| &self.entries[i].1)
    }

    /// Returns a mutable reference to the value for `key`.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_of(key).map(|i| &mut self.entries[i].1)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_of(key).is_some()
    }

    /// Removes `key`, shifting every later entry down by one.
    ///
    /// This is O(N).
    pub fn shift_remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entries = &self.entries;
        let Ok(entry) = self
            .indices
            .find_entry(Self::hash_of(key), |&i| entries[i].0.borrow() == key)
        else {
            return None;
        };
        let (index, _) = entry.remove();
        let (_, value) = self.entries.remove(index);
        for slot in self.indices.iter_mut() {
            if *slot > index {
                *slot -= 1;
            }
        }
        Some(value)
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = alloc::vec::IntoIter<(K, V)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl<K: Hash + Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::OrderedMap;

    #[test]
    fn keeps_insertion_order() {
        let mut map = OrderedMap::new();
        for i in (0..32).rev() {
            map.insert(i, i * 10);
        }
        let keys: Vec<_> = map.keys().copied().collect();
        let expected: Vec<_> = (0..32).rev().collect();
        assert_eq!(keys, expected);
        assert_eq!(map.get(&7), Some(&70));
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.insert("a", 3), Some(1));
        assert_eq!(map.get_index(0), Some((&"a", &3)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn shift_remove_reindexes() {
        let mut map: OrderedMap<u32, u32> = (0..5).map(|i| (i, i)).collect();
        assert_eq!(map.shift_remove(&1), Some(1));
        assert_eq!(map.shift_remove(&1), None);
        assert_eq!(map.get(&4), Some(&4));
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, [0, 2, 3, 4]);
    }

    #[test]
    fn equality_ignores_order() {
        let a: OrderedMap<_, _> = [(1, 'a'), (2, 'b')].into_iter().collect();
        let b: OrderedMap<_, _> = [(2, 'b'), (1, 'a')].into_iter().collect();
        assert_eq!(a, b);
    }
}
