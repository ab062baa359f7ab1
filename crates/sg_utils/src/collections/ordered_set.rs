use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;

use super::OrderedMap;

// -----------------------------------------------------------------------------
// OrderedSet

/// A hash set that iterates in insertion order.
///
/// A thin wrapper around [`OrderedMap<T, ()>`](OrderedMap).
///
/// # Examples
///
/// ```
/// use sg_utils::collections::OrderedSet;
///
/// let mut set = OrderedSet::new();
/// assert!(set.insert(3));
/// assert!(set.insert(1));
/// assert!(!set.insert(3));
///
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 1]);
/// ```
#[derive(Clone)]
pub struct OrderedSet<T> {
    map: OrderedMap<T, ()>,
}

impl<T> Default for OrderedSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedSet<T> {
    /// Creates an empty `OrderedSet`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            map: OrderedMap::new(),
        }
    }

    /// Creates an empty `OrderedSet` with room for `capacity` values.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: OrderedMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Iterates over values in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> {
        self.map.keys()
    }
}

impl<T: Hash + Eq> OrderedSet<T> {
    /// Adds a value, returning `false` if it was already present.
    #[inline]
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    #[inline]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(value)
    }

    /// Removes a value, shifting later values down. O(N).
    #[inline]
    pub fn shift_remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.shift_remove(value).is_some()
    }
}

impl<T: Hash + Eq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|v| (v, ())).collect(),
        }
    }
}

impl<T: Hash + Eq> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|v| (v, ())));
    }
}

impl<T> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = core::iter::Map<alloc::vec::IntoIter<(T, ())>, fn((T, ())) -> T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter().map((|(v, ())| v) as fn((T, ())) -> T)
    }
}

impl<T: Hash + Eq> PartialEq for OrderedSet<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Hash + Eq> Eq for OrderedSet<T> {}

impl<T: fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedSet;

    #[test]
    fn membership() {
        let mut set: OrderedSet<&str> = ["x", "y"].into_iter().collect();
        assert!(set.contains("x"));
        assert!(!set.insert("y"));
        assert!(set.shift_remove("x"));
        assert!(!set.contains("x"));
        assert_eq!(set.len(), 1);
    }
}
