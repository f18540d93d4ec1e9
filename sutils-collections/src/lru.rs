//! LruCache - a key/value map bounded by recency.
//!
//! Entries live in a slab-backed linked list ordered from least- to
//! most-recently touched. A touch is any read ([`LruCache::get`]) or write
//! ([`LruCache::set`]) of a key. When a write pushes the size over
//! `max_size`, the single entry at the front of the list is evicted.
//!
//! ```text
//! set(a) set(b) set(c)      [a, b, c]
//! get(a)                    [b, c, a]
//! set(d)   (max_size = 3)   [c, a, d]   evicts b
//! ```
//!
//! A `max_size` of 0 means unbounded.
//!
//! The cache is a single-writer structure; note that `get` takes
//! `&mut self` because it reorders entries.

use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use std::collections::HashMap;

use tracing::trace;

use crate::chain::{self, Chain};
use crate::Error;

const PREALLOC_LIMIT: usize = 1024;

/// A bounded least-recently-used cache.
///
/// # Example
///
/// ```
/// use sutils_collections::LruCache;
///
/// let mut cache = LruCache::new(3);
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.set("c", 3);
///
/// assert_eq!(cache.get("a"), Ok(&1));
///
/// // "b" is now the least recently used
/// assert_eq!(cache.set("d", 4), Some(("b", 2)));
/// assert_eq!(cache.keys().copied().collect::<Vec<_>>(), ["c", "a", "d"]);
/// ```
pub struct LruCache<K, V> {
    chain: Chain<(K, V)>,
    index: HashMap<K, usize>,
    max_size: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates a cache holding at most `max_size` entries (0 = unbounded).
    pub fn new(max_size: usize) -> Self {
        // Large bounds grow on demand
        let capacity = max_size.min(PREALLOC_LIMIT);
        Self {
            chain: Chain::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            max_size,
        }
    }

    /// Creates a cache with no size limit.
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Creates a cache from a size that may be negative, e.g. one read from
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `max_size` does not fit in a
    /// `usize`, which includes every negative value.
    ///
    /// ```
    /// use sutils_collections::{Error, LruCache};
    ///
    /// assert!(LruCache::<&str, i32>::try_new(10_i64).is_ok());
    /// assert!(matches!(
    ///     LruCache::<&str, i32>::try_new(-1_i64),
    ///     Err(Error::InvalidArgument(_))
    /// ));
    /// ```
    pub fn try_new<N>(max_size: N) -> Result<Self, Error>
    where
        N: TryInto<usize> + fmt::Display + Copy,
    {
        max_size.try_into().map(Self::new).map_err(|_| {
            Error::InvalidArgument(format!(
                "max_size must be 0 or greater, got {max_size}"
            ))
        })
    }

    /// Maximum number of entries, 0 meaning unbounded.
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of cached entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Returns `true` if `key` is cached. Not a touch.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Returns the value for `key` and marks it most recently used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    pub fn get<Q>(&mut self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.touch(key)?;
        self.chain
            .get(slot)
            .map(|(_, value)| value)
            .ok_or(Error::NotFound)
    }

    /// Mutable variant of [`get`](Self::get); also a touch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.touch(key)?;
        self.chain
            .get_mut(slot)
            .map(|(_, value)| value)
            .ok_or(Error::NotFound)
    }

    fn touch<Q>(&mut self, key: &Q) -> Result<usize, Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = *self.index.get(key).ok_or(Error::NotFound)?;
        self.chain.move_to_back(slot);
        Ok(slot)
    }

    /// Returns the value for `key` without changing recency order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = *self.index.get(key)?;
        self.chain.get(slot).map(|(_, value)| value)
    }

    /// Inserts or overwrites `key`, making it the most recently used.
    ///
    /// An existing key is moved to the back before its value is replaced.
    /// If the insert grows the cache past `max_size`, the least recently
    /// used entry is evicted and returned.
    pub fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&slot) = self.index.get(&key) {
            self.chain.move_to_back(slot);
            if let Some(entry) = self.chain.get_mut(slot) {
                entry.1 = value;
            }
            return None;
        }

        let slot = self.chain.push_back((key.clone(), value));
        self.index.insert(key, slot);

        if self.max_size != 0 && self.chain.len() > self.max_size {
            return self.evict();
        }
        None
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let (key, value) = self.chain.pop_front()?;
        self.index.remove(&key);
        trace!(
            len = self.chain.len(),
            max_size = self.max_size,
            "evicted least recently used entry"
        );
        Some((key, value))
    }

    /// Applies [`set`](Self::set) to each pair in iteration order.
    ///
    /// Accepts maps as well as sequences of pairs. Each pair may evict
    /// independently.
    pub fn update<I>(&mut self, source: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in source {
            self.set(key, value);
        }
    }

    /// Removes `key` without affecting the order of other entries.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.index.remove(key)?;
        self.chain.remove(slot).map(|(_, value)| value)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.chain.clear();
        self.index.clear();
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.chain.iter(),
        }
    }

    /// Iterates keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<K, V> Clone for LruCache<K, V>
where
    K: Clone,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            index: self.index.clone(),
            max_size: self.max_size,
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Extend<(K, V)> for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.update(iter);
    }
}

/// Iterator over `(key, value)` pairs in recency order.
pub struct Iter<'a, K, V> {
    inner: chain::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn items<K: Hash + Eq + Clone + Copy, V: Copy>(cache: &LruCache<K, V>) -> Vec<(K, V)> {
        cache.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn abc(max_size: usize) -> LruCache<&'static str, i32> {
        let mut cache = LruCache::new(max_size);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);
        cache
    }

    // ============================================================================
    // Construction
    // ============================================================================

    #[test]
    fn try_new_rejects_negative() {
        assert!(matches!(
            LruCache::<u8, u8>::try_new(-1_i32),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(LruCache::<u8, u8>::try_new(0_i64).unwrap().max_size(), 0);
        assert_eq!(LruCache::<u8, u8>::try_new(7_i64).unwrap().max_size(), 7);
    }

    #[test]
    fn invalid_argument_message_names_value() {
        let err = LruCache::<u8, u8>::try_new(-5_i64).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: max_size must be 0 or greater, got -5"
        );
    }

    // ============================================================================
    // Eviction
    // ============================================================================

    #[test]
    fn insertion_and_eviction() {
        let mut cache = abc(3);
        assert_eq!(items(&cache), vec![("a", 1), ("b", 2), ("c", 3)]);

        assert_eq!(cache.set("d", 4), Some(("a", 1)));
        assert_eq!(items(&cache), vec![("b", 2), ("c", 3), ("d", 4)]);
        assert!(!cache.contains_key("a"));
    }

    #[test]
    fn access_order_update() {
        let mut cache = abc(3);

        assert_eq!(cache.get("a"), Ok(&1));
        assert_eq!(items(&cache), vec![("b", 2), ("c", 3), ("a", 1)]);

        assert_eq!(cache.set("d", 4), Some(("b", 2)));
        assert_eq!(items(&cache), vec![("c", 3), ("a", 1), ("d", 4)]);
    }

    #[test]
    fn update_existing_key() {
        let mut cache = abc(3);

        assert_eq!(cache.set("b", 20), None);
        assert_eq!(items(&cache), vec![("a", 1), ("c", 3), ("b", 20)]);

        cache.set("d", 4);
        assert_eq!(items(&cache), vec![("c", 3), ("b", 20), ("d", 4)]);
    }

    #[test]
    fn eviction_order_after_overwrite() {
        let mut cache = LruCache::new(2);
        cache.set("a", 1);
        cache.set("b", 2);

        cache.set("a", 10);
        assert_eq!(items(&cache), vec![("b", 2), ("a", 10)]);

        cache.set("c", 3);
        assert_eq!(items(&cache), vec![("a", 10), ("c", 3)]);
    }

    #[test]
    fn unbounded_never_evicts() {
        let mut cache = abc(0);

        cache.get("a").unwrap();
        assert_eq!(items(&cache), vec![("b", 2), ("c", 3), ("a", 1)]);

        assert_eq!(cache.set("d", 4), None);
        assert_eq!(
            items(&cache),
            vec![("b", 2), ("c", 3), ("a", 1), ("d", 4)]
        );
    }

    #[test]
    fn capacity_one() {
        let mut cache = LruCache::new(1);
        assert_eq!(cache.set(1, "x"), None);
        assert_eq!(cache.set(2, "y"), Some((1, "x")));
        assert_eq!(cache.set(2, "z"), None);
        assert_eq!(items(&cache), vec![(2, "z")]);
    }

    // ============================================================================
    // Reads
    // ============================================================================

    #[test]
    fn get_missing_is_not_found() {
        let mut cache = abc(3);
        assert_eq!(cache.get("zz"), Err(Error::NotFound));
        assert_eq!(items(&cache), vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn peek_does_not_touch() {
        let mut cache = abc(3);

        assert_eq!(cache.peek("a"), Some(&1));
        assert_eq!(cache.peek("zz"), None);

        cache.set("d", 4);
        assert!(!cache.contains_key("a"));
    }

    #[test]
    fn get_mut_touches_and_writes() {
        let mut cache = abc(3);

        *cache.get_mut("a").unwrap() += 100;
        assert_eq!(items(&cache), vec![("b", 2), ("c", 3), ("a", 101)]);
    }

    // ============================================================================
    // Bulk / removal
    // ============================================================================

    #[test]
    fn update_from_map_and_pairs() {
        let mut cache = LruCache::new(3);
        let source: BTreeMap<_, _> = [("a", 1), ("b", 2), ("c", 3), ("d", 4)].into();
        cache.update(source);
        assert_eq!(items(&cache), vec![("b", 2), ("c", 3), ("d", 4)]);

        cache.update(vec![("b", 20), ("e", 5)]);
        assert_eq!(items(&cache), vec![("d", 4), ("b", 20), ("e", 5)]);
    }

    #[test]
    fn remove_shrinks_without_reordering() {
        let mut cache = abc(3);

        assert_eq!(cache.remove("b"), Some(2));
        assert_eq!(cache.remove("b"), None);
        assert_eq!(items(&cache), vec![("a", 1), ("c", 3)]);

        // Room for one more without eviction
        assert_eq!(cache.set("d", 4), None);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn clear_and_debug() {
        let mut cache = abc(3);
        assert_eq!(format!("{cache:?}"), r#"{"a": 1, "b": 2, "c": 3}"#);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(format!("{cache:?}"), "{}");
    }
}
