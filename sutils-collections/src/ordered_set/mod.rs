//! OrderedSet - an insertion-ordered set with per-element markers.
//!
//! Values are kept in a slab-backed linked list in insertion order, and a
//! `HashMap` indexes each value to its slab key:
//!
//! ```text
//! index: HashMap<V, slab key>      chain: slab-backed list, insertion order
//!   "a" -> 0                       [0] "a" #3  <->  [1] "b" #4  <->  [2] "c" #9
//!   "b" -> 1
//!   "c" -> 2
//! ```
//!
//! That gives O(1) `add`, `remove`, `contains`, and `pop` from either end.
//! Range queries (`before`, `since`, ...) scan the chain, which is O(n);
//! there is no secondary marker index.
//!
//! The set is a single-writer structure. Share it across threads behind a
//! lock owned by the caller.
//!
//! # Example
//!
//! ```
//! use sutils_collections::{Marker, OrderedSet};
//!
//! let mut set: OrderedSet<&str> = OrderedSet::new();
//! set.add("a");
//! set.add("b");
//! let boundary = Marker::now();
//! set.add("c");
//!
//! assert_eq!(set.before(boundary), ["a", "b"].into_iter().collect::<OrderedSet<_>>());
//! assert_eq!(set.pop(false).unwrap(), "a");
//! assert_eq!(set.pop(true).unwrap(), "c");
//! ```

mod algebra;
mod range;

use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use std::collections::HashMap;

use crate::chain::{self, Chain};
use crate::marker::{Clock, LogicalClock};
use crate::Error;

#[derive(Debug, Clone)]
struct Entry<V, M> {
    value: V,
    marker: M,
}

/// An insertion-ordered set whose elements remember when they were added.
///
/// Equality only looks at the values: two sets holding the same values are
/// equal regardless of order or markers.
pub struct OrderedSet<V, C: Clock = LogicalClock> {
    chain: Chain<Entry<V, C::Marker>>,
    index: HashMap<V, usize>,
    clock: C,
}

impl<V, C> OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock + Default,
{
    /// Creates an empty set using the default clock.
    pub fn new() -> Self {
        Self::with_clock(C::default())
    }

    /// Creates an empty set with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chain: Chain::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            clock: C::default(),
        }
    }
}

impl<V, C> OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
{
    /// Creates an empty set drawing markers from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            chain: Chain::new(),
            index: HashMap::new(),
            clock,
        }
    }

    /// Returns an empty set sharing this set's clock.
    fn empty_like(&self) -> Self {
        Self::with_clock(self.clock.clone())
    }

    /// Returns the clock this set draws markers from.
    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` if the set holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Returns `true` if `value` is in the set.
    #[inline]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(value)
    }

    /// Adds a value, stamping it with the clock's current marker.
    ///
    /// If the value is already present nothing changes, including its marker
    /// and position. Returns `true` if the value was inserted.
    pub fn add(&mut self, value: V) -> bool {
        if self.index.contains_key(&value) {
            return false;
        }
        let marker = self.clock.now();
        self.push(value, marker);
        true
    }

    /// Adds a value with an explicit marker.
    ///
    /// Behaves like [`add`](Self::add) for values already present. The marker
    /// is taken as given; callers append in marker order so iteration order
    /// and marker order stay consistent.
    pub(crate) fn insert_at(&mut self, value: V, marker: C::Marker) -> bool {
        if self.index.contains_key(&value) {
            return false;
        }
        self.push(value, marker);
        true
    }

    fn push(&mut self, value: V, marker: C::Marker) {
        let key = self.chain.push_back(Entry {
            value: value.clone(),
            marker,
        });
        self.index.insert(value, key);
    }

    /// Adds every value in order; values already present are skipped.
    pub fn update<I: IntoIterator<Item = V>>(&mut self, values: I) {
        for value in values {
            self.add(value);
        }
    }

    /// Removes a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the value is absent.
    pub fn remove<Q>(&mut self, value: &Q) -> Result<(), Error>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let key = self.index.remove(value).ok_or(Error::NotFound)?;
        self.chain.remove(key);
        Ok(())
    }

    /// Removes a value if present. Returns `true` if something was removed.
    pub fn discard<Q>(&mut self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(value).is_ok()
    }

    /// Removes every listed value, returning how many were removed.
    ///
    /// With `discard == false` the first missing value aborts the operation
    /// with [`Error::NotFound`]; values before it stay removed.
    pub fn remove_items<I>(&mut self, values: I, discard: bool) -> Result<usize, Error>
    where
        I: IntoIterator,
        I::Item: Borrow<V>,
    {
        let mut removed = 0;
        for item in values {
            let value: &V = item.borrow();
            if discard {
                removed += usize::from(self.discard(value));
            } else {
                self.remove(value)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Removes and returns the earliest element, or the latest if `last`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the set is empty.
    pub fn pop(&mut self, last: bool) -> Result<V, Error> {
        let popped = if last {
            self.chain.pop_back()
        } else {
            self.chain.pop_front()
        };
        let entry = popped.ok_or(Error::EmptyContainer)?;
        self.index.remove(&entry.value);
        Ok(entry.value)
    }

    /// Returns the earliest element without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the set is empty.
    pub fn first(&self) -> Result<&V, Error> {
        self.chain
            .front()
            .map(|entry| &entry.value)
            .ok_or(Error::EmptyContainer)
    }

    /// Returns the latest element without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the set is empty.
    pub fn last(&self) -> Result<&V, Error> {
        self.chain
            .back()
            .map(|entry| &entry.value)
            .ok_or(Error::EmptyContainer)
    }

    /// Returns the marker recorded for `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the value is absent.
    pub fn time<Q>(&self, value: &Q) -> Result<C::Marker, Error>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let key = *self.index.get(value).ok_or(Error::NotFound)?;
        self.chain
            .get(key)
            .map(|entry| entry.marker)
            .ok_or(Error::NotFound)
    }

    /// Overwrites the marker of an existing value. Its position is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the value is absent.
    pub fn set_time<Q>(&mut self, value: &Q, marker: C::Marker) -> Result<(), Error>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let key = *self.index.get(value).ok_or(Error::NotFound)?;
        let entry = self.chain.get_mut(key).ok_or(Error::NotFound)?;
        entry.marker = marker;
        Ok(())
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.chain.clear();
        self.index.clear();
    }

    /// Returns a copy with the same order and the same markers.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Iterates values in insertion order.
    pub fn iter(&self) -> Iter<'_, V, C::Marker> {
        Iter {
            inner: self.chain.iter(),
        }
    }

    /// Iterates `(value, marker)` pairs in insertion order.
    pub fn entries(&self) -> Entries<'_, V, C::Marker> {
        Entries {
            inner: self.chain.iter(),
        }
    }
}

impl<V, C> Clone for OrderedSet<V, C>
where
    V: Clone,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            index: self.index.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<V, C> Default for OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> fmt::Debug for OrderedSet<V, C>
where
    V: Hash + Eq + Clone + fmt::Debug,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<V, C> FromIterator<V> for OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock + Default,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut set = Self::new();
        set.update(iter);
        set
    }
}

impl<V, C> Extend<V> for OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
{
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl<V, C, const N: usize> From<[V; N]> for OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock + Default,
{
    fn from(values: [V; N]) -> Self {
        values.into_iter().collect()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over the values of an [`OrderedSet`], in insertion order.
///
/// Created by [`OrderedSet::iter`]. Cloning restarts nothing; call `iter`
/// again for a fresh pass.
pub struct Iter<'a, V, M> {
    inner: chain::Iter<'a, Entry<V, M>>,
}

impl<V, M> Clone for Iter<'_, V, M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, V, M> Iterator for Iter<'a, V, M> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|entry| &entry.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V, M> ExactSizeIterator for Iter<'_, V, M> {}

/// Iterator over `(value, marker)` pairs. Created by [`OrderedSet::entries`].
pub struct Entries<'a, V, M> {
    inner: chain::Iter<'a, Entry<V, M>>,
}

impl<'a, V, M: Copy> Iterator for Entries<'a, V, M> {
    type Item = (&'a V, M);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.value, entry.marker))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V, M: Copy> ExactSizeIterator for Entries<'_, V, M> {}

/// Owning iterator that drains an [`OrderedSet`] front to back.
pub struct IntoIter<V, C: Clock> {
    set: OrderedSet<V, C>,
}

impl<V, C> Iterator for IntoIter<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
{
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        self.set.pop(false).ok()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.set.len(), Some(self.set.len()))
    }
}

impl<V, C> IntoIterator for OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
{
    type Item = V;
    type IntoIter = IntoIter<V, C>;

    fn into_iter(self) -> IntoIter<V, C> {
        IntoIter { set: self }
    }
}

impl<'a, V, C> IntoIterator for &'a OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
{
    type Item = &'a V;
    type IntoIter = Iter<'a, V, C::Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
