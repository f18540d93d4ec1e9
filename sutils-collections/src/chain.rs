//! Chain - a doubly-linked list that owns its slab.
//!
//! This is the storage shared by [`OrderedSet`](crate::OrderedSet) and
//! [`LruCache`](crate::LruCache): values are kept in insertion (or recency)
//! order, and the stable slab key returned by [`Chain::push_back`] is what
//! the owning structure indexes by value.

use slab::Slab;

use crate::linked::{Linked, List, NIL};

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: usize,
    next: usize,
}

impl<T> Linked for Node<T> {
    #[inline]
    fn next(&self) -> usize {
        self.next
    }
    #[inline]
    fn prev(&self) -> usize {
        self.prev
    }
    #[inline]
    fn set_next(&mut self, key: usize) {
        self.next = key;
    }
    #[inline]
    fn set_prev(&mut self, key: usize) {
        self.prev = key;
    }
}

/// A doubly-linked list that owns a growable slab.
///
/// Cloning a chain preserves slab keys, so an index built over one chain is
/// valid for its clone.
#[derive(Debug, Clone)]
pub(crate) struct Chain<T> {
    slab: Slab<Node<T>>,
    list: List,
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Chain<T> {
    pub(crate) fn new() -> Self {
        Self {
            slab: Slab::new(),
            list: List::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slab: Slab::with_capacity(capacity),
            list: List::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Appends a value and returns its stable key.
    pub(crate) fn push_back(&mut self, value: T) -> usize {
        let key = self.slab.insert(Node {
            value,
            prev: NIL,
            next: NIL,
        });
        self.list.push_back(&mut self.slab, key);
        key
    }

    /// Removes the value stored under `key`.
    ///
    /// Returns `None` if the key is vacant.
    pub(crate) fn remove(&mut self, key: usize) -> Option<T> {
        if !self.slab.contains(key) {
            return None;
        }
        self.list.unlink(&mut self.slab, key);
        Some(self.slab.remove(key).value)
    }

    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let key = self.list.pop_front(&mut self.slab);
        if key == NIL {
            return None;
        }
        Some(self.slab.remove(key).value)
    }

    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let key = self.list.pop_back(&mut self.slab);
        if key == NIL {
            return None;
        }
        Some(self.slab.remove(key).value)
    }

    #[inline]
    pub(crate) fn front(&self) -> Option<&T> {
        self.get(self.list.head())
    }

    #[inline]
    pub(crate) fn back(&self) -> Option<&T> {
        self.get(self.list.tail())
    }

    #[inline]
    pub(crate) fn get(&self, key: usize) -> Option<&T> {
        self.slab.get(key).map(|node| &node.value)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.slab.get_mut(key).map(|node| &mut node.value)
    }

    /// Moves the node under `key` to the back.
    ///
    /// # Panics
    ///
    /// Panics if `key` is vacant.
    #[inline]
    pub(crate) fn move_to_back(&mut self, key: usize) {
        self.list.move_to_back(&mut self.slab, key);
    }

    pub(crate) fn clear(&mut self) {
        self.slab.clear();
        self.list.reset();
    }

    /// Iterates values front to back.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            slab: &self.slab,
            front: self.list.head(),
            remaining: self.list.len(),
        }
    }
}

/// Front-to-back iterator over a [`Chain`].
#[derive(Debug)]
pub(crate) struct Iter<'a, T> {
    slab: &'a Slab<Node<T>>,
    front: usize,
    remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slab: self.slab,
            front: self.front,
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == NIL {
            return None;
        }
        let node = &self.slab[self.front];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> core::iter::FusedIterator for Iter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let chain: Chain<u64> = Chain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert!(chain.front().is_none());
        assert!(chain.back().is_none());
    }

    #[test]
    fn push_back_pop_front() {
        let mut chain = Chain::with_capacity(4);

        chain.push_back(1);
        chain.push_back(2);
        chain.push_back(3);

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.pop_front(), Some(1));
        assert_eq!(chain.pop_front(), Some(2));
        assert_eq!(chain.pop_front(), Some(3));
        assert_eq!(chain.pop_front(), None);
    }

    #[test]
    fn pop_back_is_lifo() {
        let mut chain = Chain::new();

        chain.push_back(1);
        chain.push_back(2);

        assert_eq!(chain.pop_back(), Some(2));
        assert_eq!(chain.pop_back(), Some(1));
        assert_eq!(chain.pop_back(), None);
    }

    #[test]
    fn remove_by_key() {
        let mut chain = Chain::new();

        let a = chain.push_back(1);
        let b = chain.push_back(2);
        let c = chain.push_back(3);

        assert_eq!(chain.remove(b), Some(2));
        assert_eq!(chain.len(), 2);

        // a and c still accessible
        assert_eq!(chain.get(a), Some(&1));
        assert_eq!(chain.get(c), Some(&3));

        // b is gone
        assert_eq!(chain.get(b), None);
        assert_eq!(chain.remove(b), None);
    }

    #[test]
    fn move_to_back_and_iter() {
        let mut chain = Chain::new();

        let a = chain.push_back("a");
        chain.push_back("b");
        chain.push_back("c");

        chain.move_to_back(a);

        let values: Vec<_> = chain.iter().copied().collect();
        assert_eq!(values, vec!["b", "c", "a"]);
        assert_eq!(chain.front(), Some(&"b"));
        assert_eq!(chain.back(), Some(&"a"));
        assert_eq!(chain.iter().len(), 3);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut chain = Chain::new();

        let a = chain.push_back(10);
        *chain.get_mut(a).unwrap() += 5;

        assert_eq!(chain.get(a), Some(&15));
    }

    #[test]
    fn clone_preserves_keys() {
        let mut chain = Chain::new();

        let a = chain.push_back(1);
        let b = chain.push_back(2);
        chain.remove(a);
        let c = chain.push_back(3);

        let copy = chain.clone();
        assert_eq!(copy.get(b), Some(&2));
        assert_eq!(copy.get(c), Some(&3));
        assert_eq!(copy.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn clear_resets() {
        let mut chain = Chain::new();

        chain.push_back(1);
        chain.push_back(2);
        chain.clear();

        assert!(chain.is_empty());
        assert_eq!(chain.iter().next(), None);

        chain.push_back(7);
        assert_eq!(chain.front(), Some(&7));
    }
}
