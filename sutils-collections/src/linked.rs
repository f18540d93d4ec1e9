//! Intrusive doubly-linked list over slab storage.
//!
//! Nodes live in a [`Slab`] and embed their own prev/next links, so any node
//! can be unlinked, or moved to the back, in O(1) given only its slab key.
//! The list itself only stores head, tail, and length; it never owns nodes.
//!
//! Keys stay stable until the node is removed from the slab, which is what
//! lets [`OrderedSet`](crate::OrderedSet) and [`LruCache`](crate::LruCache)
//! keep a `HashMap<value, key>` index next to the list.

use slab::Slab;

/// Sentinel key meaning "no node".
pub(crate) const NIL: usize = usize::MAX;

/// A node that can participate in a [`List`].
pub(crate) trait Linked {
    /// Key of the next node, or [`NIL`] if this is the tail.
    fn next(&self) -> usize;

    /// Key of the previous node, or [`NIL`] if this is the head.
    fn prev(&self) -> usize;

    fn set_next(&mut self, key: usize);

    fn set_prev(&mut self, key: usize);
}

/// A doubly-linked list coordinating keys into a slab.
///
/// All operations must be given the same slab instance the nodes were
/// inserted into. Passing a key that is not occupied in the slab panics.
#[derive(Debug, Clone)]
pub(crate) struct List {
    head: usize,
    tail: usize,
    len: usize,
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl List {
    /// Creates an empty list.
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    #[inline]
    pub(crate) const fn head(&self) -> usize {
        self.head
    }

    #[inline]
    pub(crate) const fn tail(&self) -> usize {
        self.tail
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Links an already-stored node at the back of the list.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not occupied in `slab`.
    pub(crate) fn push_back<T: Linked>(&mut self, slab: &mut Slab<T>, key: usize) {
        {
            let node = &mut slab[key];
            node.set_prev(self.tail);
            node.set_next(NIL);
        }

        if self.tail != NIL {
            slab[self.tail].set_next(key);
        } else {
            self.head = key;
        }

        self.tail = key;
        self.len += 1;
    }

    /// Unlinks the head node and returns its key, or [`NIL`] if empty.
    ///
    /// The node stays in the slab; only its links are cleared.
    pub(crate) fn pop_front<T: Linked>(&mut self, slab: &mut Slab<T>) -> usize {
        let key = self.head;
        if key != NIL {
            self.unlink(slab, key);
        }
        key
    }

    /// Unlinks the tail node and returns its key, or [`NIL`] if empty.
    pub(crate) fn pop_back<T: Linked>(&mut self, slab: &mut Slab<T>) -> usize {
        let key = self.tail;
        if key != NIL {
            self.unlink(slab, key);
        }
        key
    }

    /// Unlinks a node from anywhere in the list in O(1).
    ///
    /// # Panics
    ///
    /// Panics if `key` is not occupied in `slab`.
    pub(crate) fn unlink<T: Linked>(&mut self, slab: &mut Slab<T>, key: usize) {
        let (prev, next) = {
            let node = &slab[key];
            (node.prev(), node.next())
        };

        if prev != NIL {
            slab[prev].set_next(next);
        } else {
            self.head = next;
        }

        if next != NIL {
            slab[next].set_prev(prev);
        } else {
            self.tail = prev;
        }

        let node = &mut slab[key];
        node.set_prev(NIL);
        node.set_next(NIL);

        self.len -= 1;
    }

    /// Moves a linked node to the back of the list.
    ///
    /// No-op if the node already is the tail.
    pub(crate) fn move_to_back<T: Linked>(&mut self, slab: &mut Slab<T>, key: usize) {
        if self.tail == key {
            return;
        }
        self.unlink(slab, key);
        self.push_back(slab, key);
    }

    /// Forgets every link without touching the slab.
    ///
    /// Callers clear the slab themselves; stale links in dropped nodes are
    /// never read again.
    pub(crate) fn reset(&mut self) {
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Node {
        value: u64,
        next: usize,
        prev: usize,
    }

    impl Node {
        fn new(value: u64) -> Self {
            Self {
                value,
                next: NIL,
                prev: NIL,
            }
        }
    }

    impl Linked for Node {
        fn next(&self) -> usize {
            self.next
        }
        fn prev(&self) -> usize {
            self.prev
        }
        fn set_next(&mut self, key: usize) {
            self.next = key;
        }
        fn set_prev(&mut self, key: usize) {
            self.prev = key;
        }
    }

    fn values(list: &List, slab: &Slab<Node>) -> Vec<u64> {
        let mut out = Vec::new();
        let mut key = list.head();
        while key != NIL {
            out.push(slab[key].value);
            key = slab[key].next;
        }
        out
    }

    #[test]
    fn new_list_is_empty() {
        let list = List::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.head(), NIL);
        assert_eq!(list.tail(), NIL);
    }

    #[test]
    fn push_back_links_both_directions() {
        let mut slab = Slab::new();
        let mut list = List::new();

        let a = slab.insert(Node::new(1));
        let b = slab.insert(Node::new(2));
        let c = slab.insert(Node::new(3));

        list.push_back(&mut slab, a);
        list.push_back(&mut slab, b);
        list.push_back(&mut slab, c);

        assert_eq!(list.len(), 3);
        assert_eq!(list.head(), a);
        assert_eq!(list.tail(), c);

        assert_eq!(slab[a].next, b);
        assert_eq!(slab[b].next, c);
        assert_eq!(slab[c].next, NIL);

        assert_eq!(slab[a].prev, NIL);
        assert_eq!(slab[b].prev, a);
        assert_eq!(slab[c].prev, b);
    }

    #[test]
    fn unlink_middle() {
        let mut slab = Slab::new();
        let mut list = List::new();

        let keys: Vec<_> = (1..=3).map(|v| slab.insert(Node::new(v))).collect();
        for &k in &keys {
            list.push_back(&mut slab, k);
        }

        list.unlink(&mut slab, keys[1]);

        assert_eq!(list.len(), 2);
        assert_eq!(values(&list, &slab), vec![1, 3]);
        assert_eq!(slab[keys[1]].next, NIL);
        assert_eq!(slab[keys[1]].prev, NIL);
    }

    #[test]
    fn pop_front_and_back() {
        let mut slab = Slab::new();
        let mut list = List::new();

        let a = slab.insert(Node::new(1));
        let b = slab.insert(Node::new(2));
        let c = slab.insert(Node::new(3));
        list.push_back(&mut slab, a);
        list.push_back(&mut slab, b);
        list.push_back(&mut slab, c);

        assert_eq!(list.pop_front(&mut slab), a);
        assert_eq!(list.pop_back(&mut slab), c);
        assert_eq!(list.head(), b);
        assert_eq!(list.tail(), b);
        assert_eq!(list.pop_back(&mut slab), b);

        assert!(list.is_empty());
        assert_eq!(list.pop_front(&mut slab), NIL);
        assert_eq!(list.pop_back(&mut slab), NIL);
    }

    #[test]
    fn move_to_back_reorders() {
        let mut slab = Slab::new();
        let mut list = List::new();

        let keys: Vec<_> = (1..=4).map(|v| slab.insert(Node::new(v))).collect();
        for &k in &keys {
            list.push_back(&mut slab, k);
        }

        list.move_to_back(&mut slab, keys[0]);
        assert_eq!(values(&list, &slab), vec![2, 3, 4, 1]);

        list.move_to_back(&mut slab, keys[2]);
        assert_eq!(values(&list, &slab), vec![2, 4, 1, 3]);

        // Already the tail
        list.move_to_back(&mut slab, keys[2]);
        assert_eq!(values(&list, &slab), vec![2, 4, 1, 3]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn reset_forgets_links() {
        let mut slab = Slab::new();
        let mut list = List::new();

        let a = slab.insert(Node::new(1));
        list.push_back(&mut slab, a);
        list.reset();

        assert!(list.is_empty());
        assert_eq!(list.head(), NIL);
    }
}
