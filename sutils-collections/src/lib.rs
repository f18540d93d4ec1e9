//! In-memory ordered collections over slab-backed linked lists.
//!
//! Two structures share one storage model: values live in a growable
//! [`slab`] and are threaded on an intrusive doubly-linked list, while a
//! `HashMap` maps each value (or key) to its stable slab key.
//!
//! ```text
//! HashMap<V, key>  ──►  Slab<Node>  ◄──  List (head, tail, len)
//!    O(1) lookup         stable keys       O(1) unlink / move-to-back
//! ```
//!
//! # Data Structures
//!
//! | Structure | Use Case | Key Operations |
//! |-----------|----------|----------------|
//! | [`OrderedSet`] | Audit trails, time windows | O(1) add/remove/pop, O(n) range queries |
//! | [`LruCache`] | Bounded memoization | O(1) get/set with recency eviction |
//!
//! # Ordered Set
//!
//! Elements are stamped with a [`Marker`] from a [`Clock`] on insertion.
//! The default [`LogicalClock`] issues strictly increasing markers, so
//! markers follow insertion order and range queries are exact.
//!
//! ```
//! use std::collections::HashSet;
//! use sutils_collections::{Marker, OrderedSet};
//!
//! let mut seen: OrderedSet<u32> = OrderedSet::new();
//! seen.update([10, 20]);
//! let checkpoint = Marker::now();
//! seen.add(30);
//!
//! assert_eq!(seen.since(checkpoint), HashSet::from([30]));
//! seen.remove_before(checkpoint, false).unwrap();
//! assert_eq!(seen.first(), Ok(&30));
//! ```
//!
//! # LRU Cache
//!
//! ```
//! use sutils_collections::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.set(1, "one");
//! cache.set(2, "two");
//! cache.get(&1).unwrap();
//! assert_eq!(cache.set(3, "three"), Some((2, "two")));
//! ```
//!
//! # Thread Safety
//!
//! Both structures assume a single writer. Wrap them in a lock when sharing
//! across threads.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod chain;
mod error;
mod linked;
pub mod lru;
pub mod marker;
pub mod ordered_set;

pub use error::Error;
pub use lru::LruCache;
pub use marker::{Clock, LogicalClock, Marker, SystemClock};
pub use ordered_set::OrderedSet;
