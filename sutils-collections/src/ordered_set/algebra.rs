//! Set algebra, predicates, equality, and operator aliases.
//!
//! Every operation accepts any iterable of `&V` as the other operand: another
//! `OrderedSet`, a `HashSet`, a slice, a `Vec`. Results are new sets whose
//! markers are drawn fresh from the left operand's clock when the result is
//! built. Only [`OrderedSet::copy`] carries markers over.
//!
//! Result order is the left operand's insertion order followed, where the
//! operation admits them, by the right operand's remaining values in the
//! right operand's iteration order.

use core::hash::{BuildHasher, Hash};
use core::ops::{BitAnd, BitOr, BitXor, Sub};
use std::collections::HashSet;

use super::OrderedSet;
use crate::marker::Clock;

/// Collects the other operand into a lookup set, preserving first-seen order.
fn distinct<'a, V, I>(other: I) -> (Vec<&'a V>, HashSet<&'a V>)
where
    V: Hash + Eq + 'a,
    I: IntoIterator<Item = &'a V>,
{
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    for value in other {
        if seen.insert(value) {
            order.push(value);
        }
    }
    (order, seen)
}

impl<V, C> OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
{
    /// Values in either operand.
    pub fn union<'a, I>(&self, other: I) -> Self
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let mut out = self.empty_like();
        out.update(self.iter().cloned());
        out.update(other.into_iter().cloned());
        out
    }

    /// Values in both operands, in this set's order.
    pub fn intersection<'a, I>(&self, other: I) -> Self
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let (_, other) = distinct(other);
        let mut out = self.empty_like();
        out.update(self.iter().filter(|v| other.contains(v)).cloned());
        out
    }

    /// Values in this set but not in `other`.
    pub fn difference<'a, I>(&self, other: I) -> Self
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let (_, other) = distinct(other);
        let mut out = self.empty_like();
        out.update(self.iter().filter(|v| !other.contains(v)).cloned());
        out
    }

    /// Values in exactly one of the operands.
    pub fn symmetric_difference<'a, I>(&self, other: I) -> Self
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let (order, lookup) = distinct(other);
        let mut out = self.empty_like();
        out.update(self.iter().filter(|v| !lookup.contains(v)).cloned());
        out.update(
            order
                .into_iter()
                .filter(|v| !self.contains(*v))
                .cloned(),
        );
        out
    }

    /// Removes every value that is also in `other`. Survivors keep their
    /// markers and order.
    pub fn difference_update<'a, I>(&mut self, other: I)
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        for value in other {
            self.discard(value);
        }
    }

    /// Keeps only values also in `other`. Survivors keep their markers and
    /// order.
    pub fn intersection_update<'a, I>(&mut self, other: I)
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let (_, other) = distinct(other);
        let doomed: Vec<V> = self
            .iter()
            .filter(|v| !other.contains(v))
            .cloned()
            .collect();
        for value in &doomed {
            self.discard(value);
        }
    }

    /// Returns `true` if no value is in both operands.
    pub fn is_disjoint<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        other.into_iter().all(|v| !self.contains(v))
    }

    /// Returns `true` if every value of this set is in `other`.
    pub fn is_subset<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        let (_, other) = distinct(other);
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every value of `other` is in this set.
    pub fn is_superset<'a, I>(&self, other: I) -> bool
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        other.into_iter().all(|v| self.contains(v))
    }
}

// =============================================================================
// Equality
// =============================================================================

impl<V, C1, C2> PartialEq<OrderedSet<V, C2>> for OrderedSet<V, C1>
where
    V: Hash + Eq + Clone,
    C1: Clock,
    C2: Clock,
{
    fn eq(&self, other: &OrderedSet<V, C2>) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<V, C> Eq for OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
{
}

impl<V, C, S> PartialEq<HashSet<V, S>> for OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
    S: BuildHasher,
{
    fn eq(&self, other: &HashSet<V, S>) -> bool {
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<V, C, S> PartialEq<OrderedSet<V, C>> for HashSet<V, S>
where
    V: Hash + Eq + Clone,
    C: Clock,
    S: BuildHasher,
{
    fn eq(&self, other: &OrderedSet<V, C>) -> bool {
        other == self
    }
}

// =============================================================================
// Operators
// =============================================================================

macro_rules! impl_set_operator {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl<V, C> $trait<&OrderedSet<V, C>> for &OrderedSet<V, C>
            where
                V: Hash + Eq + Clone,
                C: Clock,
            {
                type Output = OrderedSet<V, C>;

                fn $method(self, rhs: &OrderedSet<V, C>) -> OrderedSet<V, C> {
                    self.$op(rhs)
                }
            }

            impl<V, C, S> $trait<&HashSet<V, S>> for &OrderedSet<V, C>
            where
                V: Hash + Eq + Clone,
                C: Clock,
            {
                type Output = OrderedSet<V, C>;

                fn $method(self, rhs: &HashSet<V, S>) -> OrderedSet<V, C> {
                    self.$op(rhs)
                }
            }
        )*
    };
}

impl_set_operator! {
    BitOr::bitor => union,
    BitAnd::bitand => intersection,
    Sub::sub => difference,
    BitXor::bitxor => symmetric_difference,
}
