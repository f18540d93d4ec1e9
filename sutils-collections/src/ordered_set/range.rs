//! Marker range queries and range-driven bulk removal.
//!
//! | Query    | Keeps elements whose marker is |
//! |----------|--------------------------------|
//! | `before` | `< m`                          |
//! | `until`  | `<= m`                         |
//! | `after`  | `> m`                          |
//! | `since`  | `>= m`                         |
//!
//! Queries return a new set with the original markers and relative order.
//! Each is a linear scan of the chain.

use core::hash::Hash;

use super::OrderedSet;
use crate::marker::Clock;
use crate::Error;

impl<V, C> OrderedSet<V, C>
where
    V: Hash + Eq + Clone,
    C: Clock,
{
    fn select<F>(&self, keep: F) -> Self
    where
        F: Fn(&C::Marker) -> bool,
    {
        let mut out = self.empty_like();
        for (value, marker) in self.entries() {
            if keep(&marker) {
                out.insert_at(value.clone(), marker);
            }
        }
        out
    }

    fn matching<F>(&self, keep: F) -> Vec<V>
    where
        F: Fn(&C::Marker) -> bool,
    {
        self.entries()
            .filter(|(_, marker)| keep(marker))
            .map(|(value, _)| value.clone())
            .collect()
    }

    /// Elements added strictly before `marker`.
    pub fn before(&self, marker: C::Marker) -> Self {
        self.select(|m| *m < marker)
    }

    /// Elements added before or at `marker`.
    pub fn until(&self, marker: C::Marker) -> Self {
        self.select(|m| *m <= marker)
    }

    /// Elements added strictly after `marker`.
    pub fn after(&self, marker: C::Marker) -> Self {
        self.select(|m| *m > marker)
    }

    /// Elements added at or after `marker`.
    pub fn since(&self, marker: C::Marker) -> Self {
        self.select(|m| *m >= marker)
    }

    /// Removes every element [`before`](Self::before) `marker`.
    ///
    /// Returns the number of elements removed. `discard` selects the
    /// absence-tolerant removal policy, as in
    /// [`remove_items`](Self::remove_items).
    pub fn remove_before(&mut self, marker: C::Marker, discard: bool) -> Result<usize, Error> {
        let matched = self.matching(|m| *m < marker);
        self.remove_items(matched, discard)
    }

    /// Removes every element [`until`](Self::until) `marker`.
    pub fn remove_until(&mut self, marker: C::Marker, discard: bool) -> Result<usize, Error> {
        let matched = self.matching(|m| *m <= marker);
        self.remove_items(matched, discard)
    }

    /// Removes every element [`after`](Self::after) `marker`.
    pub fn remove_after(&mut self, marker: C::Marker, discard: bool) -> Result<usize, Error> {
        let matched = self.matching(|m| *m > marker);
        self.remove_items(matched, discard)
    }

    /// Removes every element [`since`](Self::since) `marker`.
    pub fn remove_since(&mut self, marker: C::Marker, discard: bool) -> Result<usize, Error> {
        let matched = self.matching(|m| *m >= marker);
        self.remove_items(matched, discard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::Marker;
    use std::collections::HashSet;

    fn values(set: &OrderedSet<i32>) -> Vec<i32> {
        set.iter().copied().collect()
    }

    /// `1, 8` added, then a boundary, then `2..=6`.
    fn two_batches() -> (OrderedSet<i32>, Marker) {
        let mut set = OrderedSet::new();
        set.add(1);
        set.add(8);
        let boundary = Marker::now();
        for value in 2..=6 {
            set.add(value);
        }
        (set, boundary)
    }

    #[test]
    fn before_and_after_boundary() {
        let (set, boundary) = two_batches();

        let before = set.before(boundary);
        assert_eq!(before, HashSet::from([8, 1]));
        for value in &before {
            assert_eq!(set.time(value), before.time(value));
        }

        let after = set.after(boundary);
        assert_eq!(values(&after), vec![2, 3, 4, 5, 6]);
        for value in &after {
            assert_eq!(set.time(value), after.time(value));
        }
    }

    #[test]
    fn inclusive_and_exclusive_bounds() {
        let (set, _) = two_batches();

        assert_eq!(set.before(set.time(&8).unwrap()), HashSet::from([1]));
        assert_eq!(set.until(set.time(&8).unwrap()), HashSet::from([1, 8]));
        assert_eq!(set.after(set.time(&3).unwrap()), HashSet::from([4, 5, 6]));
        assert_eq!(set.since(set.time(&3).unwrap()), HashSet::from([3, 4, 5, 6]));
    }

    #[test]
    fn range_results_keep_order() {
        let (set, _) = two_batches();
        let since = set.since(set.time(&8).unwrap());
        assert_eq!(values(&since), vec![8, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn range_results_keep_markers_in_iteration_order() {
        let (set, boundary) = two_batches();
        let after = set.after(boundary);

        let markers: Vec<Marker> = after.entries().map(|(_, m)| m).collect();
        assert!(markers.windows(2).all(|w| w[0] < w[1]));
        for (value, marker) in after.entries() {
            assert_eq!(set.time(value).unwrap(), marker);
        }
    }

    #[test]
    fn empty_ranges() {
        let (set, _) = two_batches();
        let earliest = set.time(&1).unwrap();
        let latest = set.time(&6).unwrap();

        assert!(set.before(earliest).is_empty());
        assert!(set.after(latest).is_empty());
        assert_eq!(set.until(latest).len(), set.len());
        assert_eq!(set.since(earliest).len(), set.len());
    }

    #[test]
    fn set_time_moves_element_between_ranges() {
        let (mut set, boundary) = two_batches();

        set.set_time(&1, Marker::now()).unwrap();

        assert_eq!(set.before(boundary), HashSet::from([8]));
        assert!(set.after(boundary).contains(&1));
        // Position unchanged
        assert_eq!(set.first(), Ok(&1));
    }

    fn five() -> OrderedSet<i32> {
        let mut set: OrderedSet<i32> = [1, 2, 3].into_iter().collect();
        set.remove(&2).unwrap();
        set.add(4);
        set.add(5);
        set
    }

    #[test]
    fn remove_before_marker() {
        let mut set = five();
        let m = set.time(&4).unwrap();
        assert_eq!(set.remove_before(m, false), Ok(2));
        assert_eq!(set, HashSet::from([4, 5]));
    }

    #[test]
    fn remove_after_marker() {
        let mut set = five();
        let m = set.time(&4).unwrap();
        assert_eq!(set.remove_after(m, false), Ok(1));
        assert_eq!(set, HashSet::from([1, 3, 4]));
    }

    #[test]
    fn remove_until_marker() {
        let mut set = five();
        let m = set.time(&4).unwrap();
        assert_eq!(set.remove_until(m, false), Ok(3));
        assert_eq!(set, HashSet::from([5]));
    }

    #[test]
    fn remove_since_marker() {
        let mut set = five();
        let m = set.time(&4).unwrap();
        assert_eq!(set.remove_since(m, true), Ok(2));
        assert_eq!(values(&set), vec![1, 3]);
    }

    #[test]
    fn bulk_removal_on_empty_range() {
        let mut set = five();
        let earliest = set.time(&1).unwrap();
        assert_eq!(set.remove_before(earliest, false), Ok(0));
        assert_eq!(set.len(), 4);
    }
}
