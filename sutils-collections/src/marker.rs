//! Insertion markers and the clocks that issue them.
//!
//! Every element of an [`OrderedSet`](crate::OrderedSet) carries the marker
//! its clock issued when the element was added. Range queries compare those
//! markers, so a clock must hand out values that never go backwards for the
//! range results to follow insertion order.
//!
//! ```text
//! LogicalClock  - process-wide u64 counter, strictly increasing (default)
//! SystemClock   - wall-clock SystemTime, human readable, may jump backwards
//! ```

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Source of insertion markers.
pub trait Clock: Clone {
    /// Totally ordered token recorded at insertion.
    type Marker: Copy + Ord + fmt::Debug;

    /// Issues the marker for an insertion happening now.
    fn now(&self) -> Self::Marker;
}

/// Next value handed out by [`Marker::now`]. Shared by every set in the
/// process so markers from different sets compare meaningfully.
static NEXT_MARKER: AtomicU64 = AtomicU64::new(0);

/// Opaque logical timestamp issued by [`LogicalClock`].
///
/// Markers are strictly increasing in the order they are drawn, across all
/// threads and all sets.
///
/// # Example
///
/// ```
/// use sutils_collections::Marker;
///
/// let a = Marker::now();
/// let b = Marker::now();
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marker(u64);

impl Marker {
    /// Draws a fresh marker, later than every marker drawn before it.
    ///
    /// Useful as a range boundary between two batches of insertions.
    #[inline]
    pub fn now() -> Self {
        Self(NEXT_MARKER.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuilds a marker from its raw counter value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The default clock: a strictly monotonic logical counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicalClock;

impl Clock for LogicalClock {
    type Marker = Marker;

    #[inline]
    fn now(&self) -> Marker {
        Marker::now()
    }
}

/// Wall-clock markers for audit trails.
///
/// Two insertions within the clock's resolution share a marker, and clock
/// adjustments can move markers backwards. Range queries over these markers
/// are only as trustworthy as the system clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Marker = SystemTime;

    #[inline]
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
