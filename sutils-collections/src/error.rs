//! Error types for collection operations.

use thiserror::Error;

/// Errors returned by [`OrderedSet`](crate::OrderedSet) and
/// [`LruCache`](crate::LruCache).
///
/// All of these are synchronous contract violations reported at the call
/// site; nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested value or key is not present.
    #[error("element not found")]
    NotFound,

    /// `pop` or `first` on an empty set.
    #[error("container is empty")]
    EmptyContainer,

    /// A constructor argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
