use core::fmt;

use thiserror::Error;

/// Errors produced by the dispatch queue.
#[derive(Debug, Error)]
pub enum Error {
    /// A mode name or code was not recognized, or an item had the wrong
    /// shape for the configured binding mode.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The queue no longer accepts items.
    #[error("queue is closed")]
    QueueClosed,

    /// `start` was called on a queue whose consumer already runs.
    #[error("consumer already started")]
    AlreadyStarted,

    /// The callback panicked and the consumer thread died. Counts up to that
    /// point are available from `DispatchQueue::summary`.
    #[error("consumer thread panicked")]
    WorkerPanicked,

    /// The OS refused to spawn the consumer thread.
    #[error("failed to spawn consumer thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Error returned when adding to a closed queue.
///
/// Contains the rejected item so the caller can recover it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AddError<T>(pub T);

impl<T> AddError<T> {
    /// Returns the item that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for AddError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AddError(..)")
    }
}

impl<T> fmt::Display for AddError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is closed")
    }
}

impl<T> std::error::Error for AddError<T> {}

impl<T> From<AddError<T>> for Error {
    fn from(_: AddError<T>) -> Self {
        Error::QueueClosed
    }
}
