//! A single-consumer dispatch queue with graceful drain.
//!
//! Any number of threads enqueue work items; one dedicated consumer thread
//! dequeues them in FIFO order and hands each to a registered callback.
//!
//! ```text
//! Producer ─┐
//! Producer ─┼──► Mutex<VecDeque<T> + State> ──► consumer thread ──► callback(item)
//! Producer ─┘          (unbounded)                (one per queue)
//! ```
//!
//! # Idle Consumer
//!
//! The consumer never spins indefinitely and rarely costs producers a
//! syscall:
//!
//! ```text
//! Phase 1: Fast path       pop immediately
//! Phase 2: Backoff         Backoff::snooze() x snooze_iters (default 8)
//! Phase 3: Park            set consumer_parked, re-check, park()
//!
//! add():  push under lock -> if consumer_parked { unpark() }
//! ```
//!
//! The parked flag is a `SeqCst` store before the final re-check, and
//! producers load it with `SeqCst` after releasing the lock. If the
//! consumer's re-check ran before a push, the producer's load is ordered
//! after the flag store and sees it set.
//!
//! # Shutdown
//!
//! | Call | Queued items | Returns when |
//! |------|--------------|--------------|
//! | [`DispatchQueue::stop`] | discarded | consumer finished its current item |
//! | [`DispatchQueue::wait`] | dispatched | queue is empty and consumer exited |
//! | drop | dispatched | as `wait` |
//!
//! Both report a [`Shutdown`] summary. Adds fail with [`AddError`] as soon as
//! either has been requested. `wait` on a queue that was never started
//! starts it first. If the callback panics, queued items are discarded and
//! the counts stay available from [`DispatchQueue::summary`].
//!
//! # Argument Binding
//!
//! Queues of [`serde_json::Value`] can bind each item to the callback as
//! [`Args`] under an [`ArgsMode`]. See [`args`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::thread;
//! use sutils_dispatch::DispatchQueue;
//!
//! let count = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&count);
//! let mut queue = DispatchQueue::new(move |_: String| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//! });
//! queue.start().unwrap();
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let producer = queue.producer();
//!         thread::spawn(move || producer.add(format!("from {t}")).unwrap())
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! queue.wait().unwrap();
//! assert_eq!(count.load(Ordering::Relaxed), 4);
//! ```

#![warn(missing_docs)]

pub mod args;
mod config;
mod error;
mod queue;

pub use args::{Args, ArgsMode};
pub use config::{DEFAULT_SNOOZE_ITERS, DEFAULT_THREAD_NAME, DispatchConfig};
pub use error::{AddError, Error};
pub use queue::{DispatchQueue, Producer, Shutdown, State};
