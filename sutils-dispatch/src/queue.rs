use core::fmt;
use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_utils::sync::{Parker, Unparker};
use crossbeam_utils::{Backoff, CachePadded};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::{AddError, Args, ArgsMode, DispatchConfig, Error};

type Handler<T> = Box<dyn FnMut(T) -> Result<(), Error> + Send>;

/// Lifecycle of a [`DispatchQueue`].
///
/// ```text
/// Created ──start──► Running ──wait──► Draining ──(queue empty)──► Stopped
///    │ │                │                    ▲                       ▲
///    │ └──wait (starts)─┼────────────────────┘                       │
///    └───────stop───────┴──────────────────stop──────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Accepting items; no consumer yet.
    Created,
    /// Consumer is dispatching.
    Running,
    /// Consumer is finishing the remaining items; adds are rejected.
    Draining,
    /// Consumer has exited or was never started.
    Stopped,
}

impl State {
    /// Returns `true` once the queue rejects new items.
    pub fn is_closed(self) -> bool {
        matches!(self, State::Draining | State::Stopped)
    }
}

/// Outcome counts reported when a queue shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shutdown {
    /// Items handed to the callback.
    pub dispatched: usize,
    /// Items still queued when a hard stop was signaled or the consumer
    /// died, dropped unseen.
    pub discarded: usize,
    /// Items the callback refused because their shape did not fit the
    /// binding mode.
    pub rejected: usize,
}

/// FIFO and lifecycle state, guarded together so the closed check and the
/// enqueue are one critical section.
struct Inner<T> {
    items: VecDeque<T>,
    state: State,
}

/// Running totals. Updated by the consumer as it goes so they survive a
/// panicking callback.
#[derive(Default)]
struct Tally {
    dispatched: AtomicUsize,
    discarded: AtomicUsize,
    rejected: AtomicUsize,
}

impl Tally {
    fn snapshot(&self) -> Shutdown {
        Shutdown {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Shared state between producers and the consumer.
struct Shared<T> {
    inner: Mutex<Inner<T>>,
    tally: Tally,
    consumer_parked: CachePadded<AtomicBool>,
    unparker: Unparker,
}

enum Next<T> {
    Item(T),
    Empty,
    Done,
}

impl<T> Shared<T> {
    fn state(&self) -> State {
        self.inner.lock().state
    }

    fn push(&self, item: T) -> Result<(), AddError<T>> {
        {
            let mut inner = self.inner.lock();
            if inner.state.is_closed() {
                return Err(AddError(item));
            }
            inner.items.push_back(item);
        }
        self.notify_consumer();
        Ok(())
    }

    /// Closes the queue and drops whatever is still buffered, counting it as
    /// discarded.
    fn close_and_discard(&self) -> usize {
        let dropped = {
            let mut inner = self.inner.lock();
            inner.state = State::Stopped;
            mem::take(&mut inner.items)
        };
        self.tally.discarded.fetch_add(dropped.len(), Ordering::Relaxed);
        dropped.len()
    }

    fn take(&self) -> Next<T> {
        let mut inner = self.inner.lock();
        match inner.state {
            State::Created | State::Running => match inner.items.pop_front() {
                Some(item) => Next::Item(item),
                None => Next::Empty,
            },
            State::Draining => match inner.items.pop_front() {
                Some(item) => Next::Item(item),
                None => Next::Done,
            },
            State::Stopped => Next::Done,
        }
    }

    /// Wakes the consumer only if it actually went to sleep.
    #[inline]
    fn notify_consumer(&self) {
        if self.consumer_parked.load(Ordering::SeqCst) {
            self.unparker.unpark();
        }
    }
}

/// A handle for enqueuing items from any thread.
///
/// Cheap to clone. Producers never block beyond the short enqueue critical
/// section since the queue is unbounded.
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Producer<T> {
    /// Enqueues `item` for dispatch.
    ///
    /// Items added before the consumer starts are buffered and dispatched
    /// once it does.
    ///
    /// # Errors
    ///
    /// Returns the item in an [`AddError`] once a stop or drain has been
    /// requested.
    pub fn add(&self, item: T) -> Result<(), AddError<T>> {
        self.shared.push(item)
    }

    /// Returns `true` once a stop or drain has been requested.
    pub fn is_closed(&self) -> bool {
        self.shared.state().is_closed()
    }

    /// Number of items waiting for the consumer.
    pub fn pending(&self) -> usize {
        self.shared.inner.lock().items.len()
    }
}

impl<T> Clone for Producer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// An unbounded FIFO drained by one dedicated consumer thread.
///
/// Items are handed to the callback in the order their enqueue completed.
/// The consumer waits in three phases when idle: an immediate check, a short
/// [`Backoff`] snooze loop, then a park. Producers only issue an unpark when
/// the consumer has flagged itself parked.
///
/// # Shutdown
///
/// - [`stop`](Self::stop): hard stop. Items still queued are discarded.
/// - [`wait`](Self::wait): graceful drain. Every queued item is dispatched
///   before the call returns.
///
/// Dropping a running queue performs a graceful drain.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use sutils_dispatch::DispatchQueue;
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let mut queue = DispatchQueue::new(move |n: u32| sink.lock().unwrap().push(n));
/// queue.start().unwrap();
/// for n in 0..5 {
///     queue.add(n).unwrap();
/// }
///
/// let summary = queue.wait().unwrap();
/// assert_eq!(summary.dispatched, 5);
/// assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
/// ```
pub struct DispatchQueue<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    handler: Option<Handler<T>>,
    parker: Option<Parker>,
    worker: Option<JoinHandle<()>>,
    panicked: bool,
    snooze_iters: usize,
    thread_name: String,
}

impl<T: Send + 'static> DispatchQueue<T> {
    /// Creates a queue that passes each item to `callback`.
    ///
    /// The consumer does not run until [`start`](Self::start).
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Self::with_config(&DispatchConfig::default(), callback)
    }

    /// Creates a queue with custom backoff and thread naming.
    ///
    /// The config's `mode` applies to bound queues only and is ignored here.
    pub fn with_config<F>(config: &DispatchConfig, mut callback: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Self::with_handler(
            config,
            Box::new(move |item: T| -> Result<(), Error> {
                callback(item);
                Ok(())
            }),
        )
    }

    fn with_handler(config: &DispatchConfig, handler: Handler<T>) -> Self {
        let parker = Parker::new();
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                state: State::Created,
            }),
            tally: Tally::default(),
            consumer_parked: CachePadded::new(AtomicBool::new(false)),
            unparker: parker.unparker().clone(),
        });

        Self {
            shared,
            handler: Some(handler),
            parker: Some(parker),
            worker: None,
            panicked: false,
            snooze_iters: config.snooze_iters,
            thread_name: config.thread_name.clone(),
        }
    }

    /// Spawns the consumer thread.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyStarted`] if the consumer is running or draining.
    /// - [`Error::QueueClosed`] if the queue was already stopped.
    /// - [`Error::Spawn`] if the OS could not create the thread. The queue is
    ///   then closed and its buffer counted as discarded.
    pub fn start(&mut self) -> Result<(), Error> {
        {
            let mut inner = self.shared.inner.lock();
            match inner.state {
                State::Created => inner.state = State::Running,
                State::Running | State::Draining => return Err(Error::AlreadyStarted),
                State::Stopped => return Err(Error::QueueClosed),
            }
        }

        let (Some(handler), Some(parker)) = (self.handler.take(), self.parker.take()) else {
            return Err(Error::AlreadyStarted);
        };
        let worker = Worker {
            shared: Arc::clone(&self.shared),
            parker,
            handler,
            snooze_iters: self.snooze_iters,
        };

        let spawned = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || worker.run());

        match spawned {
            Ok(handle) => {
                debug!(thread = %self.thread_name, "dispatch consumer started");
                self.worker = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.shared.close_and_discard();
                Err(Error::Spawn(err))
            }
        }
    }

    /// Enqueues `item`. See [`Producer::add`].
    ///
    /// # Errors
    ///
    /// Returns the item in an [`AddError`] once a stop or drain has been
    /// requested.
    pub fn add(&self, item: T) -> Result<(), AddError<T>> {
        self.shared.push(item)
    }

    /// Returns a cloneable handle for enqueuing from other threads.
    pub fn producer(&self) -> Producer<T> {
        Producer {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.shared.state()
    }

    /// Counts so far.
    ///
    /// Final once [`stop`](Self::stop) or [`wait`](Self::wait) has returned,
    /// including when they return [`Error::WorkerPanicked`]. The item whose
    /// callback panicked is in none of the counts.
    pub fn summary(&self) -> Shutdown {
        self.shared.tally.snapshot()
    }

    /// Hard stop: discards queued items and joins the consumer.
    ///
    /// The item being dispatched when the stop is observed completes; nothing
    /// after it is dispatched. Calling `stop` again returns the same summary.
    ///
    /// # Errors
    ///
    /// [`Error::WorkerPanicked`] if the callback panicked. The counts are
    /// still available from [`summary`](Self::summary).
    pub fn stop(&mut self) -> Result<Shutdown, Error> {
        let discarded = self.shared.close_and_discard();
        debug!(discarded, "dispatch stop requested");

        self.finish()
    }

    /// Graceful drain: dispatches every queued item, then joins the consumer.
    ///
    /// A queue that was never started is started first, so items buffered
    /// before `start` are dispatched too.
    ///
    /// # Errors
    ///
    /// - [`Error::Spawn`] if the consumer had to be started and could not be.
    /// - [`Error::WorkerPanicked`] if the callback panicked. Items left
    ///   behind are counted as discarded in [`summary`](Self::summary).
    pub fn wait(&mut self) -> Result<Shutdown, Error> {
        if self.state() == State::Created {
            self.start()?;
        }

        {
            let mut inner = self.shared.inner.lock();
            if inner.state == State::Running {
                inner.state = State::Draining;
                debug!(pending = inner.items.len(), "dispatch drain requested");
            }
        }

        self.finish()
    }

    /// Starts the consumer, runs `f` with a producer, then drains.
    ///
    /// Every item added inside `f` has been dispatched when this returns. If
    /// `f` panics the queue is still drained while unwinding.
    ///
    /// # Errors
    ///
    /// Any error from [`start`](Self::start) or [`wait`](Self::wait).
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicU64, Ordering};
    /// use sutils_dispatch::DispatchQueue;
    ///
    /// let total = Arc::new(AtomicU64::new(0));
    /// let sum = Arc::clone(&total);
    /// let queue = DispatchQueue::new(move |n: u64| {
    ///     sum.fetch_add(n, Ordering::Relaxed);
    /// });
    ///
    /// let ((), summary) = queue
    ///     .scoped(|producer| {
    ///         for n in 1..=10 {
    ///             producer.add(n).unwrap();
    ///         }
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(summary.dispatched, 10);
    /// assert_eq!(total.load(Ordering::Relaxed), 55);
    /// ```
    pub fn scoped<R, F>(mut self, f: F) -> Result<(R, Shutdown), Error>
    where
        F: FnOnce(&Producer<T>) -> R,
    {
        self.start()?;
        let producer = self.producer();
        let out = f(&producer);
        let summary = self.wait()?;
        Ok((out, summary))
    }

    fn finish(&mut self) -> Result<Shutdown, Error> {
        self.shared.unparker.unpark();

        if let Some(handle) = self.worker.take() {
            self.panicked = handle.join().is_err();
        }

        if self.panicked {
            return Err(Error::WorkerPanicked);
        }
        Ok(self.summary())
    }
}

impl DispatchQueue<Value> {
    /// Creates a queue of dynamic items bound to the callback under `mode`.
    ///
    /// Items of the wrong shape are not passed to the callback; they are
    /// logged and counted in [`Shutdown::rejected`]. The shape is checked on
    /// the consumer thread, so [`add`](Self::add) accepts any value. Use
    /// [`ArgsMode::accepts`] to check an item before enqueuing it.
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    /// use sutils_dispatch::{Args, ArgsMode, DispatchQueue};
    ///
    /// let mut queue = DispatchQueue::bound(ArgsMode::Positional, |args| {
    ///     assert!(matches!(args, Args::Positional(_)));
    /// });
    /// queue.start().unwrap();
    /// queue.add(json!([1, "x"])).unwrap();
    /// queue.add(json!({ "a": 1 })).unwrap();
    ///
    /// let summary = queue.wait().unwrap();
    /// assert_eq!((summary.dispatched, summary.rejected), (1, 1));
    /// ```
    pub fn bound<F>(mode: ArgsMode, callback: F) -> Self
    where
        F: FnMut(Args) + Send + 'static,
    {
        let config = DispatchConfig {
            mode,
            ..DispatchConfig::default()
        };
        Self::bound_with_config(&config, callback)
    }

    /// Like [`bound`](Self::bound), taking the mode from `config`.
    pub fn bound_with_config<F>(config: &DispatchConfig, mut callback: F) -> Self
    where
        F: FnMut(Args) + Send + 'static,
    {
        let mode = config.mode;
        Self::with_handler(
            config,
            Box::new(move |item: Value| -> Result<(), Error> {
                callback(mode.bind(item)?);
                Ok(())
            }),
        )
    }
}

impl<T: Send + 'static> Drop for DispatchQueue<T> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(err) = self.wait() {
                warn!(error = %err, "dispatch queue dropped after consumer failure");
            }
        }
    }
}

impl<T: Send + 'static> fmt::Debug for DispatchQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("state", &self.state())
            .field("thread_name", &self.thread_name)
            .field("summary", &self.summary())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Consumer
// ============================================================================

struct Worker<T> {
    shared: Arc<Shared<T>>,
    parker: Parker,
    handler: Handler<T>,
    snooze_iters: usize,
}

/// Closes the queue when the consumer exits, including by panic. Anything
/// still buffered is dropped and counted so producers see the queue closed
/// and empty.
struct ExitGuard<'a, T>(&'a Shared<T>);

impl<T> Drop for ExitGuard<'_, T> {
    fn drop(&mut self) {
        let stranded = self.0.close_and_discard();
        if stranded > 0 {
            warn!(discarded = stranded, "dispatch consumer exited with items queued");
        }
    }
}

impl<T> Worker<T> {
    fn run(mut self) {
        let shared = Arc::clone(&self.shared);
        let _guard = ExitGuard(&shared);
        let tally = &shared.tally;
        let mut seq: u64 = 0;

        while let Some(item) = self.recv() {
            trace!(seq, "dispatching item");
            seq += 1;
            match (self.handler)(item) {
                Ok(()) => {
                    tally.dispatched.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    warn!(error = %err, "dispatch item rejected");
                    tally.rejected.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        debug!(
            dispatched = tally.dispatched.load(Ordering::Relaxed),
            rejected = tally.rejected.load(Ordering::Relaxed),
            "dispatch consumer exiting"
        );
    }

    /// Next item, or `None` once stopped or drained.
    fn recv(&mut self) -> Option<T> {
        // Fast path
        match self.shared.take() {
            Next::Item(item) => return Some(item),
            Next::Done => return None,
            Next::Empty => {}
        }

        // Backoff phase
        let backoff = Backoff::new();
        for _ in 0..self.snooze_iters {
            backoff.snooze();

            match self.shared.take() {
                Next::Item(item) => return Some(item),
                Next::Done => return None,
                Next::Empty => {}
            }
        }

        // Park phase
        loop {
            self.shared.consumer_parked.store(true, Ordering::SeqCst);

            // Check after signaling - prevents missed wakeup race
            match self.shared.take() {
                Next::Item(item) => {
                    self.shared.consumer_parked.store(false, Ordering::Relaxed);
                    return Some(item);
                }
                Next::Done => {
                    self.shared.consumer_parked.store(false, Ordering::Relaxed);
                    return None;
                }
                Next::Empty => {}
            }

            self.parker.park();
            self.shared.consumer_parked.store(false, Ordering::Relaxed);
        }
    }
}
