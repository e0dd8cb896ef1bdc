//! Blocking FIFO queue for inter-thread handoff.
//!
//! [`BlockingQueue`] hands elements from producer threads to consumer
//! threads in FIFO order. Every access to the internal sequence and the
//! closed flag goes through one [`Monitor`] — there is no lock-free fast
//! path. Producers block when a bounded queue is full; consumers block when
//! the queue is empty; [`BlockingQueue::close`] wakes everyone so shutdown
//! never strands a waiter.
//!
//! # Closure
//!
//! Closing is a one-way transition. A closed queue rejects new elements but
//! keeps already-queued elements poppable: consumers drain the backlog and
//! only then see [`PopError::Closed`]. A producer blocked on a full bounded
//! queue observes closure promptly instead of waiting for space that will
//! never be claimed.
//!
//! # Sharing
//!
//! The queue handle is cheaply cloneable; all clones address the same
//! queue. The internal state lives as long as any handle does, so no thread
//! can be blocked inside the monitor when it is torn down.
//!
//! # Example
//!
//! ```
//! use handoff::BlockingQueue;
//!
//! let queue = BlockingQueue::new();
//! let consumer = queue.clone();
//!
//! let worker = std::thread::spawn(move || {
//!     let mut received = Vec::new();
//!     while let Ok(item) = consumer.pop() {
//!         received.push(item);
//!     }
//!     received
//! });
//!
//! queue.push(1).expect("queue open");
//! queue.push(2).expect("queue open");
//! queue.close();
//!
//! assert_eq!(worker.join().unwrap(), vec![1, 2]);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::QueueConfig;
use crate::error::{PopError, PushError, TryPushError};
use crate::monitor::{Condition, Monitor};

/// Queue state guarded by the monitor.
#[derive(Debug)]
struct QueueState<T> {
    /// Buffered elements in arrival order.
    items: VecDeque<T>,
    /// Whether the queue has been shut down.
    closed: bool,
}

/// Shared state plus the waiter sets for each blocking predicate.
struct Shared<T> {
    /// Protected queue state.
    state: Monitor<QueueState<T>>,
    /// Notifies consumers when an element becomes available.
    not_empty: Condition,
    /// Notifies producers when space frees up (bounded queues only).
    not_full: Condition,
    /// Capacity bound; `None` means unbounded.
    capacity: Option<usize>,
    /// Diagnostic name carried into lifecycle events.
    name: String,
}

/// A thread-safe FIFO queue with blocking push/pop and graceful shutdown.
pub struct BlockingQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> BlockingQueue<T> {
    /// Creates an unbounded queue with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    /// Creates a bounded queue holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be non-zero");
        Self::with_config(QueueConfig {
            capacity,
            ..QueueConfig::default()
        })
    }

    /// Creates a queue from an explicit configuration.
    ///
    /// The configuration is normalized first; a capacity of 0 means
    /// unbounded.
    #[must_use]
    pub fn with_config(mut config: QueueConfig) -> Self {
        config.normalize();
        let capacity = (config.capacity > 0).then_some(config.capacity);
        Self {
            shared: Arc::new(Shared {
                state: Monitor::new(QueueState {
                    items: VecDeque::new(),
                    closed: false,
                }),
                not_empty: Condition::new(),
                not_full: Condition::new(),
                capacity,
                name: config.name,
            }),
        }
    }

    /// Appends an element to the tail, blocking while a bounded queue is
    /// full.
    ///
    /// Wakes one consumer blocked in [`pop`](Self::pop) once the element is
    /// queued.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Closed`] with the rejected element if the queue
    /// is closed — including when closure happens while this call is
    /// waiting for space.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.shared.state.lock();
        if let Some(capacity) = self.shared.capacity {
            state = self
                .shared
                .not_full
                .wait_while(state, |s| !s.closed && s.items.len() >= capacity);
        }
        if state.closed {
            return Err(PushError::Closed(item));
        }
        state.items.push_back(item);
        drop(state);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// As [`push`](Self::push), but gives up after `timeout`.
    ///
    /// An unbounded queue never waits, so the timeout only applies to
    /// bounded queues.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Closed`] if the queue is closed, or
    /// [`PushError::TimedOut`] with the rejected element if no space
    /// appeared in time.
    pub fn push_timeout(&self, item: T, timeout: Duration) -> Result<(), PushError<T>> {
        let mut state = self.shared.state.lock();
        if let Some(capacity) = self.shared.capacity {
            let (guard, outcome) = self.shared.not_full.wait_timeout_while(
                state,
                timeout,
                |s| !s.closed && s.items.len() >= capacity,
            );
            state = guard;
            if outcome.timed_out() {
                return Err(PushError::TimedOut(item));
            }
        }
        if state.closed {
            return Err(PushError::Closed(item));
        }
        state.items.push_back(item);
        drop(state);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Appends an element without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TryPushError::Closed`] if the queue is closed, or
    /// [`TryPushError::Full`] if a bounded queue is at capacity.
    pub fn try_push(&self, item: T) -> Result<(), TryPushError<T>> {
        let mut state = self.shared.state.lock();
        if state.closed {
            return Err(TryPushError::Closed(item));
        }
        if let Some(capacity) = self.shared.capacity {
            if state.items.len() >= capacity {
                return Err(TryPushError::Full(item));
            }
        }
        state.items.push_back(item);
        drop(state);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Removes and returns the head element, blocking while the queue is
    /// empty and open.
    ///
    /// Elements queued before [`close`](Self::close) are still delivered;
    /// closure is only reported once the queue has drained. On a bounded
    /// queue, a successful pop wakes one producer blocked in
    /// [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// Returns [`PopError::Closed`] once the queue is closed and empty.
    pub fn pop(&self) -> Result<T, PopError> {
        let state = self.shared.state.lock();
        let mut state = self
            .shared
            .not_empty
            .wait_while(state, |s| s.items.is_empty() && !s.closed);
        match state.items.pop_front() {
            Some(item) => {
                drop(state);
                if self.shared.capacity.is_some() {
                    self.shared.not_full.notify_one();
                }
                Ok(item)
            }
            None => Err(PopError::Closed),
        }
    }

    /// As [`pop`](Self::pop), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`PopError::Closed`] once the queue is closed and empty, or
    /// [`PopError::TimedOut`] if no element arrived in time. Callers can
    /// distinguish all three outcomes.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, PopError> {
        let state = self.shared.state.lock();
        let (mut state, outcome) = self
            .shared
            .not_empty
            .wait_timeout_while(state, timeout, |s| s.items.is_empty() && !s.closed);
        if outcome.timed_out() {
            return Err(PopError::TimedOut);
        }
        match state.items.pop_front() {
            Some(item) => {
                drop(state);
                if self.shared.capacity.is_some() {
                    self.shared.not_full.notify_one();
                }
                Ok(item)
            }
            None => Err(PopError::Closed),
        }
    }

    /// Removes and returns the head element without waiting.
    ///
    /// Returns `None` when nothing is queued, whether or not the queue is
    /// closed; use [`pop`](Self::pop) or [`is_closed`](Self::is_closed) to
    /// observe closure.
    #[must_use]
    pub fn try_pop(&self) -> Option<T> {
        let mut state = self.shared.state.lock();
        let item = state.items.pop_front()?;
        drop(state);
        if self.shared.capacity.is_some() {
            self.shared.not_full.notify_one();
        }
        Some(item)
    }

    /// Closes the queue and wakes every blocked producer and consumer.
    ///
    /// Already-queued elements remain poppable. Returns true if this call
    /// performed the open-to-closed transition; closing an already-closed
    /// queue is a no-op.
    pub fn close(&self) -> bool {
        let mut state = self.shared.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        let backlog = state.items.len();
        drop(state);
        tracing::debug!(queue = %self.shared.name, backlog, "queue closed");
        self.shared.not_empty.notify_all();
        self.shared.not_full.notify_all();
        true
    }

    /// Returns the number of queued elements.
    ///
    /// Snapshot under the lock; advisory only — it may be stale the instant
    /// it returns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state.lock().items.len()
    }

    /// Returns true if no elements are queued. Advisory, like
    /// [`len`](Self::len).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().items.is_empty()
    }

    /// Returns true if the queue has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Returns the capacity bound, or `None` if unbounded.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.shared.capacity
    }

    /// Returns the queue's diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }
}

impl<T> Clone for BlockingQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("BlockingQueue")
            .field("name", &self.shared.name)
            .field("capacity", &self.shared.capacity)
            .field("len", &state.items.len())
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}
