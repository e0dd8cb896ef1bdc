//! Mutual exclusion paired with condition-variable waiter sets.
//!
//! A [`Monitor`] guards one state value behind a mutex; a [`Condition`] is a
//! waiter set bound to one predicate over that state. One monitor may serve
//! several conditions (a queue pairs "not empty" and "not full" over the
//! same state), but a condition must only ever be used with one monitor.
//!
//! # Waiting
//!
//! Waiting always goes through [`Condition::wait_while`] or
//! [`Condition::wait_timeout_while`], which re-check the predicate in a loop
//! after every wake. A single wake never implies the condition holds: the
//! platform may wake a waiter spuriously, and another thread may have
//! consumed the state between the notify and the re-acquire.
//!
//! # Notification
//!
//! [`Condition::notify_one`] and [`Condition::notify_all`] may be called
//! with or without the lock held. The mutation the notification announces
//! must itself have been made through a [`MonitorGuard`], so the woken
//! thread observes it once it re-acquires the lock. `notify_one` is for
//! "one unit of work became available"; `notify_all` is for state
//! transitions that affect an unknown number of waiters.
//!
//! # Poisoning
//!
//! A poisoned lock means a thread panicked while holding the guard and the
//! guarded invariant can no longer be trusted. That is a broken contract,
//! not a runtime condition: every operation here panics on poison instead
//! of returning a recoverable error.

use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A mutex-guarded state value with scoped acquisition.
///
/// The guarded state may only be read or written through the guard returned
/// by [`Monitor::lock`], so every access happens under the lock. The lock is
/// an explicit owned resource of whatever structure embeds the monitor,
/// never a process-wide singleton.
#[derive(Debug)]
pub struct Monitor<T> {
    state: Mutex<T>,
}

/// Outcome of a time-bounded wait.
///
/// Callers must distinguish "the predicate cleared" from "the deadline
/// elapsed first"; whether the surrounding structure is closed is part of
/// the predicate and reported by the caller, not by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The awaited predicate no longer holds; the wait is over.
    Satisfied,
    /// The deadline elapsed while the predicate still held.
    TimedOut,
}

impl WaitOutcome {
    /// Returns true if the wait ended because the deadline elapsed.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

impl<T> Monitor<T> {
    /// Creates a monitor guarding `state`.
    #[must_use]
    pub const fn new(state: T) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Acquires the lock, blocking the calling thread until it is free.
    ///
    /// The returned guard releases the lock on every exit path of the scope
    /// that acquired it: normal return, early return, or unwind.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn lock(&self) -> MonitorGuard<'_, T> {
        MonitorGuard {
            inner: self.state.lock().expect("monitor lock poisoned"),
        }
    }

    /// Returns a mutable reference to the guarded state.
    ///
    /// Exclusive access through `&mut self` means no lock is needed.
    pub fn get_mut(&mut self) -> &mut T {
        self.state.get_mut().expect("monitor lock poisoned")
    }

    /// Consumes the monitor and returns the guarded state.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.state.into_inner().expect("monitor lock poisoned")
    }
}

/// Scoped access to a monitor's guarded state.
///
/// Dereferences to the state; dropping the guard releases the lock.
#[derive(Debug)]
pub struct MonitorGuard<'a, T> {
    inner: MutexGuard<'a, T>,
}

impl<T> Deref for MonitorGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for MonitorGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

/// A waiter set bound to one predicate over a monitor's state.
///
/// Waiting with guards from two different monitors is a contract violation;
/// the platform aborts the wait with a panic.
#[derive(Debug, Default)]
pub struct Condition {
    cvar: Condvar,
}

impl Condition {
    /// Creates an empty waiter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cvar: Condvar::new(),
        }
    }

    /// Blocks the calling thread while `condition` holds.
    ///
    /// Atomically releases the lock and suspends; upon each wake the lock is
    /// re-acquired and `condition` re-checked, so spurious wakeups never
    /// leak out. Returns the guard once `condition` is false.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn wait_while<'a, T>(
        &self,
        mut guard: MonitorGuard<'a, T>,
        mut condition: impl FnMut(&mut T) -> bool,
    ) -> MonitorGuard<'a, T> {
        while condition(&mut guard.inner) {
            guard.inner = self.cvar.wait(guard.inner).expect("monitor lock poisoned");
        }
        guard
    }

    /// Blocks the calling thread while `condition` holds, up to `timeout`.
    ///
    /// Returns [`WaitOutcome::Satisfied`] as soon as `condition` is false,
    /// or [`WaitOutcome::TimedOut`] if the deadline elapses while it still
    /// holds. The guard is returned either way, so the caller can read the
    /// state that decided the outcome before releasing the lock.
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    pub fn wait_timeout_while<'a, T>(
        &self,
        mut guard: MonitorGuard<'a, T>,
        timeout: Duration,
        mut condition: impl FnMut(&mut T) -> bool,
    ) -> (MonitorGuard<'a, T>, WaitOutcome) {
        let deadline = Instant::now() + timeout;
        loop {
            if !condition(&mut guard.inner) {
                return (guard, WaitOutcome::Satisfied);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return (guard, WaitOutcome::TimedOut);
            }
            guard.inner = self
                .cvar
                .wait_timeout(guard.inner, remaining)
                .expect("monitor lock poisoned")
                .0;
        }
    }

    /// Wakes at most one waiter.
    pub fn notify_one(&self) {
        self.cvar.notify_one();
    }

    /// Wakes all waiters.
    pub fn notify_all(&self) {
        self.cvar.notify_all();
    }
}
