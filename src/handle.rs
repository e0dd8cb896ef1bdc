//! Strong/weak ownership handles and the observer registry.
//!
//! A value that must be reachable from other threads is published as a
//! [`StrongHandle`]; other threads hold a [`WeakHandle`] and promote it with
//! [`WeakHandle::upgrade`] immediately before each use. Promotion is
//! all-or-nothing: it either yields a strong handle that keeps the value
//! alive for the duration of the use, or `None` once the value is gone.
//! No thread ever holds a raw, lifetime-untracked identity.
//!
//! # Publication Order
//!
//! A weak handle can only be minted from an existing strong handle, and a
//! strong handle only wraps a fully constructed value. There is no way to
//! publish an identity from inside a constructor, so no observer can invoke
//! a method on a value before its construction completed.
//!
//! # Destruction
//!
//! The value is destroyed exactly once, when the last strong handle drops.
//! The destruction gate is the atomic owning count inside the handle — a
//! resource external to the value, so teardown never depends on state the
//! destructor itself is tearing down. Destruction happens-before any
//! subsequent failed promotion: a `None` from `upgrade` is always an
//! after-the-fact observation, never a prediction.
//!
//! # Handles vs. Referents
//!
//! Handles protect the referent's lifetime, not the handle variable's
//! storage: any number of threads may `clone` and `upgrade` handles to the
//! same value without external locking, but a single handle *variable*
//! mutated from several threads needs its own synchronization, like any
//! other variable.

use std::fmt;
use std::sync::{Arc, Mutex, Weak};

/// An owning reference that keeps its referent alive.
///
/// Cloning atomically increments the owning count; dropping decrements it.
/// Dereferences to the underlying value.
pub struct StrongHandle<T> {
    inner: Arc<T>,
}

impl<T> StrongHandle<T> {
    /// Publishes a fully constructed value, returning its first owning
    /// handle.
    ///
    /// Weak handles are minted afterwards with
    /// [`downgrade`](Self::downgrade), never during construction of
    /// `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Creates a non-owning observer of the referent.
    #[must_use]
    pub fn downgrade(&self) -> WeakHandle<T> {
        WeakHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Returns the current number of owning handles.
    ///
    /// Advisory: in the presence of concurrent clones and drops the count
    /// may be stale the instant it returns.
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns true if `self` and `other` refer to the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for StrongHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::ops::Deref for StrongHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for StrongHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StrongHandle").field(&self.inner).finish()
    }
}

/// A non-owning reference that can be tested for liveness and promoted.
///
/// A weak handle outlives its referent but always reports "dead" after the
/// last strong handle drops.
pub struct WeakHandle<T> {
    inner: Weak<T>,
}

impl<T> WeakHandle<T> {
    /// Atomically tests liveness and, if alive, produces a new owning
    /// handle in the same indivisible step.
    ///
    /// The promotion is a compare-and-increment on the owning count guarded
    /// by a "not yet zero" test: there is no window in which the value
    /// could be destroyed between the check and the use. Once the count has
    /// reached zero this returns `None`, never a dangling handle.
    #[must_use]
    pub fn upgrade(&self) -> Option<StrongHandle<T>> {
        self.inner.upgrade().map(|inner| StrongHandle { inner })
    }

    /// Returns true if the referent has been destroyed.
    ///
    /// Advisory: a live referent may die immediately after this returns.
    /// Use [`upgrade`](Self::upgrade) to act on liveness.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

impl<T> Clone for WeakHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle").finish_non_exhaustive()
    }
}

/// A lifetime-safe observer registry.
///
/// Holds weak handles to registered observers; a sweep promotes each entry,
/// invokes the visitor for the live ones, and prunes the dead ones. The
/// registry never keeps an observer alive and never invokes user code while
/// holding its own lock, so a visitor may freely call back into the
/// registry.
pub struct Registry<T> {
    observers: Mutex<Vec<WeakHandle<T>>>,
}

impl<T> Registry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Registers an observer.
    ///
    /// Only a weak handle is stored, so registration never extends the
    /// observer's lifetime. Requiring a strong handle here is what makes
    /// registration from inside the observer's own constructor impossible.
    pub fn register(&self, observer: &StrongHandle<T>) {
        let mut observers = self.observers.lock().expect("registry lock poisoned");
        observers.push(observer.downgrade());
    }

    /// Visits every live observer, pruning dead entries.
    ///
    /// Each entry is promoted under the registry lock; the visitor runs
    /// after the lock is released, on strong handles that keep the
    /// observers alive for the duration of the sweep. Returns the number of
    /// observers visited.
    pub fn visit<F: FnMut(&T)>(&self, mut visitor: F) -> usize {
        let live = {
            let mut observers = self.observers.lock().expect("registry lock poisoned");
            let mut live = Vec::with_capacity(observers.len());
            observers.retain(|weak| match weak.upgrade() {
                Some(strong) => {
                    live.push(strong);
                    true
                }
                None => false,
            });
            live
        };
        for observer in &live {
            visitor(observer);
        }
        live.len()
    }

    /// Removes dead entries, returning how many were pruned.
    pub fn prune(&self) -> usize {
        let mut observers = self.observers.lock().expect("registry lock poisoned");
        let before = observers.len();
        observers.retain(|weak| !weak.is_dead());
        let pruned = before - observers.len();
        if pruned > 0 {
            tracing::trace!(pruned, remaining = observers.len(), "pruned dead observers");
        }
        pruned
    }

    /// Returns the number of registered entries, live or dead.
    ///
    /// Advisory; dead entries linger until the next
    /// [`visit`](Self::visit) or [`prune`](Self::prune).
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.lock().expect("registry lock poisoned").len()
    }

    /// Returns true if no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers
            .lock()
            .expect("registry lock poisoned")
            .is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn upgrade_while_alive() {
        init_test("upgrade_while_alive");
        let strong = StrongHandle::new(42);
        let weak = strong.downgrade();

        let upgraded = weak.upgrade();
        let alive = upgraded.is_some();
        crate::assert_with_log!(alive, "upgrade while alive", true, alive);
        let value = *upgraded.expect("upgrade failed");
        crate::assert_with_log!(value == 42, "upgraded value", 42, value);
        crate::test_complete!("upgrade_while_alive");
    }

    #[test]
    fn upgrade_after_last_strong_drop_fails() {
        init_test("upgrade_after_last_strong_drop_fails");
        let strong = StrongHandle::new(String::from("payload"));
        let weak = strong.downgrade();
        drop(strong);

        let dead = weak.is_dead();
        crate::assert_with_log!(dead, "weak reports dead", true, dead);
        let upgraded = weak.upgrade().is_none();
        crate::assert_with_log!(upgraded, "upgrade fails", true, upgraded);
        crate::test_complete!("upgrade_after_last_strong_drop_fails");
    }

    #[test]
    fn clone_extends_lifetime() {
        init_test("clone_extends_lifetime");
        let strong = StrongHandle::new(1);
        let second = strong.clone();
        let weak = strong.downgrade();
        drop(strong);

        // Still alive through the second owner.
        let alive = weak.upgrade().is_some();
        crate::assert_with_log!(alive, "alive through clone", true, alive);

        drop(second);
        let dead = weak.upgrade().is_none();
        crate::assert_with_log!(dead, "dead after last owner", true, dead);
        crate::test_complete!("clone_extends_lifetime");
    }

    #[test]
    fn strong_count_tracks_owners() {
        init_test("strong_count_tracks_owners");
        let strong = StrongHandle::new(());
        let count = strong.strong_count();
        crate::assert_with_log!(count == 1, "single owner", 1, count);

        let second = strong.clone();
        let count = strong.strong_count();
        crate::assert_with_log!(count == 2, "two owners", 2, count);
        drop(second);

        // Weak handles never count as owners.
        let _weak = strong.downgrade();
        let count = strong.strong_count();
        crate::assert_with_log!(count == 1, "weak not counted", 1, count);
        crate::test_complete!("strong_count_tracks_owners");
    }

    #[test]
    fn ptr_eq_identifies_referent() {
        init_test("ptr_eq_identifies_referent");
        let a = StrongHandle::new(5);
        let same = a.clone();
        let other = StrongHandle::new(5);

        let eq = a.ptr_eq(&same);
        crate::assert_with_log!(eq, "clone is same referent", true, eq);
        let ne = !a.ptr_eq(&other);
        crate::assert_with_log!(ne, "equal value, distinct referent", true, ne);
        crate::test_complete!("ptr_eq_identifies_referent");
    }

    #[test]
    fn registry_visits_only_live_observers() {
        init_test("registry_visits_only_live_observers");
        let registry = Registry::new();
        let kept = StrongHandle::new(AtomicUsize::new(0));
        let dropped = StrongHandle::new(AtomicUsize::new(0));

        registry.register(&kept);
        registry.register(&dropped);
        let len = registry.len();
        crate::assert_with_log!(len == 2, "two registered", 2, len);

        drop(dropped);
        let visited = registry.visit(|counter| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        crate::assert_with_log!(visited == 1, "one live observer", 1, visited);
        let count = kept.load(Ordering::SeqCst);
        crate::assert_with_log!(count == 1, "live observer visited once", 1, count);

        // The dead entry was pruned during the sweep.
        let len = registry.len();
        crate::assert_with_log!(len == 1, "dead entry pruned", 1, len);
        crate::test_complete!("registry_visits_only_live_observers");
    }

    #[test]
    fn registry_prune_removes_dead_entries() {
        init_test("registry_prune_removes_dead_entries");
        let registry = Registry::new();
        let a = StrongHandle::new(1);
        let b = StrongHandle::new(2);
        registry.register(&a);
        registry.register(&b);

        drop(a);
        drop(b);
        let pruned = registry.prune();
        crate::assert_with_log!(pruned == 2, "both pruned", 2, pruned);
        let empty = registry.is_empty();
        crate::assert_with_log!(empty, "registry empty", true, empty);
        crate::test_complete!("registry_prune_removes_dead_entries");
    }

    #[test]
    fn registration_never_extends_lifetime() {
        init_test("registration_never_extends_lifetime");
        let registry = Registry::new();
        let observer = StrongHandle::new(());
        let weak = observer.downgrade();
        registry.register(&observer);

        drop(observer);
        let dead = weak.is_dead();
        crate::assert_with_log!(dead, "registry holds no ownership", true, dead);
        crate::test_complete!("registration_never_extends_lifetime");
    }
}
