//! Handoff: monitor-based blocking queues and lifetime-safe publication handles.
//!
//! # Overview
//!
//! Handoff packages the two mechanisms that make cross-thread handoff safe:
//! a FIFO queue whose every access is serialized through one monitor, and
//! strong/weak ownership handles that let an object's identity be published
//! to other threads without ever exposing a raw, lifetime-untracked pointer.
//!
//! # Core Guarantees
//!
//! - **FIFO delivery**: elements leave the queue in the exact order they were
//!   accepted, across any number of producer and consumer threads
//! - **No lost wakeups**: every push wakes a blocked consumer; closing wakes
//!   every waiter, so shutdown never leaves a thread parked forever
//! - **Drain before close**: elements queued before [`BlockingQueue::close`]
//!   remain poppable; only a closed *and* empty queue reports closure
//! - **All-or-nothing promotion**: [`WeakHandle::upgrade`] either yields a
//!   handle to a fully live value or `None`, never a partially destroyed one
//! - **Publication after construction**: a weak handle can only be minted
//!   from an existing [`StrongHandle`], so no thread can observe a value
//!   before its construction completed
//!
//! # Module Structure
//!
//! - [`monitor`]: Mutual exclusion paired with condition waiter sets
//! - [`queue`]: Blocking FIFO queue built on the monitor
//! - [`handle`]: Strong/weak handles and the observer registry
//! - [`config`]: Queue configuration and builder with environment overrides
//! - [`error`]: Error types and recoverability classification
//! - [`test_utils`]: Logging init and assertion macros shared by the tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod error;
pub mod handle;
pub mod monitor;
pub mod queue;
pub mod test_utils;

// Re-exports for convenient access to core types
pub use config::{ConfigError, QueueBuilder, QueueConfig};
pub use error::{Error, ErrorKind, PopError, PushError, Recoverability, Result, TryPushError};
pub use handle::{Registry, StrongHandle, WeakHandle};
pub use monitor::{Condition, Monitor, MonitorGuard, WaitOutcome};
pub use queue::BlockingQueue;
