//! Error types and error handling strategy for Handoff.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Rejected elements are handed back to the caller, never dropped
//! - Errors are classified by recoverability for retry logic
//! - Contract violations (poisoned locks, zero capacities) are panics,
//!   never recoverable errors
//!
//! # Propagation Policy
//!
//! Queue and handle operations never swallow or retry errors internally;
//! they surface them to the immediate caller, which decides retry versus
//! propagate versus terminate. Closure in particular is always reported:
//! whether shutdown is expected is the caller's call, not the queue's.

use core::fmt;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The queue has been shut down.
    Closed,
    /// The queue is at capacity (would block).
    Full,
    /// A time-bounded wait elapsed before the operation could complete.
    TimedOut,
}

impl ErrorKind {
    /// Returns the recoverability classification for this error kind.
    ///
    /// This helps retry logic decide whether to attempt recovery: a full
    /// queue drains and a timeout can be retried, but a closed queue never
    /// reopens.
    #[must_use]
    pub const fn recoverability(&self) -> Recoverability {
        match self {
            Self::Full | Self::TimedOut => Recoverability::Transient,
            Self::Closed => Recoverability::Permanent,
        }
    }

    /// Returns true if this error is typically retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.recoverability(), Recoverability::Transient)
    }
}

/// Classification of error recoverability for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recoverability {
    /// Temporary failure that may succeed on retry.
    Transient,
    /// Permanent failure that will not succeed on retry.
    Permanent,
}

impl Recoverability {
    /// Returns true if this error is safe to retry.
    #[must_use]
    pub const fn should_retry(&self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// The main error type for Handoff operations.
///
/// Callers that funnel the per-operation errors ([`PushError`],
/// [`TryPushError`], [`PopError`]) upward convert them into this type via
/// `From`, losing the rejected element but keeping the classification.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Returns true if this error reports queue closure.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.kind, ErrorKind::Closed)
    }

    /// Returns true if this error reports an elapsed deadline.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::TimedOut)
    }

    /// Returns the recoverability classification.
    #[must_use]
    pub const fn recoverability(&self) -> Recoverability {
        self.kind.recoverability()
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Error when pushing into a queue, handing the rejected element back.
#[derive(Debug, PartialEq, Eq)]
pub enum PushError<T> {
    /// The queue was closed; no element was enqueued.
    Closed(T),
    /// The wait for space elapsed; no element was enqueued.
    TimedOut(T),
}

impl<T> PushError<T> {
    /// Returns the element that was not enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::Closed(value) | Self::TimedOut(value) => value,
        }
    }

    /// Returns true if the push failed because the queue was closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => write!(f, "push into closed queue"),
            Self::TimedOut(_) => write!(f, "push timed out waiting for space"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for PushError<T> {}

/// Error when pushing without waiting.
#[derive(Debug, PartialEq, Eq)]
pub enum TryPushError<T> {
    /// The queue is at capacity.
    Full(T),
    /// The queue was closed.
    Closed(T),
}

impl<T> TryPushError<T> {
    /// Returns the element that was not enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(value) | Self::Closed(value) => value,
        }
    }
}

impl<T> fmt::Display for TryPushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => write!(f, "queue is full"),
            Self::Closed(_) => write!(f, "push into closed queue"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for TryPushError<T> {}

/// Error when popping from a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    /// The queue was closed and fully drained.
    Closed,
    /// The wait for an element elapsed.
    TimedOut,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "queue closed and drained"),
            Self::TimedOut => write!(f, "pop timed out waiting for an element"),
        }
    }
}

impl std::error::Error for PopError {}

impl From<PopError> for Error {
    fn from(e: PopError) -> Self {
        match e {
            PopError::Closed => Self::new(ErrorKind::Closed),
            PopError::TimedOut => Self::new(ErrorKind::TimedOut),
        }
    }
}

impl<T> From<PushError<T>> for Error {
    fn from(e: PushError<T>) -> Self {
        match e {
            PushError::Closed(_) => Self::new(ErrorKind::Closed),
            PushError::TimedOut(_) => Self::new(ErrorKind::TimedOut),
        }
    }
}

impl<T> From<TryPushError<T>> for Error {
    fn from(e: TryPushError<T>) -> Self {
        match e {
            TryPushError::Full(_) => Self::new(ErrorKind::Full),
            TryPushError::Closed(_) => Self::new(ErrorKind::Closed),
        }
    }
}

/// A specialized Result type for Handoff operations.
pub type Result<T> = core::result::Result<T, Error>;
