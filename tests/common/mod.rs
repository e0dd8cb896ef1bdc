#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! mod common;
//! use common::*;
//! ```

use std::sync::Once;
use std::time::{Duration, Instant};

static INIT_LOGGING: Once = Once::new();

/// Generous bound for "this must happen promptly" assertions; far above any
/// plausible scheduling delay, far below a hang.
pub const WAIT_BUDGET: Duration = Duration::from_secs(5);

/// Initialize test logging once per test binary.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Polls `condition` until it returns true or [`WAIT_BUDGET`] elapses.
///
/// Returns whether the condition became true in time.
pub fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_BUDGET;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::yield_now();
    }
    condition()
}

/// Spins for a handful of scheduler quanta, giving other threads a chance
/// to make progress they should *not* be able to make.
pub fn brief_pause() {
    for _ in 0..1_000 {
        std::thread::yield_now();
    }
}
