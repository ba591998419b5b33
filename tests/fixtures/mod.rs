//! Test fixtures and utilities for nut-timer testing.
//!
//! Provides:
//! - `MockTickSource`: Test implementation of TickSource trait
//! - `CountingCallback`: Expiry callback counting its invocations
//! - `TaggedCallback`: Expiry callback recording a tag into a shared log
//! - `ExpiryLog`: Ordered log shared by tagged callbacks

#![allow(dead_code)]

use nut_timer::{TickSource, TimerCallback};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

// ============================================================================
// MockTickSource - Test Tick Source Implementation
// ============================================================================

/// Mock tick source for testing.
///
/// Records the requested period instead of programming hardware. Ticks are
/// delivered by the test calling `SoftTimer::tick()` directly.
#[derive(Debug, Default)]
pub struct MockTickSource {
    /// Period passed to the last successful `start()`
    pub period_us: Option<u32>,

    /// Number of `start()` calls, successful or not
    pub start_calls: u32,

    /// Make `start()` fail
    pub fail: bool,
}

impl MockTickSource {
    /// Create a tick source that starts successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tick source whose `start()` fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl TickSource for MockTickSource {
    type Error = ();

    fn start(&mut self, period_us: u32) -> Result<(), Self::Error> {
        self.start_calls += 1;
        if self.fail {
            return Err(());
        }
        self.period_us = Some(period_us);
        Ok(())
    }
}

// ============================================================================
// CountingCallback - Counts Expiries
// ============================================================================

/// Expiry callback counting its invocations.
///
/// Declare as a `static` so it can be registered as `&'static dyn TimerCallback`.
#[derive(Debug)]
pub struct CountingCallback {
    count: AtomicU32,
}

impl CountingCallback {
    /// Create a counter at zero.
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Number of invocations so far.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

impl TimerCallback for CountingCallback {
    fn on_expire(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// TaggedCallback / ExpiryLog - Records Expiry Order
// ============================================================================

/// Ordered record of expiries, shared between tagged callbacks.
#[derive(Debug)]
pub struct ExpiryLog {
    entries: Mutex<Vec<usize>>,
}

impl ExpiryLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append a tag.
    pub fn push(&self, tag: usize) {
        self.entries.lock().unwrap().push(tag);
    }

    /// Copy of the recorded tags, oldest first.
    pub fn entries(&self) -> Vec<usize> {
        self.entries.lock().unwrap().clone()
    }

    /// Forget all recorded tags.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// Expiry callback pushing its tag into an `ExpiryLog`.
#[derive(Debug)]
pub struct TaggedCallback {
    /// Tag recorded on each expiry (usually the channel index)
    pub tag: usize,

    /// Destination log
    pub log: &'static ExpiryLog,
}

impl TimerCallback for TaggedCallback {
    fn on_expire(&self) {
        self.log.push(self.tag);
    }
}
