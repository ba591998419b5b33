//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]

use nut_timer::{ChannelSnapshot, SoftTimer, TimerConfig};

// ============================================================================
// Tick Helpers
// ============================================================================

/// Deliver `count` ticks.
pub fn run_ticks<C: TimerConfig, const N: usize>(timer: &SoftTimer<C, N>, count: u32) {
    for _ in 0..count {
        timer.tick();
    }
}

// ============================================================================
// Table Helpers
// ============================================================================

/// Snapshot of every channel, in index order.
pub fn table<C: TimerConfig, const N: usize>(timer: &SoftTimer<C, N>) -> Vec<ChannelSnapshot> {
    (0..N).map(|ch| timer.snapshot(ch).unwrap()).collect()
}

/// Configure a mix of channel states so "table unchanged" checks are meaningful.
///
/// Needs at least 3 channels: 0 periodic countdown, 1 one-shot countdown
/// (stopped), 2 running stopwatch.
pub fn populate<C: TimerConfig, const N: usize>(timer: &SoftTimer<C, N>) {
    timer.set_time(0, 25, true).unwrap();
    timer.start(0).unwrap();

    timer.set_time(1, 7, false).unwrap();

    timer.set_mode(2, nut_timer::Mode::Stopwatch).unwrap();
    timer.set_time(2, 100, false).unwrap();
    timer.start(2).unwrap();
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that the channel is running with the given value.
pub fn assert_running<C: TimerConfig, const N: usize>(
    timer: &SoftTimer<C, N>,
    ch: usize,
    value: u32,
) {
    let snap = timer.snapshot(ch).unwrap();
    assert!(snap.running, "Expected channel {} running, got: {:?}", ch, snap);
    assert_eq!(
        snap.value, value,
        "Unexpected value on channel {}, got: {:?}",
        ch, snap
    );
}

/// Assert that the channel is stopped with the given value.
pub fn assert_stopped<C: TimerConfig, const N: usize>(
    timer: &SoftTimer<C, N>,
    ch: usize,
    value: u32,
) {
    let snap = timer.snapshot(ch).unwrap();
    assert!(!snap.running, "Expected channel {} stopped, got: {:?}", ch, snap);
    assert_eq!(
        snap.value, value,
        "Unexpected value on channel {}, got: {:?}",
        ch, snap
    );
}
