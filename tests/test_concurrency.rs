//! Concurrency tests.
//!
//! A background thread plays the tick interrupt while the test thread uses
//! the control API, checking that channel state is never observed torn and
//! that the blocking delays wait for real ticks.

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
mod fixtures;

use fixtures::{CountingCallback, MockTickSource};
use nut_timer::{DefaultConfig, Mode, SoftTimer, TimerError};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

type Timer = SoftTimer<DefaultConfig, 4>;

/// Background thread calling `tick()` until dropped.
struct Ticker {
    stop: &'static AtomicBool,
    handle: Option<thread::JoinHandle<()>>,
}

impl Ticker {
    fn spawn(timer: &'static Timer, stop: &'static AtomicBool, ticks: &'static AtomicU32) -> Self {
        timer.init(&mut MockTickSource::new()).unwrap();
        let handle = thread::spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                timer.tick();
                ticks.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_micros(50));
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[test]
fn test_set_time_is_never_observed_torn() {
    static TIMER: Timer = Timer::new();
    static STOP: AtomicBool = AtomicBool::new(false);
    static TICKS: AtomicU32 = AtomicU32::new(0);
    static CB: CountingCallback = CountingCallback::new();

    const SHORT: u32 = 3;
    const LONG: u32 = 100_000;

    TIMER.set_time(0, LONG, true).unwrap();
    TIMER.register_callback(0, &CB).unwrap();
    TIMER.start(0).unwrap();

    let _ticker = Ticker::spawn(&TIMER, &STOP, &TICKS);

    for i in 0..20_000u32 {
        let period = if i % 2 == 0 { SHORT } else { LONG };
        TIMER.set_time(0, period, true).unwrap();

        let snap = TIMER.snapshot(0).unwrap();
        assert!(
            snap.reload == SHORT || snap.reload == LONG,
            "Unexpected reload: {:?}",
            snap
        );
        // value and reload are written together, value only moves down from reload
        assert!(snap.value <= snap.reload, "Torn channel state: {:?}", snap);
        assert!(snap.running, "Periodic channel stopped: {:?}", snap);
    }
}

#[test]
fn test_stopwatch_tracks_background_ticks() {
    static TIMER: Timer = Timer::new();
    static STOP: AtomicBool = AtomicBool::new(false);
    static TICKS: AtomicU32 = AtomicU32::new(0);

    TIMER.set_mode(1, Mode::Stopwatch).unwrap();

    let ticker = Ticker::spawn(&TIMER, &STOP, &TICKS);
    while TICKS.load(Ordering::SeqCst) < 5 {
        thread::yield_now();
    }

    TIMER.start(1).unwrap();
    let before = TICKS.load(Ordering::SeqCst);
    while TIMER.value(1).unwrap() < 50 {
        thread::yield_now();
    }
    TIMER.stop(1).unwrap();
    let after = TICKS.load(Ordering::SeqCst);
    drop(ticker);

    let elapsed = TIMER.value(1).unwrap();
    assert!(elapsed >= 50);
    // Ticks in flight at start and at stop may be counted on one side only
    assert!(
        elapsed <= after - before + 2,
        "elapsed {} > ticks {}",
        elapsed,
        after - before
    );
}

#[test]
fn test_delay_waits_for_ticks() {
    static TIMER: Timer = Timer::new();
    static STOP: AtomicBool = AtomicBool::new(false);
    static TICKS: AtomicU32 = AtomicU32::new(0);

    let _ticker = Ticker::spawn(&TIMER, &STOP, &TICKS);

    let before = TICKS.load(Ordering::SeqCst);
    assert_eq!(TIMER.delay(2, 20), Ok(()));
    let after = TICKS.load(Ordering::SeqCst);

    // The ticker counts the expiring tick only after tick() returns
    assert!(after - before >= 19, "Delay returned after {} ticks", after - before);
    assert_eq!(TIMER.is_running(2), Ok(false));
    assert_eq!(TIMER.value(2), Ok(0));
}

#[test]
fn test_delay_zero_returns_immediately() {
    static TIMER: Timer = Timer::new();
    TIMER.init(&mut MockTickSource::new()).unwrap();

    // No ticker: any wait would hang
    assert_eq!(TIMER.delay(0, 0), Ok(()));
    assert_eq!(TIMER.is_running(0), Ok(false));
}

#[test]
fn test_delay_on_running_stopwatch_is_rejected() {
    static TIMER: Timer = Timer::new();
    TIMER.init(&mut MockTickSource::new()).unwrap();

    TIMER.set_mode(3, Mode::Stopwatch).unwrap();
    TIMER.start(3).unwrap();
    TIMER.tick();

    assert_eq!(TIMER.delay(3, 10), Err(TimerError::ChannelRunning));
    assert_eq!(TIMER.mode(3), Ok(Mode::Stopwatch));
    assert_eq!(TIMER.value(3), Ok(1));
}

#[test]
fn test_delay_before_init_is_rejected() {
    static TIMER: Timer = Timer::new();

    TIMER.set_mode(1, Mode::Stopwatch).unwrap();
    TIMER.set_time(2, 9, true).unwrap();

    // A wait nothing could end fails instead of hanging
    assert_eq!(TIMER.delay(1, 5), Err(TimerError::NotInitialized));
    assert_eq!(TIMER.delay(2, 0), Err(TimerError::NotInitialized));
    assert_eq!(TIMER.delay(4, 5), Err(TimerError::InvalidChannel));

    assert_eq!(TIMER.mode(1), Ok(Mode::Stopwatch));
    assert_eq!(TIMER.is_running(1), Ok(false));
    assert_eq!(TIMER.value(2), Ok(9));
    assert_eq!(TIMER.snapshot(2).unwrap().reload, 9);
}

#[test]
fn test_delay_takes_over_stopped_stopwatch() {
    static TIMER: Timer = Timer::new();
    static STOP: AtomicBool = AtomicBool::new(false);
    static TICKS: AtomicU32 = AtomicU32::new(0);

    TIMER.set_mode(1, Mode::Stopwatch).unwrap();
    let _ticker = Ticker::spawn(&TIMER, &STOP, &TICKS);

    assert_eq!(TIMER.delay(1, 5), Ok(()));
    assert_eq!(TIMER.mode(1), Ok(Mode::Countdown));
}

#[cfg(feature = "delay")]
#[test]
fn test_channel_delay_implements_delay_ns() {
    use embedded_hal::delay::DelayNs;
    use nut_timer::ChannelDelay;

    static TIMER: Timer = Timer::new();
    static STOP: AtomicBool = AtomicBool::new(false);
    static TICKS: AtomicU32 = AtomicU32::new(0);

    let _ticker = Ticker::spawn(&TIMER, &STOP, &TICKS);
    let mut delay = ChannelDelay::new(&TIMER, 0).unwrap();

    let before = TICKS.load(Ordering::SeqCst);
    delay.delay_ms(10);
    let after = TICKS.load(Ordering::SeqCst);
    assert!(after - before >= 10, "delay_ms(10) took {} ticks", after - before);

    let before = TICKS.load(Ordering::SeqCst);
    delay.delay_us(1500);
    let after = TICKS.load(Ordering::SeqCst);
    assert!(after - before >= 2, "delay_us(1500) took {} ticks", after - before);
}
