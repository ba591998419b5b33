//! MOSI M1 demo running on the native platform
//!
//! The LED constantly cycles through red, green and blue. Every button press
//! toggles the cycle between slow (600 ms) and fast (60 ms) and is counted on
//! screen.
//!
//! LED cycling and button reading are both timer callbacks. The button is
//! sampled every 10 ms so contact bounce is ignored. Redrawing the counter is
//! slow, so it happens in the main loop and only when the count changed.
//!
//! ```bash
//! cargo run --bin mosi_demo
//! ```
//!
//! Press space for the button, `q` to quit.

use core::fmt::Write as _;
use native_demos::board::{BLUE, GREEN, RED};
use native_demos::{Board, Key, RawModeGuard, ThreadTickSource, poll_key, redraw_line};
use nut_timer::{DefaultConfig, SoftTimer};
use std::error::Error;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU16, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

// =============================================================================
// Timer Channels
// =============================================================================

const LED_TMR: usize = 0;
const BTN_TMR: usize = 1;
const CLK_TMR: usize = 2;

/// Button sampling period in ticks (ms)
const BTN_POLL_TICKS: u32 = 10;

/// Logo splash duration in ticks (ms)
const SPLASH_TICKS: u32 = 2000;

const SLOW_INTERVAL: u16 = 600;
const FAST_INTERVAL: u16 = 60;

static TIMER: SoftTimer<DefaultConfig, 5> = SoftTimer::new();
static BOARD: Board = Board::new();

// =============================================================================
// Shared State
// =============================================================================

static LED_INTERVAL: AtomicU16 = AtomicU16::new(SLOW_INTERVAL);
static BTN_PRESS_CNT: AtomicU32 = AtomicU32::new(0);

// =============================================================================
// Timer Tasks
// =============================================================================

static LED_TASK: fn() = led_task;
static BUTTON_TASK: fn() = button_task;

/// Advance the LED one color and pick up interval changes.
fn led_task() {
    // Starts out different from any real interval so the first run re-arms
    static CURRENT_INTERVAL: AtomicU16 = AtomicU16::new(1000);
    static LED_STATE: AtomicU8 = AtomicU8::new(0);

    let next = match LED_STATE.load(Ordering::Relaxed) {
        0 => {
            BOARD.led.clear(RED);
            BOARD.led.set(GREEN);
            1
        }
        1 => {
            BOARD.led.clear(GREEN);
            BOARD.led.set(BLUE);
            2
        }
        _ => {
            BOARD.led.clear(BLUE);
            BOARD.led.set(RED);
            0
        }
    };
    LED_STATE.store(next, Ordering::Relaxed);

    let interval = LED_INTERVAL.load(Ordering::Relaxed);
    if CURRENT_INTERVAL.swap(interval, Ordering::Relaxed) != interval {
        // Next period starts from this expiry
        let rearmed = TIMER.set_time(LED_TMR, u32::from(interval), true);
        debug_assert!(rearmed.is_ok(), "LED channel out of range");
    }
}

/// Count button presses and toggle the LED speed on each press.
fn button_task() {
    static PRESSED: AtomicBool = AtomicBool::new(false);

    let level = BOARD.button.is_pressed();
    if !PRESSED.load(Ordering::Relaxed) {
        if level {
            PRESSED.store(true, Ordering::Relaxed);
            BTN_PRESS_CNT.fetch_add(1, Ordering::Relaxed);

            let interval = if LED_INTERVAL.load(Ordering::Relaxed) > 500 {
                FAST_INTERVAL
            } else {
                SLOW_INTERVAL
            };
            LED_INTERVAL.store(interval, Ordering::Relaxed);
        }
    } else if !level {
        PRESSED.store(false, Ordering::Relaxed);
    }
}

// =============================================================================
// Display
// =============================================================================

fn press_count_update(count: u32) -> Result<(), Box<dyn Error>> {
    let mut line = heapless::String::<25>::new();
    write!(line, "Button pressed: {:3}", count).map_err(|_| "display line overflow")?;
    redraw_line(&line)?;
    Ok(())
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<(), Box<dyn Error>> {
    let mut ticks = ThreadTickSource::new(&TIMER);
    TIMER.init(&mut ticks)?;

    // Logo
    BOARD.led.set_rgb(RED).map_err(|_| "invalid LED mask")?;
    println!("SIWORKS  MOSI M1");

    // Hold here for the splash
    TIMER.delay(CLK_TMR, SPLASH_TICKS)?;

    TIMER.set_time(LED_TMR, u32::from(LED_INTERVAL.load(Ordering::Relaxed)), true)?;
    TIMER.register_callback(LED_TMR, &LED_TASK)?;
    TIMER.start(LED_TMR)?;

    TIMER.set_time(BTN_TMR, BTN_POLL_TICKS, true)?;
    TIMER.register_callback(BTN_TMR, &BUTTON_TASK)?;
    TIMER.start(BTN_TMR)?;

    println!("MOSI M1 DEMO  (space: button, q: quit)");

    let _guard = RawModeGuard::new()?;

    let mut shown_count = BTN_PRESS_CNT.load(Ordering::Relaxed);
    press_count_update(shown_count)?;

    loop {
        match poll_key()? {
            Some(Key::Button) => BOARD.button.press(),
            Some(Key::Quit) => break,
            None => {}
        }

        let count = BTN_PRESS_CNT.load(Ordering::Relaxed);
        if count != shown_count {
            shown_count = count;
            press_count_update(count)?;
        }

        thread::sleep(Duration::from_millis(5));
    }

    TIMER.stop(LED_TMR)?;
    TIMER.stop(BTN_TMR)?;
    redraw_line("")?;
    print!("\r\nLED stopped at {}\r\n", BOARD.led.describe());
    Ok(())
}
