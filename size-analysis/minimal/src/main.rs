#![no_std]
#![no_main]

use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m_rt::{entry, exception};
use nut_timer::{DefaultConfig, Mode, SoftTimer, SysTickSource};
use panic_halt as _;

// Core clock of the measurement target
const CORE_HZ: u32 = 48_000_000;

const BLINK_TMR: usize = 0;
const ONESHOT_TMR: usize = 1;
const UPTIME_TMR: usize = 2;
const WAIT_TMR: usize = 3;

static TIMER: SoftTimer<DefaultConfig, 4> = SoftTimer::new();

static BLINKS: AtomicU32 = AtomicU32::new(0);
static FIRED: AtomicU32 = AtomicU32::new(0);

// Callbacks - measure only dispatch overhead
fn blink() {
    BLINKS.fetch_add(1, Ordering::Relaxed);
}

fn fired() {
    FIRED.fetch_add(1, Ordering::Relaxed);
}

static BLINK: fn() = blink;
static FIRED_CB: fn() = fired;

#[exception]
fn SysTick() {
    TIMER.tick();
}

// Entry point
#[entry]
fn main() -> ! {
    let Some(cp) = cortex_m::Peripherals::take() else {
        loop {
            cortex_m::asm::nop();
        }
    };

    let mut systick = SysTickSource::new(cp.SYST, CORE_HZ);
    let _ = core::hint::black_box(TIMER.init(&mut systick));

    // Periodic, one-shot and stopwatch channels so every dispatch path is included
    let _ = TIMER.set_time(BLINK_TMR, 500, true);
    let _ = TIMER.register_callback(BLINK_TMR, &BLINK);
    let _ = TIMER.start(BLINK_TMR);

    let _ = TIMER.set_time(ONESHOT_TMR, 100, false);
    let _ = TIMER.register_callback(ONESHOT_TMR, &FIRED_CB);
    let _ = TIMER.start(ONESHOT_TMR);

    let _ = TIMER.set_mode(UPTIME_TMR, Mode::Stopwatch);
    let _ = TIMER.start(UPTIME_TMR);

    let _ = core::hint::black_box(TIMER.delay(WAIT_TMR, 10));

    // Use black_box to prevent optimizer from removing the code
    loop {
        core::hint::black_box(TIMER.value(UPTIME_TMR).ok());
        core::hint::black_box(TIMER.snapshot(BLINK_TMR).ok());
        cortex_m::asm::nop();
    }
}

// Required: exception handler
#[exception]
unsafe fn HardFault(_ef: &cortex_m_rt::ExceptionFrame) -> ! {
    loop {
        cortex_m::asm::nop();
    }
}
