//! Thread-backed tick source for running timers on a host

use nut_timer::{SoftTimer, TickSource, TimerConfig};
use std::io;
use std::thread;
use std::time::{Duration, Instant};

/// Tick source playing the role of the hardware timer interrupt.
///
/// `start()` spawns a thread that calls `tick()` once per period. When the
/// thread falls behind by a whole period the late ticks are dropped, like a
/// hardware interrupt flag that cannot count, rather than replayed.
pub struct ThreadTickSource<C: TimerConfig + 'static, const N: usize> {
    timer: &'static SoftTimer<C, N>,
    _thread: Option<thread::JoinHandle<()>>,
}

impl<C: TimerConfig + 'static, const N: usize> ThreadTickSource<C, N> {
    pub fn new(timer: &'static SoftTimer<C, N>) -> Self {
        Self {
            timer,
            _thread: None,
        }
    }
}

impl<C: TimerConfig + 'static, const N: usize> TickSource for ThreadTickSource<C, N> {
    type Error = io::Error;

    fn start(&mut self, period_us: u32) -> Result<(), Self::Error> {
        if period_us == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "tick period must be non-zero",
            ));
        }

        let timer = self.timer;
        let period = Duration::from_micros(u64::from(period_us));

        let handle = thread::Builder::new()
            .name("tick".into())
            .spawn(move || {
                let mut next = Instant::now() + period;
                loop {
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }
                    timer.tick();

                    next += period;
                    let now = Instant::now();
                    if now > next + period {
                        // Too late: coalesce instead of catching up
                        next = now + period;
                    }
                }
            })?;

        self._thread = Some(handle);
        Ok(())
    }
}
