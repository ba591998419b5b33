//! `embedded-hal` delay backed by a timer channel.
//!
//! Lets drivers that take an `impl DelayNs` borrow one channel of a running
//! [`SoftTimer`] instead of a dedicated hardware timer.

use crate::channel::Mode;
use crate::config::TimerConfig;
use crate::error::TimerError;
use crate::timer::SoftTimer;
use embedded_hal::delay::DelayNs;

/// Blocking delay on one channel of a [`SoftTimer`].
///
/// Resolution is one tick. Every delay is rounded up to whole ticks, plus
/// one tick because the first tick can arrive at any point of the current
/// period, so the delay is never shorter than requested.
///
/// The bound channel is reserved for delays: `new()` claims it, switching it
/// to a stopped countdown, and nothing else should start, stop or reconfigure
/// it while the `ChannelDelay` exists.
///
/// Foreground only, like [`SoftTimer::delay`].
pub struct ChannelDelay<'a, C, const N: usize>
where
    C: TimerConfig,
{
    timer: &'a SoftTimer<C, N>,
    channel: usize,
}

impl<'a, C, const N: usize> ChannelDelay<'a, C, N>
where
    C: TimerConfig,
{
    /// Bind and claim channel `channel` of `timer`.
    ///
    /// # Errors
    ///
    /// - `InvalidChannel`: index out of range
    /// - `NotInitialized`: [`SoftTimer::init`] has not succeeded
    /// - `ChannelRunning`: the channel is running as a stopwatch
    ///
    /// The channel is left untouched on failure.
    pub fn new(timer: &'a SoftTimer<C, N>, channel: usize) -> Result<Self, TimerError> {
        timer.mode(channel)?;
        if !timer.is_initialized() {
            return Err(TimerError::NotInitialized);
        }
        timer.set_mode(channel, Mode::Countdown)?;
        timer.stop(channel)?;
        Ok(Self { timer, channel })
    }

    /// Channel used for delays.
    pub fn channel(&self) -> usize {
        self.channel
    }

    fn wait_ticks(&mut self, ticks: u64) {
        if ticks == 0 {
            return;
        }
        // One tick of slack for the phase of the first tick.
        let mut remaining = ticks.saturating_add(1);
        while remaining > 0 {
            let chunk = remaining.min(u64::from(u32::MAX)) as u32;
            // Only fails if the reserved channel was reconfigured behind our back
            if let Err(_err) = self.timer.delay(self.channel, chunk) {
                warn!("delay on channel {} failed: {}", self.channel, _err);
                return;
            }
            remaining -= u64::from(chunk);
        }
    }
}

impl<C, const N: usize> core::fmt::Debug for ChannelDelay<'_, C, N>
where
    C: TimerConfig,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChannelDelay")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// Ticks needed to cover `amount` units of `unit_ns` nanoseconds, rounded up.
fn ticks_for<C: TimerConfig>(amount: u32, unit_ns: u64) -> u64 {
    let period_ns = u64::from(C::TICK_PERIOD_US) * 1000;
    if period_ns == 0 {
        return 0;
    }
    (u64::from(amount) * unit_ns).div_ceil(period_ns)
}

impl<C, const N: usize> DelayNs for ChannelDelay<'_, C, N>
where
    C: TimerConfig,
{
    fn delay_ns(&mut self, ns: u32) {
        self.wait_ticks(ticks_for::<C>(ns, 1));
    }

    fn delay_us(&mut self, us: u32) {
        self.wait_ticks(ticks_for::<C>(us, 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.wait_ticks(ticks_for::<C>(ms, 1_000_000));
    }
}
