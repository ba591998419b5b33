//! Channel table, tick dispatcher and control API.
//!
//! `SoftTimer` owns a fixed table of `N` channels shared between foreground
//! code and the tick interrupt. Every access to a channel happens inside a
//! `critical_section::with` block, so the dispatcher never sees a channel
//! half-updated and foreground readers never see a half-advanced one.
//!
//! Callbacks run inside [`SoftTimer::tick`] but outside any critical section,
//! which lets them call back into the control API.

use crate::channel::{Callback, Channel, ChannelSnapshot, Mode};
use crate::config::{TimerConfig, ZeroValuePolicy};
use crate::error::TimerError;
use crate::tick::TickSource;
use core::cell::{Cell, RefCell};
use core::marker::PhantomData;
use critical_section::Mutex;

/// Bookkeeping for `init()` and tick coalescing.
#[derive(Debug, Copy, Clone)]
struct DispatchState {
    initialized: bool,
    sweeping: bool,
    missed_ticks: u32,
}

impl DispatchState {
    const RESET: DispatchState = DispatchState {
        initialized: false,
        sweeping: false,
        missed_ticks: 0,
    };
}

/// Software timer with `N` channels driven by one periodic tick.
///
/// Generic over:
/// - `C`: TimerConfig implementation (tick period, zero-value policy)
/// - `N`: number of channels, fixed at build time
///
/// `new()` is `const`, so the timer normally lives in a `static` that both
/// the tick interrupt handler and foreground code can reach:
///
/// ```
/// use nut_timer::{DefaultConfig, SoftTimer};
///
/// static TIMER: SoftTimer<DefaultConfig, 3> = SoftTimer::new();
///
/// TIMER.set_time(0, 5, true).unwrap();
/// TIMER.start(0).unwrap();
///
/// // Normally called from the tick interrupt
/// for _ in 0..5 {
///     TIMER.tick();
/// }
///
/// assert_eq!(TIMER.value(0), Ok(5));
/// assert_eq!(TIMER.is_running(0), Ok(true));
/// ```
pub struct SoftTimer<C, const N: usize>
where
    C: TimerConfig,
{
    /// Channel table
    channels: Mutex<RefCell<[Channel; N]>>,

    /// Init flag, sweep-in-progress flag, coalesced tick count
    dispatch: Mutex<Cell<DispatchState>>,

    /// Config type marker (zero-size)
    _config: PhantomData<fn() -> C>,
}

// ============================================================================
// Debug implementation
// ============================================================================

impl<C, const N: usize> core::fmt::Debug for SoftTimer<C, N>
where
    C: TimerConfig,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        critical_section::with(|cs| {
            let state = self.dispatch.borrow(cs).get();
            f.debug_struct("SoftTimer")
                .field("channels", &*self.channels.borrow_ref(cs))
                .field("initialized", &state.initialized)
                .field("missed_ticks", &state.missed_ticks)
                .finish_non_exhaustive()
        })
    }
}

impl<C, const N: usize> Default for SoftTimer<C, N>
where
    C: TimerConfig,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, const N: usize> SoftTimer<C, N>
where
    C: TimerConfig,
{
    /// Number of channels.
    pub const CHANNELS: usize = N;

    /// Create a timer with every channel stopped, in countdown mode, at 0,
    /// without reload or callback.
    pub const fn new() -> Self {
        Self {
            channels: Mutex::new(RefCell::new([Channel::IDLE; N])),
            dispatch: Mutex::new(Cell::new(DispatchState::RESET)),
            _config: PhantomData,
        }
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Start tick delivery at `C::TICK_PERIOD_US`.
    ///
    /// Must be called once. A second call fails with `AlreadyInitialized`
    /// without touching `source`. If the source fails to start the timer
    /// stays uninitialized and `init()` may be retried.
    pub fn init<S: TickSource>(&self, source: &mut S) -> Result<(), TimerError> {
        let claimed = self.update_dispatch(|state| {
            if state.initialized {
                false
            } else {
                state.initialized = true;
                true
            }
        });

        if !claimed {
            warn!("init called twice");
            return Err(TimerError::AlreadyInitialized);
        }

        if source.start(C::TICK_PERIOD_US).is_err() {
            self.update_dispatch(|state| state.initialized = false);
            warn!("tick source failed to start");
            return Err(TimerError::TickSource);
        }

        debug!("tick source started, period {} us", C::TICK_PERIOD_US);
        Ok(())
    }

    /// Whether `init()` has completed successfully.
    pub fn is_initialized(&self) -> bool {
        critical_section::with(|cs| self.dispatch.borrow(cs).get().initialized)
    }

    // ========================================================================
    // Tick dispatcher
    // ========================================================================

    /// Advance every running channel by one tick.
    ///
    /// Call from the tick interrupt handler, once per tick period. Channels are
    /// advanced in index order, each in its own critical section:
    ///
    /// - stopwatch: value + 1, wrapping at `u32::MAX`;
    /// - countdown: value - 1; on reaching 0 the callback fires, then the
    ///   channel reloads if it has a reload value and stops otherwise.
    ///
    /// The reload/stop decision is made after the callback returns and only
    /// applies while the channel still holds 0. A callback that calls
    /// `set_time` on its own channel therefore sets the next period, and a
    /// one-shot channel re-armed from its own callback keeps running.
    ///
    /// A call made while a sweep is already in progress (nested interrupt, or a
    /// callback calling `tick()`) returns immediately and is counted in
    /// [`missed_ticks`](Self::missed_ticks).
    pub fn tick(&self) {
        let entered = self.update_dispatch(|state| {
            if state.sweeping {
                state.missed_ticks = state.missed_ticks.wrapping_add(1);
                false
            } else {
                state.sweeping = true;
                true
            }
        });

        if !entered {
            trace!("tick coalesced");
            return;
        }

        for index in 0..N {
            self.advance(index);
        }

        self.update_dispatch(|state| state.sweeping = false);
    }

    /// Number of ticks dropped because a sweep was still in progress.
    pub fn missed_ticks(&self) -> u32 {
        critical_section::with(|cs| self.dispatch.borrow(cs).get().missed_ticks)
    }

    fn advance(&self, index: usize) {
        // Outer Option: expired this tick. Inner: the callback to run.
        let expired = critical_section::with(|cs| {
            let mut channels = self.channels.borrow_ref_mut(cs);
            let ch = &mut channels[index];

            if !ch.running {
                return None;
            }

            match ch.mode {
                Mode::Stopwatch => {
                    ch.value = ch.value.wrapping_add(1);
                    None
                }
                Mode::Countdown => {
                    if ch.value == 0 {
                        match C::ZERO_VALUE_POLICY {
                            ZeroValuePolicy::ExpireOnNextTick => {}
                            ZeroValuePolicy::Wrap => {
                                ch.value = u32::MAX;
                                return None;
                            }
                        }
                    } else {
                        ch.value -= 1;
                        if ch.value != 0 {
                            return None;
                        }
                    }
                    Some(ch.callback)
                }
            }
        });

        let Some(callback) = expired else {
            return;
        };

        if let Some(callback) = callback {
            callback.on_expire();
        }

        critical_section::with(|cs| {
            let mut channels = self.channels.borrow_ref_mut(cs);
            let ch = &mut channels[index];

            // A callback that gave its channel a new value has re-armed it.
            if ch.mode == Mode::Countdown && ch.value == 0 {
                if ch.reload != 0 {
                    ch.value = ch.reload;
                } else {
                    ch.running = false;
                }
            }
        });
    }

    // ========================================================================
    // Control API
    // ========================================================================

    /// Set the channel value, with optional auto-reload.
    ///
    /// With `auto_reload` a countdown channel restarts from `value` each time it
    /// expires. Stopwatch channels never keep a reload value. Takes effect
    /// immediately, also on a running channel.
    pub fn set_time(&self, ch: usize, value: u32, auto_reload: bool) -> Result<(), TimerError> {
        self.with_channel(ch, |channel| {
            channel.value = value;
            channel.reload = if auto_reload && channel.mode == Mode::Countdown {
                value
            } else {
                0
            };
            Ok(())
        })
    }

    /// Start the channel.
    ///
    /// Starting a running channel is a no-op and succeeds without touching its
    /// value. A stopped countdown channel holding 0 cannot be started.
    pub fn start(&self, ch: usize) -> Result<(), TimerError> {
        self.with_channel(ch, |channel| {
            if channel.running {
                return Ok(());
            }
            if channel.mode == Mode::Countdown && channel.value == 0 {
                trace!("channel {} not started: countdown at zero", ch);
                return Err(TimerError::ZeroCountdown);
            }
            channel.running = true;
            Ok(())
        })
    }

    /// Stop the channel. The next tick sweep skips it.
    pub fn stop(&self, ch: usize) -> Result<(), TimerError> {
        self.with_channel(ch, |channel| {
            channel.running = false;
            Ok(())
        })
    }

    /// Set the channel value to 0 without stopping it.
    ///
    /// On a running countdown channel the next tick is governed by
    /// [`TimerConfig::ZERO_VALUE_POLICY`].
    pub fn reset(&self, ch: usize) -> Result<(), TimerError> {
        self.with_channel(ch, |channel| {
            channel.value = 0;
            Ok(())
        })
    }

    /// Current value: remaining ticks (countdown) or elapsed ticks (stopwatch).
    pub fn value(&self, ch: usize) -> Result<u32, TimerError> {
        self.with_channel(ch, |channel| Ok(channel.value))
    }

    /// Change the counting direction.
    ///
    /// A running channel keeps its mode: changing it fails with
    /// `ChannelRunning` (setting the current mode again is accepted). The
    /// value is kept; switching to stopwatch drops the reload value.
    pub fn set_mode(&self, ch: usize, mode: Mode) -> Result<(), TimerError> {
        self.with_channel(ch, |channel| {
            if channel.mode == mode {
                return Ok(());
            }
            if channel.running {
                trace!("channel {} mode change rejected: running", ch);
                return Err(TimerError::ChannelRunning);
            }
            channel.mode = mode;
            if mode == Mode::Stopwatch {
                channel.reload = 0;
            }
            Ok(())
        })
    }

    /// Attach the expiry callback, replacing any previous one.
    ///
    /// See [`TimerCallback`](crate::TimerCallback) for what a callback may do.
    pub fn register_callback(&self, ch: usize, callback: Callback) -> Result<(), TimerError> {
        self.with_channel(ch, |channel| {
            channel.callback = Some(callback);
            Ok(())
        })
    }

    /// Detach the expiry callback.
    pub fn unregister_callback(&self, ch: usize) -> Result<(), TimerError> {
        self.with_channel(ch, |channel| {
            channel.callback = None;
            Ok(())
        })
    }

    /// Whether the channel advances on ticks.
    pub fn is_running(&self, ch: usize) -> Result<bool, TimerError> {
        self.with_channel(ch, |channel| Ok(channel.running))
    }

    /// Current counting direction.
    pub fn mode(&self, ch: usize) -> Result<Mode, TimerError> {
        self.with_channel(ch, |channel| Ok(channel.mode))
    }

    /// Consistent copy of the whole channel state.
    pub fn snapshot(&self, ch: usize) -> Result<ChannelSnapshot, TimerError> {
        self.with_channel(ch, |channel| Ok(channel.snapshot()))
    }

    /// Block for `ticks` tick periods using channel `ch`.
    ///
    /// Takes the channel over: it is switched to countdown, stopped, armed as a
    /// one-shot for `ticks` and started, then this busy-waits until it stops.
    /// An attached callback still fires at the end. Fails with
    /// `ChannelRunning` if the channel is running as a stopwatch.
    ///
    /// Fails with `NotInitialized`, leaving the channel untouched, until
    /// [`init`](Self::init) has succeeded, since no tick would end the wait.
    ///
    /// Foreground only: calling this from a callback never returns, because the
    /// tick that would end the wait cannot be dispatched.
    pub fn delay(&self, ch: usize, ticks: u32) -> Result<(), TimerError> {
        self.mode(ch)?;
        if !self.is_initialized() {
            warn!("delay on channel {} before init", ch);
            return Err(TimerError::NotInitialized);
        }

        self.set_mode(ch, Mode::Countdown)?;
        self.stop(ch)?;

        if ticks == 0 {
            return Ok(());
        }

        self.set_time(ch, ticks, false)?;
        self.start(ch)?;

        while self.is_running(ch)? {
            core::hint::spin_loop();
        }
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn with_channel<R>(
        &self,
        ch: usize,
        f: impl FnOnce(&mut Channel) -> Result<R, TimerError>,
    ) -> Result<R, TimerError> {
        if ch >= N {
            return Err(TimerError::InvalidChannel);
        }
        critical_section::with(|cs| f(&mut self.channels.borrow_ref_mut(cs)[ch]))
    }

    fn update_dispatch<R>(&self, f: impl FnOnce(&mut DispatchState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.dispatch.borrow(cs);
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }
}
