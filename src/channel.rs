//! Channel records and the expiry callback contract.
//!
//! A channel is one logical timer in the fixed-size table owned by
//! [`SoftTimer`](crate::SoftTimer). Channels are never created or destroyed,
//! only reconfigured.

use core::fmt;

/// Counting direction of a channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Count down to zero, then fire the callback and reload or stop
    #[default]
    Countdown,

    /// Count up from the current value, never fire the callback
    Stopwatch,
}

/// Expiry callback of a countdown channel.
///
/// Implemented for every `Fn() + Sync`, so plain functions can be registered
/// through a `static`:
///
/// ```
/// use nut_timer::{DefaultConfig, SoftTimer};
///
/// fn blink() {}
/// static BLINK: fn() = blink;
///
/// static TIMER: SoftTimer<DefaultConfig, 4> = SoftTimer::new();
/// TIMER.register_callback(0, &BLINK).unwrap();
/// ```
///
/// # Contract
///
/// `on_expire` runs inside [`SoftTimer::tick`](crate::SoftTimer::tick), which
/// is normally the tick interrupt handler. Implementations:
///
/// - must complete within a short, bounded time, well below one tick period;
/// - must not block, and must never wait for the timer to advance (no
///   `SoftTimer::delay`, no polling `value()` for a change);
/// - may call any other `SoftTimer` method, including reconfiguring or
///   restarting their own channel.
///
/// When the callback returns, a channel still holding 0 reloads (or stops
/// when it has no reload value). A channel given a non-zero value by its
/// callback, e.g. `set_time(ch, 3, false)`, counts down from that value
/// instead, whether it was one-shot or periodic.
///
/// No channel identity is passed. Register a distinct callback per channel
/// when the handler needs to know which one expired.
pub trait TimerCallback: Sync {
    /// Called once each time the channel counts down to zero.
    fn on_expire(&self);
}

impl<F> TimerCallback for F
where
    F: Fn() + Sync,
{
    fn on_expire(&self) {
        self()
    }
}

/// Registered callback reference stored in a channel.
pub type Callback = &'static dyn TimerCallback;

/// One entry of the channel table.
#[derive(Copy, Clone)]
pub(crate) struct Channel {
    pub(crate) mode: Mode,
    pub(crate) running: bool,
    pub(crate) value: u32,
    pub(crate) reload: u32,
    pub(crate) callback: Option<Callback>,
}

impl Channel {
    /// Stopped countdown at zero, no reload, no callback.
    pub(crate) const IDLE: Channel = Channel {
        mode: Mode::Countdown,
        running: false,
        value: 0,
        reload: 0,
        callback: None,
    };

    pub(crate) fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            mode: self.mode,
            running: self.running,
            value: self.value,
            reload: self.reload,
            has_callback: self.callback.is_some(),
        }
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("mode", &self.mode)
            .field("running", &self.running)
            .field("value", &self.value)
            .field("reload", &self.reload)
            .field("callback", &self.callback.map(|_| "<dyn TimerCallback>"))
            .finish()
    }
}

/// Consistent copy of one channel's state.
///
/// All fields are read in the same critical section, so they never mix
/// values from before and after a concurrent update.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSnapshot {
    /// Counting direction
    pub mode: Mode,
    /// Whether the channel advances on ticks
    pub running: bool,
    /// Remaining (countdown) or elapsed (stopwatch) ticks
    pub value: u32,
    /// Auto-reload value, 0 when disabled
    pub reload: u32,
    /// Whether an expiry callback is attached
    pub has_callback: bool,
}
