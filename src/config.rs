//! Configuration traits and implementations for tick rate and edge-case policy.
//!
//! The `TimerConfig` trait allows compile-time configuration of the timer
//! without runtime overhead. The channel count is not part of the trait: it is
//! the `N` const generic of [`SoftTimer`](crate::SoftTimer), since array lengths
//! cannot depend on associated constants yet.

/// What the dispatcher does with a running countdown channel that holds 0.
///
/// A running countdown channel can only hold 0 when `reset()` or
/// `set_time(ch, 0, _)` was applied while it was running; `start()` refuses
/// to run a countdown from 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZeroValuePolicy {
    /// The next tick expires the channel without decrementing: the callback
    /// fires, then the channel reloads or stops.
    ExpireOnNextTick,

    /// The decrement underflows to `u32::MAX` and the channel keeps counting
    /// down without firing, as classic C software-timer drivers do.
    Wrap,
}

/// Timer configuration trait.
///
/// All values are const (zero runtime cost).
pub trait TimerConfig {
    /// Tick period in microseconds handed to the tick source (default: 1000)
    const TICK_PERIOD_US: u32;

    /// Handling of running countdown channels forced to 0
    const ZERO_VALUE_POLICY: ZeroValuePolicy;
}

/// Default configuration: 1 ms ticks, zero-valued running channels expire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultConfig;

impl TimerConfig for DefaultConfig {
    const TICK_PERIOD_US: u32 = 1000;
    const ZERO_VALUE_POLICY: ZeroValuePolicy = ZeroValuePolicy::ExpireOnNextTick;
}

/// Compatibility configuration: 1 ms ticks, zero-valued running channels wrap.
///
/// Keeps the plain unsigned underflow on a zero-valued running countdown.
/// Only useful when porting code that depends on it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LegacyConfig;

impl TimerConfig for LegacyConfig {
    const TICK_PERIOD_US: u32 = 1000;
    const ZERO_VALUE_POLICY: ZeroValuePolicy = ZeroValuePolicy::Wrap;
}
