//! Error types for timer operations.
//!
//! Every failing operation leaves the channel table untouched, so callers can
//! treat an `Err` as "nothing happened" and decide their own recovery.

use core::fmt;

/// Timer error type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Channel index outside `[0, N)`
    InvalidChannel,

    /// Tried to start a stopped countdown channel holding 0
    ZeroCountdown,

    /// Tried to change the mode of a running channel
    ChannelRunning,

    /// `init()` called more than once
    AlreadyInitialized,

    /// Blocking wait requested before `init()` succeeded
    NotInitialized,

    /// The tick source refused to start
    TickSource,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::InvalidChannel => write!(f, "Invalid channel"),
            TimerError::ZeroCountdown => write!(f, "Countdown value is zero"),
            TimerError::ChannelRunning => write!(f, "Channel is running"),
            TimerError::AlreadyInitialized => write!(f, "Timer already initialized"),
            TimerError::NotInitialized => write!(f, "Timer not initialized"),
            TimerError::TickSource => write!(f, "Tick source failed to start"),
        }
    }
}

impl core::error::Error for TimerError {}
