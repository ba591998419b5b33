//! # nut-timer
//!
//! Many software timer channels multiplexed onto one periodic hardware tick.
//!
//! **Key features:**
//! - **Static allocation** - Fixed channel table, const-constructible, zero heap usage
//! - **Countdown and stopwatch channels** - One-shot, auto-reload, or free-running
//! - **Expiry callbacks** - Run from the tick interrupt, may call back into the timer
//! - **Interrupt safe** - Every channel access runs in a critical section
//! - **Flexible tick source** - Platform-agnostic `TickSource` trait
//!
//! ## Usage
//!
//! ```
//! use nut_timer::{DefaultConfig, Mode, SoftTimer};
//!
//! const LED: usize = 0;
//! const UPTIME: usize = 1;
//!
//! static TIMER: SoftTimer<DefaultConfig, 2> = SoftTimer::new();
//!
//! fn toggle_led() {}
//! static TOGGLE_LED: fn() = toggle_led;
//!
//! // Periodic 500 ms callback
//! TIMER.set_time(LED, 500, true).unwrap();
//! TIMER.register_callback(LED, &TOGGLE_LED).unwrap();
//! TIMER.start(LED).unwrap();
//!
//! // Free-running millisecond counter
//! TIMER.set_mode(UPTIME, Mode::Stopwatch).unwrap();
//! TIMER.start(UPTIME).unwrap();
//!
//! // The tick interrupt handler calls TIMER.tick() once per millisecond
//! TIMER.tick();
//! assert_eq!(TIMER.value(UPTIME), Ok(1));
//! assert_eq!(TIMER.value(LED), Ok(499));
//! ```
//!
//! ## Optional Features
//!
//! - `delay` (default) - `embedded_hal::delay::DelayNs` on a timer channel
//! - `cortex-m` - SysTick tick source for Cortex-M
//! - `defmt` - Logging and `defmt::Format` derives
//!
//! The platform must provide a `critical-section` implementation.
//!
//! This library is `no_std` compatible.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Logging macros, must come first
#[macro_use]
mod fmt;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod channel;
pub mod config;
pub mod error;
pub mod tick;
pub mod timer;

#[cfg(feature = "delay")]
pub mod delay;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Channel types
pub use channel::{Callback, ChannelSnapshot, Mode, TimerCallback};

// Configuration
pub use config::{DefaultConfig, LegacyConfig, TimerConfig, ZeroValuePolicy};

// Error types
pub use error::TimerError;

// Tick source
pub use tick::TickSource;

#[cfg(feature = "cortex-m")]
pub use tick::{SysTickError, SysTickSource};

// Timer
pub use timer::SoftTimer;

#[cfg(feature = "delay")]
pub use delay::ChannelDelay;

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
