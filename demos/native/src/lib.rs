//! Shared library code for native platform demos
//!
//! This module contains the host stand-ins for the hardware around the
//! timer: a tick thread, simulated board peripherals and terminal I/O.

pub mod board;
pub mod io;
pub mod ticker;

// Re-export commonly used types for convenience
pub use board::{Board, Button, RgbLed};
pub use io::{Key, RawModeGuard, poll_key, redraw_line};
pub use ticker::ThreadTickSource;
