//! Simulated MOSI M1 board peripherals
//!
//! Stand-ins for the GPIO-driven RGB LED and push button of the MOSI M1
//! board. State lives in atomics so timer callbacks (tick thread) and the
//! main loop can share it.

use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

// =============================================================================
// RGB LED
// =============================================================================

/// Red bit of an RGB mask
pub const RED: u8 = 1 << 0;
/// Green bit of an RGB mask
pub const GREEN: u8 = 1 << 1;
/// Blue bit of an RGB mask
pub const BLUE: u8 = 1 << 2;

/// Common-anode RGB LED, one bit per color.
#[derive(Debug)]
pub struct RgbLed {
    mask: AtomicU8,
}

impl RgbLed {
    pub const fn new() -> Self {
        Self {
            mask: AtomicU8::new(0),
        }
    }

    /// Turn on exactly the colors in `rgb`. Masks above 7 are rejected.
    pub fn set_rgb(&self, rgb: u8) -> Result<(), u8> {
        if rgb > (RED | GREEN | BLUE) {
            return Err(rgb);
        }
        self.mask.store(rgb, Ordering::Relaxed);
        Ok(())
    }

    pub fn set(&self, color: u8) {
        self.mask.fetch_or(color, Ordering::Relaxed);
    }

    pub fn clear(&self, color: u8) {
        self.mask.fetch_and(!color, Ordering::Relaxed);
    }

    pub fn rgb(&self) -> u8 {
        self.mask.load(Ordering::Relaxed)
    }

    /// Single-letter rendering of the lit colors, e.g. "R", "GB", "-".
    pub fn describe(&self) -> &'static str {
        match self.rgb() {
            0 => "-",
            RED => "R",
            GREEN => "G",
            BLUE => "B",
            m if m == RED | GREEN => "RG",
            m if m == RED | BLUE => "RB",
            m if m == GREEN | BLUE => "GB",
            _ => "RGB",
        }
    }
}

impl Default for RgbLed {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Push Button
// =============================================================================

/// Number of 10 ms button polls a key press stays held for.
const HOLD_POLLS: u32 = 5;

/// Momentary push button.
///
/// A terminal only reports key presses, so `press()` holds the button down
/// for a few polls and then releases it.
#[derive(Debug)]
pub struct Button {
    held_polls: AtomicU32,
}

impl Button {
    pub const fn new() -> Self {
        Self {
            held_polls: AtomicU32::new(0),
        }
    }

    pub fn press(&self) {
        self.held_polls.store(HOLD_POLLS, Ordering::Relaxed);
    }

    /// Read the button level; true while held.
    pub fn is_pressed(&self) -> bool {
        self.held_polls
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Board
// =============================================================================

/// All simulated peripherals.
#[derive(Debug)]
pub struct Board {
    pub led: RgbLed,
    pub button: Button,
}

impl Board {
    pub const fn new() -> Self {
        Self {
            led: RgbLed::new(),
            button: Button::new(),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
