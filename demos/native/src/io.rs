//! Terminal handling for native demos

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write};
use std::time::Duration;

// =============================================================================
// Terminal Raw Mode Guard
// =============================================================================

/// RAII guard that enables raw terminal mode on creation and restores on drop.
///
/// This ensures the terminal is always restored, even on panic or error.
/// Raw mode delivers single key presses immediately (the space bar is the
/// demo's push button) and keeps them from being echoed.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Always try to restore terminal mode
        let _ = disable_raw_mode();
    }
}

// =============================================================================
// Key Input
// =============================================================================

/// Key actions understood by the demos.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    /// Space bar, mapped to the push button
    Button,
    /// `q`, `Esc` or Ctrl-C
    Quit,
}

/// Non-blocking key read. Returns `Ok(None)` when nothing relevant was pressed.
pub fn poll_key() -> io::Result<Option<Key>> {
    if !event::poll(Duration::ZERO)? {
        return Ok(None);
    }

    let key = match event::read()? {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) => match code {
            KeyCode::Char(' ') => Some(Key::Button),
            KeyCode::Char('q') | KeyCode::Esc => Some(Key::Quit),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Key::Quit),
            _ => None,
        },
        _ => None,
    };
    Ok(key)
}

// =============================================================================
// Output
// =============================================================================

/// Overwrite the current terminal line (raw mode needs explicit `\r`).
pub fn redraw_line(line: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\r{}\x1b[K", line)?;
    stdout.flush()
}
