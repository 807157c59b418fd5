//! Core key and input event types shared by the line editor crates.
//!
//! The editor consumes exactly one `InputEvent` per step. Events are produced by a
//! `KeySource`: the terminal-backed channel source in `core-input` at runtime, or a
//! scripted queue in tests. A read that times out yields `Ok(None)`; the editor uses that
//! path both for idle notification and for resolving a pending escape prefix.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters bumped by the input thread and the interpreter. Read together through
// `InputTelemetry::snapshot`, which the binary logs once at shutdown.
// -------------------------------------------------------------------------------------------------
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0);
pub static KEYPRESS_UNMAPPED: AtomicU64 = AtomicU64::new(0);
pub static PASTE_EVENTS: AtomicU64 = AtomicU64::new(0);
pub static PASTE_BYTES: AtomicU64 = AtomicU64::new(0);
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);

/// Point-in-time copy of the input counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputTelemetry {
    pub keypresses: u64,
    pub unmapped: u64,
    pub pastes: u64,
    pub paste_bytes: u64,
    pub send_failures: u64,
}

impl InputTelemetry {
    pub fn snapshot() -> Self {
        Self {
            keypresses: KEYPRESS_TOTAL.load(Ordering::Relaxed),
            unmapped: KEYPRESS_UNMAPPED.load(Ordering::Relaxed),
            pastes: PASTE_EVENTS.load(Ordering::Relaxed),
            paste_bytes: PASTE_BYTES.load(Ordering::Relaxed),
            send_failures: CHANNEL_SEND_FAILURES.load(Ordering::Relaxed),
        }
    }
}

/// Bound of the input thread -> editor channel.
pub const INPUT_CHANNEL_CAP: usize = 1024;

/// Logical key identity after terminal decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Unmodified key.
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Unmodified character key.
    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    /// Control chord, e.g. `KeyEvent::ctrl('w')`.
    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    /// Alt chord on an arbitrary key code.
    pub const fn alt(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::ALT)
    }

    pub fn has_ctrl(&self) -> bool {
        self.mods.contains(KeyModifiers::CTRL)
    }

    pub fn has_alt(&self) -> bool {
        self.mods.contains(KeyModifiers::ALT)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Characters are rendered as their discriminant only so that typed text never reaches logs.
        match self.code {
            KeyCode::Char(_) => f.write_str("Char")?,
            other => write!(f, "{:?}", other)?,
        }
        for (name, _) in self.mods.iter_names() {
            write!(f, "+{name}")?;
        }
        Ok(())
    }
}

/// Normalized input events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    /// Complete bracketed paste payload. Never logged verbatim; log only its length.
    Paste(String),
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The producer side of the key stream is gone (input thread exited or stdin closed).
    #[error("input source disconnected")]
    Disconnected,
}

/// Producer of input events for the editor.
///
/// `timeout = None` blocks until an event arrives. `Ok(None)` means the timeout elapsed with no
/// event; implementations must not fabricate events on timeout.
pub trait KeySource {
    fn read_event(&mut self, timeout: Option<Duration>) -> Result<Option<InputEvent>, InputError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_display_hides_character() {
        let k = KeyEvent::char('x');
        let s = format!("{}", k);
        assert!(s.starts_with("Char"));
        assert!(!s.contains('x'));
        assert_eq!(KeyEvent::ctrl('w').to_string(), "Char+CTRL");
    }

    #[test]
    fn key_event_display_named_key() {
        let k = KeyEvent::alt(KeyCode::Left);
        let s = k.to_string();
        assert!(s.contains("Left"));
        assert!(s.contains("ALT"));
    }

    #[test]
    fn telemetry_snapshot_reads_counters() {
        let before = InputTelemetry::snapshot();
        KEYPRESS_UNMAPPED.fetch_add(2, Ordering::Relaxed);
        PASTE_BYTES.fetch_add(7, Ordering::Relaxed);
        let after = InputTelemetry::snapshot();
        assert!(after.unmapped >= before.unmapped + 2);
        assert!(after.paste_bytes >= before.paste_bytes + 7);
    }

    #[test]
    fn chord_constructors_set_modifiers() {
        assert!(KeyEvent::ctrl('w').has_ctrl());
        assert!(!KeyEvent::ctrl('w').has_alt());
        assert!(KeyEvent::alt(KeyCode::Char('1')).has_alt());
        assert!(KeyEvent::char('a').mods.is_empty());
    }
}
