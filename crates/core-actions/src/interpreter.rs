//! KeyInterpreter: two-state key -> Action translation.
//!
//! State machine:
//! * `Idle`: keys map through the plain binding table. A bare `Esc` enters `AltPending` and
//!   yields `Interpretation::Pending`; the caller then reads the next key with the escape delay.
//! * `AltPending`: the next key resolves through the alt table and the machine returns to `Idle`.
//!   If the read times out instead, `resolve_timeout` yields `Action::AbortLine`.
//!
//! A key that already carries `ALT` (the terminal decoded the escape prefix itself) resolves
//! through the same alt table directly from `Idle`, so `Esc` + `x` and `Alt-x` are identical.
//!
//! Keys with no binding come back as `NotHandled` and leave the state untouched; the caller
//! decides on a default.

use crate::Action;
use core_events::{KEYPRESS_UNMAPPED, KeyCode, KeyEvent, KeyModifiers};
use std::sync::atomic::Ordering;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpreterState {
    #[default]
    Idle,
    AltPending,
}

/// Outcome of feeding one key to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    Action(Action),
    /// Escape prefix observed; waiting for the next key or a timeout.
    Pending,
    /// Key swallowed with no effect (unbound alt chord).
    Consumed,
    /// No binding; the caller may apply a default.
    NotHandled(KeyEvent),
}

#[derive(Debug, Default)]
pub struct KeyInterpreter {
    state: InterpreterState,
}

impl KeyInterpreter {
    pub fn new() -> Self {
        Self {
            state: InterpreterState::Idle,
        }
    }

    pub fn state(&self) -> InterpreterState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == InterpreterState::AltPending
    }

    /// Drop a pending escape prefix without producing an action.
    pub fn reset(&mut self) {
        self.state = InterpreterState::Idle;
    }

    pub fn translate(&mut self, key: &KeyEvent) -> Interpretation {
        match self.state {
            InterpreterState::AltPending => {
                self.state = InterpreterState::Idle;
                let out = alt_binding(key);
                let action = match out {
                    Interpretation::Action(a) => a.name(),
                    _ => "none",
                };
                trace!(target: "input.interpreter", key = %key, action, "alt_resolved");
                out
            }
            InterpreterState::Idle => {
                if key.code == KeyCode::Esc && !key.has_alt() {
                    self.state = InterpreterState::AltPending;
                    trace!(target: "input.interpreter", "alt_pending");
                    return Interpretation::Pending;
                }
                if key.has_alt() {
                    return alt_binding(key);
                }
                let out = plain_binding(key);
                if let Interpretation::NotHandled(_) = out {
                    KEYPRESS_UNMAPPED.fetch_add(1, Ordering::Relaxed);
                    trace!(target: "input.interpreter", key = %key, "unmapped");
                }
                out
            }
        }
    }

    /// Read window elapsed with no key. Only meaningful while an escape prefix is pending.
    pub fn resolve_timeout(&mut self) -> Option<Action> {
        match self.state {
            InterpreterState::AltPending => {
                self.state = InterpreterState::Idle;
                trace!(target: "input.interpreter", "bare_escape");
                Some(Action::AbortLine)
            }
            InterpreterState::Idle => None,
        }
    }
}

fn plain_binding(key: &KeyEvent) -> Interpretation {
    use Interpretation::{Action as A, NotHandled};
    let ctrl = key.mods.contains(KeyModifiers::CTRL);
    match key.code {
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'a' => A(Action::Home),
            'e' => A(Action::End),
            'b' => A(Action::CursorLeft),
            'f' => A(Action::CursorRight),
            'p' => A(Action::HistoryPrevious),
            'n' => A(Action::HistoryNext),
            'd' => A(Action::DeleteAt),
            'w' => A(Action::DeleteWordBefore),
            'u' => A(Action::DeleteToLineStart),
            _ => NotHandled(*key),
        },
        KeyCode::Char(c) => A(Action::Insert(c)),
        KeyCode::Left if ctrl => A(Action::WordLeft),
        KeyCode::Right if ctrl => A(Action::WordRight),
        KeyCode::Left => A(Action::CursorLeft),
        KeyCode::Right => A(Action::CursorRight),
        KeyCode::Up => A(Action::HistoryPrevious),
        KeyCode::Down => A(Action::HistoryNext),
        KeyCode::Home => A(Action::Home),
        KeyCode::End => A(Action::End),
        KeyCode::Delete => A(Action::DeleteAt),
        KeyCode::Backspace => A(Action::DeleteBefore),
        KeyCode::Tab => A(Action::Complete),
        KeyCode::Enter => A(Action::Submit),
        _ => NotHandled(*key),
    }
}

fn alt_binding(key: &KeyEvent) -> Interpretation {
    use Interpretation::{Action as A, Consumed};
    match key.code {
        KeyCode::Char(d @ '0'..='9') => A(Action::SwitchWindow(d as u8 - b'0')),
        KeyCode::Char('b') => A(Action::WordLeft),
        KeyCode::Char('f') => A(Action::WordRight),
        KeyCode::Left => A(Action::PreviousWindow),
        KeyCode::Right => A(Action::NextWindow),
        KeyCode::Backspace => A(Action::DeleteWordBefore),
        _ => Consumed,
    }
}
