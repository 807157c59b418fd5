//! Editing actions and the key interpreter that produces them.
//!
//! `Action` is the closed vocabulary of line-editing operations. The editor applies actions; it
//! never inspects raw keys. `KeyInterpreter` owns the only piece of key-level state (whether an
//! escape prefix is pending) so escape-prefixed chords resolve without nested blocking reads.

mod interpreter;

pub use interpreter::{Interpretation, InterpreterState, KeyInterpreter};

/// One line-editing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert(char),
    CursorLeft,
    CursorRight,
    WordLeft,
    WordRight,
    /// Backspace.
    DeleteBefore,
    /// Forward delete.
    DeleteAt,
    /// Kill word: remove from the word-left boundary to the cursor.
    DeleteWordBefore,
    DeleteToLineStart,
    Home,
    End,
    HistoryPrevious,
    HistoryNext,
    Complete,
    /// Window selected by digit (`0..=9`, as typed).
    SwitchWindow(u8),
    NextWindow,
    PreviousWindow,
    Submit,
    /// Bare escape: discard the current line.
    AbortLine,
}

impl Action {
    /// Stable name for logs. Never includes the inserted character.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Insert(_) => "insert",
            Action::CursorLeft => "cursor_left",
            Action::CursorRight => "cursor_right",
            Action::WordLeft => "word_left",
            Action::WordRight => "word_right",
            Action::DeleteBefore => "delete_before",
            Action::DeleteAt => "delete_at",
            Action::DeleteWordBefore => "delete_word_before",
            Action::DeleteToLineStart => "delete_to_line_start",
            Action::Home => "home",
            Action::End => "end",
            Action::HistoryPrevious => "history_previous",
            Action::HistoryNext => "history_next",
            Action::Complete => "complete",
            Action::SwitchWindow(_) => "switch_window",
            Action::NextWindow => "next_window",
            Action::PreviousWindow => "previous_window",
            Action::Submit => "submit",
            Action::AbortLine => "abort_line",
        }
    }
}
