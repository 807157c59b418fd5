//! Line editor model.
//!
//! `LineEditor` owns every piece of editing state for one input line: the `TextBuffer`, the
//! cursor (a codepoint column), the horizontal `Viewport`, the `HistoryLog` and the
//! `KeyInterpreter`. It is created once by the session loop and reset between submitted lines;
//! nothing here is global.
//!
//! Processing is strictly sequential. `read_line` pulls exactly one event from the key source,
//! interprets it, applies the resulting action and repaints through the render hook before it
//! returns. A completed line is returned only when the terminator key was seen; every other call
//! yields `LineRead::Pending` so the caller can interleave its own work.
//!
//! Invariants (hold after every public call):
//! * `cursor <= buffer.len_chars()`.
//! * `viewport.scroll_offset() <= cursor < viewport.scroll_offset() + viewport.width()`.
//! * Buffer contents are valid UTF-8 within capacity (enforced by `TextBuffer`).
//!
//! Submit contract: the editor never appends a submitted line to history. The caller receives
//! `LineRead::Submitted` and decides whether to call `history_append`.
//!
//! Local edit errors (capacity, invalid codepoint, out-of-range column) never reach the caller;
//! they are logged at `trace` and the key is dropped. Logs carry lengths and columns only.

mod hooks;
mod masked;

pub use hooks::{ActivityObserver, Completer, Detached, EditorHooks, WindowNavigator};
pub use masked::get_masked_line;

use core_actions::{Action, Interpretation, KeyInterpreter};
use core_config::EditorConfig;
use core_events::{InputError, InputEvent, KeyEvent, KeySource};
use core_render::{LineRenderer, Viewport};
use core_state::HistoryLog;
use core_text::{EditError, TextBuffer, printable};
use std::time::Duration;
use tracing::{debug, trace};

/// Result of one `read_line` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// Terminator observed; the editor has already been reset.
    Submitted(String),
    /// No complete line yet.
    Pending,
    /// Key without a binding, returned so the caller may apply a default.
    Unhandled(KeyEvent),
    /// Terminal size changed. The viewport already follows `cols`; the caller should update its
    /// renderer geometry and call `redraw`.
    Resized { cols: u16, rows: u16 },
}

pub struct LineEditor {
    buffer: TextBuffer,
    cursor: usize,
    viewport: Viewport,
    history: HistoryLog,
    interpreter: KeyInterpreter,
    config: EditorConfig,
    /// The previous action was a completion; collaborators get `reset` on the next other action.
    completing: bool,
}

impl LineEditor {
    pub fn new(config: EditorConfig, visible_width: usize) -> Self {
        debug!(
            target: "editor",
            capacity = config.buffer_capacity,
            history = config.history_capacity,
            width = visible_width,
            "editor_created"
        );
        Self {
            buffer: TextBuffer::new(config.buffer_capacity),
            cursor: 0,
            viewport: Viewport::new(visible_width),
            history: HistoryLog::new(config.history_capacity),
            interpreter: KeyInterpreter::new(),
            config,
            completing: false,
        }
    }

    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.viewport.scroll_offset()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Read timeout for the next `read_line`: the escape delay while an escape prefix is pending,
    /// the idle timeout otherwise (`None` blocks).
    pub fn next_timeout(&self) -> Option<Duration> {
        if self.interpreter.is_pending() {
            Some(self.config.escape_delay)
        } else {
            self.config.idle_timeout
        }
    }

    /// Consume one event from `source` and apply it.
    pub fn read_line<S: KeySource + ?Sized>(
        &mut self,
        source: &mut S,
        hooks: &mut EditorHooks<'_>,
    ) -> Result<LineRead, InputError> {
        let event = source.read_event(self.next_timeout())?;
        Ok(match event {
            None => self.handle_timeout(hooks),
            Some(InputEvent::Key(key)) => self.handle_key(&key, hooks),
            Some(InputEvent::Paste(text)) => {
                self.paste(&text, hooks);
                LineRead::Pending
            }
            Some(InputEvent::Resize(cols, rows)) => {
                self.drop_escape_prefix();
                self.resize(cols as usize);
                LineRead::Resized { cols, rows }
            }
        })
    }

    pub fn handle_key(&mut self, key: &KeyEvent, hooks: &mut EditorHooks<'_>) -> LineRead {
        match self.interpreter.translate(key) {
            Interpretation::Action(action) => self.apply(action, hooks),
            Interpretation::Pending => LineRead::Pending,
            Interpretation::Consumed => {
                self.end_completion(hooks);
                LineRead::Pending
            }
            Interpretation::NotHandled(key) => {
                self.end_completion(hooks);
                LineRead::Unhandled(key)
            }
        }
    }

    /// A paste or resize between Esc and its follow-up key cancels the prefix, so the pending
    /// escape delay cannot turn into an abort of the new text.
    fn drop_escape_prefix(&mut self) {
        if self.interpreter.is_pending() {
            self.interpreter.reset();
            trace!(target: "editor", "escape_prefix_dropped");
        }
    }

    /// The read window elapsed with no event.
    pub fn handle_timeout(&mut self, hooks: &mut EditorHooks<'_>) -> LineRead {
        match self.interpreter.resolve_timeout() {
            Some(action) => self.apply(action, hooks),
            None => {
                hooks.activity.on_idle();
                LineRead::Pending
            }
        }
    }

    /// Insert pasted text through the regular insert path. Control characters are dropped and
    /// the paste stops at the first capacity rejection.
    pub fn paste(&mut self, text: &str, hooks: &mut EditorHooks<'_>) {
        self.drop_escape_prefix();
        self.end_completion(hooks);
        let mut inserted = 0usize;
        let mut command = self.buffer.starts_with(self.config.sigil);
        for c in text.chars() {
            if c.is_control() {
                continue;
            }
            if inserted == 0 && !command {
                command = self.is_command_line(c);
            }
            match self.insert_char(c) {
                Ok(()) => inserted += 1,
                Err(EditError::CapacityExceeded { .. }) => break,
                Err(_) => {}
            }
        }
        debug!(target: "editor", len = text.len(), inserted, "paste");
        if inserted > 0 {
            self.redraw(hooks.renderer);
            if !command {
                hooks.activity.on_activity();
            }
        }
    }

    /// Apply one action. Visible changes are repainted before returning.
    pub fn apply(&mut self, action: Action, hooks: &mut EditorHooks<'_>) -> LineRead {
        trace!(target: "editor", action = action.name(), cursor = self.cursor, len = self.buffer.len_chars(), "apply");
        if action != Action::Complete {
            self.end_completion(hooks);
        }
        match action {
            Action::SwitchWindow(index) => hooks.windows.switch_to(index),
            Action::NextWindow => hooks.windows.next(),
            Action::PreviousWindow => hooks.windows.previous(),
            Action::Insert(c) => {
                let command = self.is_command_line(c);
                if self.insert_char(c).is_ok() {
                    self.redraw(hooks.renderer);
                    if !command {
                        hooks.activity.on_activity();
                    }
                }
            }
            Action::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.viewport.step_left(self.cursor);
                    self.redraw(hooks.renderer);
                }
            }
            Action::CursorRight => {
                if self.cursor < self.buffer.len_chars() {
                    self.cursor += 1;
                    self.viewport.step_right(self.cursor);
                    self.redraw(hooks.renderer);
                }
            }
            Action::WordLeft => {
                self.cursor = self.buffer.word_left(self.cursor);
                self.viewport.jump_to(self.cursor);
                self.redraw(hooks.renderer);
            }
            Action::WordRight => {
                self.cursor = self.buffer.word_right(self.cursor);
                self.viewport.jump_to(self.cursor);
                self.redraw(hooks.renderer);
            }
            Action::DeleteBefore => {
                if self.cursor > 0 {
                    match self.buffer.delete_at(self.cursor - 1) {
                        Ok(_) => {
                            self.cursor -= 1;
                            self.viewport.jump_to(self.cursor);
                            self.redraw(hooks.renderer);
                        }
                        Err(e) => trace!(target: "editor", error = %e, "delete_rejected"),
                    }
                }
            }
            Action::DeleteAt => {
                if self.cursor < self.buffer.len_chars() {
                    match self.buffer.delete_at(self.cursor) {
                        Ok(_) => {
                            self.viewport.jump_to(self.cursor);
                            self.redraw(hooks.renderer);
                        }
                        Err(e) => trace!(target: "editor", error = %e, "delete_rejected"),
                    }
                }
            }
            Action::DeleteWordBefore => {
                if self.kill_word() {
                    self.redraw(hooks.renderer);
                }
            }
            Action::DeleteToLineStart => {
                let mut changed = false;
                while self.cursor > 0 && self.kill_word() {
                    changed = true;
                }
                if changed {
                    self.viewport.home();
                    self.redraw(hooks.renderer);
                }
            }
            Action::Home => {
                self.cursor = 0;
                self.viewport.home();
                self.redraw(hooks.renderer);
            }
            Action::End => {
                self.cursor = self.buffer.len_chars();
                self.viewport.end(self.cursor);
                self.redraw(hooks.renderer);
            }
            Action::HistoryPrevious => {
                let recalled = self.history.previous(self.buffer.as_str()).map(str::to_owned);
                match recalled {
                    Some(line) => {
                        self.replace_whole_line(&line);
                        self.redraw(hooks.renderer);
                    }
                    None => trace!(target: "editor", "history_previous_at_boundary"),
                }
            }
            Action::HistoryNext => match self.history.next(self.buffer.as_str()) {
                Some(line) => {
                    self.replace_whole_line(&line);
                    self.redraw(hooks.renderer);
                }
                None => trace!(target: "editor", "history_next_at_boundary"),
            },
            Action::Complete => self.complete(hooks),
            Action::Submit => {
                let line = self.buffer.as_str().to_owned();
                self.reset();
                self.redraw(hooks.renderer);
                debug!(target: "editor", len = line.len(), "submit");
                return LineRead::Submitted(line);
            }
            Action::AbortLine => {
                let dropped = self.buffer.len_chars();
                self.reset();
                self.redraw(hooks.renderer);
                debug!(target: "editor", dropped, "abort_line");
            }
        }
        LineRead::Pending
    }

    fn end_completion(&mut self, hooks: &mut EditorHooks<'_>) {
        if self.completing {
            self.completing = false;
            hooks.commands.reset();
            hooks.contextual.reset();
        }
    }

    /// Judged before `typed` is inserted: the line already starts with the sigil, or it is empty
    /// and `typed` is the sigil.
    fn is_command_line(&self, typed: char) -> bool {
        self.buffer.starts_with(self.config.sigil)
            || (self.buffer.is_empty() && typed == self.config.sigil)
    }

    /// Validate and insert at the cursor: end-of-line appends without shifting, mid-line
    /// inserts shift the tail.
    fn insert_char(&mut self, c: char) -> Result<(), EditError> {
        let c = printable(c).inspect_err(|e| trace!(target: "editor", error = %e, "insert_rejected"))?;
        let result = if self.cursor == self.buffer.len_chars() {
            self.buffer.push(c)
        } else {
            self.buffer.insert(self.cursor, c)
        };
        if let Err(e) = result {
            trace!(target: "editor", error = %e, "insert_rejected");
            return Err(e);
        }
        self.cursor += 1;
        self.viewport.follow_typing(self.cursor);
        Ok(())
    }

    /// Delete from the word-left boundary to the cursor. Returns whether anything was removed.
    fn kill_word(&mut self) -> bool {
        let start = self.buffer.word_left(self.cursor);
        if start >= self.cursor {
            return false;
        }
        match self.buffer.delete_range(start, self.cursor) {
            Ok(_) => {
                self.cursor = start;
                self.viewport.jump_to(self.cursor);
                true
            }
            Err(e) => {
                trace!(target: "editor", error = %e, "kill_word_rejected");
                false
            }
        }
    }

    fn complete(&mut self, hooks: &mut EditorHooks<'_>) {
        if self.buffer.is_empty() {
            return;
        }
        let command = self.buffer.starts_with(self.config.sigil);
        let result = if command {
            hooks.commands.complete(self.buffer.as_str())
        } else {
            hooks.contextual.complete(self.buffer.as_str())
        };
        self.completing = true;
        match result {
            Some(text) => {
                debug!(target: "editor", command, len = text.len(), "completed");
                self.replace_whole_line(&text);
                self.redraw(hooks.renderer);
            }
            None => trace!(target: "editor", command, "no_completion"),
        }
    }

    /// Overwrite the buffer with `text` and put the cursor at its end. Text past capacity is
    /// truncated at a codepoint boundary. Does not repaint; call `redraw` afterwards.
    pub fn replace_whole_line(&mut self, text: &str) {
        if let Err(e) = self.buffer.replace(text) {
            debug!(target: "editor", error = %e, "replace_truncated");
        }
        self.cursor = self.buffer.len_chars();
        self.viewport.jump_to(self.cursor);
    }

    /// Clear buffer, cursor and scroll; abandon history browsing and any pending escape prefix.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.viewport.reset();
        self.history.reset_navigation();
        self.interpreter.reset();
    }

    /// Record a line in history. Empty lines are ignored.
    pub fn history_append(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        self.history.append(line);
    }

    pub fn resize(&mut self, visible_width: usize) {
        self.viewport.resize(visible_width, self.cursor);
    }

    pub fn redraw(&self, renderer: &mut dyn LineRenderer) {
        renderer.draw(
            self.buffer.as_str(),
            self.cursor,
            self.viewport.scroll_offset(),
        );
    }

    /// Masked capture bounded by `max_length` codepoints; see [`get_masked_line`].
    pub fn get_masked_line<S: KeySource + ?Sized>(
        &mut self,
        source: &mut S,
        renderer: &mut dyn LineRenderer,
        max_length: usize,
    ) -> Result<String, InputError> {
        self.interpreter.reset();
        let secret = get_masked_line(source, renderer, max_length)?;
        self.redraw(renderer);
        Ok(secret)
    }
}
