//! Horizontal viewport over the edited line.
//!
//! Tracks which codepoint column is the leftmost visible one (`scroll_offset`) inside a window
//! of `visible_width` columns. One column per codepoint is assumed.
//!
//! Invariant restored by every cursor-moving call:
//! `scroll_offset <= cursor < scroll_offset + width()`.
//!
//! Two scroll policies:
//! * Continuous typing (`follow_typing`) advances one column at a time once the cursor crosses
//!   the right margin (`RIGHT_MARGIN` columns from the edge), so the visible text slides smoothly.
//! * Discrete navigation (`jump_to`) moves by half the visible width when the cursor leaves the
//!   window on either side, so one logical action causes one redraw.

use tracing::trace;

/// Columns kept free at the right edge while typing.
pub const RIGHT_MARGIN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    scroll_offset: usize,
    visible_width: usize,
}

impl Viewport {
    pub fn new(visible_width: usize) -> Self {
        Self {
            scroll_offset: 0,
            visible_width,
        }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn visible_width(&self) -> usize {
        self.visible_width
    }

    /// Effective width; a zero-width window behaves as one column.
    pub fn width(&self) -> usize {
        self.visible_width.max(1)
    }

    fn half(&self) -> usize {
        self.width() / 2
    }

    pub fn contains(&self, cursor: usize) -> bool {
        cursor >= self.scroll_offset && cursor < self.scroll_offset + self.width()
    }

    /// Visible part of `text`.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        visible_slice(text, self.scroll_offset, self.width())
    }

    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }

    /// Minimal shift that puts `cursor` back inside the window.
    fn restore(&mut self, cursor: usize) {
        let w = self.width();
        if cursor < self.scroll_offset {
            self.scroll_offset = cursor;
        } else if cursor >= self.scroll_offset + w {
            self.scroll_offset = cursor + 1 - w;
        }
        debug_assert!(self.contains(cursor));
    }

    /// Scroll after a typed codepoint moved the cursor to `cursor`.
    pub fn follow_typing(&mut self, cursor: usize) {
        let limit = self.width().saturating_sub(RIGHT_MARGIN);
        if cursor.saturating_sub(self.scroll_offset) > limit {
            self.scroll_offset += 1;
            trace!(target: "edit.viewport", policy = "follow", scroll = self.scroll_offset, "scroll");
        }
        self.restore(cursor);
    }

    /// Scroll after a discrete jump (word motion, kill word, history recall, backspace).
    pub fn jump_to(&mut self, cursor: usize) {
        let half = self.half();
        let before = self.scroll_offset;
        if cursor < self.scroll_offset {
            self.scroll_offset = self.scroll_offset.saturating_sub(half);
            if cursor < self.scroll_offset {
                self.scroll_offset = cursor.saturating_sub(half);
            }
        } else if cursor >= self.scroll_offset + self.width() {
            self.scroll_offset += half;
            if cursor >= self.scroll_offset + self.width() {
                self.scroll_offset = cursor - half;
            }
        }
        if before != self.scroll_offset {
            trace!(target: "edit.viewport", policy = "jump", from = before, to = self.scroll_offset, "scroll");
        }
        self.restore(cursor);
    }

    /// Scroll after a single-column move to the left.
    pub fn step_left(&mut self, cursor: usize) {
        if cursor < self.scroll_offset {
            self.scroll_offset -= 1;
        }
        self.restore(cursor);
    }

    /// Scroll after a single-column move to the right.
    pub fn step_right(&mut self, cursor: usize) {
        if cursor.saturating_sub(self.scroll_offset) >= self.width() {
            self.scroll_offset += 1;
        }
        self.restore(cursor);
    }

    /// Cursor moved to column 0.
    pub fn home(&mut self) {
        self.scroll_offset = 0;
    }

    /// Cursor moved to the end of a line of `len` codepoints; the cursor cell ends up in the
    /// last visible column when the line is wider than the window.
    pub fn end(&mut self, len: usize) {
        let w = self.width();
        if len > w.saturating_sub(RIGHT_MARGIN) {
            self.scroll_offset = (len + 1).saturating_sub(w);
        } else {
            self.scroll_offset = 0;
        }
        self.restore(len);
    }

    /// Window width changed; re-center the cursor if it fell off the right edge.
    pub fn resize(&mut self, visible_width: usize, cursor: usize) {
        self.visible_width = visible_width;
        if cursor >= self.scroll_offset + self.width() {
            self.scroll_offset = cursor.saturating_sub(self.half());
        }
        self.restore(cursor);
        trace!(target: "edit.viewport", width = visible_width, scroll = self.scroll_offset, "resize");
    }
}

/// Codepoint-bounded slice of `text` starting at column `scroll` spanning `width` columns.
pub fn visible_slice(text: &str, scroll: usize, width: usize) -> &str {
    let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let Some(start) = indices.nth(scroll) else {
        return "";
    };
    let end = if width == 0 {
        start
    } else {
        indices.nth(width - 1).unwrap_or(text.len())
    };
    &text[start..end]
}
