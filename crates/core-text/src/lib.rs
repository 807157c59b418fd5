//! Fixed-capacity, codepoint-indexed line buffer.
//!
//! `TextBuffer` owns the raw UTF-8 bytes of the line being edited. Every public operation takes
//! codepoint offsets ("columns"); the translation to byte offsets happens in exactly one place
//! (`TextBuffer::byte_offset`) so callers never mix the two index spaces.
//!
//! Invariants (hold after every public call):
//! * `bytes[..len]` is valid UTF-8.
//! * `len <= capacity`; storage is allocated once and never grows.
//! * `chars` equals the number of codepoints in `bytes[..len]`.
//!
//! Inserts shift trailing bytes right in place by the encoded width of the new codepoint,
//! deletes shift them left. Appends take a fast path without any shift.

use tracing::trace;

pub mod classify;
pub mod word;

pub use classify::printable;

/// Default buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Smallest capacity that can hold any single codepoint.
pub const MIN_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// The mutation would push the byte length past the fixed capacity.
    #[error("edit needs {requested} bytes but capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },
    /// The key did not decode to a printable codepoint.
    #[error("key does not decode to a printable codepoint")]
    InvalidCodepoint,
    /// A codepoint offset outside `0..=len_chars`. Unreachable from key input.
    #[error("codepoint offset {offset} out of range for length {len}")]
    OutOfRangeOffset { offset: usize, len: usize },
}

/// Single-line UTF-8 buffer with a fixed byte capacity.
#[derive(Clone)]
pub struct TextBuffer {
    bytes: Box<[u8]>,
    len: usize,
    chars: usize,
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Contents deliberately omitted.
        f.debug_struct("TextBuffer")
            .field("capacity", &self.capacity())
            .field("len_bytes", &self.len)
            .field("len_chars", &self.chars)
            .finish()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl TextBuffer {
    /// Allocate a buffer holding at most `capacity` bytes (raised to `MIN_CAPACITY`).
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity.max(MIN_CAPACITY)].into_boxed_slice(),
            len: 0,
            chars: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn len_bytes(&self) -> usize {
        self.len
    }

    pub fn len_chars(&self) -> usize {
        self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes still available before the capacity is reached.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Current contents.
    pub fn as_str(&self) -> &str {
        match std::str::from_utf8(&self.bytes[..self.len]) {
            Ok(s) => s,
            Err(_) => {
                debug_assert!(false, "TextBuffer lost UTF-8 validity");
                ""
            }
        }
    }

    pub fn chars(&self) -> std::str::Chars<'_> {
        self.as_str().chars()
    }

    /// Codepoint at column `col`, if any.
    pub fn char_at(&self, col: usize) -> Option<char> {
        let at = self.byte_offset(col).ok()?;
        self.as_str()[at..].chars().next()
    }

    pub fn starts_with(&self, c: char) -> bool {
        self.chars().next() == Some(c)
    }

    /// Translate a codepoint column into a byte offset. `col == len_chars` maps to the end.
    fn byte_offset(&self, col: usize) -> Result<usize, EditError> {
        if col > self.chars {
            return Err(EditError::OutOfRangeOffset {
                offset: col,
                len: self.chars,
            });
        }
        if col == self.chars {
            return Ok(self.len);
        }
        self.as_str()
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .ok_or(EditError::OutOfRangeOffset {
                offset: col,
                len: self.chars,
            })
    }

    fn ensure_room(&self, extra: usize) -> Result<(), EditError> {
        let requested = self.len + extra;
        if requested > self.capacity() {
            return Err(EditError::CapacityExceeded {
                requested,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Insert `ch` so that it occupies column `col`. Trailing bytes shift right in place.
    pub fn insert(&mut self, col: usize, ch: char) -> Result<(), EditError> {
        let width = ch.len_utf8();
        let at = self.byte_offset(col)?;
        self.ensure_room(width)?;
        self.bytes.copy_within(at..self.len, at + width);
        ch.encode_utf8(&mut self.bytes[at..at + width]);
        self.len += width;
        self.chars += 1;
        trace!(target: "edit.buffer", op = "insert", col, width, len = self.len, "mutate");
        Ok(())
    }

    /// Append `ch` at the end without shifting.
    pub fn push(&mut self, ch: char) -> Result<(), EditError> {
        let width = ch.len_utf8();
        self.ensure_room(width)?;
        ch.encode_utf8(&mut self.bytes[self.len..self.len + width]);
        self.len += width;
        self.chars += 1;
        trace!(target: "edit.buffer", op = "push", width, len = self.len, "mutate");
        Ok(())
    }

    /// Remove the codepoint occupying column `col`, returning it.
    pub fn delete_at(&mut self, col: usize) -> Result<char, EditError> {
        if col >= self.chars {
            return Err(EditError::OutOfRangeOffset {
                offset: col,
                len: self.chars,
            });
        }
        let at = self.byte_offset(col)?;
        let ch = self.as_str()[at..]
            .chars()
            .next()
            .ok_or(EditError::OutOfRangeOffset {
                offset: col,
                len: self.chars,
            })?;
        let width = ch.len_utf8();
        self.bytes.copy_within(at + width..self.len, at);
        self.len -= width;
        self.chars -= 1;
        trace!(target: "edit.buffer", op = "delete_at", col, width, len = self.len, "mutate");
        Ok(ch)
    }

    /// Remove the codepoints in columns `[start, end)`. Returns the number removed.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<usize, EditError> {
        if start > end {
            return Err(EditError::OutOfRangeOffset {
                offset: start,
                len: self.chars,
            });
        }
        let from = self.byte_offset(start)?;
        let to = self.byte_offset(end)?;
        self.bytes.copy_within(to..self.len, from);
        self.len -= to - from;
        self.chars -= end - start;
        trace!(target: "edit.buffer", op = "delete_range", start, end, len = self.len, "mutate");
        Ok(end - start)
    }

    /// Codepoint-bounded slice `[start, end)`.
    pub fn substring(&self, start: usize, end: usize) -> Result<&str, EditError> {
        if start > end {
            return Err(EditError::OutOfRangeOffset {
                offset: start,
                len: self.chars,
            });
        }
        let from = self.byte_offset(start)?;
        let to = self.byte_offset(end)?;
        Ok(&self.as_str()[from..to])
    }

    /// Overwrite the whole contents with `text`.
    ///
    /// On overflow the longest codepoint prefix that fits is kept and `CapacityExceeded` is
    /// returned; the buffer is valid either way.
    pub fn replace(&mut self, text: &str) -> Result<(), EditError> {
        self.clear();
        let mut cut = text.len();
        if text.len() > self.capacity() {
            cut = self.capacity();
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
        }
        let kept = &text[..cut];
        self.bytes[..kept.len()].copy_from_slice(kept.as_bytes());
        self.len = kept.len();
        self.chars = kept.chars().count();
        if cut < text.len() {
            return Err(EditError::CapacityExceeded {
                requested: text.len(),
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.chars = 0;
    }

    /// Column reached by a word-left motion from `col`.
    pub fn word_left(&self, col: usize) -> usize {
        word::word_left(self.as_str(), col)
    }

    /// Column reached by a word-right motion from `col`.
    pub fn word_right(&self, col: usize) -> usize {
        word::word_right(self.as_str(), col)
    }
}
