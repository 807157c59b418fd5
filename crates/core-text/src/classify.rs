//! Printable-codepoint classification for key decoding.
//!
//! A key is insertable when it decodes to a codepoint the terminal can place in a cell:
//! control characters and codepoints without a defined display width are rejected as
//! `EditError::InvalidCodepoint`. Combining marks (width 0) are accepted; this editor assumes
//! one display column per codepoint and does not attempt cluster layout.

use crate::EditError;
use unicode_width::UnicodeWidthChar;

/// Accept `c` if it is printable, otherwise `InvalidCodepoint`.
pub fn printable(c: char) -> Result<char, EditError> {
    if c.is_control() || is_noncharacter(c) {
        return Err(EditError::InvalidCodepoint);
    }
    match c.width() {
        Some(_) => Ok(c),
        None => Err(EditError::InvalidCodepoint),
    }
}

fn is_noncharacter(c: char) -> bool {
    let cp = c as u32;
    (0xFDD0..=0xFDEF).contains(&cp) || (cp & 0xFFFE) == 0xFFFE
}
