//! Word boundary motions over codepoint columns.
//!
//! A "word" is a maximal run of non-whitespace codepoints (`char::is_whitespace`).
//!
//! * `word_left` skips the whitespace run immediately left of the column, then the
//!   non-whitespace run before it, landing on the first codepoint of that word (or 0).
//! * `word_right` skips the non-whitespace run at the column, then the whitespace run after
//!   it, landing on the first codepoint of the next word (or the end of the line).
//!
//! The pair satisfies `word_left(word_right(c)) <= c` for every column, so a word-right
//! followed by a word-left never leaves the cursor past where it started.

fn is_space(c: char) -> bool {
    c.is_whitespace()
}

/// Column reached by moving one word left from `col` (clamped to the line).
pub fn word_left(text: &str, col: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut i = col.min(chars.len());
    while i > 0 && is_space(chars[i - 1]) {
        i -= 1;
    }
    while i > 0 && !is_space(chars[i - 1]) {
        i -= 1;
    }
    i
}

/// Column reached by moving one word right from `col` (clamped to the line).
pub fn word_right(text: &str, col: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut i = col.min(chars.len());
    while i < chars.len() && !is_space(chars[i]) {
        i += 1;
    }
    while i < chars.len() && is_space(chars[i]) {
        i += 1;
    }
    i
}
