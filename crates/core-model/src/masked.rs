//! Non-echoing capture for secrets.
//!
//! Runs its own read loop over the key source. It shares nothing with the line editor's buffer,
//! history or completion, and logs only the final length.

use core_events::{InputError, InputEvent, KeyCode, KeyEvent, KeyModifiers, KeySource};
use core_render::LineRenderer;
use core_text::printable;
use tracing::debug;

/// Read keys until Enter, collecting at most `max_length` printable codepoints.
///
/// The visible line is cleared first and never redrawn with content. Backspace drops the last
/// codepoint; chords, named keys and timeouts are ignored.
pub fn get_masked_line<S: KeySource + ?Sized>(
    source: &mut S,
    renderer: &mut dyn LineRenderer,
    max_length: usize,
) -> Result<String, InputError> {
    renderer.draw("", 0, 0);
    let mut secret = String::new();
    let mut count = 0usize;
    loop {
        match source.read_event(None)? {
            Some(InputEvent::Key(KeyEvent {
                code: KeyCode::Enter,
                ..
            })) => break,
            Some(InputEvent::Key(KeyEvent {
                code: KeyCode::Backspace,
                ..
            })) => {
                if secret.pop().is_some() {
                    count -= 1;
                }
            }
            Some(InputEvent::Key(KeyEvent {
                code: KeyCode::Char(c),
                mods,
            })) if !mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT) => {
                push_bounded(&mut secret, &mut count, c, max_length);
            }
            Some(InputEvent::Key(_)) => {}
            Some(InputEvent::Paste(text)) => {
                for c in text.chars() {
                    push_bounded(&mut secret, &mut count, c, max_length);
                }
            }
            Some(InputEvent::Resize(..)) | None => {}
        }
    }
    debug!(target: "editor", len = count, "masked_line_done");
    Ok(secret)
}

fn push_bounded(secret: &mut String, count: &mut usize, c: char, max_length: usize) {
    if *count < max_length && printable(c).is_ok() {
        secret.push(c);
        *count += 1;
    }
}
