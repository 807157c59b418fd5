//! Input line presentation: the horizontal [`Viewport`] policy and the [`LineRenderer`] seam the
//! editor draws through.
//!
//! The editor never touches the terminal directly. After every visible change it calls
//! [`LineRenderer::draw`] with the whole line, the cursor column and the scroll offset (all in
//! codepoints); a renderer decides what to emit. [`TerminalLineRenderer`] paints a single row via
//! crossterm, [`NullRenderer`] discards everything (headless sessions and tests).

pub mod viewport;
pub mod writer;

pub use viewport::{RIGHT_MARGIN, Viewport, visible_slice};

use std::io::Write;
use tracing::warn;
use writer::Writer;

/// Presentation hook invoked after each visible change to the line.
pub trait LineRenderer {
    fn draw(&mut self, line: &str, cursor: usize, scroll_offset: usize);
}

impl<R: LineRenderer + ?Sized> LineRenderer for &mut R {
    fn draw(&mut self, line: &str, cursor: usize, scroll_offset: usize) {
        (**self).draw(line, cursor, scroll_offset)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl LineRenderer for NullRenderer {
    fn draw(&mut self, _line: &str, _cursor: usize, _scroll_offset: usize) {}
}

/// Paints the line on one terminal row, clipped to `width` columns.
pub struct TerminalLineRenderer<W: Write> {
    out: W,
    row: u16,
    width: usize,
}

impl<W: Write> TerminalLineRenderer<W> {
    pub fn new(out: W, row: u16, width: usize) -> Self {
        Self { out, row, width }
    }

    pub fn row(&self) -> u16 {
        self.row
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Move the input row / change its width (terminal resize).
    pub fn set_geometry(&mut self, row: u16, width: usize) {
        self.row = row;
        self.width = width;
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn frame(&self, line: &str, cursor: usize, scroll_offset: usize) -> Writer {
        let mut w = Writer::new();
        w.move_to(0, self.row);
        w.clear_line();
        w.print(visible_slice(line, scroll_offset, self.width));
        let col = cursor.saturating_sub(scroll_offset).min(u16::MAX as usize) as u16;
        w.move_to(col, self.row);
        w
    }
}

impl<W: Write> LineRenderer for TerminalLineRenderer<W> {
    fn draw(&mut self, line: &str, cursor: usize, scroll_offset: usize) {
        let frame = self.frame(line, cursor, scroll_offset);
        if let Err(e) = frame.flush_to(&mut self.out) {
            // Nothing upstream can recover a failed paint; the next draw repaints the row.
            warn!(target: "render", error = %e, "line_draw_failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use writer::Command;

    #[test]
    fn frame_clips_to_window_and_places_cursor() {
        let r = TerminalLineRenderer::new(Vec::new(), 7, 4);
        let w = r.frame("abcdefgh", 5, 3);
        assert_eq!(
            w.commands(),
            &[
                Command::MoveTo(0, 7),
                Command::ClearLine,
                Command::Print("defg".into()),
                Command::MoveTo(2, 7),
            ]
        );
    }

    #[test]
    fn draw_writes_visible_text_only() {
        let mut r = TerminalLineRenderer::new(Vec::new(), 0, 3);
        r.draw("héllo", 5, 2);
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert!(out.contains("llo"));
        assert!(!out.contains("hé"));
    }

    #[test]
    fn set_geometry_moves_row() {
        let mut r = TerminalLineRenderer::new(Vec::new(), 0, 3);
        r.set_geometry(9, 20);
        assert_eq!((r.row(), r.width()), (9, 20));
        let w = r.frame("", 0, 0);
        assert_eq!(w.commands()[0], Command::MoveTo(0, 9));
    }
}
