//! Presentation layer: diff-based crossterm output.
//!
//! How it works:
//!   1. `GameRenderer` composes a frame into a `FrameBuffer`
//!   2. `present()` compares it with the previously shown frame
//!   3. Only changed cells produce terminal commands
//!   4. Commands are batched with `queue!` and flushed once
//!
//! Every cell carries explicit RGB colours, so the terminal's default
//! colours never show through between rows.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use unicode_width::UnicodeWidthChar;

use crate::domain::coords::Viewport;
use crate::domain::tile::Rgb;
use crate::ui::buffer::{FrameBuffer, RenderCell};

/// Fallback when the terminal size can't be queried.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Sentinel that never equals a real cell; filling the back buffer with it
/// forces a full repaint.
const INVALID: RenderCell = RenderCell::new('\u{0}', Rgb::new(255, 0, 255), Rgb::new(255, 0, 255));

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb { r: c.r, g: c.g, b: c.b }
    }
}

pub struct Terminal {
    writer: BufWriter<io::Stdout>,
    /// What is currently on screen.
    shown: FrameBuffer,
    clear_color: Rgb,
}

impl Terminal {
    pub fn new(clear_color: Rgb) -> Self {
        Terminal {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            shown: FrameBuffer::new(0, 0),
            clear_color,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Color::from(self.clear_color)),
            Clear(ClearType::All)
        )?;
        let size = self.size();
        self.shown.resize(size);
        self.shown.fill(INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Current display size; recomputed on every call.
    pub fn size(&self) -> Viewport {
        let (w, h) = terminal::size().unwrap_or(DEFAULT_SIZE);
        Viewport::new(w, h)
    }

    pub fn present(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        if self.shown.viewport() != frame.viewport() {
            self.shown.resize(frame.viewport());
            self.shown.fill(INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Color::from(self.clear_color)),
                Clear(ClearType::All)
            )?;
        }
        self.flush_diff(frame)?;
        self.shown.clone_from(frame);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;
        // Position right after the last printed cell, if the cursor is there.
        let mut cursor_at: Option<(usize, usize)> = None;

        for y in 0..frame.height() {
            let now = frame.row(y);
            let before = self.shown.row(y);
            for (x, cell) in now.iter().enumerate() {
                if before.get(x) == Some(cell) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(Color::from(cell.fg)))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(Color::from(cell.bg)))?;
                    last_bg = Some(cell.bg);
                }
                queue!(self.writer, Print(cell.glyph))?;
                cursor_at = cursor_after(cell.glyph, x, y);
            }
        }

        self.writer.flush()
    }
}

/// Where the terminal cursor is known to be after printing `glyph` at
/// `(x, y)`. Anything that is not exactly one column wide leaves it unknown,
/// so the next cell gets an explicit `MoveTo`.
fn cursor_after(glyph: char, x: usize, y: usize) -> Option<(usize, usize)> {
    match glyph.width() {
        Some(1) => Some((x + 1, y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── cursor tracking ──

    #[test]
    fn single_width_glyphs_advance_one_column() {
        for glyph in ['@', '█', '─', '·', ' '] {
            assert_eq!(cursor_after(glyph, 4, 2), Some((5, 2)), "{glyph:?}");
        }
    }

    #[test]
    fn wide_or_zero_width_glyphs_force_a_move() {
        for glyph in ['中', '🌲', '\u{301}', '\u{0}'] {
            assert_eq!(cursor_after(glyph, 4, 2), None, "{glyph:?}");
        }
    }
}
