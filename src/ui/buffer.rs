//! Screen-cell buffer that one frame is composed into.
//!
//! The buffer is reused between frames but fully overwritten each time:
//! `GameRenderer` clears it before the world layer is drawn.

use crate::domain::coords::Viewport;
use crate::domain::tile::Rgb;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RenderCell {
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl RenderCell {
    pub const BLANK: RenderCell = RenderCell { glyph: ' ', fg: Rgb::WHITE, bg: Rgb::BLACK };

    pub const fn new(glyph: char, fg: Rgb, bg: Rgb) -> Self {
        RenderCell { glyph, fg, bg }
    }
}

#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<RenderCell>,
}

impl FrameBuffer {
    pub fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![RenderCell::BLANK; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as u16, self.height as u16)
    }

    /// Match the buffer to `viewport`. Contents are unspecified afterwards.
    pub fn resize(&mut self, viewport: Viewport) {
        let (w, h) = (viewport.width as usize, viewport.height as usize);
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![RenderCell::BLANK; viewport.area()];
        }
    }

    pub fn fill(&mut self, cell: RenderCell) {
        self.cells.fill(cell);
    }

    pub fn set(&mut self, x: usize, y: usize, cell: RenderCell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<RenderCell> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Write a string at (x, y); characters past the right edge are dropped.
    pub fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Rgb, bg: Rgb) {
        for (cx, ch) in (x..self.width).zip(s.chars()) {
            self.set(cx, y, RenderCell::new(ch, fg, bg));
        }
    }

    pub fn row(&self, y: usize) -> &[RenderCell] {
        if y < self.height {
            &self.cells[y * self.width..(y + 1) * self.width]
        } else {
            &[]
        }
    }

    /// Glyphs of row `y` as a string.
    #[cfg(test)]
    pub fn row_text(&self, y: usize) -> String {
        self.row(y).iter().map(|c| c.glyph).collect()
    }

    #[cfg(test)]
    pub fn cells(&self) -> &[RenderCell] {
        &self.cells
    }
}
