//! WorldGrid: the generated terrain.
//!
//! Cells store an index into a small palette of tile keys instead of the
//! key itself, so a grid of any size carries each distinct key once.
//! A grid is built whole by the spiral generator and never edited in
//! place; regeneration swaps in a new grid.

use crate::domain::tile::TileCatalog;
use crate::error::RenderError;

/// Integer world coordinate. `y` grows downward, like screen rows.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
}

impl WorldPos {
    pub const fn new(x: i32, y: i32) -> Self {
        WorldPos { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        WorldPos::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Chebyshev distance, i.e. the spiral ring this position sits on
    /// relative to `center`.
    pub fn ring_from(self, center: WorldPos) -> u32 {
        let dx = (self.x as i64 - center.x as i64).unsigned_abs();
        let dy = (self.y as i64 - center.y as i64).unsigned_abs();
        dx.max(dy) as u32
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WorldGrid {
    width: i32,
    height: i32,
    center: WorldPos,
    seed: u64,
    palette: Vec<String>,
    cells: Vec<u32>,
}

impl WorldGrid {
    /// Assemble a grid from a palette and one palette index per cell
    /// (row-major). Callers guarantee `cells.len() == width * height`
    /// and that every index is inside the palette.
    pub(crate) fn from_parts(
        width: i32,
        height: i32,
        center: WorldPos,
        seed: u64,
        palette: Vec<String>,
        cells: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(cells.len(), (width as usize) * (height as usize));
        debug_assert!(cells.iter().all(|&i| (i as usize) < palette.len()));
        WorldGrid { width, height, center, seed, palette, cells }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn center(&self) -> WorldPos {
        self.center
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn in_bounds(&self, pos: WorldPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Distinct tile keys used by this grid.
    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Palette index at `pos`, or `None` when `pos` is off the grid.
    pub fn index_at(&self, pos: WorldPos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        let i = pos.y as usize * self.width as usize + pos.x as usize;
        self.cells.get(i).map(|&p| p as usize)
    }

    #[cfg(test)]
    pub fn tile_at(&self, pos: WorldPos) -> Option<&str> {
        self.index_at(pos).map(|i| self.palette[i].as_str())
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (WorldPos, &str)> + '_ {
        let w = self.width as usize;
        self.cells.iter().enumerate().map(move |(i, &p)| {
            let pos = WorldPos::new((i % w) as i32, (i / w) as i32);
            (pos, self.palette[p as usize].as_str())
        })
    }

    /// First cell that holds palette entry `index`.
    fn first_cell_of(&self, index: usize) -> WorldPos {
        let w = self.width as usize;
        let i = self
            .cells
            .iter()
            .position(|&p| p as usize == index)
            .unwrap_or(0);
        WorldPos::new((i % w) as i32, (i / w) as i32)
    }

    /// Check that every key in the grid exists in `catalog`.
    pub fn validate(&self, catalog: &TileCatalog) -> Result<(), RenderError> {
        for (index, key) in self.palette.iter().enumerate() {
            if !catalog.contains(key) {
                let at = self.first_cell_of(index);
                return Err(RenderError::UnknownTile { key: key.clone(), x: at.x, y: at.y });
            }
        }
        Ok(())
    }
}
