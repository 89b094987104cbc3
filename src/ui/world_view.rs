//! World layer: paints every screen cell from the tile under it.
//!
//! ## Seamless blocks
//! Shade glyphs (`█ ▓ ▒ ░ ■ ▪ ▫`) leave thin gaps between rows in most
//! terminals. In seamless mode those tiles are drawn as a full block in the
//! tile's *background* colour, so neighbouring cells merge into one solid
//! area. The shade pattern is lost; every other glyph is drawn as defined.

use crate::domain::coords::{CoordinateMapper, ScreenPos};
use crate::domain::grid::WorldGrid;
use crate::domain::tile::{Rgb, TileCatalog, TileDefinition};
use crate::error::RenderError;
use crate::ui::buffer::{FrameBuffer, RenderCell};

pub const FULL_BLOCK: char = '█';

pub const SEAMLESS_BLOCK_GLYPHS: [char; 7] = ['█', '▓', '▒', '░', '■', '▪', '▫'];

pub fn is_block_glyph(glyph: char) -> bool {
    SEAMLESS_BLOCK_GLYPHS.contains(&glyph)
}

/// Screen cell for one tile.
pub fn tile_cell(def: &TileDefinition, seamless: bool) -> RenderCell {
    if seamless && is_block_glyph(def.glyph) {
        RenderCell::new(FULL_BLOCK, def.bg, def.bg)
    } else {
        RenderCell::new(def.glyph, def.fg, def.bg)
    }
}

pub struct WorldRenderer {
    /// Painted where the viewport extends past the grid.
    void: RenderCell,
}

impl WorldRenderer {
    pub fn new(clear_color: Rgb) -> Self {
        WorldRenderer { void: RenderCell::new(' ', Rgb::WHITE, clear_color) }
    }

    /// Overwrite every cell of `buf` with the world as seen through `mapper`.
    ///
    /// Keys are resolved once per frame from the grid palette. A key missing
    /// from the catalog aborts the frame, even if no visible cell uses it.
    pub fn render(
        &self,
        buf: &mut FrameBuffer,
        grid: &WorldGrid,
        catalog: &TileCatalog,
        mapper: &CoordinateMapper,
        seamless: bool,
    ) -> Result<(), RenderError> {
        grid.validate(catalog)?;
        let resolved: Vec<RenderCell> = grid
            .palette()
            .iter()
            .filter_map(|key| catalog.get(key))
            .map(|def| tile_cell(def, seamless))
            .collect();

        for sy in 0..buf.height() {
            for sx in 0..buf.width() {
                let world = mapper.screen_to_world(ScreenPos::new(sx as u16, sy as u16));
                let cell = match grid.index_at(world) {
                    Some(i) => resolved[i],
                    None => self.void,
                };
                buf.set(sx, sy, cell);
            }
        }
        Ok(())
    }
}

/// The whole grid as lines of glyphs, top row first.
pub fn grid_text(grid: &WorldGrid, catalog: &TileCatalog, seamless: bool) -> Result<Vec<String>, RenderError> {
    grid.validate(catalog)?;
    let mut lines = vec![String::with_capacity(grid.width() as usize); grid.height() as usize];
    for (pos, key) in grid.iter() {
        if let Some(def) = catalog.get(key) {
            lines[pos.y as usize].push(tile_cell(def, seamless).glyph);
        }
    }
    Ok(lines)
}
