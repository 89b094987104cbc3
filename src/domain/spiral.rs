//! Spiral world generation.
//!
//! The walk starts on the center cell (ring 0) and then visits ring 1,
//! ring 2, ... in turn. Each ring `r` holds `8r` cells and is traversed
//! counter-clockwise as seen on screen, starting just below due east:
//!
//! ```text
//!   ring 1 around C:   3 2 1
//!                      4 C 0
//!                      5 6 7
//! ```
//!
//! Cells outside the grid are skipped, so an off-center spiral is simply
//! clipped. The walk stops after the smallest ring that covers the whole
//! grid, which means every in-bounds cell is assigned exactly once.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::grid::{WorldGrid, WorldPos};
use crate::error::GenerationError;

// ── Walk ──

/// One stop of the spiral walk.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RingCell {
    pub pos: WorldPos,
    pub ring: u32,
    /// Index along the ring, `0..8 * ring` (always 0 for ring 0).
    pub position: u32,
}

/// Iterator over every cell of rings `0..=max_ring`, in spiral order.
/// Positions are not clipped.
#[derive(Clone, Debug)]
pub struct SpiralWalk {
    center: WorldPos,
    max_ring: u32,
    ring: u32,
    position: u32,
}

impl SpiralWalk {
    pub fn new(center: WorldPos, max_ring: u32) -> Self {
        SpiralWalk { center, max_ring, ring: 0, position: 0 }
    }
}

/// Offset of cell `position` on ring `ring` (ring >= 1) from the center.
fn ring_offset(ring: u32, position: u32) -> (i64, i64) {
    let r = ring as i64;
    let p = position as i64;
    match p / (2 * r) {
        // east side, going up
        0 => (r, r - 1 - p),
        // north side, going west
        1 => (r - 1 - (p - 2 * r), -r),
        // west side, going down
        2 => (-r, -r + 1 + (p - 4 * r)),
        // south side, going east
        _ => (-r + 1 + (p - 6 * r), r),
    }
}

impl Iterator for SpiralWalk {
    type Item = RingCell;

    fn next(&mut self) -> Option<RingCell> {
        if self.ring > self.max_ring {
            return None;
        }
        if self.ring == 0 {
            self.ring = 1;
            return Some(RingCell { pos: self.center, ring: 0, position: 0 });
        }

        let (dx, dy) = ring_offset(self.ring, self.position);
        let cell = RingCell {
            pos: WorldPos::new(
                (self.center.x as i64 + dx) as i32,
                (self.center.y as i64 + dy) as i32,
            ),
            ring: self.ring,
            position: self.position,
        };

        self.position += 1;
        if self.position == 8 * self.ring {
            self.ring += 1;
            self.position = 0;
        }
        Some(cell)
    }
}

// ── Ring rules ──

/// Decides which tile a spiral cell gets.
///
/// `rng` is seeded from the generation seed and consumed in walk order, so
/// any rule that draws from it is still deterministic for a given seed.
pub trait RingRule {
    fn tile_for(&self, ring: u32, position: u32, rng: &mut StdRng) -> &str;
}

impl<F> RingRule for F
where
    F: Fn(u32, u32) -> &'static str,
{
    fn tile_for(&self, ring: u32, position: u32, _rng: &mut StdRng) -> &str {
        self(ring, position)
    }
}

/// Rings `..=through_ring` (not claimed by an earlier band) use `tiles`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Band {
    pub through_ring: u32,
    pub tiles: Vec<String>,
}

/// Concentric bands of tiles with a fallback for everything beyond the
/// last band. A band with several tiles picks one at random per cell.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BandedRule {
    bands: Vec<Band>,
    outer: String,
}

impl BandedRule {
    /// Bands are sorted by `through_ring`; bands without tiles are dropped.
    pub fn new(mut bands: Vec<Band>, outer: &str) -> Self {
        bands.retain(|b| !b.tiles.is_empty());
        bands.sort_by_key(|b| b.through_ring);
        BandedRule { bands, outer: outer.to_string() }
    }

    /// Every tile key this rule can produce.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bands
            .iter()
            .flat_map(|b| b.tiles.iter().map(String::as_str))
            .chain(std::iter::once(self.outer.as_str()))
    }
}

impl RingRule for BandedRule {
    fn tile_for(&self, ring: u32, _position: u32, rng: &mut StdRng) -> &str {
        match self.bands.iter().find(|b| ring <= b.through_ring) {
            Some(band) if band.tiles.len() == 1 => &band.tiles[0],
            Some(band) => &band.tiles[rng.gen_range(0..band.tiles.len())],
            None => &self.outer,
        }
    }
}

// ── Generation ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SpiralParams {
    pub width: i32,
    pub height: i32,
    pub center: WorldPos,
    pub seed: u64,
}

impl SpiralParams {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(GenerationError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let c = self.center;
        if c.x < 0 || c.y < 0 || c.x >= self.width || c.y >= self.height {
            return Err(GenerationError::InvalidCenter {
                x: c.x,
                y: c.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Smallest ring that reaches every corner of the grid.
    pub fn max_ring(&self) -> u32 {
        let c = self.center;
        let reach = c.x.max(self.width - 1 - c.x).max(c.y).max(self.height - 1 - c.y);
        reach.max(0) as u32
    }
}

const UNSET: u32 = u32::MAX;

/// Build a fully populated grid by walking the spiral from `params.center`.
pub fn generate<R>(params: &SpiralParams, rule: &R) -> Result<WorldGrid, GenerationError>
where
    R: RingRule + ?Sized,
{
    params.validate()?;

    let width = params.width as usize;
    let mut cells = vec![UNSET; width * params.height as usize];
    let mut palette: Vec<String> = Vec::new();
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut written = 0usize;

    for step in SpiralWalk::new(params.center, params.max_ring()) {
        let p = step.pos;
        if p.x < 0 || p.y < 0 || p.x >= params.width || p.y >= params.height {
            continue;
        }
        debug_assert_eq!(p.ring_from(params.center), step.ring);
        let key = rule.tile_for(step.ring, step.position, &mut rng);
        let index = match palette.iter().position(|k| k == key) {
            Some(i) => i,
            None => {
                palette.push(key.to_string());
                palette.len() - 1
            }
        };
        cells[p.y as usize * width + p.x as usize] = index as u32;
        written += 1;
    }
    debug_assert_eq!(written, cells.len());

    Ok(WorldGrid::from_parts(
        params.width,
        params.height,
        params.center,
        params.seed,
        palette,
        cells,
    ))
}
