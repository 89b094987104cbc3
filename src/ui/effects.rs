//! Transient overlays drawn on top of the world layer.
//!
//! Effects live on the renderer's own clock, advanced by `update()`. An
//! effect is visible while its age is below its duration and is pruned on
//! the first update after that.

use std::time::Duration;

use crate::domain::coords::{CoordinateMapper, ScreenPos};
use crate::domain::grid::WorldPos;
use crate::domain::tile::Rgb;
use crate::ui::buffer::FrameBuffer;

/// Sparkle glyph flips every this many milliseconds.
const SPARKLE_PERIOD_MS: u128 = 66;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EffectKind {
    /// Blinking `*` / `+` on a single cell.
    Sparkle { color: Rgb },
    /// Square ring outline growing from the anchor to `max_radius`.
    Ripple { color: Rgb, max_radius: u16 },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Anchor {
    World(WorldPos),
    Screen(ScreenPos),
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct EffectInstance {
    pub kind: EffectKind,
    pub anchor: Anchor,
    pub started: Duration,
    pub duration: Duration,
}

#[derive(Default)]
pub struct EffectRenderer {
    clock: Duration,
    active: Vec<EffectInstance>,
}

impl EffectRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an effect at the current clock time.
    pub fn trigger(&mut self, kind: EffectKind, anchor: Anchor, duration: Duration) {
        self.active.push(EffectInstance { kind, anchor, started: self.clock, duration });
    }

    /// Advance the clock and drop expired effects.
    pub fn update(&mut self, delta: Duration) {
        self.clock += delta;
        let now = self.clock;
        self.active.retain(|e| now - e.started < e.duration);
    }

    #[cfg(test)]
    pub fn active(&self) -> &[EffectInstance] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn age(&self, e: &EffectInstance) -> Duration {
        self.clock.saturating_sub(e.started)
    }

    /// Draw every live effect over the existing contents of `buf`.
    /// Effects whose anchor is off-viewport are skipped for this frame.
    pub fn render(&self, buf: &mut FrameBuffer, mapper: &CoordinateMapper) {
        for e in &self.active {
            let age = self.age(e);
            if age >= e.duration {
                continue;
            }
            let Some(origin) = resolve(e.anchor, mapper) else { continue };

            match e.kind {
                EffectKind::Sparkle { color } => {
                    let glyph = if (age.as_millis() / SPARKLE_PERIOD_MS) % 2 == 0 { '*' } else { '+' };
                    overlay(buf, origin, glyph, color);
                }
                EffectKind::Ripple { color, max_radius } => {
                    let t = age.as_secs_f32() / e.duration.as_secs_f32();
                    let radius = (t * max_radius as f32).round() as i64;
                    draw_ring(buf, origin, radius, color);
                }
            }
        }
    }
}

/// Screen position of an anchor, as signed coordinates so that rings
/// centred just off-screen can still be partially drawn.
fn resolve(anchor: Anchor, mapper: &CoordinateMapper) -> Option<(i64, i64)> {
    let p = match anchor {
        Anchor::World(w) => mapper.world_to_screen(w)?,
        Anchor::Screen(s) if mapper.viewport().contains(s.x as i64, s.y as i64) => s,
        Anchor::Screen(_) => return None,
    };
    Some((p.x as i64, p.y as i64))
}

/// Replace glyph and foreground, keep whatever background is underneath.
fn overlay(buf: &mut FrameBuffer, (x, y): (i64, i64), glyph: char, color: Rgb) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if let Some(mut cell) = buf.get(x, y) {
        cell.glyph = glyph;
        cell.fg = color;
        buf.set(x, y, cell);
    }
}

fn draw_ring(buf: &mut FrameBuffer, (cx, cy): (i64, i64), radius: i64, color: Rgb) {
    if radius == 0 {
        overlay(buf, (cx, cy), '·', color);
        return;
    }
    for d in -radius..=radius {
        overlay(buf, (cx + d, cy - radius), '·', color);
        overlay(buf, (cx + d, cy + radius), '·', color);
        overlay(buf, (cx - radius, cy + d), '·', color);
        overlay(buf, (cx + radius, cy + d), '·', color);
    }
}
