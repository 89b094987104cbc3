//! World ↔ screen coordinate mapping.
//!
//! The view center is drawn at the viewport midpoint:
//!   `screen = world - center + (viewport / 2)`
//! A mapper is rebuilt every frame from the current viewport, so nothing
//! computed before a resize can leak into the next frame.

use crate::domain::grid::WorldPos;

/// Size of the display surface in character cells.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub const fn new(width: u16, height: u16) -> Self {
        Viewport { width, height }
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ScreenPos {
    pub x: u16,
    pub y: u16,
}

impl ScreenPos {
    pub const fn new(x: u16, y: u16) -> Self {
        ScreenPos { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CoordinateMapper {
    viewport: Viewport,
    center: WorldPos,
}

impl CoordinateMapper {
    pub fn new(viewport: Viewport, center: WorldPos) -> Self {
        CoordinateMapper { viewport, center }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn center(&self) -> WorldPos {
        self.center
    }

    fn half(&self) -> (i64, i64) {
        ((self.viewport.width / 2) as i64, (self.viewport.height / 2) as i64)
    }

    /// Screen cell showing `world`, or `None` when it is off-viewport.
    pub fn world_to_screen(&self, world: WorldPos) -> Option<ScreenPos> {
        let (hx, hy) = self.half();
        let sx = world.x as i64 - self.center.x as i64 + hx;
        let sy = world.y as i64 - self.center.y as i64 + hy;
        if self.viewport.contains(sx, sy) {
            Some(ScreenPos::new(sx as u16, sy as u16))
        } else {
            None
        }
    }

    /// World cell shown at `screen`. Defined for any screen position,
    /// including ones outside the viewport.
    pub fn screen_to_world(&self, screen: ScreenPos) -> WorldPos {
        let (hx, hy) = self.half();
        let wx = self.center.x as i64 + screen.x as i64 - hx;
        let wy = self.center.y as i64 + screen.y as i64 - hy;
        WorldPos::new(clamp_i32(wx), clamp_i32(wy))
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
