//! Frame composition: world → effects → panels, in that order.
//!
//! `GameRenderer` owns the frame buffer and every layer renderer. It reads
//! `GameState` but never changes it; the only state it keeps is the effect
//! clock and the help text.

use std::time::Duration;

use crate::domain::coords::{CoordinateMapper, ScreenPos};
use crate::domain::tile::{Rgb, TileCatalog};
use crate::error::RenderError;
use crate::sim::state::GameState;
use crate::ui::buffer::{FrameBuffer, RenderCell};
use crate::ui::effects::{Anchor, EffectKind, EffectRenderer};
use crate::ui::panel::{DebugInfo, PanelRenderer};
use crate::ui::world_view::WorldRenderer;

/// Ripple radius as a fraction of the smaller viewport side.
const RIPPLE_REACH: f32 = 0.5;

/// Timing and colour of the effects played after a regenerate.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RegenEffects {
    pub sparkle: Duration,
    pub sparkle_color: Rgb,
    pub ripple: Duration,
}

pub struct GameRenderer {
    buffer: FrameBuffer,
    clear: RenderCell,
    world: WorldRenderer,
    effects: EffectRenderer,
    panels: PanelRenderer,
    help: Vec<String>,
    regen: RegenEffects,
}

impl GameRenderer {
    pub fn new(clear_color: Rgb, panels: PanelRenderer, help: Vec<String>, regen: RegenEffects) -> Self {
        GameRenderer {
            buffer: FrameBuffer::new(0, 0),
            clear: RenderCell::new(' ', Rgb::WHITE, clear_color),
            world: WorldRenderer::new(clear_color),
            effects: EffectRenderer::new(),
            panels,
            help,
            regen,
        }
    }

    #[cfg(test)]
    pub fn effects(&self) -> &EffectRenderer {
        &self.effects
    }

    pub fn update_effects(&mut self, delta: Duration) {
        self.effects.update(delta);
    }

    /// Sparkle at the centre of the (new) world, ripple spreading from the
    /// middle of the screen.
    pub fn celebrate_regenerate(&mut self, state: &GameState) {
        let center = state.grid().center();
        let vp = state.viewport();
        let midpoint = ScreenPos::new(vp.width / 2, vp.height / 2);
        let max_radius = (vp.width.min(vp.height) as f32 * RIPPLE_REACH) as u16;
        let color = self.regen.sparkle_color;

        if !self.regen.ripple.is_zero() && max_radius > 0 {
            self.effects.trigger(
                EffectKind::Ripple { color, max_radius },
                Anchor::Screen(midpoint),
                self.regen.ripple,
            );
        }
        self.effects.trigger(EffectKind::Sparkle { color }, Anchor::World(center), self.regen.sparkle);
    }

    /// Compose the next frame. The buffer is resized to the state's
    /// viewport and fully repainted.
    pub fn render_frame(&mut self, state: &GameState, catalog: &TileCatalog) -> Result<&FrameBuffer, RenderError> {
        let viewport = state.viewport();
        self.buffer.resize(viewport);
        self.buffer.fill(self.clear);

        let mapper = CoordinateMapper::new(viewport, state.view_center());
        let flags = state.flags;

        self.world.render(&mut self.buffer, state.grid(), catalog, &mapper, flags.seamless_mode)?;
        if !self.effects.is_empty() {
            self.effects.render(&mut self.buffer, &mapper);
        }

        let info = flags.show_debug.then(|| DebugInfo {
            center: mapper.center(),
            viewport,
            frame: state.frame(),
            fps: state.fps(),
            show_coordinates: flags.show_coordinates,
            show_fps: flags.show_fps,
        });
        self.panels.render(&mut self.buffer, viewport, info.as_ref(), &self.help);

        Ok(&self.buffer)
    }
}
