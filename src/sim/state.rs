//! GameState: everything that persists between frames.
//!
//! ## Frame order
//!   1. `begin_frame()`: frame counter, FPS, resize detection
//!   2. `dispatch()` for each command polled this frame
//!   3. renderer reads the state
//!
//! Commands complete synchronously. Regeneration builds the new grid first
//! and only swaps it in on success, so a failed regenerate leaves the old
//! world untouched.

use std::time::Duration;

use crate::domain::coords::Viewport;
use crate::domain::grid::{WorldGrid, WorldPos};
use crate::domain::spiral::{self, RingRule, SpiralParams};
use crate::error::GenerationError;

/// How a regenerate picks its seed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reseed {
    /// Same seed as the current world.
    Keep,
    /// Current seed + 1.
    Advance,
    /// A fixed seed, so every regenerate rebuilds the same world.
    Set(u64),
}

impl Reseed {
    pub fn apply(self, current: u64) -> u64 {
        match self {
            Reseed::Keep => current,
            Reseed::Advance => current.wrapping_add(1),
            Reseed::Set(seed) => seed,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Quit,
    Regenerate(Reseed),
    ToggleDebug,
    ToggleCoordinates,
    ToggleSeamless,
    ToggleFps,
    /// Move the view center by (dx, dy) world cells.
    Pan { dx: i32, dy: i32 },
    Recenter,
}

/// What a dispatched command did, for the frame loop to react to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Continue,
    Regenerated,
    Quit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Flags {
    pub show_debug: bool,
    pub show_coordinates: bool,
    pub show_fps: bool,
    pub seamless_mode: bool,
}

/// Frames per second over windows of at least one second.
#[derive(Clone, Debug, Default)]
pub struct FpsCounter {
    window: Duration,
    frames: u32,
    fps: Option<f32>,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn tick(&mut self, delta: Duration) {
        self.window += delta;
        self.frames += 1;
        if self.window >= Self::WINDOW {
            self.fps = Some(self.frames as f32 / self.window.as_secs_f32());
            self.window = Duration::ZERO;
            self.frames = 0;
        }
    }

    /// `None` until the first full window has elapsed.
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }
}

pub struct GameState {
    grid: WorldGrid,
    params: SpiralParams,
    rule: Box<dyn RingRule>,
    viewport: Viewport,
    pan: (i32, i32),
    frame: u64,
    fps: FpsCounter,
    pub flags: Flags,
    quit: bool,
}

impl GameState {
    /// Generate the initial world. Fails if `params` are invalid.
    pub fn new(params: SpiralParams, rule: Box<dyn RingRule>, flags: Flags) -> Result<Self, GenerationError> {
        let grid = spiral::generate(&params, rule.as_ref())?;
        log::info!(
            "Generated {}x{} world around ({}, {}) with seed {}",
            params.width, params.height, params.center.x, params.center.y, params.seed
        );
        Ok(GameState {
            grid,
            params,
            rule,
            viewport: Viewport::default(),
            pan: (0, 0),
            frame: 0,
            fps: FpsCounter::default(),
            flags,
            quit: false,
        })
    }

    // ── Accessors ──

    pub fn grid(&self) -> &WorldGrid {
        &self.grid
    }

    pub fn params(&self) -> SpiralParams {
        self.params
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn fps(&self) -> Option<f32> {
        self.fps.fps()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// World position drawn at the viewport midpoint.
    pub fn view_center(&self) -> WorldPos {
        self.grid.center().offset(self.pan.0, self.pan.1)
    }

    // ── Per-frame ──

    /// Start a frame. Returns `true` if the display size changed.
    /// A resize only moves the window into the world; the grid is kept.
    pub fn begin_frame(&mut self, display: Viewport, delta: Duration) -> bool {
        self.frame += 1;
        self.fps.tick(delta);
        if display == self.viewport {
            return false;
        }
        log::debug!(
            "Viewport resized {}x{} -> {}x{}",
            self.viewport.width, self.viewport.height, display.width, display.height
        );
        self.viewport = display;
        true
    }

    // ── Commands ──

    pub fn dispatch(&mut self, cmd: Command) -> Result<Outcome, GenerationError> {
        match cmd {
            Command::Quit => {
                log::info!("Quit requested at frame {}", self.frame);
                self.quit = true;
                return Ok(Outcome::Quit);
            }
            Command::Regenerate(reseed) => {
                let params = SpiralParams { seed: reseed.apply(self.params.seed), ..self.params };
                self.regenerate(params)?;
                return Ok(Outcome::Regenerated);
            }
            Command::ToggleDebug => self.flags.show_debug = !self.flags.show_debug,
            Command::ToggleCoordinates => self.flags.show_coordinates = !self.flags.show_coordinates,
            Command::ToggleSeamless => self.flags.seamless_mode = !self.flags.seamless_mode,
            Command::ToggleFps => self.flags.show_fps = !self.flags.show_fps,
            Command::Pan { dx, dy } => {
                self.pan = (self.pan.0.saturating_add(dx), self.pan.1.saturating_add(dy));
            }
            Command::Recenter => self.pan = (0, 0),
        }
        Ok(Outcome::Continue)
    }

    /// Replace the world with a freshly generated one.
    /// On error nothing changes: grid, params and pan stay as they were.
    pub fn regenerate(&mut self, params: SpiralParams) -> Result<(), GenerationError> {
        let grid = match spiral::generate(&params, self.rule.as_ref()) {
            Ok(grid) => grid,
            Err(e) => {
                log::warn!("Regenerate rejected: {e}");
                return Err(e);
            }
        };
        log::info!(
            "Regenerated {}x{} world with seed {}",
            grid.width(), grid.height(), grid.seed()
        );
        self.grid = grid;
        self.params = params;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(ring: u32, _pos: u32) -> &'static str {
        if ring == 0 { "center" } else { "stone" }
    }

    fn params() -> SpiralParams {
        SpiralParams { width: 9, height: 7, center: WorldPos::new(4, 3), seed: 10 }
    }

    fn state() -> GameState {
        GameState::new(params(), Box::new(rule), Flags::default()).unwrap()
    }

    // ── construction ──

    #[test]
    fn new_rejects_invalid_params() {
        let bad = SpiralParams { width: 0, ..params() };
        assert!(matches!(
            GameState::new(bad, Box::new(rule), Flags::default()),
            Err(GenerationError::InvalidDimensions { .. })
        ));
    }

    // ── toggles ──

    #[test]
    fn toggles_flip_flags() {
        let mut s = state();
        assert_eq!(s.dispatch(Command::ToggleDebug), Ok(Outcome::Continue));
        s.dispatch(Command::ToggleCoordinates).unwrap();
        s.dispatch(Command::ToggleSeamless).unwrap();
        s.dispatch(Command::ToggleFps).unwrap();
        assert_eq!(
            s.flags,
            Flags { show_debug: true, show_coordinates: true, show_fps: true, seamless_mode: true }
        );
        s.dispatch(Command::ToggleSeamless).unwrap();
        assert!(!s.flags.seamless_mode);
    }

    #[test]
    fn quit_sets_flag_without_touching_world() {
        let mut s = state();
        let before = s.grid().clone();
        assert_eq!(s.dispatch(Command::Quit), Ok(Outcome::Quit));
        assert!(s.quit_requested());
        assert_eq!(s.grid(), &before);
    }

    // ── regenerate ──

    #[test]
    fn regenerate_with_zero_width_keeps_previous_world() {
        let mut s = state();
        let before = s.grid().clone();
        let err = s.regenerate(SpiralParams { width: 0, ..params() }).unwrap_err();
        assert_eq!(err, GenerationError::InvalidDimensions { width: 0, height: 7 });
        assert_eq!(s.grid(), &before);
        assert_eq!(s.params(), params());
    }

    #[test]
    fn regenerate_with_bad_center_keeps_previous_world() {
        let mut s = state();
        let before = s.grid().clone();
        let bad = SpiralParams { center: WorldPos::new(20, 0), ..params() };
        assert!(matches!(s.regenerate(bad), Err(GenerationError::InvalidCenter { .. })));
        assert_eq!(s.grid(), &before);
    }

    #[test]
    fn regenerate_replaces_grid() {
        let mut s = state();
        s.regenerate(SpiralParams { width: 3, height: 3, center: WorldPos::new(0, 0), seed: 1 })
            .unwrap();
        assert_eq!((s.grid().width(), s.grid().height()), (3, 3));
        assert_eq!(s.grid().tile_at(WorldPos::new(0, 0)), Some("center"));
        assert_eq!(s.params().seed, 1);
    }

    #[test]
    fn reseed_policies() {
        let mut s = state();
        assert_eq!(s.dispatch(Command::Regenerate(Reseed::Advance)), Ok(Outcome::Regenerated));
        assert_eq!(s.grid().seed(), 11);
        s.dispatch(Command::Regenerate(Reseed::Keep)).unwrap();
        assert_eq!(s.grid().seed(), 11);
        s.dispatch(Command::Regenerate(Reseed::Set(99))).unwrap();
        assert_eq!(s.params().seed, 99);
        assert_eq!(Reseed::Advance.apply(u64::MAX), 0);
    }

    // ── frames & resize ──

    #[test]
    fn resize_updates_viewport_only() {
        let mut s = state();
        let before = s.grid().clone();
        assert!(s.begin_frame(Viewport::new(80, 24), Duration::from_millis(16)));
        assert!(!s.begin_frame(Viewport::new(80, 24), Duration::from_millis(16)));
        assert!(s.begin_frame(Viewport::new(10, 3), Duration::from_millis(16)));
        assert_eq!(s.viewport(), Viewport::new(10, 3));
        assert_eq!(s.grid(), &before);
        assert_eq!(s.frame(), 3);
    }

    #[test]
    fn pan_moves_view_center_and_recenter_resets() {
        let mut s = state();
        s.dispatch(Command::Pan { dx: 5, dy: -2 }).unwrap();
        assert_eq!(s.view_center(), WorldPos::new(9, 1));
        s.dispatch(Command::Recenter).unwrap();
        assert_eq!(s.view_center(), WorldPos::new(4, 3));
    }

    #[test]
    fn fps_needs_a_full_window() {
        let mut fps = FpsCounter::default();
        for _ in 0..9 {
            fps.tick(Duration::from_millis(100));
        }
        assert_eq!(fps.fps(), None);
        fps.tick(Duration::from_millis(100));
        let v = fps.fps().unwrap();
        assert!((v - 10.0).abs() < 0.01, "{v}");
    }
}
