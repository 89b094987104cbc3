//! Floating bordered panels: debug info at the top, key help at the bottom.
//!
//! A panel spans the viewport width minus a 2-cell margin on each side and
//! sits one row away from its screen edge. If the viewport is too small for
//! the box plus a minimum amount of text, nothing is drawn at all.
//!
//! Help lines are clipped to the box. Debug lines are not: the debug panel
//! is dropped whenever its longest line does not fit, and also when it
//! would run into the help panel on a short screen.

use crate::domain::coords::Viewport;
use crate::domain::grid::WorldPos;
use crate::domain::tile::Rgb;
use crate::ui::buffer::{FrameBuffer, RenderCell};

pub const PANEL_MARGIN: u16 = 2;
/// Border + one column of padding on each side.
const FRAME_COLS: u16 = 4;
/// Narrowest text column worth drawing.
pub const MIN_TEXT_WIDTH: u16 = 12;
/// Viewports narrower than this get no panels.
pub const MIN_PANEL_VIEWPORT_WIDTH: u16 = 2 * PANEL_MARGIN + FRAME_COLS + MIN_TEXT_WIDTH;

pub const TOP_MAX_LINES: usize = 2;
pub const BOTTOM_MAX_LINES: usize = 3;

const TOP_LEFT: char = '┌';
const TOP_RIGHT: char = '┐';
const BOTTOM_LEFT: char = '└';
const BOTTOM_RIGHT: char = '┘';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PanelAnchor {
    Top,
    Bottom,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PanelStyle {
    pub background: Rgb,
    pub border: Rgb,
    pub text: Rgb,
}

/// What the debug panel reports.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DebugInfo {
    pub center: WorldPos,
    pub viewport: Viewport,
    pub frame: u64,
    pub fps: Option<f32>,
    pub show_coordinates: bool,
    pub show_fps: bool,
}

impl DebugInfo {
    pub fn lines(&self) -> Vec<String> {
        let mut first = Vec::with_capacity(2);
        if self.show_coordinates {
            first.push(format!("Center: ({}, {})", self.center.x, self.center.y));
        }
        first.push(format!("Screen: {}x{}", self.viewport.width, self.viewport.height));

        let mut second = vec![format!("Frame: {}", self.frame)];
        if self.show_fps {
            match self.fps {
                Some(fps) => second.push(format!("FPS: {fps:.1}")),
                None => second.push("FPS: --".to_string()),
            }
        }
        vec![first.join(" | "), second.join(" | ")]
    }
}

pub struct PanelRenderer {
    style: PanelStyle,
    top_max_lines: usize,
    bottom_max_lines: usize,
}

impl PanelRenderer {
    /// Line limits are capped at 2 (top) and 3 (bottom).
    pub fn new(style: PanelStyle, top_max_lines: usize, bottom_max_lines: usize) -> Self {
        PanelRenderer {
            style,
            top_max_lines: top_max_lines.min(TOP_MAX_LINES),
            bottom_max_lines: bottom_max_lines.min(BOTTOM_MAX_LINES),
        }
    }

    /// Help panel, then the debug panel if `info` is given and there is room
    /// for it above the help panel. Returns `(top_drawn, bottom_drawn)`.
    pub fn render(
        &self,
        buf: &mut FrameBuffer,
        viewport: Viewport,
        info: Option<&DebugInfo>,
        help: &[String],
    ) -> (bool, bool) {
        let bottom = self.render_bottom(buf, viewport, help);
        let Some(info) = info else {
            return (false, bottom);
        };

        let help_rect = panel_rect(viewport, help.len().min(self.bottom_max_lines), PanelAnchor::Bottom);
        let top_rect = panel_rect(viewport, info.lines().len().min(self.top_max_lines), PanelAnchor::Top);
        if let (Some((_, ty, _, th)), Some((_, by, _, _))) = (top_rect, help_rect) {
            if ty + th > by {
                return (false, bottom);
            }
        }
        (self.render_top(buf, viewport, info), bottom)
    }

    /// Returns whether the panel was drawn.
    pub fn render_top(&self, buf: &mut FrameBuffer, viewport: Viewport, info: &DebugInfo) -> bool {
        let lines = info.lines();
        let lines = &lines[..lines.len().min(self.top_max_lines)];
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if (text_width(viewport) as usize) < widest {
            return false;
        }
        self.render_box(buf, viewport, lines, PanelAnchor::Top)
    }

    /// Returns whether the panel was drawn.
    pub fn render_bottom(&self, buf: &mut FrameBuffer, viewport: Viewport, help: &[String]) -> bool {
        let n = help.len().min(self.bottom_max_lines);
        self.render_box(buf, viewport, &help[..n], PanelAnchor::Bottom)
    }

    fn render_box(
        &self,
        buf: &mut FrameBuffer,
        viewport: Viewport,
        lines: &[String],
        anchor: PanelAnchor,
    ) -> bool {
        let Some((x0, y0, w, h)) = panel_rect(viewport, lines.len(), anchor) else {
            return false;
        };
        let (x0, y0, w, h) = (x0 as usize, y0 as usize, w as usize, h as usize);
        let s = self.style;
        let border = |ch| RenderCell::new(ch, s.border, s.background);

        for y in y0..y0 + h {
            for x in x0..x0 + w {
                buf.set(x, y, RenderCell::new(' ', s.text, s.background));
            }
        }

        let (right, bottom) = (x0 + w - 1, y0 + h - 1);
        for x in x0 + 1..right {
            buf.set(x, y0, border(HORIZONTAL));
            buf.set(x, bottom, border(HORIZONTAL));
        }
        for y in y0 + 1..bottom {
            buf.set(x0, y, border(VERTICAL));
            buf.set(right, y, border(VERTICAL));
        }
        buf.set(x0, y0, border(TOP_LEFT));
        buf.set(right, y0, border(TOP_RIGHT));
        buf.set(x0, bottom, border(BOTTOM_LEFT));
        buf.set(right, bottom, border(BOTTOM_RIGHT));

        let columns = text_width(viewport) as usize;
        for (i, line) in lines.iter().enumerate() {
            let clipped: String = line.chars().take(columns).collect();
            buf.put_str(x0 + 2, y0 + 1 + i, &clipped, s.text, s.background);
        }
        true
    }
}

/// Columns available for text inside a panel on `viewport`.
pub fn text_width(viewport: Viewport) -> u16 {
    viewport.width.saturating_sub(2 * PANEL_MARGIN + FRAME_COLS)
}

/// `(x, y, width, height)` of a panel with `lines` rows of text, or `None`
/// when it does not fit.
pub fn panel_rect(viewport: Viewport, lines: usize, anchor: PanelAnchor) -> Option<(u16, u16, u16, u16)> {
    if lines == 0 || viewport.width < MIN_PANEL_VIEWPORT_WIDTH {
        return None;
    }
    let height = lines as u16 + 2;
    // one free row between the panel and its screen edge
    if viewport.height < height + 1 {
        return None;
    }
    let width = viewport.width - 2 * PANEL_MARGIN;
    let y = match anchor {
        PanelAnchor::Top => 1,
        PanelAnchor::Bottom => viewport.height - height - 1,
    };
    Some((PANEL_MARGIN, y, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> PanelStyle {
        PanelStyle {
            background: Rgb::new(20, 20, 40),
            border: Rgb::new(100, 100, 160),
            text: Rgb::new(220, 220, 220),
        }
    }

    fn info(viewport: Viewport) -> DebugInfo {
        DebugInfo {
            center: WorldPos::new(60, 30),
            viewport,
            frame: 42,
            fps: Some(59.94),
            show_coordinates: true,
            show_fps: true,
        }
    }

    fn help() -> Vec<String> {
        vec!["Esc: Quit | R: Regenerate".into(), "F1: Debug".into(), "Tiles: tiles.toml".into()]
    }

    // ── content ──

    #[test]
    fn debug_lines_follow_flags() {
        let vp = Viewport::new(80, 24);
        assert_eq!(
            info(vp).lines(),
            vec!["Center: (60, 30) | Screen: 80x24".to_string(), "Frame: 42 | FPS: 59.9".to_string()]
        );
        let quiet = DebugInfo { show_coordinates: false, show_fps: false, ..info(vp) };
        assert_eq!(quiet.lines(), vec!["Screen: 80x24".to_string(), "Frame: 42".to_string()]);
    }

    // ── layout ──

    #[test]
    fn top_panel_box_on_80x24() {
        let vp = Viewport::new(80, 24);
        let mut fb = FrameBuffer::new(80, 24);
        assert!(PanelRenderer::new(style(), 2, 3).render_top(&mut fb, vp, &info(vp)));

        assert_eq!(fb.get(2, 1).map(|c| c.glyph), Some('┌'));
        assert_eq!(fb.get(77, 1).map(|c| c.glyph), Some('┐'));
        assert_eq!(fb.get(2, 4).map(|c| c.glyph), Some('└'));
        assert_eq!(fb.get(77, 4).map(|c| c.glyph), Some('┘'));
        assert_eq!(fb.get(40, 1).map(|c| c.glyph), Some('─'));
        assert_eq!(fb.get(2, 2).map(|c| c.glyph), Some('│'));
        assert!(fb.row_text(2).contains("Center: (60, 30)"));
        assert_eq!(fb.get(1, 1), Some(RenderCell::BLANK));
        assert_eq!(fb.get(78, 1), Some(RenderCell::BLANK));
        assert_eq!(fb.row(0).iter().filter(|c| **c != RenderCell::BLANK).count(), 0);
    }

    #[test]
    fn bottom_panel_sits_above_last_row() {
        let vp = Viewport::new(40, 12);
        let mut fb = FrameBuffer::new(40, 12);
        assert!(PanelRenderer::new(style(), 2, 3).render_bottom(&mut fb, vp, &help()));
        // 3 lines + 2 borders, one free row below
        assert_eq!(fb.get(2, 6).map(|c| c.glyph), Some('┌'));
        assert_eq!(fb.get(37, 10).map(|c| c.glyph), Some('┘'));
        assert_eq!(fb.row(11).iter().filter(|c| **c != RenderCell::BLANK).count(), 0);
    }

    #[test]
    fn long_lines_are_clipped_inside_the_box() {
        let vp = Viewport::new(24, 10);
        let mut fb = FrameBuffer::new(24, 10);
        let lines = vec!["0123456789abcdefghijklmnop".to_string()];
        assert!(PanelRenderer::new(style(), 2, 3).render_bottom(&mut fb, vp, &lines));
        // box spans columns 2..=21, text columns 4..=19
        assert_eq!(fb.row_text(7), "  │ 0123456789abcdef │  ");
    }

    #[test]
    fn line_limits_are_capped() {
        let vp = Viewport::new(40, 20);
        let mut fb = FrameBuffer::new(40, 20);
        let many: Vec<String> = (0..6).map(|i| format!("line {i}")).collect();
        assert!(PanelRenderer::new(style(), 9, 9).render_bottom(&mut fb, vp, &many));
        // 3 text rows: box from row 14 to row 18
        assert_eq!(fb.get(2, 14).map(|c| c.glyph), Some('┌'));
        assert!(fb.row_text(17).contains("line 2"));
        assert!(!(0..20).any(|y| fb.row_text(y).contains("line 3")));
    }

    // ── too small ──

    #[test]
    fn tiny_viewport_skips_panels_entirely() {
        let vp = Viewport::new(10, 3);
        let mut fb = FrameBuffer::new(10, 3);
        let panels = PanelRenderer::new(style(), 2, 3);
        assert!(!panels.render_top(&mut fb, vp, &info(vp)));
        assert!(!panels.render_bottom(&mut fb, vp, &help()));
        assert!(fb.cells().iter().all(|c| *c == RenderCell::BLANK));
    }

    #[test]
    fn width_threshold_is_exact() {
        let narrow = Viewport::new(MIN_PANEL_VIEWPORT_WIDTH - 1, 24);
        let ok = Viewport::new(MIN_PANEL_VIEWPORT_WIDTH, 24);
        assert_eq!(panel_rect(narrow, 2, PanelAnchor::Top), None);
        assert_eq!(panel_rect(ok, 2, PanelAnchor::Top), Some((2, 1, MIN_PANEL_VIEWPORT_WIDTH - 4, 4)));
    }

    #[test]
    fn debug_panel_needs_room_for_its_longest_line() {
        let panels = PanelRenderer::new(style(), 2, 3);
        // "Center: (60, 30) | Screen: 40x24" is 32 columns
        let fits = Viewport::new(40, 24);
        assert_eq!(text_width(fits), 32);
        let mut fb = FrameBuffer::new(40, 24);
        assert!(panels.render_top(&mut fb, fits, &info(fits)));
        assert!(fb.row_text(2).contains("Screen: 40x24"));

        let short = Viewport::new(39, 24);
        let mut fb = FrameBuffer::new(39, 24);
        assert!(!panels.render_top(&mut fb, short, &info(short)));
        assert!(fb.cells().iter().all(|c| *c == RenderCell::BLANK));
    }

    #[test]
    fn debug_panel_is_never_truncated_on_narrow_screens() {
        let vp = Viewport::new(MIN_PANEL_VIEWPORT_WIDTH + 1, 24);
        let mut fb = FrameBuffer::new(vp.width as usize, 24);
        let panels = PanelRenderer::new(style(), 2, 3);
        assert!(!panels.render_top(&mut fb, vp, &info(vp)));
        // without coordinates the lines are short enough
        let quiet = DebugInfo { show_coordinates: false, show_fps: false, ..info(vp) };
        assert!(panels.render_top(&mut fb, vp, &quiet));
        assert!(fb.row_text(2).contains("Screen: 21x24"));
        assert!(!(0..24).any(|y| fb.row_text(y).contains("Center")));
    }

    #[test]
    fn debug_panel_yields_to_help_on_short_screens() {
        let panels = PanelRenderer::new(style(), 2, 3);
        let lines = help();
        let help = &lines[..2];

        // 60x8: top would cover rows 1..=4, help covers rows 3..=6
        let vp = Viewport::new(60, 8);
        let mut fb = FrameBuffer::new(60, 8);
        assert_eq!(panels.render(&mut fb, vp, Some(&info(vp)), help), (false, true));
        assert_eq!(fb.get(2, 3).map(|c| c.glyph), Some('┌'));
        assert_eq!(fb.cells().iter().filter(|c| c.glyph == '┌').count(), 1);
        assert!(!(0..8).any(|y| fb.row_text(y).contains("Screen:")));

        // 60x10: top rows 1..=4, help rows 5..=8
        let vp = Viewport::new(60, 10);
        let mut fb = FrameBuffer::new(60, 10);
        assert_eq!(panels.render(&mut fb, vp, Some(&info(vp)), help), (true, true));
        assert_eq!(fb.get(2, 1).map(|c| c.glyph), Some('┌'));
        assert_eq!(fb.get(2, 5).map(|c| c.glyph), Some('┌'));
    }

    #[test]
    fn no_debug_info_draws_help_only() {
        let vp = Viewport::new(60, 20);
        let mut fb = FrameBuffer::new(60, 20);
        let drawn = PanelRenderer::new(style(), 2, 3).render(&mut fb, vp, None, &help());
        assert_eq!(drawn, (false, true));
        assert!(!fb.row_text(2).contains("Screen:"));
    }

    #[test]
    fn short_viewport_skips_panel() {
        assert_eq!(panel_rect(Viewport::new(80, 4), 3, PanelAnchor::Bottom), None);
        assert_eq!(panel_rect(Viewport::new(80, 6), 3, PanelAnchor::Bottom), Some((2, 0, 76, 5)));
    }
}
