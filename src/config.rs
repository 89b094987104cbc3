//! Application configuration.
//!
//! Reads `config.toml` from an explicit path, the executable's directory or
//! the CWD, in that order. Every key has a default, so a missing file or a
//! partial one still yields a usable config. A file that fails to parse is
//! reported and replaced by defaults; only an explicit path that cannot be
//! read is an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::grid::WorldPos;
use crate::domain::spiral::{Band, BandedRule, SpiralParams};
use crate::domain::tile::{Rgb, TileCatalog};
use crate::error::ConfigError;
use crate::sim::state::{Flags, Reseed};
use crate::ui::panel::{PanelStyle, BOTTOM_MAX_LINES, TOP_MAX_LINES};
use crate::ui::renderer::RegenEffects;

pub const CONFIG_FILE: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Resolved location of the tile catalog.
    pub tiles_file: PathBuf,
    pub world: WorldConfig,
    pub camera: CameraConfig,
    pub debug: DebugConfig,
    pub rendering: RenderingConfig,
    pub ui: UiConfig,
    pub effects: EffectsConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
    pub center: WorldPos,
    pub seed: u64,
    pub regenerate_seed: Reseed,
    pub outer_tile: String,
    pub bands: Vec<Band>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraConfig {
    pub move_speed: i32,
    pub fast_move_speed: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebugConfig {
    pub show_debug_on_startup: bool,
    pub show_coordinates_on_startup: bool,
    pub show_fps_on_startup: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderingConfig {
    pub seamless_blocks_enabled: bool,
    pub clear_color: Rgb,
    pub frame_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiConfig {
    pub panel: PanelStyle,
    pub top_panel_max_lines: usize,
    pub bottom_panel_max_lines: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectsConfig {
    pub sparkle_ms: u64,
    pub sparkle_color: Rgb,
    pub ripple_ms: u64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    camera: TomlCamera,
    #[serde(default)]
    debug: TomlDebug,
    #[serde(default)]
    rendering: TomlRendering,
    #[serde(default)]
    ui: TomlUi,
    #[serde(default)]
    effects: TomlEffects,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tiles_file")]
    tiles_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_width")]
    width: i32,
    #[serde(default = "default_height")]
    height: i32,
    #[serde(default = "default_center_x")]
    center_x: i32,
    #[serde(default = "default_center_y")]
    center_y: i32,
    #[serde(default = "default_seed")]
    seed: u64,
    #[serde(default = "default_regenerate_seed")]
    regenerate_seed: String,
    #[serde(default = "default_outer_tile")]
    outer_tile: String,
    #[serde(default = "default_bands")]
    bands: Vec<TomlBand>,
}

#[derive(Deserialize, Debug, Clone)]
struct TomlBand {
    through_ring: u32,
    tiles: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlCamera {
    #[serde(default = "default_move_speed")]
    move_speed: i32,
    #[serde(default = "default_fast_move_speed")]
    fast_move_speed: i32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlDebug {
    #[serde(default)]
    show_debug_on_startup: bool,
    #[serde(default)]
    show_coordinates_on_startup: bool,
    #[serde(default)]
    show_fps_on_startup: bool,
}

#[derive(Deserialize, Debug)]
struct TomlRendering {
    #[serde(default = "default_true")]
    seamless_blocks_enabled: bool,
    #[serde(default = "default_clear_color")]
    clear_color: [u8; 3],
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlUi {
    #[serde(default = "default_panel_background")]
    panel_background: [u8; 3],
    #[serde(default = "default_border_color")]
    border_color: [u8; 3],
    #[serde(default = "default_info_color")]
    info_color: [u8; 3],
    #[serde(default = "default_top_lines")]
    top_panel_max_lines: usize,
    #[serde(default = "default_bottom_lines")]
    bottom_panel_max_lines: usize,
}

#[derive(Deserialize, Debug)]
struct TomlEffects {
    #[serde(default = "default_sparkle_ms")]
    sparkle_ms: u64,
    #[serde(default = "default_sparkle_color")]
    sparkle_color: [u8; 3],
    #[serde(default = "default_ripple_ms")]
    ripple_ms: u64,
}

// ── Defaults ──

fn default_tiles_file() -> String { "tiles.toml".into() }
fn default_width() -> i32 { 121 }
fn default_height() -> i32 { 61 }
fn default_center_x() -> i32 { 60 }
fn default_center_y() -> i32 { 30 }
fn default_seed() -> u64 { 42 }
fn default_regenerate_seed() -> String { "advance".into() }
fn default_outer_tile() -> String { "stone".into() }
fn default_move_speed() -> i32 { 1 }
fn default_fast_move_speed() -> i32 { 5 }
fn default_true() -> bool { true }
fn default_clear_color() -> [u8; 3] { [22, 22, 35] }
fn default_frame_ms() -> u64 { 33 }     // ~30 fps
fn default_panel_background() -> [u8; 3] { [16, 16, 32] }
fn default_border_color() -> [u8; 3] { [96, 96, 160] }
fn default_info_color() -> [u8; 3] { [220, 220, 230] }
fn default_top_lines() -> usize { TOP_MAX_LINES }
fn default_bottom_lines() -> usize { BOTTOM_MAX_LINES }
fn default_sparkle_ms() -> u64 { 500 }
fn default_sparkle_color() -> [u8; 3] { [255, 215, 0] }
fn default_ripple_ms() -> u64 { 800 }

fn default_bands() -> Vec<TomlBand> {
    let band = |through_ring, tiles: &[&str]| TomlBand {
        through_ring,
        tiles: tiles.iter().map(|t| t.to_string()).collect(),
    };
    vec![
        band(0, &["center_marker"]),
        band(2, &["sand"]),
        band(6, &["grass", "grass", "dirt"]),
        band(9, &["water"]),
        band(16, &["grass", "dirt"]),
        band(22, &["dirt", "stone"]),
    ]
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { tiles_file: default_tiles_file() }
    }
}

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            width: default_width(),
            height: default_height(),
            center_x: default_center_x(),
            center_y: default_center_y(),
            seed: default_seed(),
            regenerate_seed: default_regenerate_seed(),
            outer_tile: default_outer_tile(),
            bands: default_bands(),
        }
    }
}

impl Default for TomlCamera {
    fn default() -> Self {
        TomlCamera {
            move_speed: default_move_speed(),
            fast_move_speed: default_fast_move_speed(),
        }
    }
}

impl Default for TomlRendering {
    fn default() -> Self {
        TomlRendering {
            seamless_blocks_enabled: default_true(),
            clear_color: default_clear_color(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl Default for TomlUi {
    fn default() -> Self {
        TomlUi {
            panel_background: default_panel_background(),
            border_color: default_border_color(),
            info_color: default_info_color(),
            top_panel_max_lines: default_top_lines(),
            bottom_panel_max_lines: default_bottom_lines(),
        }
    }
}

impl Default for TomlEffects {
    fn default() -> Self {
        TomlEffects {
            sparkle_ms: default_sparkle_ms(),
            sparkle_color: default_sparkle_color(),
            ripple_ms: default_ripple_ms(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load the application config.
    /// `explicit` (from `--config`) must be readable; otherwise the exe
    /// directory and the CWD are searched and a missing file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let search_dirs = candidate_dirs();
        let (toml_cfg, base_dir) = match explicit {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                log::info!("Loaded config from {}", path.display());
                (parse_or_default(&text, path), path.parent().map(Path::to_path_buf))
            }
            None => load_toml(&search_dirs),
        };
        Ok(Self::resolve(toml_cfg, base_dir.as_deref(), &search_dirs))
    }

    /// Config from TOML text, with paths resolved against `base_dir`.
    /// Malformed text yields the defaults.
    #[cfg(test)]
    pub fn from_toml_str(text: &str, base_dir: &Path) -> Self {
        let cfg = parse_or_default(text, &base_dir.join(CONFIG_FILE));
        Self::resolve(cfg, Some(base_dir), &[])
    }

    fn resolve(cfg: TomlConfig, base_dir: Option<&Path>, search_dirs: &[PathBuf]) -> Self {
        let tiles_file = resolve_data_file(&cfg.general.tiles_file, base_dir, search_dirs);

        let regenerate_seed = match cfg.world.regenerate_seed.to_ascii_lowercase().as_str() {
            "keep" => Reseed::Keep,
            "advance" => Reseed::Advance,
            other => match other.parse::<u64>() {
                Ok(seed) => Reseed::Set(seed),
                Err(_) => {
                    log::warn!("Unknown world.regenerate_seed '{other}', using 'advance'");
                    Reseed::Advance
                }
            },
        };

        let camera = CameraConfig {
            move_speed: cfg.camera.move_speed.max(1),
            fast_move_speed: cfg.camera.fast_move_speed.max(1),
        };

        GameConfig {
            tiles_file,
            world: WorldConfig {
                width: cfg.world.width,
                height: cfg.world.height,
                center: WorldPos::new(cfg.world.center_x, cfg.world.center_y),
                seed: cfg.world.seed,
                regenerate_seed,
                outer_tile: cfg.world.outer_tile,
                bands: cfg
                    .world
                    .bands
                    .into_iter()
                    .map(|b| Band { through_ring: b.through_ring, tiles: b.tiles })
                    .collect(),
            },
            camera,
            debug: DebugConfig {
                show_debug_on_startup: cfg.debug.show_debug_on_startup,
                show_coordinates_on_startup: cfg.debug.show_coordinates_on_startup,
                show_fps_on_startup: cfg.debug.show_fps_on_startup,
            },
            rendering: RenderingConfig {
                seamless_blocks_enabled: cfg.rendering.seamless_blocks_enabled,
                clear_color: cfg.rendering.clear_color.into(),
                frame_ms: cfg.rendering.frame_ms.max(1),
            },
            ui: UiConfig {
                panel: PanelStyle {
                    background: cfg.ui.panel_background.into(),
                    border: cfg.ui.border_color.into(),
                    text: cfg.ui.info_color.into(),
                },
                top_panel_max_lines: cfg.ui.top_panel_max_lines.min(TOP_MAX_LINES),
                bottom_panel_max_lines: cfg.ui.bottom_panel_max_lines.min(BOTTOM_MAX_LINES),
            },
            effects: EffectsConfig {
                sparkle_ms: cfg.effects.sparkle_ms,
                sparkle_color: cfg.effects.sparkle_color.into(),
                ripple_ms: cfg.effects.ripple_ms,
            },
        }
    }

    // ── Derived values ──

    pub fn spiral_params(&self, seed_override: Option<u64>) -> SpiralParams {
        SpiralParams {
            width: self.world.width,
            height: self.world.height,
            center: self.world.center,
            seed: seed_override.unwrap_or(self.world.seed),
        }
    }

    pub fn ring_rule(&self) -> BandedRule {
        BandedRule::new(self.world.bands.clone(), &self.world.outer_tile)
    }

    pub fn startup_flags(&self) -> Flags {
        Flags {
            show_debug: self.debug.show_debug_on_startup,
            show_coordinates: self.debug.show_coordinates_on_startup,
            show_fps: self.debug.show_fps_on_startup,
            seamless_mode: self.rendering.seamless_blocks_enabled,
        }
    }

    pub fn regen_effects(&self) -> RegenEffects {
        RegenEffects {
            sparkle: std::time::Duration::from_millis(self.effects.sparkle_ms),
            sparkle_color: self.effects.sparkle_color,
            ripple: std::time::Duration::from_millis(self.effects.ripple_ms),
        }
    }

    /// Every tile the ring rule can place must exist in the catalog, so a
    /// generated grid never carries a key the renderer can't resolve.
    pub fn check_tiles(&self, catalog: &TileCatalog) -> Result<(), ConfigError> {
        let rule = self.ring_rule();
        let missing = rule.keys().find(|key| !catalog.contains(key)).map(str::to_string);
        match missing {
            Some(key) => Err(ConfigError::UnknownTileReference {
                key,
                context: "world generation".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Follow symlinks so an installed link still finds files next to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
/// Returns the parsed config and the directory it came from.
fn load_toml(search_dirs: &[PathBuf]) -> (TomlConfig, Option<PathBuf>) {
    for dir in search_dirs {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(text) => {
                log::info!("Loaded config from {}", path.display());
                return (parse_or_default(&text, &path), Some(dir.clone()));
            }
            Err(e) => log::warn!("Could not read {}: {e}", path.display()),
        }
    }
    log::info!("No {CONFIG_FILE} found, using defaults");
    (TomlConfig::default(), None)
}

fn parse_or_default(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("{} parse error: {e}", path.display());
            log::warn!("Using default settings.");
            TomlConfig::default()
        }
    }
}

/// Absolute paths are used as-is. Relative ones are tried against the
/// config's own directory, then each search dir; if none exists the path
/// stays relative to the config directory (or the CWD).
fn resolve_data_file(name: &str, base_dir: Option<&Path>, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return path;
    }
    base_dir
        .into_iter()
        .chain(search_dirs.iter().map(PathBuf::as_path))
        .map(|d| d.join(&path))
        .find(|p| p.exists())
        .unwrap_or_else(|| match base_dir {
            Some(d) => d.join(&path),
            None => path,
        })
}
