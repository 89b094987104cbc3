//! Error taxonomy.
//!
//! Configuration errors are raised before the viewer starts and are fatal.
//! Generation errors abort a single regenerate command and leave the
//! previous world in place. Render errors mean a grid and the catalog are
//! out of sync, which is a bug, so the frame loop stops.

use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("tile '{tile}' is missing required field '{field}'")]
    MissingField { tile: String, field: &'static str },

    #[error("tile '{tile}': {field} component {value} is outside 0-255")]
    InvalidColorRange {
        tile: String,
        field: &'static str,
        value: i64,
    },

    #[error("tile '{tile}': {field} needs exactly 3 components, found {len}")]
    InvalidColorShape {
        tile: String,
        field: &'static str,
        len: usize,
    },

    #[error("tile '{tile}': character {glyph:?} must be exactly one single-width glyph")]
    InvalidGlyph { tile: String, glyph: String },

    #[error("tile key '{0}' is defined more than once")]
    DuplicateKey(String),

    #[error("{context} refers to unknown tile '{key}'")]
    UnknownTileReference { key: String, context: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("invalid world dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("center ({x}, {y}) lies outside a {width}x{height} world")]
    InvalidCenter {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("grid cell ({x}, {y}) holds tile '{key}' which is not in the catalog")]
    UnknownTile { key: String, x: i32, y: i32 },
}

/// Anything that can end the program.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("world generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("render invariant violated: {0}")]
    Render(#[from] RenderError),

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
