//! Tile definitions and the catalog that maps tile keys to their visuals.
//!
//! The catalog is closed: it is loaded once from `tiles.toml`, validated in
//! full, and never mutated afterwards. Anything that refers to a tile by key
//! (world bands, generated grids) is checked against it.
//!
//! ## File format
//!   ```toml
//!   [stone]
//!   name = "Stone"
//!   character = "█"
//!   font_color = [128, 128, 128]
//!   background_color = [64, 64, 64]
//!   ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use unicode_width::UnicodeWidthChar;

use crate::error::ConfigError;

/// 24-bit colour.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb::new(c[0], c[1], c[2])
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TileDefinition {
    pub name: String,
    pub glyph: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

#[cfg(test)]
impl TileDefinition {
    pub fn new(name: &str, glyph: char, fg: Rgb, bg: Rgb) -> Self {
        TileDefinition { name: name.to_string(), glyph, fg, bg }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TileCatalog {
    tiles: BTreeMap<String, TileDefinition>,
}

// ── Raw TOML schema ──
// Every field is optional here so that a missing one maps to
// `MissingField` instead of a generic serde message.

#[derive(Deserialize, Debug)]
struct RawTile {
    name: Option<String>,
    character: Option<String>,
    font_color: Option<Vec<i64>>,
    background_color: Option<Vec<i64>>,
}

impl TileCatalog {
    /// Build a catalog from already-constructed definitions.
    pub fn from_definitions<I>(defs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, TileDefinition)>,
    {
        let mut tiles = BTreeMap::new();
        for (key, def) in defs {
            if tiles.contains_key(&key) {
                return Err(ConfigError::DuplicateKey(key));
            }
            tiles.insert(key, def);
        }
        Ok(TileCatalog { tiles })
    }

    /// Read and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&text)?;
        if catalog.is_empty() {
            log::warn!("{} defines no tiles", path.display());
        }
        log::info!("Loaded {} tile definitions from {}", catalog.len(), path.display());
        let listed: Vec<String> = catalog
            .keys()
            .filter_map(|key| catalog.get(key).map(|t| format!("{key} ({})", t.name)))
            .collect();
        log::debug!("Tiles: {}", listed.join(", "));
        Ok(catalog)
    }

    /// Parse catalog text. All entries are validated; the first problem wins.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        if let Some(key) = find_duplicate_header(text) {
            return Err(ConfigError::DuplicateKey(key));
        }

        let raw: BTreeMap<String, RawTile> = toml::from_str(text)?;
        let defs = raw
            .into_iter()
            .map(|(key, entry)| validate_entry(&key, entry).map(|def| (key, def)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_definitions(defs)
    }

    pub fn get(&self, key: &str) -> Option<&TileDefinition> {
        self.tiles.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tiles.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

fn validate_entry(key: &str, entry: RawTile) -> Result<TileDefinition, ConfigError> {
    let missing = |field| ConfigError::MissingField { tile: key.to_string(), field };

    let name = entry.name.ok_or_else(|| missing("name"))?;
    let character = entry.character.ok_or_else(|| missing("character"))?;
    let font_color = entry.font_color.ok_or_else(|| missing("font_color"))?;
    let background_color = entry.background_color.ok_or_else(|| missing("background_color"))?;

    let mut chars = character.chars();
    let glyph = match (chars.next(), chars.next()) {
        (Some(c), None) if c.width() == Some(1) => c,
        _ => {
            return Err(ConfigError::InvalidGlyph {
                tile: key.to_string(),
                glyph: character,
            })
        }
    };

    Ok(TileDefinition {
        name,
        glyph,
        fg: parse_color(key, "font_color", &font_color)?,
        bg: parse_color(key, "background_color", &background_color)?,
    })
}

fn parse_color(tile: &str, field: &'static str, parts: &[i64]) -> Result<Rgb, ConfigError> {
    if parts.len() != 3 {
        return Err(ConfigError::InvalidColorShape {
            tile: tile.to_string(),
            field,
            len: parts.len(),
        });
    }
    let mut out = [0u8; 3];
    for (slot, &value) in out.iter_mut().zip(parts) {
        *slot = u8::try_from(value).map_err(|_| ConfigError::InvalidColorRange {
            tile: tile.to_string(),
            field,
            value,
        })?;
    }
    Ok(Rgb::from(out))
}

/// Scan `[table]` headers and return the first key that appears twice.
/// Lines that don't look like a plain header (array rows, `[[...]]`) are skipped.
fn find_duplicate_header(text: &str) -> Option<String> {
    let mut seen = HashSet::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.starts_with('[') || line.starts_with("[[") {
            continue;
        }
        let Some(end) = line.find(']') else { continue };
        let key = line[1..end].trim().trim_matches(|c| c == '"' || c == '\'');
        let is_header = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if is_header && !seen.insert(key.to_string()) {
            return Some(key.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STONE: &str = r#"
[stone]
name = "Stone"
character = "█"
font_color = [128, 128, 128]
background_color = [64, 64, 64]
"#;

    const GRASS: &str = r#"
[grass]
name = "Grass"
character = '"'
font_color = [40, 200, 40]
background_color = [10, 80, 10]
"#;

    // ── parsing ──

    #[test]
    fn parses_valid_catalog() {
        let text = format!("{STONE}{GRASS}");
        let cat = TileCatalog::parse(&text).unwrap();
        assert_eq!(cat.len(), 2);
        let stone = cat.get("stone").unwrap();
        assert_eq!(stone.name, "Stone");
        assert_eq!(stone.glyph, '█');
        assert_eq!(stone.fg, Rgb::new(128, 128, 128));
        assert_eq!(stone.bg, Rgb::new(64, 64, 64));
        assert_eq!(cat.get("grass").unwrap().glyph, '"');
        assert!(!cat.contains("void"));
    }

    #[test]
    fn keys_are_sorted() {
        let text = format!("{STONE}{GRASS}");
        let cat = TileCatalog::parse(&text).unwrap();
        assert_eq!(cat.keys().collect::<Vec<_>>(), vec!["grass", "stone"]);
    }

    #[test]
    fn missing_field_is_reported() {
        let text = "[dirt]\nname = \"Dirt\"\ncharacter = \"▓\"\nfont_color = [1, 2, 3]\n";
        match TileCatalog::parse(text) {
            Err(ConfigError::MissingField { tile, field }) => {
                assert_eq!(tile, "dirt");
                assert_eq!(field, "background_color");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_color_is_rejected() {
        let text = STONE.replace("[128, 128, 128]", "[128, 256, 128]");
        match TileCatalog::parse(&text) {
            Err(ConfigError::InvalidColorRange { field, value, .. }) => {
                assert_eq!(field, "font_color");
                assert_eq!(value, 256);
            }
            other => panic!("expected InvalidColorRange, got {other:?}"),
        }
    }

    #[test]
    fn negative_color_is_rejected() {
        let text = STONE.replace("[64, 64, 64]", "[64, -1, 64]");
        assert!(matches!(
            TileCatalog::parse(&text),
            Err(ConfigError::InvalidColorRange { value: -1, .. })
        ));
    }

    #[test]
    fn two_component_color_is_rejected() {
        let text = STONE.replace("[64, 64, 64]", "[64, 64]");
        assert!(matches!(
            TileCatalog::parse(&text),
            Err(ConfigError::InvalidColorShape { len: 2, .. })
        ));
    }

    #[test]
    fn multi_char_glyph_is_rejected() {
        let text = STONE.replace("\"█\"", "\"##\"");
        assert!(matches!(TileCatalog::parse(&text), Err(ConfigError::InvalidGlyph { .. })));
        let text = STONE.replace("\"█\"", "\"\"");
        assert!(matches!(TileCatalog::parse(&text), Err(ConfigError::InvalidGlyph { .. })));
    }

    #[test]
    fn wide_or_zero_width_glyph_is_rejected() {
        for glyph in ["中", "🌲", "\u{301}", "\t"] {
            let text = STONE.replace("\"█\"", &format!("\"{glyph}\""));
            assert!(
                matches!(TileCatalog::parse(&text), Err(ConfigError::InvalidGlyph { .. })),
                "{glyph:?} should be rejected"
            );
        }
        let text = STONE.replace("\"█\"", "\"▓\"");
        assert!(TileCatalog::parse(&text).is_ok());
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let text = format!("{STONE}{GRASS}{STONE}");
        match TileCatalog::parse(&text) {
            Err(ConfigError::DuplicateKey(key)) => assert_eq!(key, "stone"),
            other => panic!("expected DuplicateKey, got {other:?}"),
        }
    }

    #[test]
    fn multiline_color_rows_are_not_headers() {
        let text = "[a]\nname = \"A\"\ncharacter = \"a\"\nfont_color = [\n1, 2, 3\n]\n\
                    background_color = [\n1, 2, 3\n]\n";
        assert!(TileCatalog::parse(text).is_ok());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(TileCatalog::parse("[stone\nname ="), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn from_definitions_rejects_duplicates() {
        let def = TileDefinition::new("Stone", '█', Rgb::WHITE, Rgb::BLACK);
        let res = TileCatalog::from_definitions(vec![
            ("stone".to_string(), def.clone()),
            ("stone".to_string(), def),
        ]);
        assert!(matches!(res, Err(ConfigError::DuplicateKey(k)) if k == "stone"));
    }

    // ── file loading ──

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STONE.as_bytes()).unwrap();
        let cat = TileCatalog::load(file.path()).unwrap();
        assert!(cat.contains("stone"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(TileCatalog::load(&path), Err(ConfigError::Io { .. })));
    }
}
