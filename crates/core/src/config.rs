//! Game data - colors and piece sets loaded from a JSON document
//!
//! ```json
//! { "colors": [ { "id": 1, "fg": "cyan", "bg": "black" } ],
//!   "types":  [ { "name": "Tetrominoes",
//!                 "polyominoes": [ { "color": 1, "blocks": [[0,0],[1,0],[-1,0],[0,1]] } ] } ] }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::template::PieceTemplate;
use crate::types::{ColorId, Point};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed game data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid game data: {0}")]
    Invalid(String),
}

/// The eight terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    Blue,
    Cyan,
    Green,
    Magenta,
    Red,
    White,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorPair {
    pub fg: NamedColor,
    pub bg: NamedColor,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    colors: Vec<RawColor>,
    types: Vec<RawType>,
}

#[derive(Debug, Deserialize)]
struct RawColor {
    id: u16,
    fg: NamedColor,
    bg: NamedColor,
}

#[derive(Debug, Deserialize)]
struct RawType {
    name: String,
    polyominoes: Vec<RawPolyomino>,
}

#[derive(Debug, Deserialize)]
struct RawPolyomino {
    color: u16,
    blocks: Vec<(i32, i32)>,
}

/// Validated game data: color pairs by id and piece sets by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    colors: BTreeMap<ColorId, ColorPair>,
    piece_types: BTreeMap<String, Vec<PieceTemplate>>,
}

impl Catalog {
    pub fn colors(&self) -> &BTreeMap<ColorId, ColorPair> {
        &self.colors
    }

    pub fn color(&self, id: ColorId) -> Option<ColorPair> {
        self.colors.get(&id).copied()
    }

    pub fn piece_types(&self) -> &BTreeMap<String, Vec<PieceTemplate>> {
        &self.piece_types
    }

    /// Templates of one piece set, by name.
    pub fn piece_type(&self, name: &str) -> Option<&[PieceTemplate]> {
        self.piece_types.get(name).map(Vec::as_slice)
    }

    /// Set names, in sorted order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.piece_types.keys().map(String::as_str)
    }
}

/// Parse and validate a game data document.
pub fn parse_catalog(text: &str) -> Result<Catalog, ConfigError> {
    let raw: RawCatalog = serde_json::from_str(text)?;

    let mut colors = BTreeMap::new();
    for c in raw.colors {
        let pair = ColorPair { fg: c.fg, bg: c.bg };
        if colors.insert(ColorId(c.id), pair).is_some() {
            return Err(invalid(format!("color {} is defined twice", c.id)));
        }
    }

    if raw.types.is_empty() {
        return Err(invalid("no piece types defined".to_string()));
    }

    let mut piece_types = BTreeMap::new();
    for t in raw.types {
        if t.polyominoes.is_empty() {
            return Err(invalid(format!("piece type '{}' has no polyominoes", t.name)));
        }
        let mut templates = Vec::with_capacity(t.polyominoes.len());
        for (i, poly) in t.polyominoes.into_iter().enumerate() {
            templates.push(build_template(&t.name, i, poly, &colors)?);
        }
        if piece_types.contains_key(&t.name) {
            return Err(invalid(format!("piece type '{}' is defined twice", t.name)));
        }
        piece_types.insert(t.name, templates);
    }

    Ok(Catalog {
        colors,
        piece_types,
    })
}

/// Read and parse a game data file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&text)?;
    info!(
        path = %path.display(),
        colors = catalog.colors.len(),
        types = catalog.piece_types.len(),
        "loaded game data"
    );
    Ok(catalog)
}

/// Largest block offset accepted along either axis.
const MAX_BLOCK_OFFSET: i32 = 64;

fn build_template(
    type_name: &str,
    index: usize,
    poly: RawPolyomino,
    colors: &BTreeMap<ColorId, ColorPair>,
) -> Result<PieceTemplate, ConfigError> {
    let color = ColorId(poly.color);
    if !colors.contains_key(&color) {
        return Err(invalid(format!(
            "polyomino {index} of '{type_name}' uses undefined color {}",
            poly.color
        )));
    }
    if poly.blocks.is_empty() {
        return Err(invalid(format!("polyomino {index} of '{type_name}' has no blocks")));
    }
    let mut seen = HashSet::new();
    let mut offsets = Vec::with_capacity(poly.blocks.len());
    for (x, y) in poly.blocks {
        let p = Point::new(x, y);
        let bounds = -MAX_BLOCK_OFFSET..=MAX_BLOCK_OFFSET;
        if !bounds.contains(&x) || !bounds.contains(&y) {
            return Err(invalid(format!(
                "polyomino {index} of '{type_name}' has block {p} beyond ±{MAX_BLOCK_OFFSET}"
            )));
        }
        if !seen.insert(p) {
            return Err(invalid(format!(
                "polyomino {index} of '{type_name}' repeats block {p}"
            )));
        }
        offsets.push(p);
    }
    Ok(PieceTemplate::new(offsets, color))
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid(reason)
}
