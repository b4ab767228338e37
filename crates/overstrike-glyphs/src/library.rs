//! Immutable glyph reference library.
//!
//! A library is parsed from the JSON table written by the glyph-sheet
//! preparation tools: an object whose keys are one- or two-character strings
//! and whose values are `rows × cols × bins` nested arrays of histogram
//! values.

use crate::key::{GlyphKey, InvalidKey};
use log::{debug, info};
use overstrike_core::DescriptorBlock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Shape of every reference block in a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphGeometry {
    /// Cell rows per character.
    pub rows: usize,
    /// Cell columns per character.
    pub cols: usize,
    /// Orientation bins per cell.
    pub bins: usize,
}

impl Default for GlyphGeometry {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 3,
            bins: 8,
        }
    }
}

impl GlyphGeometry {
    fn check(self) -> Result<(), GlyphTableError> {
        if self.rows == 0 || self.cols == 0 || self.bins == 0 {
            return Err(GlyphTableError::Geometry {
                rows: self.rows,
                cols: self.cols,
                bins: self.bins,
            });
        }
        Ok(())
    }
}

/// Errors raised while loading a glyph table.
#[derive(thiserror::Error, Debug)]
pub enum GlyphTableError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Key(#[from] InvalidKey),
    #[error("glyph {key:?}: expected {expected} {axis}, got {got}")]
    Shape {
        key: String,
        axis: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("glyph {key:?}: entry {value} at cell ({row},{col}) bin {bin} is negative or not finite")]
    Value {
        key: String,
        row: usize,
        col: usize,
        bin: usize,
        value: f32,
    },
    #[error("glyph geometry {rows}x{cols}x{bins} has a zero dimension")]
    Geometry { rows: usize, cols: usize, bins: usize },
    #[error("glyph table is empty")]
    Empty,
}

/// One matching target.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub key: GlyphKey,
    pub reference: DescriptorBlock,
    /// Mean over every entry of `reference`.
    pub mean_luminance: f32,
}

impl Glyph {
    pub fn new(key: GlyphKey, reference: DescriptorBlock) -> Self {
        let mean_luminance = reference.mean();
        Self {
            key,
            reference,
            mean_luminance,
        }
    }
}

/// Allow-lists for the first and second character of a key.
///
/// The space is always allowed on either side so that blanks stay available.
/// Single-character keys are only checked against `left`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyFilter {
    pub left: Option<String>,
    pub right: Option<String>,
}

impl KeyFilter {
    pub fn accepts(&self, key: &GlyphKey) -> bool {
        fn allowed(set: &Option<String>, c: char) -> bool {
            c == ' ' || set.as_deref().is_none_or(|s| s.contains(c))
        }
        allowed(&self.left, key.first()) && key.second().is_none_or(|c| allowed(&self.right, c))
    }
}

/// Glyph table, read-only after load.
#[derive(Clone, Debug)]
pub struct GlyphLibrary {
    geometry: GlyphGeometry,
    glyphs: BTreeMap<GlyphKey, Glyph>,
}

impl GlyphLibrary {
    /// Build a library from already-validated glyphs.
    ///
    /// Glyphs whose reference shape disagrees with `geometry` are rejected.
    pub fn from_glyphs(
        geometry: GlyphGeometry,
        glyphs: impl IntoIterator<Item = Glyph>,
    ) -> Result<Self, GlyphTableError> {
        geometry.check()?;
        let mut map = BTreeMap::new();
        for glyph in glyphs {
            let (rows, cols, bins) = glyph.reference.shape();
            check_len(&glyph.key.to_string(), "rows", geometry.rows, rows)?;
            check_len(&glyph.key.to_string(), "columns", geometry.cols, cols)?;
            check_len(&glyph.key.to_string(), "bins", geometry.bins, bins)?;
            map.insert(glyph.key, glyph);
        }
        if map.is_empty() {
            return Err(GlyphTableError::Empty);
        }
        Ok(Self {
            geometry,
            glyphs: map,
        })
    }

    /// Parse a JSON table held in memory.
    pub fn from_json_str(raw: &str, geometry: GlyphGeometry) -> Result<Self, GlyphTableError> {
        let table: BTreeMap<String, Vec<Vec<Vec<f32>>>> = serde_json::from_str(raw)?;
        Self::from_table(table, geometry)
    }

    /// Parse a JSON table from any reader.
    pub fn from_reader<R: Read>(reader: R, geometry: GlyphGeometry) -> Result<Self, GlyphTableError> {
        let table: BTreeMap<String, Vec<Vec<Vec<f32>>>> = serde_json::from_reader(reader)?;
        Self::from_table(table, geometry)
    }

    /// Load a JSON table from disk.
    pub fn load_json(path: impl AsRef<Path>, geometry: GlyphGeometry) -> Result<Self, GlyphTableError> {
        let path = path.as_ref();
        let lib = Self::from_reader(BufReader::new(File::open(path)?), geometry)?;
        info!("loaded {} glyphs from {}", lib.len(), path.display());
        Ok(lib)
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(entries = table.len()))
    )]
    fn from_table(
        table: BTreeMap<String, Vec<Vec<Vec<f32>>>>,
        geometry: GlyphGeometry,
    ) -> Result<Self, GlyphTableError> {
        geometry.check()?;
        let mut glyphs = Vec::with_capacity(table.len());
        for (raw_key, rows) in table {
            let key = GlyphKey::parse(&raw_key)?;
            let reference = parse_block(&raw_key, &rows, geometry)?;
            glyphs.push(Glyph::new(key, reference));
        }
        let lib = Self::from_glyphs(geometry, glyphs)?;
        debug!(
            "glyph table: {} entries, {}x{}x{}",
            lib.len(),
            geometry.rows,
            geometry.cols,
            geometry.bins
        );
        Ok(lib)
    }

    #[inline]
    pub fn geometry(&self) -> GlyphGeometry {
        self.geometry
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn lookup(&self, key: &GlyphKey) -> Option<&Glyph> {
        self.glyphs.get(key)
    }

    pub fn contains(&self, key: &GlyphKey) -> bool {
        self.glyphs.contains_key(key)
    }

    /// Every key in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &GlyphKey> {
        self.glyphs.keys()
    }

    /// Glyphs in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }

    /// Keys accepted by `pred`, in lexicographic order.
    pub fn filtered_keys<F>(&self, mut pred: F) -> BTreeSet<GlyphKey>
    where
        F: FnMut(&Glyph) -> bool,
    {
        self.glyphs
            .values()
            .filter(|g| pred(g))
            .map(|g| g.key)
            .collect()
    }

    /// Keys passing a left/right character allow-list.
    pub fn keys_matching(&self, filter: &KeyFilter) -> BTreeSet<GlyphKey> {
        self.filtered_keys(|g| filter.accepts(&g.key))
    }

    /// True when the table holds character pairs.
    pub fn has_pairs(&self) -> bool {
        self.glyphs.keys().any(GlyphKey::is_pair)
    }
}

fn check_len(key: &str, axis: &'static str, expected: usize, got: usize) -> Result<(), GlyphTableError> {
    if expected == got {
        Ok(())
    } else {
        Err(GlyphTableError::Shape {
            key: key.to_string(),
            axis,
            expected,
            got,
        })
    }
}

fn parse_block(
    key: &str,
    rows: &[Vec<Vec<f32>>],
    geometry: GlyphGeometry,
) -> Result<DescriptorBlock, GlyphTableError> {
    check_len(key, "rows", geometry.rows, rows.len())?;
    let mut data = Vec::with_capacity(geometry.rows * geometry.cols * geometry.bins);
    for (r, cols) in rows.iter().enumerate() {
        check_len(key, "columns", geometry.cols, cols.len())?;
        for (c, hist) in cols.iter().enumerate() {
            check_len(key, "bins", geometry.bins, hist.len())?;
            if let Some((bin, &value)) = hist
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(GlyphTableError::Value {
                    key: key.to_string(),
                    row: r,
                    col: c,
                    bin,
                    value,
                });
            }
            data.extend_from_slice(hist);
        }
    }
    DescriptorBlock::new(geometry.rows, geometry.cols, geometry.bins, data).ok_or(
        GlyphTableError::Shape {
            key: key.to_string(),
            axis: "entries",
            expected: geometry.rows * geometry.cols * geometry.bins,
            got: 0,
        },
    )
}
