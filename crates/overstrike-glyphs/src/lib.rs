//! Glyph reference tables for overstrike rendering.
//!
//! This crate focuses on:
//! - the tagged [`GlyphKey`] (single character or overstruck pair),
//! - parsing and validating the JSON reference-histogram tables,
//! - deterministic, filterable key iteration,
//! - an explicit [`LibraryCache`] shared across renders.
//!
//! It does **not** build tables from scanned glyph sheets; that happens
//! offline.

mod cache;
mod key;
mod library;

pub use cache::LibraryCache;
pub use key::{GlyphKey, InvalidKey, BLANK, BLANK_PAIR};
pub use library::{Glyph, GlyphGeometry, GlyphLibrary, GlyphTableError, KeyFilter};
