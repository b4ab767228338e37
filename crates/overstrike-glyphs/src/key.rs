//! Glyph keys: a single character or an overstruck character pair.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Identifies one entry of a glyph table.
///
/// Ordering is lexicographic over the key's characters, so `" "` < `" A"` <
/// `"A"` < `"AB"`. The selector relies on this order for tie-breaking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GlyphKey {
    Single(char),
    /// First strike, second strike.
    Pair(char, char),
}

/// Blank glyph for single-character tables.
pub const BLANK: GlyphKey = GlyphKey::Single(' ');
/// Blank glyph for pair tables.
pub const BLANK_PAIR: GlyphKey = GlyphKey::Pair(' ', ' ');

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("glyph key {0:?} must be one or two characters")]
pub struct InvalidKey(pub String);

impl GlyphKey {
    /// Parse a table key of one or two characters.
    pub fn parse(raw: &str) -> Result<Self, InvalidKey> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), None, _) => Ok(GlyphKey::Single(a)),
            (Some(a), Some(b), None) => Ok(GlyphKey::Pair(a, b)),
            _ => Err(InvalidKey(raw.to_string())),
        }
    }

    /// Character printed by the first strike.
    #[inline]
    pub fn first(&self) -> char {
        match *self {
            GlyphKey::Single(c) | GlyphKey::Pair(c, _) => c,
        }
    }

    /// Character printed by the second strike, if any.
    #[inline]
    pub fn second(&self) -> Option<char> {
        match *self {
            GlyphKey::Single(_) => None,
            GlyphKey::Pair(_, c) => Some(c),
        }
    }

    #[inline]
    pub fn is_pair(&self) -> bool {
        matches!(self, GlyphKey::Pair(..))
    }

    /// True when every strike of the key is a space.
    pub fn is_blank(&self) -> bool {
        self.first() == ' ' && self.second().is_none_or(|c| c == ' ')
    }

    fn chars(&self) -> impl Iterator<Item = char> {
        std::iter::once(self.first()).chain(self.second())
    }
}

impl Ord for GlyphKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chars().cmp(other.chars())
    }
}

impl PartialOrd for GlyphKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GlyphKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphKey::Single(c) => write!(f, "{c}"),
            GlyphKey::Pair(a, b) => write!(f, "{a}{b}"),
        }
    }
}

impl std::str::FromStr for GlyphKey {
    type Err = InvalidKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GlyphKey::parse(s)
    }
}

impl Serialize for GlyphKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GlyphKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        GlyphKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}
