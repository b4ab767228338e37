use overstrike_glyphs::{GlyphKey, GlyphLibrary, KeyFilter, BLANK, BLANK_PAIR};
use serde::{Deserialize, Serialize};

/// First-layer characters of the teletype preset, biased toward glyphs with
/// distinctive shapes.
pub const TELETYPE_FIRST_LAYER: &str = " .-/\\()+>=?I#V96OZSAHX8QWKM";

/// Which kind of glyph table a render works with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One character per position and layer.
    #[default]
    Single,
    /// A pre-scanned overstruck character pair per position and layer.
    Pair,
}

impl Layout {
    /// Glyph chosen when no candidate is eligible.
    pub fn blank(self) -> GlyphKey {
        match self {
            Layout::Single => BLANK,
            Layout::Pair => BLANK_PAIR,
        }
    }

    pub fn accepts(self, key: &GlyphKey) -> bool {
        key.is_pair() == (self == Layout::Pair)
    }
}

/// Layer selection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Overstrike passes per position (`>= 1`).
    pub layers: usize,
    /// In `[0, 1]`. A glyph is eligible while `luminance * layer_factor` fits
    /// the residual; `1 - layer_factor` of its reference is subtracted once
    /// printed.
    pub layer_factor: f32,
    pub layout: Layout,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            layers: 2,
            layer_factor: 0.5,
            layout: Layout::Single,
        }
    }
}

/// Which glyphs may be chosen on each layer.
///
/// `None` character sets allow every glyph. The space is always allowed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidatePolicy {
    /// Characters allowed on layer 0.
    pub first_layer: Option<String>,
    /// Characters allowed on layers 1 and later.
    pub later_layers: Option<String>,
    /// Left/right allow-lists applied on every layer.
    pub filter: KeyFilter,
}

impl CandidatePolicy {
    /// The curated teletype preset: a shape-heavy subset on the first layer
    /// and every printable ASCII character except `?` afterwards.
    pub fn teletype() -> Self {
        Self {
            first_layer: Some(TELETYPE_FIRST_LAYER.to_string()),
            later_layers: Some((0x20u8..0x7f).map(char::from).filter(|&c| c != '?').collect()),
            filter: KeyFilter::default(),
        }
    }

    fn charset(&self, layer: usize) -> Option<&str> {
        if layer == 0 {
            self.first_layer.as_deref()
        } else {
            self.later_layers.as_deref()
        }
    }

    /// Library keys allowed on `layer`, in lexicographic order.
    pub fn keys_for_layer(&self, library: &GlyphLibrary, layer: usize) -> Vec<GlyphKey> {
        let charset = self.charset(layer);
        library
            .filtered_keys(|g| {
                self.filter.accepts(&g.key)
                    && charset.is_none_or(|set| key_within(&g.key, set))
            })
            .into_iter()
            .collect()
    }
}

/// Every strike of `key` is a space or a member of `set`.
fn key_within(key: &GlyphKey, set: &str) -> bool {
    let ok = |c: char| c == ' ' || set.contains(c);
    ok(key.first()) && key.second().is_none_or(ok)
}
