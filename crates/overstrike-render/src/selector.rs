//! Greedy multi-layer glyph selection.
//!
//! Every character-sized block of the descriptor grid is handled on its own:
//! a [`RenderBlock`] holds a copy of the block's descriptors (the residual)
//! and, once per layer, picks the glyph nearest to the residual among the
//! candidates that do not over-ink it, then subtracts that glyph's
//! contribution. Blocks never interact, so they can run in parallel; the
//! layers of one block cannot.

use crate::error::RenderError;
use crate::params::{CandidatePolicy, Layout, RenderParams};
use log::{debug, trace};
use overstrike_core::{DescriptorBlock, DescriptorGrid};
use overstrike_glyphs::{GlyphKey, GlyphLibrary};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// The glyph picked for one position on one layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerChoice {
    pub key: GlyphKey,
    /// L2 distance to the residual; `None` when nothing was eligible and the
    /// blank glyph was used.
    pub distance: Option<f32>,
}

/// Residual and selection history of one character position.
#[derive(Clone, Debug)]
pub struct RenderBlock {
    residual: DescriptorBlock,
    history: Vec<LayerChoice>,
}

impl RenderBlock {
    pub fn new(residual: DescriptorBlock) -> Self {
        Self {
            residual,
            history: Vec::new(),
        }
    }

    pub fn residual(&self) -> &DescriptorBlock {
        &self.residual
    }

    pub fn history(&self) -> &[LayerChoice] {
        &self.history
    }

    /// Mean of the residual: the ink still to be placed.
    pub fn luminance(&self) -> f32 {
        self.residual.mean()
    }

    /// Run one layer.
    ///
    /// `candidates` must be sorted; the first of several equally distant
    /// glyphs wins. The key chosen on the previous layer is skipped.
    pub fn step(
        &mut self,
        library: &GlyphLibrary,
        candidates: &[GlyphKey],
        layer_factor: f32,
        blank: GlyphKey,
    ) -> LayerChoice {
        let previous = self.history.last().map(|c| c.key);
        let budget = self.residual.mean();

        let best = candidates
            .iter()
            .filter(|&&key| Some(key) != previous)
            .filter_map(|key| library.lookup(key))
            .filter(|glyph| glyph.mean_luminance * layer_factor <= budget)
            .map(|glyph| (glyph, glyph.reference.l2_distance(&self.residual)))
            .fold(None, |best: Option<(_, f32)>, (glyph, dist)| match best {
                Some((_, best_dist)) if best_dist <= dist => best,
                _ => Some((glyph, dist)),
            });

        let choice = match best {
            Some((glyph, dist)) => {
                self.residual
                    .subtract_scaled_clamped(&glyph.reference, 1.0 - layer_factor);
                LayerChoice {
                    key: glyph.key,
                    distance: Some(dist),
                }
            }
            None => {
                if let Some(glyph) = library.lookup(&blank) {
                    self.residual
                        .subtract_scaled_clamped(&glyph.reference, 1.0 - layer_factor);
                }
                LayerChoice {
                    key: blank,
                    distance: None,
                }
            }
        };
        trace!(
            "layer {}: {:?} budget {budget:.4} -> {:.4}",
            self.history.len(),
            choice.key,
            self.residual.mean()
        );
        self.history.push(choice);
        choice
    }

    pub fn into_history(self) -> Vec<LayerChoice> {
        self.history
    }
}

/// Selections for every character position of an image.
#[derive(Clone, Debug, PartialEq)]
pub struct Selections {
    rows: usize,
    cols: usize,
    layers: usize,
    layout: Layout,
    /// Row-major, one history of `layers` entries per position.
    positions: Vec<Vec<LayerChoice>>,
}

impl Selections {
    /// Character rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Character columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// History of the position at character `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> &[LayerChoice] {
        &self.positions[row * self.cols + col]
    }

    /// Keys chosen on `layer`, row-major.
    pub fn layer_keys(&self, layer: usize) -> impl Iterator<Item = GlyphKey> + '_ {
        self.positions.iter().map(move |h| h[layer].key)
    }
}

/// Runs layer selection over a descriptor grid against one library.
#[derive(Clone, Debug)]
pub struct LayerSelector<'a> {
    library: &'a GlyphLibrary,
    params: RenderParams,
}

impl<'a> LayerSelector<'a> {
    pub fn new(library: &'a GlyphLibrary, params: RenderParams) -> Result<Self, RenderError> {
        if params.layers == 0 {
            return Err(RenderError::NoLayers);
        }
        if !(0.0..=1.0).contains(&params.layer_factor) {
            return Err(RenderError::LayerFactor(params.layer_factor));
        }
        Ok(Self { library, params })
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    /// Render with keys taken from a [`CandidatePolicy`].
    pub fn render_with_policy(
        &self,
        grid: &DescriptorGrid,
        policy: &CandidatePolicy,
    ) -> Result<Selections, RenderError> {
        self.render(grid, |layer| policy.keys_for_layer(self.library, layer))
    }

    /// Render every block of `grid`.
    ///
    /// `eligible(layer)` supplies the candidate keys for a layer. It is called
    /// once per layer; its result is sorted, deduplicated, and restricted to
    /// keys of the configured layout that exist in the library.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, grid, eligible),
            fields(rows = grid.rows(), cols = grid.cols(), layers = self.params.layers)
        )
    )]
    pub fn render<F>(&self, grid: &DescriptorGrid, eligible: F) -> Result<Selections, RenderError>
    where
        F: Fn(usize) -> Vec<GlyphKey>,
    {
        let geometry = self.library.geometry();
        if grid.bins() != geometry.bins {
            return Err(RenderError::BinMismatch {
                grid: grid.bins(),
                library: geometry.bins,
            });
        }
        if grid.rows() % geometry.rows != 0 || grid.cols() % geometry.cols != 0 {
            return Err(RenderError::GridShape {
                rows: grid.rows(),
                cols: grid.cols(),
                block_rows: geometry.rows,
                block_cols: geometry.cols,
            });
        }

        let layout = self.params.layout;
        let per_layer: Vec<Vec<GlyphKey>> = (0..self.params.layers)
            .map(|layer| {
                let mut keys: Vec<GlyphKey> = eligible(layer)
                    .into_iter()
                    .filter(|k| layout.accepts(k) && self.library.contains(k))
                    .collect();
                keys.sort();
                keys.dedup();
                debug!("layer {layer}: {} candidate glyphs", keys.len());
                keys
            })
            .collect();

        let rows = grid.rows() / geometry.rows;
        let cols = grid.cols() / geometry.cols;
        let render_position = |idx: usize| {
            let (r, c) = (idx / cols, idx % cols);
            let mut block = RenderBlock::new(grid.block(
                r * geometry.rows,
                c * geometry.cols,
                geometry.rows,
                geometry.cols,
            ));
            for keys in &per_layer {
                block.step(self.library, keys, self.params.layer_factor, layout.blank());
            }
            block.into_history()
        };

        #[cfg(feature = "rayon")]
        let positions: Vec<Vec<LayerChoice>> =
            (0..rows * cols).into_par_iter().map(render_position).collect();
        #[cfg(not(feature = "rayon"))]
        let positions: Vec<Vec<LayerChoice>> = (0..rows * cols).map(render_position).collect();

        debug!(
            "rendered {rows}x{cols} positions over {} layers",
            self.params.layers
        );
        Ok(Selections {
            rows,
            cols,
            layers: self.params.layers,
            layout,
            positions,
        })
    }
}
