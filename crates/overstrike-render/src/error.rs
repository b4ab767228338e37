use overstrike_core::ExtractError;

/// Errors returned by the renderer.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RenderError {
    #[error("layers must be at least 1")]
    NoLayers,
    #[error("layer factor {0} outside [0, 1]")]
    LayerFactor(f32),
    #[error("descriptor grid has {grid} orientation bins, glyph table has {library}")]
    BinMismatch { grid: usize, library: usize },
    #[error("descriptor grid {rows}x{cols} cells is not a multiple of the {block_rows}x{block_cols} glyph block")]
    GridShape {
        rows: usize,
        cols: usize,
        block_rows: usize,
        block_cols: usize,
    },
    #[error(transparent)]
    Extract(#[from] ExtractError),
}
