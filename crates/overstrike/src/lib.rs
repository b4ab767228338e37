//! High-level facade for the `overstrike-*` workspace.
//!
//! This crate provides:
//! - re-exports of the extraction, glyph-table and rendering crates,
//! - (feature `image`) decoding and conditioning of input pictures, and an
//!   end-to-end helper from an image file to a framed print job,
//! - (feature `cli`) the `overstrike` command-line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use overstrike::glyphs::GlyphLibrary;
//! use overstrike::prepare::PrepareParams;
//! use overstrike::render::OverstrikeConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OverstrikeConfig::teletype();
//! let library = GlyphLibrary::load_json("chars.json", config.geometry)?;
//! let job = overstrike::render_image_file("cat.png", &library, &config, &PrepareParams::default())?;
//! job.write_to(std::io::stdout())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `overstrike::core`: images, descriptor grids, HOG extraction, logging.
//! - `overstrike::glyphs`: glyph keys, glyph tables, the library cache.
//! - `overstrike::render`: layer selection, composition, print jobs, config.
//! - `overstrike::prepare` (feature `image`): decoding and conditioning.

pub use overstrike_core as core;
pub use overstrike_glyphs as glyphs;
pub use overstrike_render as render;

pub use overstrike_glyphs::{GlyphKey, GlyphLibrary, LibraryCache};
pub use overstrike_render::{ComposedText, OverstrikeConfig, PrintJob};

#[cfg(feature = "image")]
pub mod prepare;

/// Errors produced by the facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum OverstrikeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] core::ImageError),
    #[error(transparent)]
    GlyphTable(#[from] glyphs::GlyphTableError),
    #[error(transparent)]
    Render(#[from] render::RenderError),
    #[error(transparent)]
    Config(#[from] render::ConfigIoError),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Prepare(#[from] prepare::PrepareError),
}

/// Decode, condition and render an image file into a print job.
#[cfg(feature = "image")]
pub fn render_image_file(
    path: impl AsRef<std::path::Path>,
    library: &GlyphLibrary,
    config: &OverstrikeConfig,
    params: &prepare::PrepareParams,
) -> Result<PrintJob, OverstrikeError> {
    let img = prepare::load_image(path, params, config.hog.cell_px, library.geometry())?;
    Ok(render::render_job(&img.view(), library, config)?)
}
