use crate::compose::{compose, ComposedText};
use crate::error::RenderError;
use crate::io::OverstrikeConfig;
use crate::job::PrintJob;
use crate::selector::{LayerSelector, Selections};
use log::info;
use overstrike_core::{extract_descriptors_blocked, NormalizedImageView};
use overstrike_glyphs::GlyphLibrary;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Extract descriptors from `image` and run layer selection.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(width = image.width, height = image.height))
)]
pub fn select_glyphs(
    image: &NormalizedImageView<'_>,
    library: &GlyphLibrary,
    config: &OverstrikeConfig,
) -> Result<Selections, RenderError> {
    let geometry = library.geometry();
    let grid = extract_descriptors_blocked(image, &config.hog, geometry.rows, geometry.cols)?;
    let selector = LayerSelector::new(library, config.render.clone())?;
    let selections = selector.render_with_policy(&grid, &config.candidates)?;
    info!(
        "selected glyphs for {}x{} characters, {} layer(s)",
        selections.rows(),
        selections.cols(),
        selections.layers()
    );
    Ok(selections)
}

/// Image to composed overstrike text.
pub fn render_text(
    image: &NormalizedImageView<'_>,
    library: &GlyphLibrary,
    config: &OverstrikeConfig,
) -> Result<ComposedText, RenderError> {
    let selections = select_glyphs(image, library, config)?;
    Ok(compose(&selections, &config.compose))
}

/// Image to a framed print job, ready to be written out.
pub fn render_job(
    image: &NormalizedImageView<'_>,
    library: &GlyphLibrary,
    config: &OverstrikeConfig,
) -> Result<PrintJob, RenderError> {
    let text = render_text(image, library, config)?;
    Ok(PrintJob::new(text, config.job.clone()))
}
