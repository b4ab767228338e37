//! Image decoding and conditioning ahead of descriptor extraction.
//!
//! Turns an arbitrary decoded image into a [`NormalizedImage`] whose size is
//! a whole number of glyph blocks:
//!
//! 1. luma with alpha blended over white,
//! 2. resize to `width` characters, keeping the aspect of the printed page,
//! 3. min/max stretch measured on a one-pixel-per-character thumbnail,
//! 4. gamma, then optional inversion,
//! 5. padding at the bottom up to the next block boundary by repeating the
//!    last row.

use crate::core::{ImageError, NormalizedImage};
use crate::glyphs::GlyphGeometry;
use ::image::imageops::{self, FilterType};
use ::image::{DynamicImage, ImageBuffer, ImageReader, Luma};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// 16-bit luma keeps resampling of flat regions exactly flat.
type Gray16 = ImageBuffer<Luma<u16>, Vec<u16>>;

const U16_MAX: f32 = u16::MAX as f32;

#[derive(thiserror::Error, Debug)]
pub enum PrepareError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] ::image::ImageError),
    #[error("image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("invalid preparation parameters: {0}")]
    InvalidParams(&'static str),
    #[error(transparent)]
    Normalize(#[from] ImageError),
}

/// How an input picture is conditioned before rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareParams {
    /// Output width in characters.
    pub width: usize,
    /// Exponent applied to every intensity after stretching.
    pub gamma: f32,
    /// Use `1 - v` instead of `v`.
    pub invert: bool,
    /// Stretch intensities to the full `[0, 1]` range.
    pub stretch: bool,
}

impl Default for PrepareParams {
    fn default() -> Self {
        Self {
            width: 66,
            gamma: 1.0,
            invert: false,
            stretch: true,
        }
    }
}

/// Decode `path` and prepare it.
pub fn load_image(
    path: impl AsRef<Path>,
    params: &PrepareParams,
    cell_px: usize,
    geometry: GlyphGeometry,
) -> Result<NormalizedImage, PrepareError> {
    let img = ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .decode()?;
    prepare_image(&img, params, cell_px, geometry)
}

/// Condition a decoded image for rendering with `cell_px` pixel cells and
/// `geometry` cells per glyph.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn prepare_image(
    img: &DynamicImage,
    params: &PrepareParams,
    cell_px: usize,
    geometry: GlyphGeometry,
) -> Result<NormalizedImage, PrepareError> {
    if params.width == 0 {
        return Err(PrepareError::InvalidParams("width must be positive"));
    }
    if !(params.gamma.is_finite() && params.gamma > 0.0) {
        return Err(PrepareError::InvalidParams("gamma must be positive"));
    }
    if cell_px == 0 || geometry.rows == 0 || geometry.cols == 0 {
        return Err(PrepareError::InvalidParams("cell geometry must be positive"));
    }
    let (src_w, src_h) = (img.width(), img.height());
    if src_w == 0 || src_h == 0 {
        return Err(PrepareError::Empty {
            width: src_w,
            height: src_h,
        });
    }

    let gray = blend_over_white(img);

    let width_px = params.width * geometry.cols * cell_px;
    let height_px =
        ((src_h as usize * width_px * geometry.cols) / (geometry.rows * src_w as usize)).max(1);
    let resized = imageops::resize(&gray, width_px as u32, height_px as u32, FilterType::Triangle);
    debug!("prepare: {src_w}x{src_h} -> {width_px}x{height_px} px");

    let (lo, span) = if params.stretch {
        intensity_range(&resized, params.width)
    } else {
        (0.0, 1.0)
    };

    let block_h = geometry.rows * cell_px;
    let padded_h = height_px.div_ceil(block_h) * block_h;
    let mut data: Vec<f32> = resized
        .as_raw()
        .iter()
        .map(|&v| {
            let v = ((v as f32 / U16_MAX - lo) / span)
                .clamp(0.0, 1.0)
                .powf(params.gamma);
            if params.invert {
                1.0 - v
            } else {
                v
            }
        })
        .collect();
    // Replicate the last row so the padding adds no gradient.
    let last_row = data.len() - width_px;
    for _ in height_px..padded_h {
        data.extend_from_within(last_row..last_row + width_px);
    }
    Ok(NormalizedImage::new(width_px, padded_h, data)?)
}

fn blend_over_white(img: &DynamicImage) -> Gray16 {
    let la = img.to_luma_alpha32f();
    ImageBuffer::from_fn(la.width(), la.height(), |x, y| {
        let [l, a] = la.get_pixel(x, y).0;
        let v = (l * a + (1.0 - a)).clamp(0.0, 1.0);
        Luma([(v * U16_MAX).round() as u16])
    })
}

/// `(min, max - min)` of a thumbnail one pixel per character wide. A flat
/// image yields `(0, 1)`, which leaves intensities untouched.
fn intensity_range(img: &Gray16, chars: usize) -> (f32, f32) {
    let small_w = chars.min(img.width() as usize).max(1) as u32;
    let small_h = ((img.height() as u64 * small_w as u64) / img.width() as u64).max(1) as u32;
    let small = imageops::resize(img, small_w, small_h, FilterType::Triangle);
    let (lo, hi) = small
        .as_raw()
        .iter()
        .map(|&v| v as f32 / U16_MAX)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if hi - lo > 1e-6 {
        (lo, hi - lo)
    } else {
        (0.0, 1.0)
    }
}
