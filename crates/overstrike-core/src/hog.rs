//! Histogram-of-oriented-gradients extraction with per-cell luminance scaling.
//!
//! Each non-overlapping `cell_px × cell_px` pixel cell yields one histogram of
//! unsigned gradient orientations on `[0°, 180°)`. The histogram is block
//! normalized (1×1 blocks) and then rescaled so that its mean equals the mean
//! intensity of the source cell. The rescaling makes histogram magnitude a
//! proxy for "ink", which is what the glyph matcher subtracts layer by layer.

use crate::descriptor::{mean, DescriptorGrid};
use crate::image::NormalizedImageView;
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

const L1_EPS: f32 = 1e-5;
const L2_EPS_SQ: f32 = 1e-10;
const L2_HYS_CLIP: f32 = 0.2;

/// Block normalization applied to each cell histogram.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormKind {
    /// `h / (Σ|h| + ε)`.
    L1,
    /// L2 normalization, clipping at 0.2, then L2 again.
    #[default]
    L2Hys,
}

/// Parameters of the feature extractor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HogParams {
    /// Side length of a square pixel cell.
    pub cell_px: usize,
    /// Number of orientation bins on `[0°, 180°)`.
    pub orientations: usize,
    pub norm: NormKind,
    /// Intensity added to the 2×2 centre pixels of every cell before
    /// gradients are taken. Zero disables it.
    pub center_seed: f32,
}

impl Default for HogParams {
    fn default() -> Self {
        Self {
            cell_px: 16,
            orientations: 8,
            norm: NormKind::L2Hys,
            center_seed: 0.0,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExtractError {
    #[error(
        "image {width}x{height} is not a multiple of the {multiple_x}x{multiple_y} px cell geometry"
    )]
    Precondition {
        width: usize,
        height: usize,
        multiple_x: usize,
        multiple_y: usize,
    },
    #[error("invalid extractor parameters: {0}")]
    InvalidParams(&'static str),
}

/// Extract the descriptor grid of `image`.
///
/// `image` dimensions must be exact multiples of `params.cell_px`; padding is
/// the caller's job.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image, params), fields(width = image.width, height = image.height))
)]
pub fn extract_descriptors(
    image: &NormalizedImageView<'_>,
    params: &HogParams,
) -> Result<DescriptorGrid, ExtractError> {
    extract_descriptors_blocked(image, params, 1, 1)
}

/// Like [`extract_descriptors`], but additionally requires the image to
/// contain a whole number of `block_rows × block_cols` cell blocks.
pub fn extract_descriptors_blocked(
    image: &NormalizedImageView<'_>,
    params: &HogParams,
    block_rows: usize,
    block_cols: usize,
) -> Result<DescriptorGrid, ExtractError> {
    if params.cell_px == 0 {
        return Err(ExtractError::InvalidParams("cell_px must be positive"));
    }
    if params.orientations == 0 {
        return Err(ExtractError::InvalidParams("orientations must be positive"));
    }
    if block_rows == 0 || block_cols == 0 {
        return Err(ExtractError::InvalidParams("block size must be positive"));
    }

    let multiple_x = params.cell_px * block_cols;
    let multiple_y = params.cell_px * block_rows;
    if image.width == 0
        || image.height == 0
        || image.width % multiple_x != 0
        || image.height % multiple_y != 0
    {
        return Err(ExtractError::Precondition {
            width: image.width,
            height: image.height,
            multiple_x,
            multiple_y,
        });
    }

    let rows = image.height / params.cell_px;
    let cols = image.width / params.cell_px;
    let bins = params.orientations;
    debug!(
        "hog: {}x{} px -> {rows}x{cols} cells, {bins} bins, {:?}",
        image.width, image.height, params.norm
    );

    let px = SeededPixels::new(image, params);
    let mut histograms = vec![0.0f32; rows * cols * bins];
    let mut luminance = vec![0.0f32; rows * cols];
    let area = (params.cell_px * params.cell_px) as f32;
    let bin_width = 180.0 / bins as f32;

    for cy in 0..rows {
        for cx in 0..cols {
            let idx = cy * cols + cx;
            let hist = &mut histograms[idx * bins..(idx + 1) * bins];
            let mut lum_sum = 0.0f32;

            for y in cy * params.cell_px..(cy + 1) * params.cell_px {
                for x in cx * params.cell_px..(cx + 1) * params.cell_px {
                    lum_sum += px.get(x, y);
                    let (g_row, g_col) = px.gradient(x, y);
                    let magnitude = g_row.hypot(g_col);
                    if magnitude == 0.0 {
                        continue;
                    }
                    let bin = orientation_bin(g_row, g_col, bin_width, bins);
                    hist[bin] += magnitude;
                }
            }

            for v in hist.iter_mut() {
                *v /= area;
            }
            normalize(hist, params.norm);

            let lum = lum_sum / area;
            let scale = lum / (mean(hist) + f32::EPSILON);
            for v in hist.iter_mut() {
                *v *= scale;
            }
            luminance[idx] = lum;
        }
    }

    Ok(DescriptorGrid::from_parts(
        rows, cols, bins, histograms, luminance,
    ))
}

/// Pixel access with the optional centre seed applied on the fly, so the
/// caller's image is never modified.
struct SeededPixels<'a> {
    image: &'a NormalizedImageView<'a>,
    cell_px: usize,
    seed: f32,
}

impl<'a> SeededPixels<'a> {
    fn new(image: &'a NormalizedImageView<'a>, params: &HogParams) -> Self {
        Self {
            image,
            cell_px: params.cell_px,
            seed: params.center_seed.max(0.0),
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> f32 {
        let v = self.image.get(x, y);
        if self.seed == 0.0 {
            return v;
        }
        let half = self.cell_px / 2;
        let in_centre = |p: usize| {
            let off = p % self.cell_px;
            off == half || off == half + 1
        };
        if in_centre(x) && in_centre(y) {
            v + self.seed
        } else {
            v
        }
    }

    /// Central differences `(d/drow, d/dcol)`; zero on the outer pixel ring.
    #[inline]
    fn gradient(&self, x: usize, y: usize) -> (f32, f32) {
        let w = self.image.width;
        let h = self.image.height;
        let g_row = if y == 0 || y + 1 >= h {
            0.0
        } else {
            self.get(x, y + 1) - self.get(x, y - 1)
        };
        let g_col = if x == 0 || x + 1 >= w {
            0.0
        } else {
            self.get(x + 1, y) - self.get(x - 1, y)
        };
        (g_row, g_col)
    }
}

#[inline]
fn orientation_bin(g_row: f32, g_col: f32, bin_width: f32, bins: usize) -> usize {
    let mut deg = g_row.atan2(g_col).to_degrees() % 180.0;
    if deg < 0.0 {
        deg += 180.0;
    }
    ((deg / bin_width) as usize).min(bins - 1)
}

fn normalize(hist: &mut [f32], kind: NormKind) {
    match kind {
        NormKind::L1 => {
            let denom = hist.iter().map(|v| v.abs()).sum::<f32>() + L1_EPS;
            for v in hist.iter_mut() {
                *v /= denom;
            }
        }
        NormKind::L2Hys => {
            l2_normalize(hist);
            for v in hist.iter_mut() {
                *v = v.min(L2_HYS_CLIP);
            }
            l2_normalize(hist);
        }
    }
}

#[inline]
fn l2_normalize(hist: &mut [f32]) {
    let denom = (hist.iter().map(|v| v * v).sum::<f32>() + L2_EPS_SQ).sqrt();
    for v in hist.iter_mut() {
        *v /= denom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::NormalizedImage;
    use approx::assert_relative_eq;

    /// Left half black, right half white.
    fn vertical_edge(width: usize, height: usize) -> NormalizedImage {
        let data = (0..width * height)
            .map(|i| if i % width >= width / 2 { 1.0 } else { 0.0 })
            .collect();
        NormalizedImage::new(width, height, data).expect("valid image")
    }

    #[test]
    fn rejects_non_multiple_dimensions() {
        let img = NormalizedImage::filled(20, 16, 0.5);
        let err = extract_descriptors(&img.view(), &HogParams::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::Precondition {
                width: 20,
                height: 16,
                multiple_x: 16,
                multiple_y: 16,
            }
        );
    }

    #[test]
    fn blocked_extraction_checks_block_geometry() {
        let img = NormalizedImage::filled(48, 48, 0.5);
        let params = HogParams::default();
        assert!(extract_descriptors(&img.view(), &params).is_ok());
        let err = extract_descriptors_blocked(&img.view(), &params, 4, 3).unwrap_err();
        assert!(matches!(err, ExtractError::Precondition { .. }));
    }

    #[test]
    fn rejects_zero_cell_size() {
        let img = NormalizedImage::filled(16, 16, 0.5);
        let params = HogParams {
            cell_px: 0,
            ..HogParams::default()
        };
        assert!(matches!(
            extract_descriptors(&img.view(), &params),
            Err(ExtractError::InvalidParams(_))
        ));
    }

    #[test]
    fn uniform_image_has_zero_histograms() {
        for norm in [NormKind::L1, NormKind::L2Hys] {
            let img = NormalizedImage::filled(32, 48, 1.0);
            let params = HogParams {
                norm,
                ..HogParams::default()
            };
            let grid = extract_descriptors(&img.view(), &params).expect("extract");
            assert_eq!((grid.rows(), grid.cols(), grid.bins()), (3, 2, 8));
            assert!(grid.histograms().iter().all(|&v| v == 0.0));
            assert_relative_eq!(grid.cell(1, 1).luminance, 1.0);
        }
    }

    #[test]
    fn vertical_edge_lands_in_first_bin() {
        let img = vertical_edge(32, 16);
        let params = HogParams {
            norm: NormKind::L1,
            ..HogParams::default()
        };
        let grid = extract_descriptors(&img.view(), &params).expect("extract");

        // The dark cell has zero luminance and therefore zero histogram.
        assert!(grid.cell(0, 0).histogram.iter().all(|&v| v == 0.0));

        let bright = grid.cell(0, 1);
        assert_relative_eq!(bright.luminance, 1.0);
        assert!(bright.histogram[0] > 0.0);
        assert!(bright.histogram[1..].iter().all(|&v| v == 0.0));
        // Luminance normalization: histogram mean equals the cell luminance.
        assert_relative_eq!(mean(bright.histogram), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn l2_hys_spreads_clipped_energy() {
        let mut hist = [4.0, 1.0, 0.0, 0.0];
        normalize(&mut hist, NormKind::L2Hys);
        // After clipping, both non-zero bins sit at the clip value and the
        // second L2 pass equalizes them.
        assert_relative_eq!(hist[0], hist[1], epsilon = 1e-5);
        assert_relative_eq!(hist[0], std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-4);
    }

    #[test]
    fn center_seed_breaks_flat_regions() {
        let img = NormalizedImage::filled(16, 16, 0.5);
        let params = HogParams {
            center_seed: 0.001,
            ..HogParams::default()
        };
        let grid = extract_descriptors(&img.view(), &params).expect("extract");
        let cell = grid.cell(0, 0);
        assert!(cell.histogram.iter().any(|&v| v > 0.0));
        // The caller's pixels stay untouched.
        assert!(img.data().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn orientation_bins_cover_half_circle() {
        let w = 180.0 / 8.0;
        assert_eq!(orientation_bin(0.0, 1.0, w, 8), 0);
        assert_eq!(orientation_bin(1.0, 0.0, w, 8), 4);
        assert_eq!(orientation_bin(0.0, -1.0, w, 8), 0);
        assert_eq!(orientation_bin(-1.0, 1.0, w, 8), 6);
    }
}
