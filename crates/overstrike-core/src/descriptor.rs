//! Per-cell gradient histograms and the grids/blocks built from them.
//!
//! All containers are flat, row-major `Vec<f32>` with the histogram bins as
//! the innermost axis: `index = (row * cols + col) * bins + bin`.

use serde::{Deserialize, Serialize};

/// Borrowed view of one pixel cell's descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellDescriptor<'a> {
    pub histogram: &'a [f32],
    /// Mean source intensity of the cell.
    pub luminance: f32,
}

/// Descriptors for every pixel cell of an image.
#[derive(Clone, Debug, PartialEq)]
pub struct DescriptorGrid {
    rows: usize,
    cols: usize,
    bins: usize,
    histograms: Vec<f32>,
    luminance: Vec<f32>,
}

impl DescriptorGrid {
    /// Assemble a grid from raw parts.
    ///
    /// Panics if the buffer lengths do not match `rows * cols (* bins)`.
    pub fn from_parts(
        rows: usize,
        cols: usize,
        bins: usize,
        histograms: Vec<f32>,
        luminance: Vec<f32>,
    ) -> Self {
        assert_eq!(histograms.len(), rows * cols * bins, "histogram buffer length");
        assert_eq!(luminance.len(), rows * cols, "luminance buffer length");
        Self {
            rows,
            cols,
            bins,
            histograms,
            luminance,
        }
    }

    /// Grid that repeats `block` across `block_rows × block_cols` character positions.
    pub fn tiled(block: &DescriptorBlock, block_rows: usize, block_cols: usize) -> Self {
        let rows = block.rows * block_rows;
        let cols = block.cols * block_cols;
        let bins = block.bins;
        let mut histograms = vec![0.0; rows * cols * bins];
        let mut luminance = vec![0.0; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                let src = block.cell(r % block.rows, c % block.cols);
                let dst = (r * cols + c) * bins;
                histograms[dst..dst + bins].copy_from_slice(src);
                luminance[r * cols + c] = mean(src);
            }
        }
        Self::from_parts(rows, cols, bins, histograms, luminance)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn cell(&self, row: usize, col: usize) -> CellDescriptor<'_> {
        let start = (row * self.cols + col) * self.bins;
        CellDescriptor {
            histogram: &self.histograms[start..start + self.bins],
            luminance: self.luminance[row * self.cols + col],
        }
    }

    pub fn histograms(&self) -> &[f32] {
        &self.histograms
    }

    /// Copy the `rows × cols` cell region starting at cell `(row0, col0)`.
    ///
    /// Panics if the region leaves the grid.
    pub fn block(&self, row0: usize, col0: usize, rows: usize, cols: usize) -> DescriptorBlock {
        assert!(
            row0 + rows <= self.rows && col0 + cols <= self.cols,
            "block ({row0},{col0})+({rows}x{cols}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        let mut data = Vec::with_capacity(rows * cols * self.bins);
        for r in row0..row0 + rows {
            let start = (r * self.cols + col0) * self.bins;
            data.extend_from_slice(&self.histograms[start..start + cols * self.bins]);
        }
        DescriptorBlock {
            rows,
            cols,
            bins: self.bins,
            data,
        }
    }
}

/// A `rows × cols × bins` stack of histograms covering one character cell.
///
/// Used both for glyph reference descriptors and for render residuals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DescriptorBlock {
    rows: usize,
    cols: usize,
    bins: usize,
    data: Vec<f32>,
}

impl DescriptorBlock {
    /// Returns `None` when `data.len() != rows * cols * bins`.
    pub fn new(rows: usize, cols: usize, bins: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == rows * cols * bins).then_some(Self {
            rows,
            cols,
            bins,
            data,
        })
    }

    pub fn zeros(rows: usize, cols: usize, bins: usize) -> Self {
        Self {
            rows,
            cols,
            bins,
            data: vec![0.0; rows * cols * bins],
        }
    }

    /// Every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, bins: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            bins,
            data: vec![value; rows * cols * bins],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn bins(&self) -> usize {
        self.bins
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.bins)
    }

    /// Flattened entries.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn cell(&self, row: usize, col: usize) -> &[f32] {
        let start = (row * self.cols + col) * self.bins;
        &self.data[start..start + self.bins]
    }

    /// Mean over every entry of the block (its "luminance").
    pub fn mean(&self) -> f32 {
        mean(&self.data)
    }

    /// Euclidean distance between the flattened blocks.
    ///
    /// Panics if the shapes differ.
    pub fn l2_distance(&self, other: &DescriptorBlock) -> f32 {
        assert_eq!(self.shape(), other.shape(), "descriptor block shapes differ");
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt()
    }

    /// `self -= scale * other`, then clamp every entry to `>= 0`.
    pub fn subtract_scaled_clamped(&mut self, other: &DescriptorBlock, scale: f32) {
        assert_eq!(self.shape(), other.shape(), "descriptor block shapes differ");
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a = (*a - scale * b).max(0.0);
        }
    }
}

#[inline]
pub(crate) fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}
