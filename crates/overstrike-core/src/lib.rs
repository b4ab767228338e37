//! Core types for overstrike text rendering.
//!
//! This crate owns the numeric side of the pipeline: normalized grayscale
//! rasters, descriptor grids and blocks, and the histogram-of-oriented-gradient
//! extractor that produces them. It does *not* know about glyphs, text
//! layout, or any concrete image codec.

mod descriptor;
mod hog;
mod image;
mod logger;

pub use descriptor::{CellDescriptor, DescriptorBlock, DescriptorGrid};
pub use hog::{extract_descriptors, extract_descriptors_blocked, ExtractError, HogParams, NormKind};
pub use image::{GrayImageView, ImageError, NormalizedImage, NormalizedImageView};

#[cfg(feature = "tracing")]
pub use logger::{init_tracing, LogFormat};

pub use logger::{filter_directives, init_with_level, level_from_verbosity};
