/// Borrowed 8-bit grayscale buffer, row-major, `len = width * height`.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

/// Borrowed intensity raster with values in `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct NormalizedImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f32], // row-major, len = w*h
}

/// Owned intensity raster with values in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedImage {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} values, got {got})")]
    BufferLength { expected: usize, got: usize },
    #[error("pixel {index} has intensity {value} outside [0, 1]")]
    OutOfRange { index: usize, value: f32 },
}

impl NormalizedImage {
    /// Wrap a row-major buffer, checking its length and value range.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ImageError> {
        let expected = width * height;
        if data.len() != expected {
            return Err(ImageError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        if let Some((index, &value)) = data
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v > 1.0)
        {
            return Err(ImageError::OutOfRange { index, value });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Constant-intensity image; `value` is clamped into `[0, 1]`.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value.clamp(0.0, 1.0); width * height],
        }
    }

    /// Convert an 8-bit buffer by dividing every sample by 255.
    pub fn from_gray(src: &GrayImageView<'_>) -> Result<Self, ImageError> {
        let expected = src.width * src.height;
        if src.data.len() != expected {
            return Err(ImageError::BufferLength {
                expected,
                got: src.data.len(),
            });
        }
        Ok(Self {
            width: src.width,
            height: src.height,
            data: src.data.iter().map(|&v| v as f32 / 255.0).collect(),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn view(&self) -> NormalizedImageView<'_> {
        NormalizedImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

impl NormalizedImageView<'_> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}
