use std::path::Path;

use crate::error::{StillglowError, StillglowResult};

/// The decoded source still, owned by the pipeline for its whole lifetime.
///
/// Pixels are RGB8, tightly packed, row-major. The raster is immutable after construction.
#[derive(Clone, Debug)]
pub struct SourceImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SourceImage {
    /// Wrap an RGB8 buffer as a source image.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> StillglowResult<Self> {
        if width == 0 || height == 0 {
            return Err(StillglowError::input_image(
                "source image dimensions must be non-zero",
            ));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| StillglowError::input_image("source image size overflow"))?;
        if data.len() != expected {
            return Err(StillglowError::input_image(format!(
                "source buffer length {} does not match {width}x{height} rgb8",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`; callers must pass in-bounds coordinates.
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

/// Decode a source image from disk, once, before rendering begins.
///
/// A missing, unreadable, or zero-dimension input is fatal.
pub fn load_source_image(path: &Path) -> StillglowResult<SourceImage> {
    let decoded = image::open(path).map_err(|e| {
        StillglowError::input_image(format!("failed to decode '{}': {e}", path.display()))
    })?;
    let rgb = decoded.to_rgb8();
    SourceImage::from_rgb8(rgb.width(), rgb.height(), rgb.into_raw())
}
