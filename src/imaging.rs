//! Image decoding and resampling collaborators.
//!
//! The environment only depends on the [`ImageDecoder`] and [`Resizer`]
//! traits; the `image`-crate backed implementations here are the defaults.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::io::Reader as ImageReader;
use image::{ImageBuffer, Luma, Rgb};

use crate::error::{EnvError, Result};
use crate::types::PixelArray;

/// Loads an image from disk as a normalized 3-channel [`PixelArray`].
///
/// Implementations must return values in `[0, 1]` and expand grayscale
/// sources to three identical channels.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<PixelArray>;
}

/// Resamples a [`PixelArray`] to a target `(height, width)`.
///
/// The interpolation kernel is up to the implementation; the channel count
/// and the exact target shape must be preserved.
pub trait Resizer: Send + Sync {
    fn resize(&self, array: &PixelArray, size: (usize, usize)) -> Result<PixelArray>;
}

/// Decoder backed by the `image` crate, sniffing the format from file contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<PixelArray> {
        let load_error = |reason: String| EnvError::SampleLoad {
            path: path.to_path_buf(),
            reason,
        };
        let decoded = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| load_error(e.to_string()))?
            .decode()
            .map_err(|e| load_error(e.to_string()))?;
        // to_rgb8 replicates luma into all three channels
        let rgb = decoded.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        PixelArray::from_u8(height, width, 3, rgb.as_raw())
    }
}

/// Resizer backed by [`image::imageops::resize`] on `f32` buffers.
#[derive(Debug, Clone, Copy)]
pub struct ImageResizer {
    filter: FilterType,
}

impl ImageResizer {
    /// Creates a resizer using the given resampling filter.
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Default for ImageResizer {
    /// Bilinear (`Triangle`) resampling.
    fn default() -> Self {
        Self::new(FilterType::Triangle)
    }
}

impl Resizer for ImageResizer {
    fn resize(&self, array: &PixelArray, size: (usize, usize)) -> Result<PixelArray> {
        let (height, width) = size;
        let channels = array.channels();
        if array.is_empty() || height == 0 || width == 0 {
            return Ok(PixelArray::zeros(height, width, channels));
        }

        let (src_w, src_h) = (array.width() as u32, array.height() as u32);
        let (dst_w, dst_h) = (width as u32, height as u32);
        let raw = array.as_slice().to_vec();

        let resized = match channels {
            3 => {
                let buf = ImageBuffer::<Rgb<f32>, Vec<f32>>::from_raw(src_w, src_h, raw)
                    .ok_or(EnvError::Shape {
                        expected: 3,
                        found: channels,
                    })?;
                imageops::resize(&buf, dst_w, dst_h, self.filter).into_raw()
            }
            1 => {
                let buf = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(src_w, src_h, raw)
                    .ok_or(EnvError::Shape {
                        expected: 1,
                        found: channels,
                    })?;
                imageops::resize(&buf, dst_w, dst_h, self.filter).into_raw()
            }
            other => {
                return Err(EnvError::Shape {
                    expected: 3,
                    found: other,
                })
            }
        };

        let mut out = PixelArray::from_raw(height, width, channels, resized)?;
        out.clamp_values(0.0, 1.0);
        Ok(out)
    }
}
