//! Glimpse geometry: focus → crop rectangle → padded crop → observation.
//!
//! A focus is expressed relative to the image center and normalized by half
//! of the longer image side, so `(y, x) = (0, 0)` with `zoom = 0` frames the
//! whole image inside a square window of side `max(height, width)`. The
//! resulting rectangle may reach past any image edge; missing pixels are
//! zero-filled rather than clamped, so the observation always shows exactly
//! the requested window.

use std::fmt;

use crate::config::GlimpseConfig;
use crate::error::{EnvError, Result};
use crate::imaging::Resizer;
use crate::types::{Focus, Observation, PixelArray};

/// Absolute crop window in source pixel coordinates, half-open on the max side.
///
/// Bounds may be negative or exceed the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    pub y_min: i64,
    pub y_max: i64,
    pub x_min: i64,
    pub x_max: i64,
}

/// Zero rows/columns needed on each side to cover a [`CropRect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Padding {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl CropRect {
    /// Rows covered, `0` for an inverted rectangle.
    pub fn height(&self) -> usize {
        self.y_max.saturating_sub(self.y_min).max(0) as usize
    }

    /// Columns covered, `0` for an inverted rectangle.
    pub fn width(&self) -> usize {
        self.x_max.saturating_sub(self.x_min).max(0) as usize
    }

    /// Padding required against an image of the given shape.
    ///
    /// Saturates for rectangles near the `i64` limits.
    pub fn padding(&self, height: usize, width: usize) -> Padding {
        let (h, w) = (height as i64, width as i64);
        Padding {
            top: 0i64.saturating_sub(self.y_min).max(0) as usize,
            bottom: self.y_max.saturating_sub(h).max(0) as usize,
            left: 0i64.saturating_sub(self.x_min).max(0) as usize,
            right: self.x_max.saturating_sub(w).max(0) as usize,
        }
    }

    /// Intersection with `[0, height) × [0, width)`, `None` if empty.
    pub fn clamped(&self, height: usize, width: usize) -> Option<CropRect> {
        let clamped = CropRect {
            y_min: self.y_min.max(0),
            y_max: self.y_max.min(height as i64),
            x_min: self.x_min.max(0),
            x_max: self.x_max.min(width as i64),
        };
        (clamped.y_max > clamped.y_min && clamped.x_max > clamped.x_min).then_some(clamped)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) x [{}, {})",
            self.y_min, self.y_max, self.x_min, self.x_max
        )
    }
}

/// Maps a focus onto absolute pixel bounds for an image of `(height, width)`.
///
/// The window side interpolates linearly from the longer image side at
/// `zoom = 0` to `glimpse_size` at `zoom = 1`. Centers and bounds are
/// truncated toward zero. Focus values are never clamped.
pub fn compute_crop_rectangle(focus: Focus, shape: (usize, usize), glimpse_size: usize) -> CropRect {
    let (height, width) = (shape.0 as f64, shape.1 as f64);
    let longer_side = height.max(width);

    let center_y = (focus.y * (longer_side / 2.0) + height / 2.0) as i64 as f64;
    let center_x = (focus.x * (longer_side / 2.0) + width / 2.0) as i64 as f64;

    let attention_size = focus.zoom * glimpse_size as f64 + (1.0 - focus.zoom) * longer_side;
    let s = attention_size / 2.0;

    CropRect {
        y_min: (center_y - s) as i64,
        y_max: (center_y + s) as i64,
        x_min: (center_x - s) as i64,
        x_max: (center_x + s) as i64,
    }
}

/// Crops `rect` out of `image`, zero-filling whatever lies off the image.
///
/// The result is always `rect.height() × rect.width()` with the image's
/// channel count.
pub fn pad_crop(image: &PixelArray, rect: &CropRect) -> PixelArray {
    let channels = image.channels();
    let mut out = PixelArray::zeros(rect.height(), rect.width(), channels);

    let Some(inside) = rect.clamped(image.height(), image.width()) else {
        return out;
    };
    let pad = rect.padding(image.height(), image.width());
    copy_region(image, &inside, &mut out, (pad.top, pad.left));
    out
}

/// Copies the in-image rectangle `src` into `dst` starting at `offset`.
fn copy_region(image: &PixelArray, src: &CropRect, dst: &mut PixelArray, offset: (usize, usize)) {
    let channels = image.channels();
    for (dy, sy) in (src.y_min..src.y_max).enumerate() {
        for (dx, sx) in (src.x_min..src.x_max).enumerate() {
            for c in 0..channels {
                let value = image.get(sy as usize, sx as usize, c);
                dst.set(offset.0 + dy, offset.1 + dx, c, value);
            }
        }
    }
}

/// Windows wider than this multiple of the longer image side (or the glimpse
/// size) skip the padded crop and resample only their visible part.
const PADDED_SIDE_FACTOR: usize = 4;

/// Stateless producer of glimpse observations.
pub struct GeometryEngine {
    glimpse_size: usize,
    resizer: Box<dyn Resizer>,
}

impl GeometryEngine {
    /// Creates an engine emitting `glimpse_size × glimpse_size × 3` patches.
    pub fn new(glimpse_size: usize, resizer: Box<dyn Resizer>) -> Result<Self> {
        if glimpse_size == 0 {
            return Err(EnvError::Configuration(
                "glimpse_size must be positive".into(),
            ));
        }
        Ok(Self {
            glimpse_size,
            resizer,
        })
    }

    pub fn glimpse_size(&self) -> usize {
        self.glimpse_size
    }

    /// Crop rectangle for `focus` over an image of `(height, width)`.
    pub fn crop_rectangle(&self, focus: Focus, shape: (usize, usize)) -> CropRect {
        compute_crop_rectangle(focus, shape, self.glimpse_size)
    }

    /// Produces the observation for `focus` over `image`.
    ///
    /// `image` must hold three channels in `[0, 1]` (decoders divide 8-bit
    /// samples by 255). The padded crop is resampled to the glimpse size and
    /// clamped back into `[0, 1]`.
    pub fn extract_observation(&self, image: &PixelArray, focus: Focus) -> Result<Observation> {
        if image.channels() != GlimpseConfig::CHANNELS {
            return Err(EnvError::Shape {
                expected: GlimpseConfig::CHANNELS,
                found: image.channels(),
            });
        }

        let shape = (image.height(), image.width());
        let rect = self.crop_rectangle(focus, shape);
        let size = self.glimpse_size;
        if rect.height() == 0 || rect.width() == 0 {
            return Ok(PixelArray::zeros(size, size, GlimpseConfig::CHANNELS));
        }

        let mut observation = if self.fits_padded(&rect, shape) {
            let padded = pad_crop(image, &rect);
            self.resample(&padded, (size, size))?
        } else {
            self.resample_visible(image, &rect)?
        };
        observation.clamp_values(0.0, 1.0);
        Ok(observation)
    }

    /// Whether `rect` is small enough to materialize at source resolution.
    ///
    /// Any zoom in `[0, 1]` qualifies.
    fn fits_padded(&self, rect: &CropRect, shape: (usize, usize)) -> bool {
        let limit = shape.0.max(shape.1).max(self.glimpse_size).saturating_mul(PADDED_SIDE_FACTOR);
        rect.height() <= limit && rect.width() <= limit
    }

    /// Resamples only the in-image part of `rect` into its share of the glimpse.
    ///
    /// Used for windows far larger than the image, where the zero border
    /// would dominate a padded crop.
    fn resample_visible(&self, image: &PixelArray, rect: &CropRect) -> Result<Observation> {
        let size = self.glimpse_size;
        let mut observation = PixelArray::zeros(size, size, GlimpseConfig::CHANNELS);
        let Some(inside) = rect.clamped(image.height(), image.width()) else {
            return Ok(observation);
        };
        let pad = rect.padding(image.height(), image.width());

        // f64 sums: the padding alone may saturate near usize::MAX
        let span = |lead: usize, extent: usize, trail: usize| {
            let (lead, extent) = (lead as f64, extent as f64);
            let scale = size as f64 / (lead + extent + trail as f64);
            let start = ((lead * scale).round() as usize).min(size);
            let end = (((lead + extent) * scale).round() as usize).min(size);
            (start, end)
        };
        let (y0, y1) = span(pad.top, inside.height(), pad.bottom);
        let (x0, x1) = span(pad.left, inside.width(), pad.right);
        if y1 <= y0 || x1 <= x0 {
            return Ok(observation);
        }

        let visible = pad_crop(image, &inside);
        let patch = self.resample(&visible, (y1 - y0, x1 - x0))?;
        let whole = CropRect {
            y_min: 0,
            y_max: patch.height() as i64,
            x_min: 0,
            x_max: patch.width() as i64,
        };
        copy_region(&patch, &whole, &mut observation, (y0, x0));
        Ok(observation)
    }

    fn resample(&self, array: &PixelArray, size: (usize, usize)) -> Result<PixelArray> {
        let out = self.resizer.resize(array, size)?;
        if out.shape() != (size.0, size.1, GlimpseConfig::CHANNELS) {
            return Err(EnvError::Shape {
                expected: GlimpseConfig::CHANNELS,
                found: out.channels(),
            });
        }
        Ok(out)
    }
}

impl fmt::Debug for GeometryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryEngine")
            .field("glimpse_size", &self.glimpse_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ImageResizer;

    fn engine(glimpse_size: usize) -> GeometryEngine {
        GeometryEngine::new(glimpse_size, Box::new(ImageResizer::default())).unwrap()
    }

    fn filled(height: usize, width: usize, value: f32) -> PixelArray {
        PixelArray::from_raw(height, width, 3, vec![value; height * width * 3]).unwrap()
    }

    fn gradient(height: usize, width: usize) -> PixelArray {
        let mut img = PixelArray::zeros(height, width, 3);
        for y in 0..height {
            for x in 0..width {
                img.set(y, x, 0, y as f32 / height as f32);
                img.set(y, x, 1, x as f32 / width as f32);
                img.set(y, x, 2, 0.5);
            }
        }
        img
    }

    #[test]
    fn centered_zoom_out_covers_square_image() {
        let rect = compute_crop_rectangle(Focus::centered(), (100, 100), 32);
        assert_eq!(
            rect,
            CropRect {
                y_min: 0,
                y_max: 100,
                x_min: 0,
                x_max: 100
            }
        );
        assert!(rect.padding(100, 100).is_zero());
    }

    #[test]
    fn centered_zoom_out_pads_short_axis() {
        let rect = compute_crop_rectangle(Focus::centered(), (50, 100), 32);
        assert_eq!((rect.y_min, rect.y_max), (-25, 75));
        assert_eq!((rect.x_min, rect.x_max), (0, 100));
        let pad = rect.padding(50, 100);
        assert_eq!((pad.top, pad.bottom, pad.left, pad.right), (25, 25, 0, 0));
    }

    #[test]
    fn full_zoom_is_glimpse_sized() {
        let rect = compute_crop_rectangle(Focus::new(0.0, 0.0, 1.0), (200, 120), 32);
        assert_eq!(rect.height(), 32);
        assert_eq!(rect.width(), 32);
        assert_eq!((rect.y_min, rect.x_min), (84, 44));
    }

    #[test]
    fn zoom_shrinks_window_monotonically() {
        let mut previous = usize::MAX;
        for step in 0..=10 {
            let zoom = step as f64 / 10.0;
            let rect = compute_crop_rectangle(Focus::new(0.2, -0.3, zoom), (240, 320), 24);
            assert!(rect.height() <= previous);
            previous = rect.height();
            if step == 0 {
                assert_eq!(rect.height(), 320);
            }
        }
        assert_eq!(previous, 24);
    }

    #[test]
    fn centers_truncate_toward_zero() {
        // center_y = -1.5 * 2.5 + 2.5 = -1.25 -> -1; s = 1.5
        let rect = compute_crop_rectangle(Focus::new(-1.5, 0.0, 1.0), (5, 5), 3);
        assert_eq!(rect.y_min, -2);
        assert_eq!(rect.y_max, 0);
        assert_eq!((rect.x_min, rect.x_max), (0, 3));
    }

    #[test]
    fn out_of_range_focus_is_not_clamped() {
        let rect = compute_crop_rectangle(Focus::new(3.0, -3.0, 1.0), (100, 100), 10);
        assert_eq!((rect.y_min, rect.y_max), (195, 205));
        assert_eq!((rect.x_min, rect.x_max), (-105, -95));
    }

    #[test]
    fn bottom_right_glimpse_zero_pads_before_resize() {
        let image = filled(100, 100, 1.0);
        let rect = compute_crop_rectangle(Focus::new(1.0, 1.0, 1.0), (100, 100), 32);
        assert_eq!(rect, CropRect { y_min: 84, y_max: 116, x_min: 84, x_max: 116 });
        let pad = rect.padding(100, 100);
        assert_eq!((pad.bottom, pad.right), (16, 16));

        let padded = pad_crop(&image, &rect);
        assert_eq!(padded.shape(), (32, 32, 3));
        for y in 0..32 {
            for x in 0..32 {
                let expected = if y < 16 && x < 16 { 1.0 } else { 0.0 };
                for c in 0..3 {
                    assert_eq!(padded.get(y, x, c), expected);
                }
            }
        }
    }

    #[test]
    fn pad_crop_copies_interior_pixels() {
        let image = gradient(10, 10);
        let rect = CropRect { y_min: 2, y_max: 5, x_min: 3, x_max: 7 };
        let crop = pad_crop(&image, &rect);
        assert_eq!(crop.shape(), (3, 4, 3));
        assert_eq!(crop.get(0, 0, 0), image.get(2, 3, 0));
        assert_eq!(crop.get(2, 3, 1), image.get(4, 6, 1));
    }

    #[test]
    fn wholly_off_image_window_is_black() {
        let obs = engine(16)
            .extract_observation(&filled(40, 60, 0.8), Focus::new(5.0, 5.0, 1.0))
            .unwrap();
        assert_eq!(obs.shape(), (16, 16, 3));
        assert!(obs.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn inverted_window_yields_black_glimpse() {
        // attention size = 2 * 10 - 1 * 100 < 0
        let obs = engine(10)
            .extract_observation(&filled(100, 100, 1.0), Focus::new(0.0, 0.0, 2.0))
            .unwrap();
        assert_eq!(obs.shape(), (10, 10, 3));
        assert!(obs.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn observation_shape_and_range_hold_for_any_focus() {
        let image = gradient(37, 53);
        let focuses = [
            Focus::centered(),
            Focus::new(1.0, 1.0, 1.0),
            Focus::new(-1.0, -1.0, 0.0),
            Focus::new(0.5, -0.75, 0.5),
            Focus::new(-1.0, 1.0, 1.0),
            Focus::new(0.0, 0.0, 1.0),
            Focus::new(1.7, -2.2, 0.3),
        ];
        for glimpse in [1, 8, 32] {
            let engine = engine(glimpse);
            for focus in focuses {
                let obs = engine.extract_observation(&image, focus).unwrap();
                assert_eq!(obs.shape(), (glimpse, glimpse, 3), "focus {focus}");
                assert!(obs.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
            }
        }
    }

    #[test]
    fn extraction_is_idempotent() {
        let engine = engine(12);
        let image = gradient(30, 45);
        let focus = Focus::new(0.3, -0.6, 0.4);
        let a = engine.extract_observation(&image, focus).unwrap();
        let b = engine.extract_observation(&image, focus).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_rgb_image_is_shape_error() {
        let gray = PixelArray::zeros(20, 20, 1);
        assert_eq!(
            engine(8).extract_observation(&gray, Focus::centered()),
            Err(EnvError::Shape { expected: 3, found: 1 })
        );
    }

    #[test]
    fn extreme_zoom_saturates_instead_of_overflowing() {
        let rect = compute_crop_rectangle(Focus::new(0.0, 0.0, -1e30), (40, 40), 8);
        assert_eq!((rect.y_min, rect.y_max), (i64::MIN, i64::MAX));
        assert_eq!(rect.height(), i64::MAX as usize);
        let pad = rect.padding(40, 40);
        assert_eq!(pad.top, i64::MAX as usize);
        assert_eq!(pad.right, (i64::MAX - 40) as usize);

        let obs = engine(8)
            .extract_observation(&filled(40, 40, 0.7), Focus::new(0.0, 0.0, -1e30))
            .unwrap();
        assert_eq!(obs.shape(), (8, 8, 3));
        assert!(obs.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn large_negative_zoom_shrinks_image_to_center() {
        // side = -20 * 32 + 21 * 1000 = 20360, far beyond the padded limit
        let engine = engine(32);
        let image = filled(1000, 1000, 1.0);
        let rect = engine.crop_rectangle(Focus::new(0.0, 0.0, -20.0), (1000, 1000));
        assert_eq!(rect.height(), 20360);

        let obs = engine
            .extract_observation(&image, Focus::new(0.0, 0.0, -20.0))
            .unwrap();
        assert_eq!(obs.shape(), (32, 32, 3));
        // the image covers 1000/20360 of the window: a 2x2 block in the middle
        let lit: Vec<(usize, usize)> = (0..32)
            .flat_map(|y| (0..32).map(move |x| (y, x)))
            .filter(|&(y, x)| obs.get(y, x, 0) > 0.0)
            .collect();
        assert_eq!(lit, vec![(15, 15), (15, 16), (16, 15), (16, 16)]);
        assert!((obs.get(15, 15, 1) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn moderate_negative_zoom_still_pads_at_source_resolution() {
        // side = -1 * 10 + 2 * 20 = 30, within the padded limit
        let engine = engine(10);
        let image = filled(20, 20, 1.0);
        let rect = engine.crop_rectangle(Focus::new(0.0, 0.0, -1.0), (20, 20));
        assert_eq!(rect, CropRect { y_min: -5, y_max: 25, x_min: -5, x_max: 25 });

        let obs = engine
            .extract_observation(&image, Focus::new(0.0, 0.0, -1.0))
            .unwrap();
        let expected = engine
            .resample(&pad_crop(&image, &rect), (10, 10))
            .unwrap();
        assert_eq!(obs, expected);
        assert!(obs.mean() > 0.0 && obs.mean() < 1.0);
    }

    #[test]
    fn zero_glimpse_size_is_rejected() {
        assert!(GeometryEngine::new(0, Box::new(ImageResizer::default())).is_err());
    }
}
