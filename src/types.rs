//! Core value types shared by the geometry engine and the episode controller.
//!
//! Defines the attention action submitted by an agent, the focus triple that
//! positions the glimpse window, and the pixel buffer used for both decoded
//! source images and observations.

use std::fmt;

use crate::error::{EnvError, Result};

/// Where and how tightly to look.
///
/// `y` and `x` are offsets from the image center in `[-1, 1]`, normalized by
/// half of the longer image side. `zoom` interpolates the window size between
/// the longer image side (`0.0`) and the glimpse size (`1.0`).
///
/// Values are never clamped: a focus outside these ranges simply places the
/// window (partially) off the image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Focus {
    pub y: f64,
    pub x: f64,
    pub zoom: f64,
}

impl Focus {
    /// Creates a new focus triple.
    pub fn new(y: f64, x: f64, zoom: f64) -> Self {
        Self { y, x, zoom }
    }

    /// The whole image, centered.
    pub fn centered() -> Self {
        Self::default()
    }

    /// Returns the focus as `[y, x, zoom]`.
    pub fn as_array(&self) -> [f64; 3] {
        [self.y, self.x, self.zoom]
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(y={:.3}, x={:.3}, zoom={:.3})", self.y, self.x, self.zoom)
    }
}

/// One agent decision: stop or continue, a class guess, and the next focus.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttentionAction {
    /// End the episode after this step.
    pub stop: bool,
    /// Predicted class id in `[0, num_categories)`.
    pub class_guess: usize,
    /// Where to place the next glimpse.
    pub focus: Focus,
}

impl AttentionAction {
    /// Creates a new action.
    pub fn new(stop: bool, class_guess: usize, focus: Focus) -> Self {
        Self {
            stop,
            class_guess,
            focus,
        }
    }

    /// The action every episode starts from: keep going, guess 0, whole image.
    pub fn neutral() -> Self {
        Self::new(false, 0, Focus::centered())
    }

    /// Continue the episode looking at `focus`.
    pub fn look(focus: Focus) -> Self {
        Self::new(false, 0, focus)
    }

    /// Stop the episode and commit to `class_guess`.
    pub fn classify(class_guess: usize, focus: Focus) -> Self {
        Self::new(true, class_guess, focus)
    }
}

impl Default for AttentionAction {
    fn default() -> Self {
        Self::neutral()
    }
}

/// A dense `height × width × channels` buffer of `f32` samples, row-major HWC.
///
/// Decoded images hold values in `[0, 1]`; observations are always
/// `glimpse_size × glimpse_size × 3`.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

/// The glimpse returned to the agent.
pub type Observation = PixelArray;

impl PixelArray {
    /// Creates a zero-filled array.
    pub fn zeros(height: usize, width: usize, channels: usize) -> Self {
        Self {
            height,
            width,
            channels,
            data: vec![0.0; height * width * channels],
        }
    }

    /// Wraps an existing buffer, checking that its length matches the shape.
    pub fn from_raw(height: usize, width: usize, channels: usize, data: Vec<f32>) -> Result<Self> {
        let expected = height * width * channels;
        if data.len() != expected {
            return Err(EnvError::Configuration(format!(
                "pixel buffer has {} values, shape {}x{}x{} needs {}",
                data.len(),
                height,
                width,
                channels,
                expected
            )));
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Builds a normalized array from 8-bit samples (each divided by 255).
    pub fn from_u8(height: usize, width: usize, channels: usize, raw: &[u8]) -> Result<Self> {
        let data = raw.iter().map(|&v| f32::from(v) / 255.0).collect();
        Self::from_raw(height, width, channels, data)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns `(height, width, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    /// Raw samples in row-major HWC order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn offset(&self, y: usize, x: usize, c: usize) -> usize {
        (y * self.width + x) * self.channels + c
    }

    /// Returns the sample at `(y, x, c)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, y: usize, x: usize, c: usize) -> f32 {
        self.data[self.offset(y, x, c)]
    }

    /// Sets the sample at `(y, x, c)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn set(&mut self, y: usize, x: usize, c: usize, value: f32) {
        let i = self.offset(y, x, c);
        self.data[i] = value;
    }

    /// The samples of row `y`, all columns and channels.
    pub fn row(&self, y: usize) -> &[f32] {
        let stride = self.width * self.channels;
        &self.data[y * stride..(y + 1) * stride]
    }

    /// Replicates a single-channel array into three identical channels.
    ///
    /// Arrays with any other channel count are returned unchanged.
    pub fn expand_gray(self) -> Self {
        if self.channels != 1 {
            return self;
        }
        let data = self.data.iter().flat_map(|&v| [v, v, v]).collect();
        Self {
            height: self.height,
            width: self.width,
            channels: 3,
            data,
        }
    }

    /// Mean over all samples, `0.0` for an empty array.
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f32>() / self.data.len() as f32
    }

    /// Clamps every sample into `[lo, hi]`.
    pub fn clamp_values(&mut self, lo: f32, hi: f32) {
        for v in &mut self.data {
            *v = v.clamp(lo, hi);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
