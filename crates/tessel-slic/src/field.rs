//! Per-pixel input and working grids.
//!
//! [`ColorField`] is the validated, read-only color input. [`LabelGrid`]
//! and [`DistanceGrid`] are the two dense working grids the assignment
//! step mutates; the label grid is also the final output of a run.

use image::{Rgb, RgbImage};

use crate::types::{Dimensions, SlicError};

/// Label value for a pixel no cluster has claimed yet.
pub const UNASSIGNED: u32 = u32::MAX;

/// Distance value for a pixel no cluster has reached yet. Any computed
/// distance is strictly smaller.
pub const UNREACHED_DISTANCE: f32 = f32::INFINITY;

/// Three 8-bit channels per pixel in the working color space.
///
/// Construction validates the input, so every `ColorField` is non-empty
/// and holds exactly three samples per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorField {
    image: RgbImage,
}

impl ColorField {
    /// Wrap an image whose channels are already in the working color
    /// space.
    ///
    /// # Errors
    ///
    /// Returns [`SlicError::ZeroDimension`] if either axis is zero.
    pub fn from_image(image: RgbImage) -> Result<Self, SlicError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SlicError::ZeroDimension { width, height });
        }
        Ok(Self { image })
    }

    /// Build a field from interleaved row-major samples.
    ///
    /// # Errors
    ///
    /// Returns [`SlicError::ZeroDimension`] if either axis is zero, or
    /// [`SlicError::BufferLength`] if `samples` does not hold exactly
    /// `width * height * 3` bytes.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, SlicError> {
        if width == 0 || height == 0 {
            return Err(SlicError::ZeroDimension { width, height });
        }

        let len = samples.len();
        let expected = Dimensions::new(width, height).pixel_count().checked_mul(3);
        if expected != Some(len) {
            return Err(SlicError::BufferLength { len, width, height });
        }

        RgbImage::from_raw(width, height, samples)
            .map(|image| Self { image })
            .ok_or(SlicError::BufferLength { len, width, height })
    }

    /// Build a field where every pixel has the same color.
    ///
    /// # Errors
    ///
    /// Returns [`SlicError::ZeroDimension`] if either axis is zero.
    pub fn uniform(width: u32, height: u32, color: [u8; 3]) -> Result<Self, SlicError> {
        Self::from_image(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    /// Field dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = self.image.dimensions();
        Dimensions { width, height }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[must_use]
    pub fn color(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    /// The underlying three-channel image.
    #[must_use]
    pub const fn as_image(&self) -> &RgbImage {
        &self.image
    }
}

/// Cluster index per pixel, or [`UNASSIGNED`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrid {
    dimensions: Dimensions,
    labels: Vec<u32>,
}

impl LabelGrid {
    /// A grid with every pixel unassigned.
    pub(crate) fn unassigned(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            labels: vec![UNASSIGNED; dimensions.pixel_count()],
        }
    }

    /// Build a grid from row-major raw labels (with [`UNASSIGNED`] for
    /// unclaimed pixels). Returns `None` if the length does not match.
    #[must_use]
    pub fn from_raw(dimensions: Dimensions, labels: Vec<u32>) -> Option<Self> {
        (labels.len() == dimensions.pixel_count()).then_some(Self { dimensions, labels })
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Label of `(x, y)`, or `None` if the pixel is unassigned or out of
    /// bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        self.raw(x, y)
    }

    /// Row-major labels, `None` for unassigned pixels.
    pub fn iter(&self) -> impl Iterator<Item = Option<u32>> + '_ {
        self.labels
            .iter()
            .map(|&l| (l != UNASSIGNED).then_some(l))
    }

    /// Row-major raw labels including the [`UNASSIGNED`] sentinel.
    #[must_use]
    pub fn as_raw(&self) -> &[u32] {
        &self.labels
    }

    /// Number of pixels no cluster has claimed.
    #[must_use]
    pub fn unassigned_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == UNASSIGNED).count()
    }

    /// Largest assigned label, if any pixel is assigned.
    #[must_use]
    pub fn max_label(&self) -> Option<u32> {
        self.iter().flatten().max()
    }

    pub(crate) fn raw(&self, x: u32, y: u32) -> Option<u32> {
        let l = self.labels[self.dimensions.index(x, y)];
        (l != UNASSIGNED).then_some(l)
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, label: u32) {
        let i = self.dimensions.index(x, y);
        self.labels[i] = label;
    }
}

/// Best-known distance from each pixel to its assigned center.
///
/// Values only ever decrease during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceGrid {
    dimensions: Dimensions,
    values: Vec<f32>,
}

impl DistanceGrid {
    /// A grid with every pixel at [`UNREACHED_DISTANCE`].
    pub(crate) fn unreached(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            values: vec![UNREACHED_DISTANCE; dimensions.pixel_count()],
        }
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Recorded distance at `(x, y)`, or `None` if unreached or out of
    /// bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let d = self.values[self.dimensions.index(x, y)];
        (d < UNREACHED_DISTANCE).then_some(d)
    }

    /// Row-major raw distances including the [`UNREACHED_DISTANCE`]
    /// sentinel.
    #[must_use]
    pub fn as_raw(&self) -> &[f32] {
        &self.values
    }

    /// Overwrite the distance at `(x, y)` if `distance` is strictly
    /// smaller. Returns whether the value changed.
    pub(crate) fn improve(&mut self, x: u32, y: u32, distance: f32) -> bool {
        let slot = &mut self.values[self.dimensions.index(x, y)];
        if distance < *slot {
            *slot = distance;
            true
        } else {
            false
        }
    }
}
