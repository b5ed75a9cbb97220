//! Shared types for the tessel superpixel engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can pass decoded source
/// images around without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `GrayImage` for single-channel renders (contour masks).
pub use image::GrayImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimensions value.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Row-major index of `(x, y)`.
    #[must_use]
    pub(crate) const fn index(self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Run parameters for a segmentation.
///
/// Every field has a fallback default. Out-of-range values are never
/// rejected: [`SlicConfig::sanitized`] replaces them with the default
/// for that field, and the engine always sanitizes before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicConfig {
    /// Target superpixel side length in pixels. Seeds are laid out on
    /// a grid with this spacing.
    pub superpixel_size: u32,

    /// Maximum number of assign + update passes.
    pub max_iterations: u32,

    /// Color weighting factor. Larger values make superpixels more
    /// spatially regular and less color-adherent.
    pub color_weight: f32,
}

impl SlicConfig {
    /// Default superpixel side length in pixels.
    pub const DEFAULT_SUPERPIXEL_SIZE: u32 = 30;
    /// Default maximum iteration count.
    pub const DEFAULT_MAX_ITERATIONS: u32 = 10;
    /// Default color weighting factor.
    pub const DEFAULT_COLOR_WEIGHT: f32 = 20.0;

    /// Build a config from raw, possibly non-positive values.
    ///
    /// Each non-positive value is replaced by its default.
    #[must_use]
    pub fn new(superpixel_size: i64, max_iterations: i64, color_weight: f32) -> Self {
        let positive = |v: i64, fallback: u32| {
            u32::try_from(v)
                .ok()
                .filter(|&v| v > 0)
                .unwrap_or(fallback)
        };

        Self {
            superpixel_size: positive(superpixel_size, Self::DEFAULT_SUPERPIXEL_SIZE),
            max_iterations: positive(max_iterations, Self::DEFAULT_MAX_ITERATIONS),
            color_weight,
        }
        .sanitized()
    }

    /// Replace zero counts and non-positive or non-finite weights with
    /// their defaults.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            superpixel_size: if self.superpixel_size == 0 {
                Self::DEFAULT_SUPERPIXEL_SIZE
            } else {
                self.superpixel_size
            },
            max_iterations: if self.max_iterations == 0 {
                Self::DEFAULT_MAX_ITERATIONS
            } else {
                self.max_iterations
            },
            color_weight: if self.color_weight.is_finite() && self.color_weight > 0.0 {
                self.color_weight
            } else {
                Self::DEFAULT_COLOR_WEIGHT
            },
        }
    }
}

impl Default for SlicConfig {
    fn default() -> Self {
        Self {
            superpixel_size: Self::DEFAULT_SUPERPIXEL_SIZE,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            color_weight: Self::DEFAULT_COLOR_WEIGHT,
        }
    }
}

/// Representative position and color of one superpixel.
///
/// Coordinates always name a real pixel and `color` is that pixel's
/// sample (or, for a tentative mean, the truncated channel average).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterCenter {
    /// Horizontal position (pixels from left edge).
    pub x: u32,
    /// Vertical position (pixels from top edge).
    pub y: u32,
    /// Color channels in the working color space (L, a, b).
    pub color: [u8; 3],
}

impl ClusterCenter {
    /// Create a new cluster center.
    #[must_use]
    pub const fn new(x: u32, y: u32, color: [u8; 3]) -> Self {
        Self { x, y, color }
    }

    /// Squared Euclidean distance between this center's color and
    /// `color`.
    #[must_use]
    pub fn color_distance_squared(&self, color: [u8; 3]) -> u32 {
        self.color
            .iter()
            .zip(color)
            .map(|(&c, p)| {
                let d = i32::from(c) - i32::from(p);
                d.unsigned_abs() * d.unsigned_abs()
            })
            .sum()
    }

    /// Squared Euclidean distance between this center's position and
    /// `(x, y)`.
    #[must_use]
    pub fn spatial_distance_squared(&self, x: u32, y: u32) -> u64 {
        let dx = u64::from(self.x.abs_diff(x));
        let dy = u64::from(self.y.abs_diff(y));
        dx * dx + dy * dy
    }
}

/// Errors that can occur before a segmentation run starts.
///
/// Every variant is raised while validating input, before any working
/// grid is allocated. Nothing inside the iteration loop is fallible.
#[derive(Debug, thiserror::Error)]
pub enum SlicError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The image has a zero-length axis.
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// A raw sample buffer does not hold exactly three channels per pixel.
    #[error("color buffer length {len} does not match {width}x{height} with 3 channels")]
    BufferLength {
        /// Actual buffer length.
        len: usize,
        /// Declared width in pixels.
        width: u32,
        /// Declared height in pixels.
        height: u32,
    },

    /// A gradient field does not cover the same grid as the color field.
    #[error("gradient field is {gradient} but color field is {color}")]
    GradientMismatch {
        /// Color field dimensions.
        color: Dimensions,
        /// Gradient field dimensions.
        gradient: Dimensions,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Dimensions tests ---

    #[test]
    fn dimensions_pixel_count() {
        assert_eq!(Dimensions::new(17, 31).pixel_count(), 527);
    }

    #[test]
    fn dimensions_empty_when_either_axis_zero() {
        assert!(Dimensions::new(0, 5).is_empty());
        assert!(Dimensions::new(5, 0).is_empty());
        assert!(!Dimensions::new(1, 1).is_empty());
    }

    #[test]
    fn dimensions_index_is_row_major() {
        let d = Dimensions::new(10, 4);
        assert_eq!(d.index(0, 0), 0);
        assert_eq!(d.index(9, 0), 9);
        assert_eq!(d.index(0, 1), 10);
        assert_eq!(d.index(3, 2), 23);
    }

    #[test]
    fn dimensions_display() {
        assert_eq!(Dimensions::new(640, 480).to_string(), "640x480");
    }

    // --- SlicConfig tests ---

    #[test]
    fn config_defaults() {
        let config = SlicConfig::default();
        assert_eq!(config.superpixel_size, 30);
        assert_eq!(config.max_iterations, 10);
        assert!((config.color_weight - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn config_new_keeps_positive_values() {
        let config = SlicConfig::new(12, 3, 5.5);
        assert_eq!(config.superpixel_size, 12);
        assert_eq!(config.max_iterations, 3);
        assert!((config.color_weight - 5.5).abs() < f32::EPSILON);
    }

    #[test]
    fn config_new_replaces_non_positive_values_independently() {
        let config = SlicConfig::new(0, 4, 8.0);
        assert_eq!(config.superpixel_size, 30);
        assert_eq!(config.max_iterations, 4);

        let config = SlicConfig::new(16, -2, 8.0);
        assert_eq!(config.superpixel_size, 16);
        assert_eq!(config.max_iterations, 10);

        let config = SlicConfig::new(16, 4, -1.0);
        assert!((config.color_weight - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn config_sanitized_replaces_zero_and_non_finite() {
        let config = SlicConfig {
            superpixel_size: 0,
            max_iterations: 0,
            color_weight: f32::NAN,
        }
        .sanitized();
        assert_eq!(config, SlicConfig::default());

        let config = SlicConfig {
            color_weight: f32::INFINITY,
            ..SlicConfig::default()
        }
        .sanitized();
        assert!((config.color_weight - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = SlicConfig::new(24, 7, 12.5);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SlicConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let config: SlicConfig = serde_json::from_str(r#"{"superpixel_size": 12}"#).unwrap();
        assert_eq!(config.superpixel_size, 12);
        assert_eq!(config.max_iterations, 10);
    }

    // --- ClusterCenter tests ---

    #[test]
    fn color_distance_squared_sums_channels() {
        let c = ClusterCenter::new(0, 0, [10, 20, 30]);
        assert_eq!(c.color_distance_squared([13, 16, 30]), 9 + 16);
        assert_eq!(c.color_distance_squared([10, 20, 30]), 0);
    }

    #[test]
    fn color_distance_squared_handles_full_range() {
        let c = ClusterCenter::new(0, 0, [0, 0, 0]);
        assert_eq!(c.color_distance_squared([255, 255, 255]), 3 * 255 * 255);
    }

    #[test]
    fn spatial_distance_squared_is_symmetric() {
        let c = ClusterCenter::new(5, 5, [0, 0, 0]);
        assert_eq!(c.spatial_distance_squared(8, 9), 25);
        assert_eq!(c.spatial_distance_squared(2, 1), 25);
    }

    // --- SlicError tests ---

    #[test]
    fn error_zero_dimension_display() {
        let err = SlicError::ZeroDimension {
            width: 0,
            height: 4,
        };
        assert_eq!(err.to_string(), "image dimensions must be non-zero, got 0x4");
    }

    #[test]
    fn error_gradient_mismatch_display() {
        let err = SlicError::GradientMismatch {
            color: Dimensions::new(4, 4),
            gradient: Dimensions::new(4, 3),
        };
        assert_eq!(err.to_string(), "gradient field is 4x3 but color field is 4x4");
    }

    #[test]
    fn error_empty_input_display() {
        assert_eq!(SlicError::EmptyInput.to_string(), "input image data is empty");
    }
}
