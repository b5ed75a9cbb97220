//! Gradient field used to nudge seeds off edges and noisy pixels.
//!
//! The default field is the sum of the signed per-channel Laplacian
//! responses, computed with [`imageproc::filter::laplacian_filter`]
//! (kernel `[0 1 0; 1 -4 1; 0 1 0]`, edge pixels replicated). Callers
//! with their own edge measure can supply a field via
//! [`GradientField::from_raw`].

use image::GrayImage;

use crate::field::ColorField;
use crate::types::Dimensions;

/// One scalar per pixel, aligned with a [`ColorField`].
#[derive(Debug, Clone, PartialEq)]
pub struct GradientField {
    dimensions: Dimensions,
    values: Vec<f32>,
}

impl GradientField {
    /// Compute the summed three-channel Laplacian of `field`.
    ///
    /// `imageproc`'s filter only accepts `GrayImage`, so the field is
    /// split into three single-channel images, each is filtered, and
    /// the signed responses are summed per pixel.
    #[must_use]
    pub fn laplacian(field: &ColorField) -> Self {
        let dimensions = field.dimensions();
        let image = field.as_image();
        let (w, h) = (dimensions.width, dimensions.height);

        let responses: [_; 3] = std::array::from_fn(|c| {
            let channel =
                GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]));
            imageproc::filter::laplacian_filter(&channel)
        });

        let values = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .map(|(x, y)| {
                responses
                    .iter()
                    .map(|r| f32::from(r.get_pixel(x, y).0[0]))
                    .sum()
            })
            .collect();

        Self { dimensions, values }
    }

    /// Build a field from row-major values. Returns `None` if the
    /// length does not match `dimensions`.
    #[must_use]
    pub fn from_raw(dimensions: Dimensions, values: Vec<f32>) -> Option<Self> {
        (values.len() == dimensions.pixel_count()).then_some(Self { dimensions, values })
    }

    /// Field dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Gradient value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[must_use]
    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.values[self.dimensions.index(x, y)]
    }
}
