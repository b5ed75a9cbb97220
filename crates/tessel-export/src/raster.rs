//! Raster renders of a label grid.
//!
//! A pixel is a boundary pixel when its right or lower neighbor is
//! assigned and carries a different label. Only the right and lower
//! neighbors are checked, so every boundary is drawn one pixel wide on
//! the upper/left side of the edge. An unassigned neighbor never makes
//! a boundary.

use image::{GrayImage, Luma, Rgb, RgbImage};
use tessel_slic::{Dimensions, LabelGrid};

use crate::ExportError;

/// Boundary mask: 255 on superpixel boundaries, 0 elsewhere.
#[must_use]
pub fn contour_mask(labels: &LabelGrid) -> GrayImage {
    GrayImage::from_fn(labels.width(), labels.height(), |x, y| {
        if is_boundary(labels, x, y) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Copy of `image` with superpixel boundaries painted in `color`.
///
/// # Errors
///
/// Returns [`ExportError::DimensionMismatch`] if `image` and `labels`
/// differ in size.
pub fn overlay_contours(
    image: &RgbImage,
    labels: &LabelGrid,
    color: Rgb<u8>,
) -> Result<RgbImage, ExportError> {
    check_dimensions(image, labels)?;

    let mut out = image.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if is_boundary(labels, x, y) {
            *pixel = color;
        }
    }
    Ok(out)
}

/// Mosaic where every pixel takes the average source color of its
/// superpixel, truncated per channel. Unassigned pixels are black.
///
/// # Errors
///
/// Returns [`ExportError::DimensionMismatch`] if `image` and `labels`
/// differ in size.
pub fn mean_color_image(image: &RgbImage, labels: &LabelGrid) -> Result<RgbImage, ExportError> {
    check_dimensions(image, labels)?;

    let clusters = labels.max_label().map_or(0, |m| m as usize + 1);
    let mut sums = vec![([0u64; 3], 0u64); clusters];

    for (x, y, pixel) in image.enumerate_pixels() {
        if let Some((sum, count)) = labels.get(x, y).and_then(|l| sums.get_mut(l as usize)) {
            for (s, c) in sum.iter_mut().zip(pixel.0) {
                *s += u64::from(c);
            }
            *count += 1;
        }
    }

    let means: Vec<Rgb<u8>> = sums
        .iter()
        .map(|&(sum, count)| Rgb(sum.map(|s| channel_mean(s, count))))
        .collect();

    Ok(RgbImage::from_fn(image.width(), image.height(), |x, y| {
        labels
            .get(x, y)
            .and_then(|l| means.get(l as usize).copied())
            .unwrap_or(Rgb([0, 0, 0]))
    }))
}

fn is_boundary(labels: &LabelGrid, x: u32, y: u32) -> bool {
    let here = labels.get(x, y);
    let differs = |nx: u32, ny: u32| {
        nx < labels.width()
            && ny < labels.height()
            && labels.get(nx, ny).is_some_and(|n| Some(n) != here)
    };
    differs(x + 1, y) || differs(x, y + 1)
}

#[allow(clippy::cast_possible_truncation)]
fn channel_mean(sum: u64, count: u64) -> u8 {
    if count == 0 {
        return 0;
    }
    // Mean of u8 samples fits in u8.
    (sum / count) as u8
}

fn check_dimensions(image: &RgbImage, labels: &LabelGrid) -> Result<(), ExportError> {
    let (width, height) = image.dimensions();
    let image = Dimensions::new(width, height);
    if image == labels.dimensions() {
        Ok(())
    } else {
        Err(ExportError::DimensionMismatch {
            image,
            labels: labels.dimensions(),
        })
    }
}
