//! tessel-slic: SLIC superpixel segmentation (sans-IO).
//!
//! Partitions an image into compact, roughly equal-sized regions whose
//! pixels share similar color. The engine works on a three-channel color
//! field (8-bit CIE L\*a\*b\* when built through [`segment_rgb`]) and
//! produces one cluster label per pixel:
//!
//! seed grid -> gradient perturbation -> { windowed assignment ->
//! center update } until no pixel improves or the iteration budget runs
//! out.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! buffers and returns structured data; rendering and file output live
//! in `tessel-export` and `tessel-bench`.

pub mod assign;
pub mod color;
pub mod diagnostics;
pub mod field;
pub mod gradient;
pub mod seed;
pub mod segmenter;
pub mod types;
pub mod update;

pub use assign::Accumulator;
pub use diagnostics::{RunState, SegmentationDiagnostics};
pub use field::{ColorField, DistanceGrid, LabelGrid, UNASSIGNED, UNREACHED_DISTANCE};
pub use gradient::GradientField;
pub use seed::Normalization;
pub use segmenter::{Segmentation, Segmenter};
pub use types::{ClusterCenter, Dimensions, GrayImage, RgbImage, SlicConfig, SlicError};

/// Segment a color field that is already in the working color space.
///
/// Seeds are perturbed on the summed Laplacian of `field`.
#[must_use]
pub fn segment(field: &ColorField, config: &SlicConfig) -> Segmentation {
    Segmenter::new(field, config).run()
}

/// Segment a color field using a caller-supplied gradient for seed
/// perturbation.
///
/// # Errors
///
/// Returns [`SlicError::GradientMismatch`] if the two fields differ in
/// dimensions.
pub fn segment_with_gradient(
    field: &ColorField,
    gradient: &GradientField,
    config: &SlicConfig,
) -> Result<Segmentation, SlicError> {
    Ok(Segmenter::with_gradient(field, gradient, config)?.run())
}

/// Convert an sRGB image to Lab and segment it.
///
/// # Errors
///
/// Returns [`SlicError::ZeroDimension`] if the image has no pixels.
pub fn segment_rgb(image: &RgbImage, config: &SlicConfig) -> Result<Segmentation, SlicError> {
    let field = color::srgb_to_lab(image)?;
    Ok(segment(&field, config))
}

/// Decode an encoded image (PNG, JPEG, BMP, WebP) and segment it.
///
/// # Errors
///
/// Returns [`SlicError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`SlicError::ImageDecode`] if the format is unrecognized.
/// Returns [`SlicError::ZeroDimension`] if the decoded image has no pixels.
pub fn segment_bytes(image_bytes: &[u8], config: &SlicConfig) -> Result<Segmentation, SlicError> {
    let rgb = color::decode(image_bytes)?;
    segment_rgb(&rgb, config)
}
