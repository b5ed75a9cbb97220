//! tessel-export: Renders and serializers for label grids (sans-IO)
//!
//! Turns a finished segmentation into things people and programs can
//! look at: boundary masks, contour overlays, mean-color mosaics, and
//! JSON. Everything here returns in-memory images or strings; writing
//! files is the caller's job.

pub mod json;
pub mod raster;

pub use json::{LabelsDocument, labels_from_json, labels_to_json};
pub use raster::{contour_mask, mean_color_image, overlay_contours};

use tessel_slic::Dimensions;

/// Errors that can occur while exporting a segmentation.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A source image and a label grid cover different pixel grids.
    #[error("label grid is {labels} but image is {image}")]
    DimensionMismatch {
        /// Source image dimensions.
        image: Dimensions,
        /// Label grid dimensions.
        labels: Dimensions,
    },

    /// JSON encoding or decoding failed.
    #[error("label JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A decoded label document does not hold one entry per pixel.
    #[error("label document has {len} entries for a {dimensions} grid")]
    LabelCount {
        /// Number of entries in the document.
        len: usize,
        /// Declared grid dimensions.
        dimensions: Dimensions,
    },
}
