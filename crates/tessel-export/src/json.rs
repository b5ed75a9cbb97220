//! JSON serialization of label grids.
//!
//! Produces a single object:
//!
//! ```json
//! { "width": 3, "height": 1, "labels": [0, 1, null] }
//! ```
//!
//! Labels are row-major; unassigned pixels are `null`.

use serde::{Deserialize, Serialize};
use tessel_slic::{Dimensions, LabelGrid, UNASSIGNED};

use crate::ExportError;

/// Serialized form of a [`LabelGrid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelsDocument {
    /// Grid width in pixels.
    pub width: u32,
    /// Grid height in pixels.
    pub height: u32,
    /// Row-major labels, `None` for unassigned pixels.
    pub labels: Vec<Option<u32>>,
}

impl From<&LabelGrid> for LabelsDocument {
    fn from(grid: &LabelGrid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            labels: grid.iter().collect(),
        }
    }
}

impl TryFrom<LabelsDocument> for LabelGrid {
    type Error = ExportError;

    fn try_from(doc: LabelsDocument) -> Result<Self, Self::Error> {
        let dimensions = Dimensions::new(doc.width, doc.height);
        let len = doc.labels.len();
        let raw = doc
            .labels
            .into_iter()
            .map(|l| l.unwrap_or(UNASSIGNED))
            .collect();
        Self::from_raw(dimensions, raw).ok_or(ExportError::LabelCount { len, dimensions })
    }
}

/// Serialize a label grid to compact JSON.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn labels_to_json(labels: &LabelGrid) -> Result<String, ExportError> {
    Ok(serde_json::to_string(&LabelsDocument::from(labels))?)
}

/// Parse a label grid previously written by [`labels_to_json`].
///
/// # Errors
///
/// Returns [`ExportError::Json`] if `json` is malformed, or
/// [`ExportError::LabelCount`] if the label array does not have one
/// entry per pixel.
pub fn labels_from_json(json: &str) -> Result<LabelGrid, ExportError> {
    let doc: LabelsDocument = serde_json::from_str(json)?;
    LabelGrid::try_from(doc)
}
