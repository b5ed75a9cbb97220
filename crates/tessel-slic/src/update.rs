//! Center update step: snap each tentative mean to a real pixel.
//!
//! The tentative mean of a cluster is an averaged, generally off-grid
//! point with a color that may not exist in the image. This step scans
//! the whole image once and moves every center to the pixel, among
//! those currently carrying its label, whose color is nearest to the
//! tentative mean color. Position plays no part in the choice.

use crate::field::{ColorField, LabelGrid};
use crate::types::ClusterCenter;

/// Best-color-distance value before any pixel has been considered.
pub const NO_CANDIDATE: u32 = u32::MAX;

/// Move each center to its best-matching labeled pixel.
///
/// `tentative` holds one optional mean per center; a cluster with no
/// mean keeps its previous center, and unassigned pixels are skipped.
/// `best` is per-cluster scratch, reset here before the scan.
pub fn update_centers(
    field: &ColorField,
    labels: &LabelGrid,
    tentative: &[Option<ClusterCenter>],
    best: &mut [u32],
    centers: &mut [ClusterCenter],
) {
    debug_assert_eq!(centers.len(), tentative.len());
    debug_assert_eq!(centers.len(), best.len());

    best.fill(NO_CANDIDATE);

    for y in 0..field.height() {
        for x in 0..field.width() {
            let Some(label) = labels.raw(x, y) else {
                continue;
            };
            let l = label as usize;
            let Some(mean) = tentative.get(l).copied().flatten() else {
                continue;
            };

            let color = field.color(x, y);
            let dist = mean.color_distance_squared(color);
            if dist < best[l] {
                best[l] = dist;
                centers[l] = ClusterCenter::new(x, y, color);
            }
        }
    }
}
