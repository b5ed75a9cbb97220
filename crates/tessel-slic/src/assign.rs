//! Assignment step: claim pixels for the nearest center within a
//! bounded window.
//!
//! Each cluster only scans the `(2S + 1)²` window around its center, so
//! a pass costs `O(clusters · S²) ≈ O(pixels)` rather than
//! `O(clusters · pixels)`. A single cluster scans the whole image.
//!
//! Clusters run in index order over shared label/distance grids. A
//! pixel one cluster has just accumulated can be taken by a later
//! cluster in the same pass; the earlier accumulator keeps that
//! pixel's contribution.

use std::ops::AddAssign;

use crate::field::{ColorField, DistanceGrid, LabelGrid};
use crate::seed::Normalization;
use crate::types::ClusterCenter;

/// Running sums of the pixels attributed to one cluster during a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    x: u64,
    y: u64,
    color: [u64; 3],
    count: u64,
}

impl Accumulator {
    /// Add one pixel's position and color.
    pub fn add(&mut self, x: u32, y: u32, color: [u8; 3]) {
        self.x += u64::from(x);
        self.y += u64::from(y);
        for (sum, c) in self.color.iter_mut().zip(color) {
            *sum += u64::from(c);
        }
        self.count += 1;
    }

    /// Number of pixels added.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Truncating average of everything added, or `None` when empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn mean(&self) -> Option<ClusterCenter> {
        let n = self.count;
        if n == 0 {
            return None;
        }
        // Averages of u32 coordinates and u8 samples fit their types.
        Some(ClusterCenter::new(
            (self.x / n) as u32,
            (self.y / n) as u32,
            self.color.map(|c| (c / n) as u8),
        ))
    }
}

impl AddAssign for Accumulator {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        for (sum, c) in self.color.iter_mut().zip(rhs.color) {
            *sum += c;
        }
        self.count += rhs.count;
    }
}

/// Run one assignment pass over every cluster.
///
/// `accumulators` must hold one slot per center; each slot is reset
/// before its cluster scans. Returns the number of distance
/// improvements, counting a pixel once per cluster that improved it.
pub fn assign(
    field: &ColorField,
    centers: &[ClusterCenter],
    normalization: &Normalization,
    labels: &mut LabelGrid,
    distances: &mut DistanceGrid,
    accumulators: &mut [Accumulator],
) -> u64 {
    debug_assert_eq!(centers.len(), accumulators.len());

    let (w, h) = (field.width(), field.height());
    // A lone cluster owns the whole image, whatever its window.
    let s = if centers.len() == 1 {
        w.max(h)
    } else {
        normalization.radius
    };
    let mut changed = 0;

    for ((index, center), acc) in (0u32..).zip(centers).zip(accumulators.iter_mut()) {
        *acc = Accumulator::default();

        let xs = center.x.saturating_sub(s);
        let xe = center.x.saturating_add(s).saturating_add(1).min(w);
        let ys = center.y.saturating_sub(s);
        let ye = center.y.saturating_add(s).saturating_add(1).min(h);

        for y in ys..ye {
            for x in xs..xe {
                let color = field.color(x, y);
                let d = normalization.distance(center, x, y, color);

                if distances.improve(x, y, d) {
                    labels.set(x, y, index);
                    changed += 1;
                }

                if labels.raw(x, y) == Some(index) {
                    acc.add(x, y, color);
                }
            }
        }
    }

    changed
}
