//! Run diagnostics: seed layout, per-iteration churn, and outcome.
//!
//! These are permanent instrumentation intended for parameter tuning.
//! Every [`Segmentation`](crate::Segmentation) carries one, and the
//! bench CLI prints it as a report or as JSON.

use serde::{Deserialize, Serialize};

use crate::field::LabelGrid;
use crate::types::{Dimensions, SlicConfig};

/// Where the convergence loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Seeds are placed and the loop may still run.
    Running,
    /// An assignment pass changed no pixel.
    Converged,
    /// The iteration budget ran out before a fixed point.
    Exhausted,
}

impl RunState {
    /// Returns `true` for either terminal state.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Diagnostics collected from a single segmentation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationDiagnostics {
    /// Input dimensions.
    pub dimensions: Dimensions,
    /// Sanitized config the run used.
    pub config: SlicConfig,
    /// Number of seeds (and clusters) for the run.
    pub seed_count: usize,
    /// Search window half-width `S`.
    pub search_radius: u32,
    /// Distance improvements recorded by each assignment pass, in order.
    pub changed_per_iteration: Vec<u64>,
    /// Final loop state.
    pub state: RunState,
    /// Clusters that own at least one pixel in the final label grid.
    pub live_clusters: usize,
    /// Pixels no window ever reached.
    pub unassigned_pixels: usize,
}

impl SegmentationDiagnostics {
    /// Number of assign + update passes performed.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.changed_per_iteration.len()
    }

    /// Whether the run stopped at a fixed point.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.state == RunState::Converged
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Segmentation Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {} ({} pixels)",
            self.dimensions,
            self.dimensions.pixel_count(),
        ));
        lines.push(format!(
            "Config: size={} max_iterations={} color_weight={:.2}",
            self.config.superpixel_size, self.config.max_iterations, self.config.color_weight,
        ));
        lines.push(format!(
            "Seeds: {}  |  Search radius S: {}",
            self.seed_count, self.search_radius,
        ));
        lines.push(String::new());

        lines.push(format!("{:<12} {:>14}", "Iteration", "Changed"));
        lines.push("-".repeat(40));
        for (i, changed) in self.changed_per_iteration.iter().enumerate() {
            lines.push(format!("{:<12} {changed:>14}", i + 1));
        }

        lines.push(String::new());
        let outcome = match self.state {
            RunState::Running => "running",
            RunState::Converged => "converged",
            RunState::Exhausted => "iteration budget exhausted",
        };
        lines.push(format!(
            "Outcome: {outcome} after {} iteration(s)",
            self.iterations(),
        ));
        lines.push(format!(
            "Live clusters: {}/{}  |  Unassigned pixels: {}",
            self.live_clusters, self.seed_count, self.unassigned_pixels,
        ));

        lines.join("\n")
    }
}

/// Count clusters in `[0, cluster_count)` that own at least one pixel.
pub(crate) fn live_cluster_count(labels: &LabelGrid, cluster_count: usize) -> usize {
    let mut owned = vec![false; cluster_count];
    for label in labels.iter().flatten() {
        if let Some(slot) = owned.get_mut(label as usize) {
            *slot = true;
        }
    }
    owned.into_iter().filter(|&o| o).count()
}
