//! Convergence controller: seeds once, then assign + update until the
//! label grid stops changing or the iteration budget runs out.
//!
//! [`Segmenter`] owns every working grid for one run. It can be driven
//! in one call:
//!
//! ```rust
//! # use tessel_slic::{ColorField, Segmenter, SlicConfig, SlicError};
//! # fn run() -> Result<(), SlicError> {
//! let field = ColorField::uniform(64, 48, [128, 128, 128])?;
//! let segmentation = Segmenter::new(&field, &SlicConfig::default()).run();
//! assert_eq!(segmentation.labels.dimensions(), field.dimensions());
//! # Ok(())
//! # }
//! ```
//!
//! or one pass at a time with [`Segmenter::assign`],
//! [`Segmenter::update_centers`], and [`Segmenter::step`], inspecting
//! labels, distances, and centers in between.
//!
//! Nothing inside the loop is fallible. Dropping a `Segmenter` abandons
//! the run; there is no resume.

use crate::assign::{self, Accumulator};
use crate::diagnostics::{self, RunState, SegmentationDiagnostics};
use crate::field::{ColorField, DistanceGrid, LabelGrid};
use crate::gradient::GradientField;
use crate::seed::{self, Normalization};
use crate::types::{ClusterCenter, SlicConfig, SlicError};
use crate::update::{self, NO_CANDIDATE};

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Final cluster index per pixel.
    pub labels: LabelGrid,
    /// Final cluster centers, indexed by label.
    pub centers: Vec<ClusterCenter>,
    /// Seed layout, per-iteration churn, and outcome.
    pub diagnostics: SegmentationDiagnostics,
}

impl Segmentation {
    /// Number of clusters the run was seeded with.
    #[must_use]
    pub fn num_superpixels(&self) -> usize {
        self.centers.len()
    }
}

/// One segmentation run over a borrowed color field.
pub struct Segmenter<'a> {
    field: &'a ColorField,
    config: SlicConfig,
    normalization: Normalization,
    centers: Vec<ClusterCenter>,
    labels: LabelGrid,
    distances: DistanceGrid,
    accumulators: Vec<Accumulator>,
    tentative: Vec<Option<ClusterCenter>>,
    best_color: Vec<u32>,
    changed_per_iteration: Vec<u64>,
    state: RunState,
}

impl<'a> Segmenter<'a> {
    /// Place and perturb seeds using the summed Laplacian of `field`.
    #[must_use]
    pub fn new(field: &'a ColorField, config: &SlicConfig) -> Self {
        let gradient = GradientField::laplacian(field);
        Self::seeded(field, &gradient, config)
    }

    /// Place seeds and perturb them using a caller-supplied gradient.
    ///
    /// # Errors
    ///
    /// Returns [`SlicError::GradientMismatch`] if `gradient` does not
    /// have the same dimensions as `field`. No grid is allocated in
    /// that case.
    pub fn with_gradient(
        field: &'a ColorField,
        gradient: &GradientField,
        config: &SlicConfig,
    ) -> Result<Self, SlicError> {
        if gradient.dimensions() != field.dimensions() {
            return Err(SlicError::GradientMismatch {
                color: field.dimensions(),
                gradient: gradient.dimensions(),
            });
        }
        Ok(Self::seeded(field, gradient, config))
    }

    fn seeded(field: &'a ColorField, gradient: &GradientField, config: &SlicConfig) -> Self {
        let config = config.sanitized();
        let dimensions = field.dimensions();

        let mut centers = seed::place_seeds(field, config.superpixel_size);
        let normalization = Normalization::new(dimensions, centers.len(), config.color_weight);
        seed::perturb(&mut centers, field, gradient);

        log::debug!(
            "seeded {} clusters on {dimensions} (S = {})",
            centers.len(),
            normalization.radius,
        );

        let n = centers.len();
        Self {
            field,
            config,
            normalization,
            centers,
            labels: LabelGrid::unassigned(dimensions),
            distances: DistanceGrid::unreached(dimensions),
            accumulators: vec![Accumulator::default(); n],
            tentative: vec![None; n],
            best_color: vec![NO_CANDIDATE; n],
            changed_per_iteration: Vec::new(),
            state: RunState::Running,
        }
    }

    /// Run one assignment pass and record each cluster's tentative mean.
    ///
    /// Returns the number of distance improvements in the pass.
    pub fn assign(&mut self) -> u64 {
        let changed = assign::assign(
            self.field,
            &self.centers,
            &self.normalization,
            &mut self.labels,
            &mut self.distances,
            &mut self.accumulators,
        );
        for (mean, acc) in self.tentative.iter_mut().zip(&self.accumulators) {
            *mean = acc.mean();
        }
        changed
    }

    /// Snap every center with a tentative mean to its best-matching
    /// labeled pixel.
    pub fn update_centers(&mut self) {
        update::update_centers(
            self.field,
            &self.labels,
            &self.tentative,
            &mut self.best_color,
            &mut self.centers,
        );
    }

    /// One full iteration: assign, then update. Returns the assignment
    /// pass's change count.
    pub fn step(&mut self) -> u64 {
        let changed = self.assign();
        self.update_centers();
        self.changed_per_iteration.push(changed);
        log::debug!(
            "iteration {}: {changed} pixels changed",
            self.changed_per_iteration.len(),
        );
        changed
    }

    /// Iterate until an assignment pass changes nothing or the
    /// configured budget of iterations has been spent, then finish.
    ///
    /// Iterations already taken with [`step`](Self::step) count against
    /// the budget.
    #[must_use]
    pub fn run(mut self) -> Segmentation {
        self.converge();
        self.finish()
    }

    /// Drive the loop to a terminal state without consuming the run.
    ///
    /// Returns the terminal state. Calling it again once finished does
    /// nothing.
    pub fn converge(&mut self) -> RunState {
        let budget = self.config.max_iterations as usize;
        while !self.state.is_finished() {
            if self.changed_per_iteration.len() >= budget {
                self.state = RunState::Exhausted;
            } else if self.step() == 0 {
                self.state = RunState::Converged;
            }
        }
        self.state
    }

    /// Consume the run and package the current labels and centers.
    #[must_use]
    pub fn finish(self) -> Segmentation {
        let diagnostics = self.diagnostics();

        log::info!(
            "segmentation {:?} after {} iteration(s): {}/{} clusters live",
            diagnostics.state,
            diagnostics.iterations(),
            diagnostics.live_clusters,
            diagnostics.seed_count,
        );
        if diagnostics.unassigned_pixels > 0 {
            log::warn!(
                "{} pixels were never reached by any search window",
                diagnostics.unassigned_pixels,
            );
        }

        Segmentation {
            labels: self.labels,
            centers: self.centers,
            diagnostics,
        }
    }

    /// Snapshot of the run's diagnostics so far.
    #[must_use]
    pub fn diagnostics(&self) -> SegmentationDiagnostics {
        SegmentationDiagnostics {
            dimensions: self.field.dimensions(),
            config: self.config,
            seed_count: self.centers.len(),
            search_radius: self.normalization.radius,
            changed_per_iteration: self.changed_per_iteration.clone(),
            state: self.state,
            live_clusters: diagnostics::live_cluster_count(&self.labels, self.centers.len()),
            unassigned_pixels: self.labels.unassigned_count(),
        }
    }

    /// Sanitized config for this run.
    #[must_use]
    pub const fn config(&self) -> &SlicConfig {
        &self.config
    }

    /// Window radius and distance normalization.
    #[must_use]
    pub const fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    /// Number of clusters. Fixed at seeding.
    #[must_use]
    pub fn num_superpixels(&self) -> usize {
        self.centers.len()
    }

    /// Current cluster centers.
    #[must_use]
    pub fn centers(&self) -> &[ClusterCenter] {
        &self.centers
    }

    /// Tentative means from the latest assignment pass (`None` for a
    /// cluster that accumulated no pixel).
    #[must_use]
    pub fn tentative_means(&self) -> &[Option<ClusterCenter>] {
        &self.tentative
    }

    /// Current label grid.
    #[must_use]
    pub const fn labels(&self) -> &LabelGrid {
        &self.labels
    }

    /// Current distance grid.
    #[must_use]
    pub const fn distances(&self) -> &DistanceGrid {
        &self.distances
    }

    /// Current loop state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }
}
