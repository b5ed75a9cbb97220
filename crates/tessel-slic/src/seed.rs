//! Seed placement, seed perturbation, and the distance normalization.
//!
//! Seeds sit on a regular grid with spacing equal to the configured
//! superpixel size, offset by half a cell. Each seed is then moved to
//! the lowest-gradient pixel of its 3x3 neighborhood so it does not
//! start on an edge or a noisy pixel. The seed count fixed here is the
//! cluster count for the whole run.

use serde::{Deserialize, Serialize};

use crate::field::ColorField;
use crate::gradient::GradientField;
use crate::types::{ClusterCenter, Dimensions};

/// Constants that make color and spatial distances commensurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    /// Expected cluster radius `S`: the half-width of every search
    /// window (a lone cluster searches the whole image).
    pub radius: u32,
    /// `1 / color_weight²`.
    pub color: f32,
    /// `1 / S²`.
    pub spatial: f32,
}

impl Normalization {
    /// Derive `S` and both normalization factors.
    ///
    /// `seed_count` must be non-zero; [`place_seeds`] always yields at
    /// least one seed for a non-empty field.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn new(dimensions: Dimensions, seed_count: usize, color_weight: f32) -> Self {
        let per_seed = dimensions.pixel_count() as f64 / seed_count.max(1) as f64;
        let radius = (per_seed.sqrt().ceil() as u32).max(1);

        Self {
            radius,
            color: 1.0 / (color_weight * color_weight),
            spatial: 1.0 / (f64::from(radius) * f64::from(radius)) as f32,
        }
    }

    /// Joint color + spatial distance between `center` and the pixel at
    /// `(x, y)` with sample `color`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
    pub fn distance(&self, center: &ClusterCenter, x: u32, y: u32, color: [u8; 3]) -> f32 {
        let color_sq = center.color_distance_squared(color) as f32;
        let spatial_sq = center.spatial_distance_squared(x, y) as f32;
        self.color * color_sq + self.spatial * spatial_sq
    }
}

/// Grid coordinates along one axis of length `len`.
///
/// Starts at `step / 2` and advances by `step`. When the axis is too
/// short for the first offset, the single seed on that axis sits on the
/// last pixel instead, so a non-empty axis always yields at least one
/// position.
#[must_use]
pub fn axis_positions(len: u32, step: u32) -> Vec<u32> {
    if len == 0 {
        return Vec::new();
    }
    let step = step.max(1);
    let start = (step / 2).min(len - 1);
    (start..len).step_by(step as usize).collect()
}

/// Place one unperturbed seed at every grid point, in raster order.
#[must_use]
pub fn place_seeds(field: &ColorField, superpixel_size: u32) -> Vec<ClusterCenter> {
    let xs = axis_positions(field.width(), superpixel_size);
    let ys = axis_positions(field.height(), superpixel_size);

    ys.iter()
        .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
        .map(|(x, y)| ClusterCenter::new(x, y, field.color(x, y)))
        .collect()
}

/// Move each seed to the lowest-gradient pixel of its edge-clamped 3x3
/// neighborhood and resample its color there.
///
/// The seed's own gradient is the starting minimum and only a strictly
/// smaller value moves it, so ties resolve to the earliest pixel in
/// raster order and a flat neighborhood leaves the seed in place.
pub fn perturb(seeds: &mut [ClusterCenter], field: &ColorField, gradient: &GradientField) {
    let (w, h) = (field.width(), field.height());

    for seed in seeds.iter_mut() {
        let mut best = (seed.x, seed.y);
        let mut min = gradient.at(seed.x, seed.y);

        let xs = seed.x.saturating_sub(1);
        let xe = (seed.x + 2).min(w);
        let ys = seed.y.saturating_sub(1);
        let ye = (seed.y + 2).min(h);

        for y in ys..ye {
            for x in xs..xe {
                let g = gradient.at(x, y);
                if g < min {
                    min = g;
                    best = (x, y);
                }
            }
        }

        let (x, y) = best;
        *seed = ClusterCenter::new(x, y, field.color(x, y));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn axis_positions_step_from_half_cell() {
        assert_eq!(axis_positions(100, 30), vec![15, 45, 75]);
        assert_eq!(axis_positions(70, 30), vec![15, 45]);
        assert_eq!(axis_positions(46, 30), vec![15, 45]);
        assert_eq!(axis_positions(45, 30), vec![15]);
    }

    #[test]
    fn axis_positions_short_axis_gets_one_seed() {
        assert_eq!(axis_positions(1, 30), vec![0]);
        assert_eq!(axis_positions(10, 30), vec![9]);
        assert_eq!(axis_positions(15, 30), vec![14]);
        assert_eq!(axis_positions(16, 30), vec![15]);
    }

    #[test]
    fn axis_positions_empty_axis() {
        assert!(axis_positions(0, 30).is_empty());
    }

    #[test]
    fn axis_positions_unit_step_covers_every_pixel() {
        assert_eq!(axis_positions(4, 1), vec![0, 1, 2, 3]);
    }

    #[test]
    fn place_seeds_is_raster_ordered_grid() {
        let field = ColorField::uniform(100, 70, [1, 2, 3]).unwrap();
        let seeds = place_seeds(&field, 30);
        let positions: Vec<_> = seeds.iter().map(|s| (s.x, s.y)).collect();
        assert_eq!(
            positions,
            vec![(15, 15), (45, 15), (75, 15), (15, 45), (45, 45), (75, 45)]
        );
        assert!(seeds.iter().all(|s| s.color == [1, 2, 3]));
    }

    #[test]
    fn place_seeds_single_pixel_image() {
        let field = ColorField::uniform(1, 1, [0, 0, 0]).unwrap();
        let seeds = place_seeds(&field, 30);
        assert_eq!(seeds, vec![ClusterCenter::new(0, 0, [0, 0, 0])]);
    }

    #[test]
    fn normalization_radius_matches_cell_area() {
        // 7000 px / 6 seeds = 1166.7 px per seed -> S = ceil(34.16) = 35.
        let norm = Normalization::new(Dimensions::new(100, 70), 6, 20.0);
        assert_eq!(norm.radius, 35);
        assert!((norm.color - 1.0 / 400.0).abs() < f32::EPSILON);
        assert!((norm.spatial - 1.0 / 1225.0).abs() < f32::EPSILON);
    }

    #[test]
    fn normalization_exact_square_cells() {
        let norm = Normalization::new(Dimensions::new(8, 8), 4, 10.0);
        assert_eq!(norm.radius, 4);
    }

    #[test]
    fn distance_combines_both_terms() {
        let norm = Normalization {
            radius: 2,
            color: 0.5,
            spatial: 0.25,
        };
        let center = ClusterCenter::new(1, 1, [10, 10, 10]);
        // color: 0.5 * (4 + 0 + 0), spatial: 0.25 * (9 + 16)
        let d = norm.distance(&center, 4, 5, [12, 10, 10]);
        assert!((d - 8.25).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn distance_rounds_each_product_separately() {
        let norm = Normalization::new(Dimensions::new(7, 3), 1, 3.0);
        let center = ClusterCenter::new(0, 0, [0, 0, 0]);
        let d = norm.distance(&center, 2, 1, [1, 1, 1]);
        let expected = norm.color * 3.0 + norm.spatial * 5.0;
        assert_eq!(d.to_bits(), expected.to_bits());
    }

    #[test]
    fn distance_to_own_pixel_is_zero() {
        let norm = Normalization::new(Dimensions::new(10, 10), 1, 20.0);
        let center = ClusterCenter::new(3, 7, [50, 60, 70]);
        assert!(norm.distance(&center, 3, 7, [50, 60, 70]).abs() < f32::EPSILON);
    }

    #[test]
    fn perturb_leaves_seed_on_flat_neighborhood() {
        let field = ColorField::uniform(30, 30, [80, 128, 128]).unwrap();
        let gradient = GradientField::laplacian(&field);
        let mut seeds = place_seeds(&field, 30);
        perturb(&mut seeds, &field, &gradient);
        assert_eq!(seeds, vec![ClusterCenter::new(15, 15, [80, 128, 128])]);
    }

    #[test]
    fn perturb_moves_off_dark_spot_to_first_minimum() {
        // A dark pixel under the seed: its Laplacian is +4d, each of its
        // 4-neighbors is -d. The first of those in raster order is the
        // pixel directly above.
        let mut samples = vec![100u8; 30 * 30 * 3];
        samples[(15 * 30 + 15) * 3] = 60;
        let field = ColorField::from_raw(30, 30, samples).unwrap();
        let gradient = GradientField::laplacian(&field);

        let mut seeds = place_seeds(&field, 30);
        assert_eq!(seeds[0].color, [60, 100, 100]);
        perturb(&mut seeds, &field, &gradient);
        assert_eq!(seeds, vec![ClusterCenter::new(15, 14, [100, 100, 100])]);
    }

    #[test]
    fn perturb_uses_supplied_gradient() {
        let field = ColorField::uniform(3, 3, [10, 20, 30]).unwrap();
        let mut values = vec![0.0; 9];
        values[8] = -1.0; // bottom-right corner
        let gradient = GradientField::from_raw(field.dimensions(), values).unwrap();

        let mut seeds = vec![ClusterCenter::new(1, 1, [10, 20, 30])];
        perturb(&mut seeds, &field, &gradient);
        assert_eq!((seeds[0].x, seeds[0].y), (2, 2));
    }

    #[test]
    fn perturb_clamps_at_image_corner() {
        let field = ColorField::uniform(2, 2, [0, 0, 0]).unwrap();
        let gradient =
            GradientField::from_raw(field.dimensions(), vec![0.0, -1.0, -1.0, -2.0]).unwrap();
        let mut seeds = vec![ClusterCenter::new(0, 0, [0, 0, 0])];
        perturb(&mut seeds, &field, &gradient);
        assert_eq!((seeds[0].x, seeds[0].y), (1, 1));
    }
}
