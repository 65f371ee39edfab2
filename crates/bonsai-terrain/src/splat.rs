//! Local splat stamping around placed objects.
//!
//! A stamp's strength at a cell falls off with a power of the cell distance
//! from the stamp centre and is lifted by noise, giving ragged patches
//! rather than discs. Larger radii flatten the falloff exponent and widen
//! the patch.

use glam::Vec2;
use rand::Rng;

use crate::error::TerrainError;
use crate::grid::{DetailGrid, LayerWeightGrid};
use crate::noise_source::NoiseSource;
use crate::seed::{det_pow, det_sqrt};

const BASE_STRENGTH: f32 = 0.35;
const NOISE_LIFT: f32 = 0.7;
const NOISE_DIVISOR: f32 = 10.0;

/// Stamps ground-cover weight and detail density patches.
#[derive(Debug, Default)]
pub struct SplatStamper {
    noise: NoiseSource,
}

/// Cells a stamp can reach on one axis. `None` means the whole grid is in
/// range, either because the falloff never overcomes the noise lift or
/// because the bound is at least as wide as the grid.
fn reach(resolution: usize, radius: f32) -> Option<usize> {
    let exponent = 2.5 - radius * 0.25;
    if exponent <= 0.0 {
        return None;
    }
    let limit = (BASE_STRENGTH + NOISE_LIFT) * resolution as f32;
    let bound = det_pow(limit, 1.0 / exponent).ceil() + 1.0;
    if !bound.is_finite() || bound >= resolution as f32 {
        return None;
    }
    Some(bound as usize)
}

impl SplatStamper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp strength at `(row, col)` for a stamp centred on cell `centre`.
    /// Negative means the cell is outside the patch.
    pub fn magnitude(
        &self,
        row: usize,
        col: usize,
        centre: (i64, i64),
        radius: f32,
        resolution: usize,
    ) -> f32 {
        let dr = row as f32 - centre.0 as f32;
        let dc = col as f32 - centre.1 as f32;
        let distance = det_sqrt(dr * dr + dc * dc);
        BASE_STRENGTH - det_pow(distance, 2.5 - radius * 0.25) / resolution as f32
            + NOISE_LIFT
                * self
                    .noise
                    .sample(col as f32 / NOISE_DIVISOR, row as f32 / NOISE_DIVISOR)
    }

    /// Iterate the cells a stamp at `at` may touch, as `(row, col)`.
    fn cells(
        resolution: usize,
        at: Vec2,
        radius: f32,
    ) -> ((i64, i64), impl Iterator<Item = (usize, usize)>) {
        let centre = (
            (at.y * resolution as f32) as i64,
            (at.x * resolution as f32) as i64,
        );
        let (rows, cols) = match reach(resolution, radius) {
            Some(r) => {
                let r = r as i64;
                let clip = |c: i64| {
                    let lo = (c - r).clamp(0, resolution as i64) as usize;
                    let hi = (c + r + 1).clamp(0, resolution as i64) as usize;
                    lo..hi
                };
                (clip(centre.0), clip(centre.1))
            }
            None => (0..resolution, 0..resolution),
        };
        let iter = rows.flat_map(move |row| cols.clone().map(move |col| (row, col)));
        (centre, iter)
    }

    /// Paint `layer` into the weight grid around planar position `at`,
    /// taking the same amount away from every other layer.
    ///
    /// Returns the number of cells changed.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MissingLayer`] if `layer` is out of range.
    pub fn stamp_layer(
        &self,
        weights: &mut LayerWeightGrid,
        layer: usize,
        at: Vec2,
        radius: f32,
    ) -> Result<usize, TerrainError> {
        let layers = weights.layers();
        if layer >= layers {
            return Err(TerrainError::MissingLayer { index: layer, len: layers });
        }
        let resolution = weights.resolution();
        let gain = 0.6 + radius * 0.1;
        let (centre, cells) = Self::cells(resolution, at, radius);

        let mut touched = 0;
        for (row, col) in cells {
            let magnitude = self.magnitude(row, col, centre, radius, resolution);
            if magnitude < 0.0 {
                continue;
            }
            for z in 0..layers {
                let delta = magnitude * gain;
                weights.add(row, col, z, if z == layer { delta } else { -delta });
            }
            touched += 1;
        }
        Ok(touched)
    }

    /// Scatter detail decorations around `at`: every cell inside the patch
    /// gains one decoration with chance `probability`.
    ///
    /// Returns the number of decorations added.
    pub fn stamp_details(
        &self,
        grid: &mut DetailGrid,
        at: Vec2,
        radius: f32,
        probability: f32,
        rng: &mut impl Rng,
    ) -> u32 {
        let resolution = grid.resolution();
        let (centre, cells) = Self::cells(resolution, at, radius);

        let mut added = 0;
        for (row, col) in cells {
            if self.magnitude(row, col, centre, radius, resolution) >= 0.0
                && rng.random::<f32>() < probability
            {
                grid.increment(row, col);
                added += 1;
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_reach_covers_every_positive_cell() {
        let stamper = SplatStamper::new();
        let resolution = 64;
        for radius in [1.0, 2.0, 3.0, 4.5] {
            let r = reach(resolution, radius).unwrap();
            let centre = (32, 32);
            for row in 0..resolution {
                for col in 0..resolution {
                    let far = (row as i64 - 32).abs() > r as i64 || (col as i64 - 32).abs() > r as i64;
                    if far {
                        assert!(
                            stamper.magnitude(row, col, centre, radius, resolution) < 0.0,
                            "Cell ({row}, {col}) outside reach must be outside the patch"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_huge_radius_spans_grid() {
        assert_eq!(reach(64, 10.0), None);
        assert_eq!(reach(64, 12.0), None);
    }

    #[test]
    fn test_near_flat_falloff_spans_grid() {
        assert_eq!(reach(128, 9.9), None, "Near-zero exponent must not overflow");
        assert_eq!(reach(128, 9.99), None);
        assert_eq!(reach(8, 6.0), None, "Bound wider than a small grid");
    }

    #[test]
    fn test_near_flat_falloff_stamps_without_overflow() {
        let stamper = SplatStamper::new();
        let mut weights = LayerWeightGrid::new(128, 4).unwrap();
        let touched = stamper
            .stamp_layer(&mut weights, 1, Vec2::splat(0.5), 9.9)
            .unwrap();
        assert!(touched >= 1, "Wide stamp must touch at least its centre");
        assert!(weights.get(64, 64, 1) > 0.0, "Centre must gain the target layer");

        let mut grid = DetailGrid::new(128).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let added = stamper.stamp_details(&mut grid, Vec2::splat(0.5), 9.9, 1.0, &mut rng);
        assert!(added >= 1);
        assert_eq!(grid.get(64, 64), 1, "Centre must be decorated");
    }

    #[test]
    fn test_stamp_layer_raises_target_and_lowers_others() {
        let mut weights = LayerWeightGrid::new(32, 4).unwrap();
        for row in 0..32 {
            for col in 0..32 {
                for layer in 0..4 {
                    weights.set(row, col, layer, 0.5);
                }
            }
        }
        let touched = SplatStamper::new()
            .stamp_layer(&mut weights, 2, Vec2::new(0.5, 0.5), 2.0)
            .unwrap();
        assert!(touched > 0);
        assert!(weights.get(16, 16, 2) > 0.5, "Target layer must gain weight");
        assert!(weights.get(16, 16, 0) < 0.5, "Other layers must lose weight");
        assert_eq!(weights.get(0, 0, 2), 0.5, "Far corner must be untouched");
        assert!(weights.as_slice().iter().all(|&w| w >= 0.0));
    }

    #[test]
    fn test_stamp_layer_rejects_missing_layer() {
        let mut weights = LayerWeightGrid::new(8, 4).unwrap();
        let err = SplatStamper::new()
            .stamp_layer(&mut weights, 4, Vec2::splat(0.5), 1.0)
            .unwrap_err();
        assert_eq!(err, TerrainError::MissingLayer { index: 4, len: 4 });
    }

    #[test]
    fn test_stamp_details_only_increments_near_centre() {
        let mut grid = DetailGrid::new(64).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let added = SplatStamper::new().stamp_details(
            &mut grid,
            Vec2::new(0.25, 0.75),
            3.0,
            1.0,
            &mut rng,
        );
        assert!(added > 0);
        assert_eq!(grid.total(), added as u64);
        assert_eq!(grid.get(48, 16), 1, "Stamp centre must be decorated");
        assert_eq!(grid.get(0, 63), 0, "Far corner must stay empty");
    }

    #[test]
    fn test_zero_probability_adds_nothing() {
        let mut grid = DetailGrid::new(32).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let added =
            SplatStamper::new().stamp_details(&mut grid, Vec2::splat(0.5), 2.0, 0.0, &mut rng);
        assert_eq!(added, 0);
        assert_eq!(grid.total(), 0);
    }
}
