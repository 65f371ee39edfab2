//! Radial-falloff height field synthesis.
//!
//! Samples coherent noise over the grid and scales it by a radial factor
//! that is 1 at the centre and 0 at half the grid width, so the terrain
//! rises as an island and settles to its base elevation toward the edges.
//! Past the falloff radius the factor goes negative and the stored height
//! flattens to zero.

use tracing::debug;

use crate::grid::HeightGrid;
use crate::noise_source::NoiseSource;
use crate::seed::{SeedPair, det_pow, det_sqrt};

/// Configuration for height field synthesis.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// Number of noise cells spanned by the whole grid. Default: 4.0.
    pub tile_scale: f32,
    /// Height of the tallest hill in terrain units. Default: 300.0.
    pub max_height: f32,
    /// Base elevation in terrain units. Default: 0.0.
    pub min_height: f32,
    /// Rows at each edge left untouched. Default: 0.
    pub margin_x: usize,
    /// Columns at each edge left untouched. Default: 0.
    pub margin_y: usize,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            tile_scale: 4.0,
            max_height: 300.0,
            min_height: 0.0,
            margin_x: 0,
            margin_y: 0,
        }
    }
}

/// Builds square elevation grids from noise and a radial falloff.
#[derive(Debug, Default)]
pub struct HeightSynthesizer {
    noise: NoiseSource,
    params: HeightmapParams,
}

impl HeightSynthesizer {
    /// Create a synthesizer with the given parameters.
    pub fn new(params: HeightmapParams) -> Self {
        Self {
            noise: NoiseSource::default(),
            params,
        }
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }

    /// Radial falloff factor for cell `(row, col)` of a grid with
    /// `resolution` samples per side.
    ///
    /// Not clamped: cells farther than half the grid width from the centre
    /// get a negative factor.
    pub fn radial_factor(resolution: usize, row: usize, col: usize) -> f32 {
        let half = resolution as f32 / 2.0;
        let dr = half - row as f32;
        let dc = half - col as f32;
        let distance = det_sqrt(det_pow(dr.abs(), 2.0) + det_pow(dc.abs(), 2.0));
        1.0 - distance / (0.5 * resolution as f32)
    }

    /// Fill `grid` with synthesized heights for `seed`.
    ///
    /// Cells within the margins keep whatever value they already hold.
    /// Identical inputs produce bit-identical grids.
    pub fn synthesize(&self, grid: &mut HeightGrid, seed: SeedPair) {
        let resolution = grid.resolution();
        let res = resolution as f32;
        let half = res / 2.0;
        let height_range = (self.params.max_height - self.params.min_height) / half;
        let base_height = self.params.min_height / half;
        let tile = self.params.tile_scale;

        let rows = self.params.margin_x..resolution.saturating_sub(self.params.margin_x);
        let cols = self.params.margin_y..resolution.saturating_sub(self.params.margin_y);

        for row in rows {
            for col in cols.clone() {
                let radial = Self::radial_factor(resolution, row, col);
                let nx = (row as f32 + seed.x as f32) / res * tile;
                let ny = (col as f32 + seed.y as f32) / res * tile;
                let height = base_height + radial * (self.noise.sample(nx, ny) * height_range);
                grid.set(row, col, height);
            }
        }

        debug!(
            resolution,
            seed_x = seed.x,
            seed_y = seed.y,
            "synthesized height field"
        );
    }
}
