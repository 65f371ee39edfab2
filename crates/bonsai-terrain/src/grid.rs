//! Square grids backing a terrain resource.
//!
//! All grids are row-major with rows running along the terrain's depth (z)
//! axis and columns along its width (x) axis. Planar positions are given in
//! normalized `[0, 1]` coordinates `(u, v) = (x / width, z / depth)`.

use crate::error::TerrainError;

/// Square elevation grid with values normalized to `[0, 1]` of the terrain's
/// vertical extent.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    resolution: usize,
    data: Vec<f32>,
}

impl HeightGrid {
    /// Create a flat (all zero) grid of `resolution × resolution` samples.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ZeroResolution`] for a zero resolution.
    pub fn new(resolution: usize) -> Result<Self, TerrainError> {
        if resolution == 0 {
            return Err(TerrainError::ZeroResolution { grid: "height" });
        }
        Ok(Self {
            resolution,
            data: vec![0.0; resolution * resolution],
        })
    }

    /// Samples per side.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Normalized height at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.resolution + col]
    }

    /// Store a height, clamping it into `[0, 1]`.
    ///
    /// Synthesized values below zero (past the radial falloff) flatten to the
    /// base of the terrain here.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.data[row * self.resolution + col] = value.clamp(0.0, 1.0);
    }

    /// Set every sample to `value` (clamped into `[0, 1]`).
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value.clamp(0.0, 1.0));
    }

    /// Raw samples in row-major order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Bilinearly interpolated normalized height at planar `(u, v)`.
    ///
    /// Coordinates outside `[0, 1]` are clamped to the grid edge.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> f32 {
        if self.resolution == 1 {
            return self.data[0];
        }
        let max = (self.resolution - 1) as f32;
        let fx = u.clamp(0.0, 1.0) * max;
        let fz = v.clamp(0.0, 1.0) * max;
        let col = (fx.floor() as usize).min(self.resolution - 2);
        let row = (fz.floor() as usize).min(self.resolution - 2);
        let tx = fx - col as f32;
        let tz = fz - row as f32;

        let h00 = self.get(row, col);
        let h01 = self.get(row, col + 1);
        let h10 = self.get(row + 1, col);
        let h11 = self.get(row + 1, col + 1);
        let near = h00 + (h01 - h00) * tx;
        let far = h10 + (h11 - h10) * tx;
        near + (far - near) * tz
    }
}

/// Per-cell blend weights for the ground-cover layers.
///
/// Weights are never normalized per cell; they are only kept non-negative.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerWeightGrid {
    resolution: usize,
    layers: usize,
    data: Vec<f32>,
}

impl LayerWeightGrid {
    /// Create an all-zero weight grid.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ZeroResolution`] for a zero resolution.
    pub fn new(resolution: usize, layers: usize) -> Result<Self, TerrainError> {
        if resolution == 0 {
            return Err(TerrainError::ZeroResolution { grid: "alpha" });
        }
        Ok(Self {
            resolution,
            layers,
            data: vec![0.0; resolution * resolution * layers],
        })
    }

    /// Cells per side.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Number of ground-cover layers per cell.
    pub fn layers(&self) -> usize {
        self.layers
    }

    #[inline]
    fn index(&self, row: usize, col: usize, layer: usize) -> usize {
        (row * self.resolution + col) * self.layers + layer
    }

    /// Weight of `layer` at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize, layer: usize) -> f32 {
        self.data[self.index(row, col, layer)]
    }

    /// Set a weight; negative values are stored as zero.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, layer: usize, value: f32) {
        let i = self.index(row, col, layer);
        self.data[i] = value.max(0.0);
    }

    /// Add `delta` to a weight, never going below zero.
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, layer: usize, delta: f32) {
        let i = self.index(row, col, layer);
        self.data[i] = (self.data[i] + delta).max(0.0);
    }

    /// All weights of one cell.
    pub fn cell(&self, row: usize, col: usize) -> &[f32] {
        let start = self.index(row, col, 0);
        &self.data[start..start + self.layers]
    }

    /// Raw weights, `layers` consecutive values per cell, cells row-major.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Per-cell counters of stamped detail decorations for one detail layer.
///
/// Counters only ever increase.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailGrid {
    resolution: usize,
    data: Vec<u32>,
}

impl DetailGrid {
    /// Create an empty density grid.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ZeroResolution`] for a zero resolution.
    pub fn new(resolution: usize) -> Result<Self, TerrainError> {
        if resolution == 0 {
            return Err(TerrainError::ZeroResolution { grid: "detail" });
        }
        Ok(Self {
            resolution,
            data: vec![0; resolution * resolution],
        })
    }

    /// Cells per side.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Decorations stamped into `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.data[row * self.resolution + col]
    }

    /// Stamp one more decoration into `(row, col)`.
    #[inline]
    pub fn increment(&mut self, row: usize, col: usize) {
        let cell = &mut self.data[row * self.resolution + col];
        *cell = cell.saturating_add(1);
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.data.iter().map(|&c| c as u64).sum()
    }

    /// Raw counters in row-major order.
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }
}
