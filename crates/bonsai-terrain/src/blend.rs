//! Height-driven ground-cover layer blending.
//!
//! Each alpha cell gets four weights from an ordered chain of rules. A rule
//! that fires overwrites the weights it names; it never adds to them, so
//! the chain is order-sensitive and the last rule to fire wins. Thresholds
//! are jittered with low-frequency noise so band edges are organic.

use crate::error::TerrainError;
use crate::grid::{HeightGrid, LayerWeightGrid};
use crate::noise_source::NoiseSource;
use crate::resource::TerrainResource;

/// Number of layers written by the blender.
pub const BLENDED_LAYERS: usize = 4;

/// Scaled-height cutoffs separating the ground-cover bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerCutoffs {
    /// Top of the lowland band (second layer). Default: 0.45.
    pub lowland: f32,
    /// Start of the rocky highland band (third layer). Default: 1.15.
    pub highland: f32,
    /// Shoreline; the sea-bottom layer lies below it. Default: 0.35.
    pub waterline: f32,
}

impl Default for LayerCutoffs {
    fn default() -> Self {
        Self {
            lowland: 0.45,
            highland: 1.15,
            waterline: 0.35,
        }
    }
}

/// One step of the blending chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendRule {
    /// First layer peaks at mid height.
    Base,
    /// Below the lowland cutoff the first layer is held at half strength.
    Lowland,
    /// Second layer in the band between shoreline and lowland cutoff.
    MidBand,
    /// Third layer above the highland cutoff, strongest on peaks.
    Highland,
    /// Fourth layer below the shoreline.
    Shore,
    /// Deep water: fourth layer at full strength, the others faded.
    DeepWater,
}

impl BlendRule {
    /// Rules in evaluation order.
    pub const CHAIN: [BlendRule; 6] = [
        BlendRule::Base,
        BlendRule::Lowland,
        BlendRule::MidBand,
        BlendRule::Highland,
        BlendRule::Shore,
        BlendRule::DeepWater,
    ];
}

/// Builds ground-cover weights from an elevation grid.
#[derive(Debug, Default)]
pub struct LayerBlender {
    noise: NoiseSource,
    cutoffs: LayerCutoffs,
    max_height: f32,
}

impl LayerBlender {
    /// Create a blender. `max_height` converts sampled elevation to the
    /// scaled height the cutoffs are expressed in.
    pub fn new(cutoffs: LayerCutoffs, max_height: f32) -> Self {
        Self {
            noise: NoiseSource::default(),
            cutoffs,
            max_height,
        }
    }

    pub fn cutoffs(&self) -> LayerCutoffs {
        self.cutoffs
    }

    #[inline]
    fn field(&self, row: usize, col: usize, divisor: f32) -> f32 {
        self.noise.sample(col as f32 / divisor, row as f32 / divisor)
    }

    #[inline]
    fn shifted(&self, row: usize, col: usize, offset: f32) -> f32 {
        self.noise.sample(col as f32 + offset, row as f32 + offset)
    }

    /// Apply one rule to the weights of cell `(row, col)`.
    pub fn apply_rule(
        &self,
        rule: BlendRule,
        scaled: f32,
        row: usize,
        col: usize,
        weights: &mut [f32; BLENDED_LAYERS],
    ) {
        let c = self.cutoffs;
        match rule {
            BlendRule::Base => {
                weights[0] = 1.0 - (scaled - 0.5).abs();
            }
            BlendRule::Lowland => {
                if scaled < c.lowland - 0.1 * self.field(row, col, 12.0) {
                    weights[0] = 0.5;
                }
            }
            BlendRule::MidBand => {
                if scaled < c.lowland + 0.2 * self.field(row, col, 20.0)
                    && scaled > c.waterline - 0.05 + 0.05 * self.field(row, col, 15.0)
                {
                    weights[1] = 1.0 - self.field(row, col, 8.0);
                }
            }
            BlendRule::Highland => {
                if scaled > c.highland - 0.3 * self.field(row, col, 10.0) {
                    weights[2] = (1.0 - self.shifted(row, col, 100.0)) * scaled.powi(3);
                }
            }
            BlendRule::Shore => {
                if scaled < c.waterline + 0.2 * self.field(row, col, 7.0) {
                    weights[3] = 1.0 - self.shifted(row, col, 50.0);
                }
            }
            BlendRule::DeepWater => {
                if scaled < c.waterline - 0.1 - 0.15 * self.field(row, col, 5.0) {
                    weights[0] = scaled - 0.05;
                    weights[1] = scaled - 0.05;
                    weights[2] = scaled - 0.05;
                    weights[3] = 1.0;
                }
            }
        }
    }

    /// Run the full chain for one cell at the given scaled height.
    pub fn blend_cell(&self, scaled: f32, row: usize, col: usize) -> [f32; BLENDED_LAYERS] {
        let mut weights = [0.0; BLENDED_LAYERS];
        for rule in BlendRule::CHAIN {
            self.apply_rule(rule, scaled, row, col, &mut weights);
        }
        weights
    }

    /// Rebuild every cell of `weights` from `heights`.
    ///
    /// `vertical_extent` converts normalized heights into terrain units
    /// before dividing by the blender's max height. Layers past the fourth
    /// are cleared. Scaled heights are not clamped.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::TooFewLayers`] if the grid has fewer than four
    /// layers.
    pub fn blend(
        &self,
        weights: &mut LayerWeightGrid,
        heights: &HeightGrid,
        vertical_extent: f32,
    ) -> Result<(), TerrainError> {
        let layers = weights.layers();
        if layers < BLENDED_LAYERS {
            return Err(TerrainError::TooFewLayers(layers));
        }
        let resolution = weights.resolution();
        let denom = resolution.saturating_sub(1).max(1) as f32;

        for row in 0..resolution {
            for col in 0..resolution {
                let u = col as f32 / denom;
                let v = row as f32 / denom;
                let height = heights.sample_bilinear(u, v) * vertical_extent;
                let scaled = height / self.max_height;

                let cell = self.blend_cell(scaled, row, col);
                for (layer, &w) in cell.iter().enumerate() {
                    weights.set(row, col, layer, w);
                }
                for layer in BLENDED_LAYERS..layers {
                    weights.set(row, col, layer, 0.0);
                }
            }
        }
        Ok(())
    }

    /// Rebuild a resource's weight grid from its own heights.
    ///
    /// # Errors
    ///
    /// See [`blend`](Self::blend).
    pub fn blend_resource(&self, resource: &mut TerrainResource) -> Result<(), TerrainError> {
        let extent = resource.size.y;
        self.blend(&mut resource.weights, &resource.heights, extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blender() -> LayerBlender {
        LayerBlender::new(LayerCutoffs::default(), 300.0)
    }

    #[test]
    fn test_mid_height_peaks_first_layer() {
        let weights = blender().blend_cell(0.5, 10, 10);
        assert!(
            (weights[0] - 1.0).abs() < 1e-6,
            "First layer should peak at mid height, got {}",
            weights[0]
        );
    }

    #[test]
    fn test_deep_water_overrides_earlier_rules() {
        let b = blender();
        for (row, col) in [(0, 0), (7, 3), (40, 90)] {
            let weights = b.blend_cell(0.0, row, col);
            assert_eq!(
                weights,
                [-0.05, -0.05, -0.05, 1.0],
                "Deep water must overwrite every layer at ({row}, {col})"
            );
        }
    }

    #[test]
    fn test_lowland_and_shore_below_cutoff() {
        let b = blender();
        for (row, col) in [(3, 5), (10, 2), (7, 7)] {
            let weights = b.blend_cell(0.28, row, col);
            assert_eq!(weights[0], 0.5, "Lowland holds first layer at half at ({row}, {col})");
            assert_eq!(weights[1], 0.0, "Mid band starts above the jittered shoreline");
            assert_eq!(weights[2], 0.0);
            assert_eq!(
                weights[3],
                1.0 - b.shifted(row, col, 50.0),
                "Shore layer expected at ({row}, {col})"
            );
        }
    }

    #[test]
    fn test_mid_band_between_shore_and_lowland() {
        let b = blender();
        for (row, col) in [(3, 5), (10, 2), (7, 7)] {
            let weights = b.blend_cell(0.40, row, col);
            assert_eq!(
                weights[1],
                1.0 - b.field(row, col, 8.0),
                "Second layer expected at ({row}, {col})"
            );
            assert_eq!(weights[2], 0.0);
        }
    }

    #[test]
    fn test_upland_keeps_base_weight_only() {
        let b = blender();
        for (row, col) in [(3, 5), (10, 2), (7, 7)] {
            let weights = b.blend_cell(0.70, row, col);
            assert!((weights[0] - 0.8).abs() < 1e-6, "got {}", weights[0]);
            assert_eq!(&weights[1..], &[0.0, 0.0, 0.0], "No other band at 0.7");
        }
    }

    #[test]
    fn test_highland_layer_only_on_peaks() {
        let b = blender();
        for row in 0..20 {
            for col in 0..20 {
                let low = b.blend_cell(0.6, row, col);
                assert_eq!(low[2], 0.0, "No rock at scaled height 0.6");
                let high = b.blend_cell(1.3, row, col);
                assert!(high[2] > 0.0, "Rock expected at scaled height 1.3");
                assert_eq!(high[3], 0.0, "No sea bottom on peaks");
            }
        }
    }

    #[test]
    fn test_rule_order_matters() {
        let b = blender();
        let mut forward = [0.0; BLENDED_LAYERS];
        for rule in BlendRule::CHAIN {
            b.apply_rule(rule, 0.0, 4, 4, &mut forward);
        }
        let mut reversed = [0.0; BLENDED_LAYERS];
        for rule in BlendRule::CHAIN.iter().rev() {
            b.apply_rule(*rule, 0.0, 4, 4, &mut reversed);
        }
        assert_ne!(forward, reversed, "Overwrite chain must not be commutative");
        assert_eq!(forward[3], 1.0);
    }

    #[test]
    fn test_blend_is_deterministic() {
        let mut heights = HeightGrid::new(33).unwrap();
        for row in 0..33 {
            for col in 0..33 {
                heights.set(row, col, (row * 33 + col) as f32 / 1089.0);
            }
        }
        let mut a = LayerWeightGrid::new(32, 4).unwrap();
        let mut b = LayerWeightGrid::new(32, 4).unwrap();
        blender().blend(&mut a, &heights, 300.0).unwrap();
        blender().blend(&mut b, &heights, 300.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_weights_not_normalized() {
        let mut heights = HeightGrid::new(9).unwrap();
        heights.fill(0.5);
        let mut weights = LayerWeightGrid::new(8, 4).unwrap();
        blender().blend(&mut weights, &heights, 300.0).unwrap();
        let sum: f32 = weights.cell(3, 3).iter().sum();
        assert!(sum > 0.0);
        assert!(
            weights.as_slice().iter().all(|&w| w >= 0.0),
            "Stored weights must be non-negative"
        );
    }

    #[test]
    fn test_extra_layers_cleared() {
        let heights = HeightGrid::new(5).unwrap();
        let mut weights = LayerWeightGrid::new(4, 6).unwrap();
        weights.set(1, 1, 5, 0.9);
        blender().blend(&mut weights, &heights, 300.0).unwrap();
        assert_eq!(weights.get(1, 1, 4), 0.0);
        assert_eq!(weights.get(1, 1, 5), 0.0);
        assert_eq!(weights.get(1, 1, 3), 1.0, "Flat zero terrain is deep water");
    }

    #[test]
    fn test_too_few_layers_rejected() {
        let heights = HeightGrid::new(5).unwrap();
        let mut weights = LayerWeightGrid::new(4, 3).unwrap();
        assert_eq!(
            blender().blend(&mut weights, &heights, 300.0),
            Err(TerrainError::TooFewLayers(3))
        );
    }
}
