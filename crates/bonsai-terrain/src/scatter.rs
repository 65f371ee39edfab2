//! Clustered object placement with underwater reclassification.
//!
//! A primary pass scatters a handful of objects in a small disc around an
//! anchor. Each primary object gets three groups of smaller decorations
//! (detail pass, which never recurses) and a local ground-cover and detail
//! density stamp. Objects that land below the waterline are swapped for
//! aquatic variants.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::TerrainError;
use crate::resource::{ObjectInstance, PrototypeCatalog, TerrainResource};
use crate::seed::det_sqrt;
use crate::splat::SplatStamper;

/// Coarse magnitude of a deposit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeClass {
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    /// 1 for small through 3 for large.
    pub fn magnitude(self) -> i32 {
        self as i32
    }

    /// Zero-based slot for per-size tallies.
    pub fn slot(self) -> usize {
        self as usize - 1
    }
}

impl TryFrom<i32> for SizeClass {
    type Error = TerrainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SizeClass::Small),
            2 => Ok(SizeClass::Medium),
            3 => Ok(SizeClass::Large),
            other => Err(TerrainError::InvalidSizeClass(other)),
        }
    }
}

/// Whether a scatter call is a primary placement or a nested decoration
/// group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScatterPass {
    /// Places primary objects, their decorations and local stamps.
    Primary,
    /// Places decorations only.
    Detail,
}

/// Catalog indices the placer draws on.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterPalette {
    /// Object prototypes with an index above this are inorganic.
    pub last_organic: usize,
    /// Primary prototypes for organic deposits.
    pub organic_primaries: [usize; 3],
    /// Primary prototypes for inorganic deposits.
    pub inorganic_primaries: [usize; 3],
    /// Decoration prototypes around organic objects.
    pub organic_details: [usize; 3],
    /// Decoration prototypes around inorganic objects.
    pub inorganic_details: [usize; 3],
    /// Tide-zone and deep-water object prototypes.
    pub aquatic: [usize; 2],
    /// Ground-cover layer painted around organic objects.
    pub grass_layer: usize,
    /// Ground-cover layer painted around inorganic objects.
    pub rock_layer: usize,
    /// Ground-cover layer painted around underwater objects.
    pub sea_grass_layer: usize,
    /// Detail layer stamped around organic objects.
    pub organic_detail_layer: usize,
    /// Detail layer stamped around inorganic objects.
    pub inorganic_detail_layer: usize,
    /// Detail layer stamped around underwater objects.
    pub aquatic_detail_layer: usize,
}

impl Default for ScatterPalette {
    fn default() -> Self {
        Self {
            last_organic: 2,
            organic_primaries: [0, 1, 2],
            inorganic_primaries: [3, 4, 5],
            organic_details: [6, 7, 8],
            inorganic_details: [9, 10, 11],
            aquatic: [12, 13],
            grass_layer: 1,
            rock_layer: 2,
            sea_grass_layer: 3,
            organic_detail_layer: 0,
            inorganic_detail_layer: 1,
            aquatic_detail_layer: 2,
        }
    }
}

impl ScatterPalette {
    /// Whether `prototype_index` falls in the inorganic band.
    pub fn is_inorganic(&self, prototype_index: usize) -> bool {
        prototype_index > self.last_organic
    }

    /// Primary prototype for a deposit of the given kind; `choice` wraps
    /// around the three slots.
    pub fn primary(&self, is_organic: bool, choice: usize) -> usize {
        let slots = if is_organic {
            &self.organic_primaries
        } else {
            &self.inorganic_primaries
        };
        slots[choice % slots.len()]
    }

    /// Check every index against the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first missing prototype, layer or detail layer.
    pub fn validate(&self, catalog: &PrototypeCatalog) -> Result<(), TerrainError> {
        for &index in self
            .organic_primaries
            .iter()
            .chain(&self.inorganic_primaries)
            .chain(&self.organic_details)
            .chain(&self.inorganic_details)
            .chain(&self.aquatic)
        {
            catalog.require_object(index)?;
        }
        for index in [self.grass_layer, self.rock_layer, self.sea_grass_layer] {
            catalog.require_layer(index)?;
        }
        for index in [
            self.organic_detail_layer,
            self.inorganic_detail_layer,
            self.aquatic_detail_layer,
        ] {
            catalog.require_detail(index)?;
        }
        Ok(())
    }
}

/// Placement tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterConfig {
    /// Elevation below which objects become aquatic. Default: 3.3.
    pub waterline: f32,
    /// Elevation below which the deep-water variant may be chosen. Default: 2.0.
    pub deep_water: f32,
    /// Chance of the deep-water variant below `deep_water`. Default: 0.5.
    pub deep_variant_chance: f32,
    /// Per-cell chance of a detail decoration inside a stamp. Default: 0.1.
    pub detail_density: f32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            waterline: 3.3,
            deep_water: 2.0,
            deep_variant_chance: 0.5,
            detail_density: 0.1,
        }
    }
}

/// What one placement call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScatterOutcome {
    /// Object instances appended, decorations included.
    pub instances_added: usize,
    /// Primary objects reclassified as aquatic.
    pub aquatic_primaries: u32,
    /// Detail decorations stamped into density grids.
    pub decorations_added: u32,
    /// Ground-cover cells repainted.
    pub cells_painted: usize,
}

impl ScatterOutcome {
    /// Whether any primary object was placed underwater.
    pub fn aquatic_placed(&self) -> bool {
        self.aquatic_primaries > 0
    }
}

/// Roll an integer in `min..max`, or `min` when the range is empty.
fn roll_count(rng: &mut impl Rng, min: i32, max: i32) -> usize {
    let n = if max > min {
        rng.random_range(min..max)
    } else {
        min
    };
    n.max(0) as usize
}

/// Places object clusters onto a terrain resource.
#[derive(Debug)]
pub struct ScatterPlacer {
    palette: ScatterPalette,
    config: ScatterConfig,
    stamper: SplatStamper,
    rng: ChaCha8Rng,
}

impl ScatterPlacer {
    /// Create a placer drawing randomness from `rng`.
    pub fn new(palette: ScatterPalette, config: ScatterConfig, rng: ChaCha8Rng) -> Self {
        Self {
            palette,
            config,
            stamper: SplatStamper::new(),
            rng,
        }
    }

    pub fn palette(&self) -> &ScatterPalette {
        &self.palette
    }

    pub fn config(&self) -> &ScatterConfig {
        &self.config
    }

    /// Number of primary objects for a deposit: fewer, larger objects for
    /// larger size classes; inorganic small and medium deposits produce
    /// twice as many.
    pub fn primary_count(&mut self, size: SizeClass, prototype_index: usize) -> usize {
        let s = size.magnitude();
        let (mut min, mut max) = (4 - s, 7 - 2 * s);
        if self.palette.is_inorganic(prototype_index) && size != SizeClass::Large {
            min *= 2;
            max *= 2;
        }
        roll_count(&mut self.rng, min, max)
    }

    /// Base scale of primary objects.
    pub fn primary_scale(&self, size: SizeClass, prototype_index: usize) -> f32 {
        let scale = 0.1 * (size.magnitude() * 2) as f32;
        if self.palette.is_inorganic(prototype_index) && size == SizeClass::Large {
            scale * 2.0
        } else {
            scale
        }
    }

    /// Scatter objects of `prototype_index` around `anchor` (normalized
    /// planar coordinates) within a disc of diameter `radius`.
    ///
    /// A primary pass also places decorations and stamps ground cover and
    /// detail density around every object it places.
    ///
    /// # Errors
    ///
    /// Returns a [`TerrainError`] if the prototype or any palette entry is
    /// missing from the resource's catalog. Nothing is placed in that case.
    pub fn place(
        &mut self,
        resource: &mut TerrainResource,
        anchor: Vec2,
        size: SizeClass,
        prototype_index: usize,
        radius: f32,
        pass: ScatterPass,
    ) -> Result<ScatterOutcome, TerrainError> {
        resource.catalog().require_object(prototype_index)?;
        self.palette.validate(resource.catalog())?;

        let (count, scale) = match pass {
            ScatterPass::Primary => (
                self.primary_count(size, prototype_index),
                self.primary_scale(size, prototype_index),
            ),
            ScatterPass::Detail => self.detail_group(size),
        };

        let mut outcome = ScatterOutcome::default();
        self.scatter(
            resource,
            anchor,
            count,
            prototype_index,
            scale,
            radius,
            size,
            pass,
            &mut outcome,
        )?;

        debug!(
            prototype_index,
            size = size.magnitude(),
            instances = outcome.instances_added,
            aquatic = outcome.aquatic_primaries,
            "scattered objects"
        );
        Ok(outcome)
    }

    fn detail_group(&mut self, size: SizeClass) -> (usize, f32) {
        let s = size.magnitude();
        (roll_count(&mut self.rng, s - 1, s + 1), 0.05)
    }

    fn jitter(&mut self, radius: f32) -> Vec2 {
        if radius <= 0.0 {
            return Vec2::ZERO;
        }
        let angle = self.rng.random_range(0.0..TAU);
        let distance = det_sqrt(self.rng.random::<f32>()) * radius * 0.5;
        Vec2::new(libm::cosf(angle), libm::sinf(angle)) * distance
    }

    #[allow(clippy::too_many_arguments)]
    fn scatter(
        &mut self,
        resource: &mut TerrainResource,
        anchor: Vec2,
        count: usize,
        prototype_index: usize,
        scale: f32,
        radius: f32,
        size: SizeClass,
        pass: ScatterPass,
        outcome: &mut ScatterOutcome,
    ) -> Result<(), TerrainError> {
        let inorganic = self.palette.is_inorganic(prototype_index);

        for _ in 0..count {
            let planar = anchor + self.jitter(radius);
            let elevation = resource.sample_elevation(planar.x, planar.y);

            let mut instance = ObjectInstance {
                prototype_index,
                position: Vec3::new(planar.x, elevation, planar.y),
                rotation: 0.0,
                width_scale: scale + self.rng.random::<f32>() * 0.1,
                height_scale: scale + self.rng.random::<f32>() * 0.1,
            };
            instance.rotation = self.rng.random_range(0.0..TAU);

            let mut ground_layer = if inorganic {
                self.palette.rock_layer
            } else {
                self.palette.grass_layer
            };
            let mut detail_layer = if inorganic {
                self.palette.inorganic_detail_layer
            } else {
                self.palette.organic_detail_layer
            };

            if elevation < self.config.waterline {
                if pass == ScatterPass::Primary {
                    outcome.aquatic_primaries += 1;
                }
                instance.prototype_index = self.palette.aquatic[0];
                if elevation < self.config.deep_water
                    && self.rng.random::<f32>() < self.config.deep_variant_chance
                {
                    instance.prototype_index = self.palette.aquatic[1];
                }
                ground_layer = self.palette.sea_grass_layer;
                detail_layer = self.palette.aquatic_detail_layer;
            }

            resource.add_instance(instance);
            outcome.instances_added += 1;

            if pass == ScatterPass::Primary {
                let details = if inorganic {
                    self.palette.inorganic_details
                } else {
                    self.palette.organic_details
                };
                let detail_radius = 0.05 * size.magnitude() as f32;
                for detail in details {
                    let (n, detail_scale) = self.detail_group(size);
                    self.scatter(
                        resource,
                        planar,
                        n,
                        detail,
                        detail_scale,
                        detail_radius,
                        size,
                        ScatterPass::Detail,
                        outcome,
                    )?;
                }

                let magnitude = size.magnitude() as f32;
                outcome.cells_painted += self.stamper.stamp_layer(
                    &mut resource.weights,
                    ground_layer,
                    planar,
                    magnitude,
                )?;
                let grid = resource.detail_layer_mut(detail_layer)?;
                outcome.decorations_added += self.stamper.stamp_details(
                    grid,
                    planar,
                    magnitude * 1.5,
                    self.config.detail_density,
                    &mut self.rng,
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::tests::{small_descriptor, test_catalog};
    use crate::seed::{SeedPair, stream_rng};

    fn resource_at(height: f32) -> TerrainResource {
        let mut resource = TerrainResource::new(&small_descriptor(), test_catalog()).unwrap();
        resource.heights_mut().fill(height);
        resource
    }

    fn placer(config: ScatterConfig) -> ScatterPlacer {
        ScatterPlacer::new(
            ScatterPalette::default(),
            config,
            stream_rng(SeedPair::new(100, 100), "scatter"),
        )
    }

    fn certain_deep() -> ScatterConfig {
        ScatterConfig {
            deep_variant_chance: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_size_class_bounds() {
        assert_eq!(SizeClass::try_from(2), Ok(SizeClass::Medium));
        assert_eq!(SizeClass::try_from(0), Err(TerrainError::InvalidSizeClass(0)));
        assert_eq!(SizeClass::try_from(4), Err(TerrainError::InvalidSizeClass(4)));
        assert_eq!(SizeClass::Large.slot(), 2);
    }

    #[test]
    fn test_palette_roles() {
        let palette = ScatterPalette::default();
        assert_eq!(palette.primary(true, 4), 1);
        assert_eq!(palette.primary(false, 0), 3);
        assert!(palette.is_inorganic(3) && !palette.is_inorganic(2));
        assert!(palette.validate(&test_catalog()).is_ok());

        let broken = ScatterPalette {
            aquatic: [12, 40],
            ..Default::default()
        };
        assert_eq!(
            broken.validate(&test_catalog()),
            Err(TerrainError::MissingPrototype { index: 40, len: 14 }),
            "Aquatic slot beyond the catalog must be rejected"
        );

        let broken = ScatterPalette {
            inorganic_primaries: [3, 4, 20],
            ..Default::default()
        };
        assert_eq!(
            broken.validate(&test_catalog()),
            Err(TerrainError::MissingPrototype { index: 20, len: 14 }),
            "Every primary slot must be checked"
        );
    }

    #[test]
    fn test_counts_shrink_with_size() {
        let mut p = placer(ScatterConfig::default());
        for _ in 0..50 {
            let small = p.primary_count(SizeClass::Small, 0);
            assert!((3..=4).contains(&small), "small organic count {small}");
            assert_eq!(p.primary_count(SizeClass::Medium, 0), 2);
            assert_eq!(p.primary_count(SizeClass::Large, 0), 1);
            let rubble = p.primary_count(SizeClass::Small, 4);
            assert!((6..=9).contains(&rubble), "small inorganic count {rubble}");
            assert_eq!(p.primary_count(SizeClass::Large, 4), 1);
        }
    }

    #[test]
    fn test_primary_scale() {
        let p = placer(ScatterConfig::default());
        assert!((p.primary_scale(SizeClass::Small, 0) - 0.2).abs() < 1e-6);
        assert!((p.primary_scale(SizeClass::Large, 0) - 0.6).abs() < 1e-6);
        assert!((p.primary_scale(SizeClass::Large, 3) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_dry_land_keeps_base_prototype() {
        let mut resource = resource_at(1.0);
        let mut p = placer(certain_deep());
        let outcome = p
            .place(&mut resource, Vec2::splat(0.5), SizeClass::Large, 0, 0.0, ScatterPass::Primary)
            .unwrap();

        assert!(!outcome.aquatic_placed());
        let first = resource.instances()[0];
        assert_eq!(first.prototype_index, 0);
        assert_eq!(first.position, Vec3::new(0.5, 20.0, 0.5));
        assert!(resource
            .instances()
            .iter()
            .all(|i| i.prototype_index != 12 && i.prototype_index != 13));
    }

    #[test]
    fn test_underwater_uses_deep_variant() {
        let mut resource = resource_at(0.0);
        let mut p = placer(certain_deep());
        let outcome = p
            .place(&mut resource, Vec2::splat(0.5), SizeClass::Large, 0, 0.0, ScatterPass::Primary)
            .unwrap();

        assert!(outcome.aquatic_placed());
        assert_eq!(outcome.aquatic_primaries, 1);
        assert_eq!(resource.instances()[0].prototype_index, 13);
        assert!(resource.instances().iter().all(|i| i.prototype_index == 13));
    }

    #[test]
    fn test_shallow_water_uses_tide_variant() {
        let mut resource = resource_at(0.125);
        let mut p = placer(certain_deep());
        p.place(&mut resource, Vec2::splat(0.5), SizeClass::Medium, 0, 0.2, ScatterPass::Primary)
            .unwrap();
        assert!(resource.instances().iter().all(|i| i.prototype_index == 12));
    }

    #[test]
    fn test_detail_pass_never_reports_aquatic() {
        let mut resource = resource_at(0.0);
        let mut p = placer(certain_deep());
        let mut added = 0;
        for _ in 0..20 {
            let outcome = p
                .place(&mut resource, Vec2::splat(0.5), SizeClass::Medium, 6, 0.1, ScatterPass::Detail)
                .unwrap();
            assert!(!outcome.aquatic_placed());
            assert_eq!(outcome.decorations_added, 0);
            added += outcome.instances_added;
        }
        assert!(added > 0);
        assert_eq!(resource.instances().len(), added);
        assert_eq!(resource.detail_layers()[2].total(), 0);
    }

    #[test]
    fn test_primary_places_decorations_and_stamps() {
        let mut resource = resource_at(1.0);
        let mut p = placer(ScatterConfig {
            detail_density: 1.0,
            ..Default::default()
        });
        let outcome = p
            .place(&mut resource, Vec2::splat(0.5), SizeClass::Large, 0, 0.0, ScatterPass::Primary)
            .unwrap();

        let instances = resource.instances();
        assert_eq!(instances.iter().filter(|i| i.prototype_index == 0).count(), 1);
        for detail in [6, 7, 8] {
            let n = instances.iter().filter(|i| i.prototype_index == detail).count();
            assert!((2..=3).contains(&n), "detail {detail} placed {n} times");
        }
        assert_eq!(outcome.instances_added, instances.len());
        assert!(outcome.cells_painted > 0);
        assert!(resource.weights().get(8, 8, 1) > 0.0, "Grass painted at the anchor");
        assert!(resource.detail_layers()[0].total() > 0);
        assert_eq!(resource.detail_layers()[1].total(), 0);
    }

    #[test]
    fn test_inorganic_uses_inorganic_details_and_rock() {
        let mut resource = resource_at(1.0);
        let mut p = placer(ScatterConfig {
            detail_density: 1.0,
            ..Default::default()
        });
        p.place(&mut resource, Vec2::splat(0.5), SizeClass::Medium, 4, 0.2, ScatterPass::Primary)
            .unwrap();
        assert!(resource
            .instances()
            .iter()
            .all(|i| [4, 9, 10, 11].contains(&i.prototype_index)));
        assert!(resource.weights().get(8, 8, 2) > 0.0, "Rock painted near the anchor");
        assert!(resource.detail_layers()[1].total() > 0);
    }

    #[test]
    fn test_jitter_stays_inside_disc() {
        let mut resource = resource_at(1.0);
        let mut p = placer(ScatterConfig::default());
        let anchor = Vec2::new(0.4, 0.6);
        for _ in 0..30 {
            p.place(&mut resource, anchor, SizeClass::Small, 1, 0.2, ScatterPass::Detail)
                .unwrap();
        }
        for instance in resource.instances() {
            let planar = Vec2::new(instance.position.x, instance.position.z);
            assert!(planar.distance(anchor) <= 0.1 + 1e-5);
        }
    }

    #[test]
    fn test_missing_prototype_places_nothing() {
        let mut resource = resource_at(1.0);
        let mut p = placer(ScatterConfig::default());
        let err = p
            .place(&mut resource, Vec2::splat(0.5), SizeClass::Small, 99, 0.2, ScatterPass::Primary)
            .unwrap_err();
        assert_eq!(err, TerrainError::MissingPrototype { index: 99, len: 14 });
        assert!(resource.instances().is_empty());
    }

    #[test]
    fn test_instance_list_only_grows() {
        let mut resource = resource_at(0.5);
        let mut p = placer(ScatterConfig::default());
        let mut previous = 0;
        for (i, size) in SizeClass::ALL.iter().cycle().take(9).enumerate() {
            p.place(&mut resource, Vec2::new(0.2 + 0.07 * i as f32, 0.5), *size, i % 6, 0.2, ScatterPass::Primary)
                .unwrap();
            assert!(resource.instances().len() > previous);
            previous = resource.instances().len();
        }
    }
}
