//! Terrain session: generation, two-scale presentation and deposit events.
//!
//! [`BonsaiTerrain::generate`] synthesizes heights, blends ground cover and
//! clones the result into a small working terrain and a large world
//! terrain. Deposits are then scattered onto the world terrain one at a
//! time and counted in a [`TerraformTally`].

use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::blend::{LayerBlender, LayerCutoffs};
use crate::cloner::{clone_into, clone_resource};
use crate::error::TerrainError;
use crate::heightmap::{HeightSynthesizer, HeightmapParams};
use crate::resource::{
    ObjectInstance, PrototypeCatalog, SceneTerrain, TerrainDescriptor, TerrainResource,
};
use crate::scatter::{
    ScatterConfig, ScatterOutcome, ScatterPalette, ScatterPass, ScatterPlacer, SizeClass,
};
use crate::seed::{SeedPair, stream_rng};
use crate::spawn::{
    DEFAULT_SPAWN_ATTEMPTS, SpawnArea, SpawnResult, SpawnSearch, max_surface_height,
};

/// Extents and placement of one presented terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Presentation {
    /// Physical size: width, vertical extent, depth.
    pub size: Vec3,
    /// World position of the terrain's minimum corner.
    pub origin: Vec3,
}

/// Everything needed to build a terrain session.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    pub seed: SeedPair,
    pub heightmap: HeightmapParams,
    pub cutoffs: LayerCutoffs,
    /// Template the generated resource is shaped from.
    pub descriptor: TerrainDescriptor,
    /// The small interactive copy.
    pub working: Presentation,
    /// The large copy deposits are scattered onto.
    pub world: Presentation,
    pub palette: ScatterPalette,
    pub scatter: ScatterConfig,
    /// Diameter of the disc primary objects are scattered in. Large
    /// deposits always use zero.
    pub scatter_radius: f32,
    pub spawn_attempts: u32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            seed: SeedPair::new(100, 100),
            heightmap: HeightmapParams::default(),
            cutoffs: LayerCutoffs::default(),
            descriptor: TerrainDescriptor::default(),
            working: Presentation {
                size: Vec3::new(3.0, 1.0, 3.0),
                origin: Vec3::new(-1.5, -0.2, -1.5),
            },
            world: Presentation {
                size: Vec3::new(60.0, 20.0, 60.0),
                origin: Vec3::new(-40.0, -7.0, 20.0),
            },
            palette: ScatterPalette::default(),
            scatter: ScatterConfig::default(),
            scatter_radius: 0.2,
            spawn_attempts: DEFAULT_SPAWN_ATTEMPTS,
        }
    }
}

/// One deposit event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    /// Drop point in the working terrain's local coordinates.
    pub anchor: Vec3,
    pub prototype_index: usize,
    /// 1 (small) through 3 (large).
    pub size_class: i32,
    pub is_organic: bool,
}

/// Running counts of deposits, reported to progression tracking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformTally {
    pub deposits: u32,
    pub organic: u32,
    pub inorganic: u32,
    /// Deposits per size class, small first.
    pub sizes: [u32; 3],
    pub organic_sizes: [u32; 3],
    pub inorganic_sizes: [u32; 3],
    /// Deposits per size class that placed an aquatic object.
    pub aquatic_sizes: [u32; 3],
    /// Primary objects reclassified as aquatic.
    pub aquatic_instances: u32,
}

impl TerraformTally {
    /// Count one deposit.
    pub fn record(&mut self, is_organic: bool, size: SizeClass, outcome: &ScatterOutcome) {
        let slot = size.slot();
        self.deposits += 1;
        self.sizes[slot] += 1;
        if is_organic {
            self.organic += 1;
            self.organic_sizes[slot] += 1;
        } else {
            self.inorganic += 1;
            self.inorganic_sizes[slot] += 1;
        }
        self.aquatic_instances += outcome.aquatic_primaries;
        if outcome.aquatic_placed() {
            self.aquatic_sizes[slot] += 1;
        }
    }
}

/// What a deposit did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepositReport {
    pub size: SizeClass,
    /// Where the deposit landed, in normalized planar coordinates.
    pub planar: Vec2,
    pub outcome: ScatterOutcome,
}

impl DepositReport {
    /// Whether an aquatic object was placed.
    pub fn aquatic(&self) -> bool {
        self.outcome.aquatic_placed()
    }
}

/// A generated terrain presented at two scales.
#[derive(Debug)]
pub struct BonsaiTerrain {
    settings: TerrainSettings,
    working: SceneTerrain,
    world: SceneTerrain,
    placer: ScatterPlacer,
    spawner: SpawnSearch,
    tally: TerraformTally,
}

impl BonsaiTerrain {
    /// Synthesize, blend and clone a terrain from `settings`.
    ///
    /// # Errors
    ///
    /// Returns a [`TerrainError`] if a resolution is zero or the palette
    /// names an entry missing from `catalog`.
    pub fn generate(
        settings: TerrainSettings,
        catalog: Arc<PrototypeCatalog>,
    ) -> Result<Self, TerrainError> {
        settings.palette.validate(&catalog)?;

        let template = TerrainResource::new(&settings.descriptor, Arc::clone(&catalog))?;
        let mut working = TerrainResource::new(&settings.descriptor, catalog)?;
        clone_into(&template, &mut working);

        HeightSynthesizer::new(settings.heightmap.clone())
            .synthesize(working.heights_mut(), settings.seed);
        LayerBlender::new(settings.cutoffs, settings.heightmap.max_height)
            .blend_resource(&mut working)?;

        let mut world = clone_resource(&working);
        working.set_size(settings.working.size);
        world.set_size(settings.world.size);

        info!(
            seed_x = settings.seed.x,
            seed_y = settings.seed.y,
            height_resolution = working.heights().resolution(),
            alpha_resolution = working.weights().resolution(),
            "generated terrain"
        );

        let placer = ScatterPlacer::new(
            settings.palette.clone(),
            settings.scatter.clone(),
            stream_rng(settings.seed, "scatter"),
        );
        let spawner = SpawnSearch::new(settings.spawn_attempts, stream_rng(settings.seed, "spawn"));

        Ok(Self {
            working: SceneTerrain::new(settings.working.origin, working),
            world: SceneTerrain::new(settings.world.origin, world),
            settings,
            placer,
            spawner,
            tally: TerraformTally::default(),
        })
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    pub fn seed(&self) -> SeedPair {
        self.settings.seed
    }

    /// The small interactive copy.
    pub fn working(&self) -> &SceneTerrain {
        &self.working
    }

    /// The large copy deposits are scattered onto.
    pub fn world(&self) -> &SceneTerrain {
        &self.world
    }

    pub fn tally(&self) -> &TerraformTally {
        &self.tally
    }

    /// Scatter a deposit onto the world terrain.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidSizeClass`] or a missing-prototype
    /// error before anything is placed or counted.
    pub fn deposit(&mut self, request: &PlacementRequest) -> Result<DepositReport, TerrainError> {
        let size = SizeClass::try_from(request.size_class)?;
        let extent = self.working.data.size();
        let planar = Vec2::new(request.anchor.x / extent.x, request.anchor.z / extent.z);
        let radius = if size == SizeClass::Large {
            0.0
        } else {
            self.settings.scatter_radius
        };

        let outcome = self.placer.place(
            &mut self.world.data,
            planar,
            size,
            request.prototype_index,
            radius,
            ScatterPass::Primary,
        )?;
        self.tally.record(request.is_organic, size, &outcome);

        info!(
            deposits = self.tally.deposits,
            size = size.magnitude(),
            instances = outcome.instances_added,
            aquatic = outcome.aquatic_placed(),
            "deposit placed"
        );
        Ok(DepositReport {
            size,
            planar,
            outcome,
        })
    }

    /// World-terrain elevation under a normalized planar position.
    pub fn sample_elevation(&self, planar: Vec2) -> f32 {
        self.world.data.sample_elevation(planar.x, planar.y)
    }

    /// Republish the world terrain's current content into the working
    /// copy, keeping the working copy's scale.
    pub fn sync_working(&mut self) {
        clone_into(&self.world.data, &mut self.working.data);
        self.working.data.set_size(self.settings.working.size);
    }

    /// Search for a point above the world terrain with clearance.
    pub fn spawn_clear(&mut self, area: &SpawnArea) -> SpawnResult {
        let centre = self.world.centre();
        self.spawner.find_clear(&[&self.world], centre, area)
    }

    /// A point on the world terrain's surface.
    pub fn spawn_grounded(&mut self, area: &SpawnArea) -> Vec3 {
        let centre = self.world.centre();
        self.spawner.find_grounded(&[&self.world], centre, area)
    }

    /// Highest world-terrain surface under a world position.
    pub fn surface_height(&self, pos: Vec3) -> f32 {
        max_surface_height(&[&self.world], pos)
    }

    /// Replace both instance lists and the tally, e.g. when restoring a
    /// saved session.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MissingPrototype`] if an instance names a
    /// prototype the catalog lacks; nothing is replaced in that case.
    pub(crate) fn restore_placements(
        &mut self,
        working: Vec<ObjectInstance>,
        world: Vec<ObjectInstance>,
        tally: TerraformTally,
    ) -> Result<(), TerrainError> {
        let catalog = Arc::clone(self.world.data.catalog());
        for instance in working.iter().chain(&world) {
            catalog.require_object(instance.prototype_index)?;
        }
        self.working.data.instances = working;
        self.world.data.instances = world;
        self.tally = tally;
        Ok(())
    }
}
