//! Procedural bonsai terrain: radial-falloff height synthesis, noise-jittered
//! ground-cover blending, clustered object scattering with underwater
//! reclassification, and two-scale presentation of one generated dataset.

mod blend;
mod cloner;
mod error;
mod grid;
mod heightmap;
mod noise_source;
mod placement;
mod scatter;
mod seed;
mod snapshot;
mod splat;
mod spawn;

pub mod resource;

pub use blend::{BLENDED_LAYERS, BlendRule, LayerBlender, LayerCutoffs};
pub use cloner::{clone_into, clone_resource};
pub use error::{SnapshotError, TerrainError};
pub use grid::{DetailGrid, HeightGrid, LayerWeightGrid};
pub use heightmap::{HeightSynthesizer, HeightmapParams};
pub use noise_source::NoiseSource;
pub use placement::{
    BonsaiTerrain, DepositReport, PlacementRequest, Presentation, TerraformTally,
    TerrainSettings,
};
pub use resource::{
    DetailPrototype, DetailRenderMode, GrassSettings, GroundLayer, ObjectInstance,
    ObjectPrototype, PrototypeCatalog, SceneTerrain, TerrainDescriptor, TerrainResource,
    default_catalog,
};
pub use scatter::{
    ScatterConfig, ScatterOutcome, ScatterPalette, ScatterPass, ScatterPlacer, SizeClass,
};
pub use seed::{RANDOM_SEED_RANGE, SeedPair, derive_stream_seed, stream_rng};
pub use snapshot::SessionSnapshot;
pub use spawn::{
    DEFAULT_SPAWN_ATTEMPTS, NO_SURFACE, SpawnArea, SpawnResult, SpawnSearch, is_clear,
    max_surface_height,
};
pub use splat::SplatStamper;
