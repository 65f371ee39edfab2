//! Generates a bonsai terrain, replays a stream of synthetic deposits onto
//! it and reports the resulting tally and spawn points.

use std::path::PathBuf;
use std::sync::Arc;

use bonsai_config::{CliArgs, Config, default_config_dir};
use bonsai_terrain::{
    BonsaiTerrain, HeightmapParams, LayerCutoffs, PlacementRequest, Presentation,
    ScatterPalette, SeedPair, SessionSnapshot, SpawnArea, TerrainDescriptor, TerrainSettings,
    default_catalog, stream_rng,
};
use clap::Parser;
use glam::Vec3;
use rand::Rng;
use tracing::{error, info, warn};

/// Build terrain settings from the loaded config and the resolved seed.
fn settings_from_config(config: &Config, seed: SeedPair) -> TerrainSettings {
    let terrain = &config.terrain;
    let presentation = &config.presentation;
    let scatter = &config.scatter;
    TerrainSettings {
        seed,
        heightmap: HeightmapParams {
            tile_scale: terrain.tile_scale,
            max_height: terrain.max_hill_height,
            min_height: terrain.min_hill_height,
            margin_x: terrain.margin_x,
            margin_y: terrain.margin_y,
        },
        cutoffs: LayerCutoffs {
            lowland: terrain.lowland_cutoff,
            highland: terrain.highland_cutoff,
            waterline: terrain.waterline_cutoff,
        },
        descriptor: TerrainDescriptor {
            size: Vec3::from_array(terrain.template_size),
            height_resolution: terrain.height_resolution,
            alpha_resolution: terrain.alpha_resolution,
            detail_resolution: terrain.detail_resolution,
            ..Default::default()
        },
        working: Presentation {
            size: Vec3::from_array(presentation.working_size),
            origin: Vec3::from_array(presentation.working_offset),
        },
        world: Presentation {
            size: Vec3::from_array(presentation.world_size),
            origin: Vec3::from_array(presentation.world_offset),
        },
        palette: ScatterPalette::default(),
        scatter: bonsai_terrain::ScatterConfig {
            waterline: scatter.waterline,
            deep_water: scatter.deep_water,
            deep_variant_chance: scatter.deep_variant_chance,
            detail_density: scatter.detail_density,
        },
        scatter_radius: scatter.scatter_radius,
        spawn_attempts: config.spawn.max_attempts,
    }
}

/// The configured seed pair, or a fresh random one when requested.
fn resolve_seed(config: &Config) -> SeedPair {
    if config.terrain.randomize_seed {
        SeedPair::randomized(&mut rand::rng())
    } else {
        SeedPair::from(config.terrain.seed)
    }
}

/// A reproducible stream of deposits dropped across the working terrain.
fn synthetic_deposits(terrain: &BonsaiTerrain, count: u32) -> Vec<PlacementRequest> {
    let mut rng = stream_rng(terrain.seed(), "deposits");
    let extent = terrain.working().data.size();
    let palette = &terrain.settings().palette;
    (0..count)
        .map(|_| {
            let is_organic = rng.random_bool(0.5);
            PlacementRequest {
                anchor: Vec3::new(
                    rng.random_range(0.1..0.9) * extent.x,
                    0.0,
                    rng.random_range(0.1..0.9) * extent.z,
                ),
                prototype_index: palette.primary(is_organic, rng.random_range(0..3)),
                size_class: rng.random_range(1..=3),
                is_organic,
            }
        })
        .collect()
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    bonsai_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let seed = resolve_seed(&config);
    let catalog = Arc::new(default_catalog());
    let mut terrain = match BonsaiTerrain::generate(settings_from_config(&config, seed), catalog)
    {
        Ok(terrain) => terrain,
        Err(e) => {
            error!("Terrain generation failed: {e}");
            std::process::exit(1);
        }
    };

    for request in synthetic_deposits(&terrain, config.session.deposits) {
        match terrain.deposit(&request) {
            Ok(report) if report.aquatic() => {
                info!(size = report.size.magnitude(), "aquatic deposit");
            }
            Ok(_) => {}
            Err(e) => warn!("Deposit rejected: {e}"),
        }
    }
    terrain.sync_working();

    let tally = *terrain.tally();
    info!(
        deposits = tally.deposits,
        organic = tally.organic,
        inorganic = tally.inorganic,
        aquatic = tally.aquatic_instances,
        instances = terrain.world().data.instances().len(),
        "session complete"
    );

    let area = SpawnArea {
        radius: config.spawn.radius,
        altitude: config.spawn.altitude,
        clearance: config.spawn.clearance,
    };
    if tally.aquatic_instances > 0 {
        let result = terrain.spawn_clear(&area);
        match result.position {
            Some(pos) => info!(attempts = result.attempts, "shoal spawns at {pos}"),
            None => info!(attempts = result.attempts, "no room for a shoal"),
        }
    }
    if tally.inorganic > 0 {
        let pos = terrain.spawn_grounded(&area);
        info!("lizards spawn at {pos}");
    }

    if let Some(path) = &args.snapshot
        && let Err(e) = SessionSnapshot::capture(&terrain).save(path)
    {
        error!("Failed to save snapshot: {e}");
    }
}
