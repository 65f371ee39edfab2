//! Spawn-point search for creatures released onto the terrain.
//!
//! Points are proposed in a disc around the terrain centre at a fixed
//! altitude. Airborne and aquatic creatures need clearance above every
//! terrain surface; grounded creatures are snapped onto the highest one.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::resource::SceneTerrain;
use crate::seed::det_sqrt;

/// Default number of proposals before a search gives up.
pub const DEFAULT_SPAWN_ATTEMPTS: u32 = 250;

/// Surface height reported when no terrain lies under a point.
pub const NO_SURFACE: f32 = -1000.0;

/// Where to look for a spawn point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnArea {
    /// Radius of the disc around the terrain centre.
    pub radius: f32,
    /// World-space height of proposed points.
    pub altitude: f32,
    /// Minimum gap required between a point and the surface below it.
    pub clearance: f32,
}

/// Result of a clearance search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnResult {
    /// The accepted point, if any proposal passed.
    pub position: Option<Vec3>,
    /// Proposals made, including the accepted one.
    pub attempts: u32,
}

/// Whether `pos` keeps at least `clearance` above every terrain whose
/// bounds contain it.
pub fn is_clear(terrains: &[&SceneTerrain], pos: Vec3, clearance: f32) -> bool {
    terrains
        .iter()
        .filter(|t| t.bounds_contain(pos))
        .all(|t| pos.y - clearance >= t.sample_height_world(pos))
}

/// Highest terrain surface under `pos`, or [`NO_SURFACE`].
pub fn max_surface_height(terrains: &[&SceneTerrain], pos: Vec3) -> f32 {
    terrains
        .iter()
        .filter(|t| t.bounds_contain(pos))
        .map(|t| t.sample_height_world(pos))
        .fold(NO_SURFACE, f32::max)
}

/// Bounded random search for spawn points.
#[derive(Debug)]
pub struct SpawnSearch {
    max_attempts: u32,
    rng: ChaCha8Rng,
}

impl SpawnSearch {
    pub fn new(max_attempts: u32, rng: ChaCha8Rng) -> Self {
        Self { max_attempts, rng }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Random point in the disc of `area` around `centre`, at the area's
    /// altitude.
    pub fn propose(&mut self, centre: Vec3, area: &SpawnArea) -> Vec3 {
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let distance = det_sqrt(self.rng.random::<f32>()) * area.radius;
        let offset = Vec2::new(libm::cosf(angle), libm::sinf(angle)) * distance;
        Vec3::new(centre.x + offset.x, area.altitude, centre.z + offset.y)
    }

    /// Propose points until one clears every terrain surface, giving up
    /// after the attempt budget.
    pub fn find_clear(
        &mut self,
        terrains: &[&SceneTerrain],
        centre: Vec3,
        area: &SpawnArea,
    ) -> SpawnResult {
        for attempt in 0..self.max_attempts {
            let pos = self.propose(centre, area);
            if is_clear(terrains, pos, area.clearance) {
                return SpawnResult {
                    position: Some(pos),
                    attempts: attempt + 1,
                };
            }
            debug!(attempt, x = pos.x, z = pos.z, "spawn point underground, retrying");
        }
        warn!(
            attempts = self.max_attempts,
            altitude = area.altitude,
            "no clear spawn point found"
        );
        SpawnResult {
            position: None,
            attempts: self.max_attempts,
        }
    }

    /// Propose one point and snap it onto the highest terrain surface.
    pub fn find_grounded(
        &mut self,
        terrains: &[&SceneTerrain],
        centre: Vec3,
        area: &SpawnArea,
    ) -> Vec3 {
        let pos = self.propose(centre, area);
        Vec3::new(pos.x, max_surface_height(terrains, pos), pos.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::TerrainResource;
    use crate::resource::tests::{small_descriptor, test_catalog};
    use crate::seed::{SeedPair, stream_rng};

    fn scene(height: f32) -> SceneTerrain {
        let mut resource = TerrainResource::new(&small_descriptor(), test_catalog()).unwrap();
        resource.heights_mut().fill(height);
        SceneTerrain::new(Vec3::new(-40.0, -7.0, 20.0), resource)
    }

    fn search() -> SpawnSearch {
        SpawnSearch::new(DEFAULT_SPAWN_ATTEMPTS, stream_rng(SeedPair::new(1, 2), "spawn"))
    }

    #[test]
    fn test_proposals_stay_in_disc() {
        let mut s = search();
        let centre = Vec3::new(-10.0, -7.0, 50.0);
        let area = SpawnArea {
            radius: 12.0,
            altitude: 3.0,
            clearance: 0.5,
        };
        for _ in 0..100 {
            let p = s.propose(centre, &area);
            assert_eq!(p.y, 3.0);
            let planar = Vec2::new(p.x - centre.x, p.z - centre.z);
            assert!(planar.length() <= 12.0 + 1e-4, "Proposal outside disc: {p}");
        }
    }

    #[test]
    fn test_open_water_accepts_first_proposal() {
        let world = scene(0.1);
        let mut s = search();
        let area = SpawnArea {
            radius: 10.0,
            altitude: 0.0,
            clearance: 1.0,
        };
        let result = s.find_clear(&[&world], world.centre(), &area);
        assert_eq!(result.attempts, 1);
        let pos = result.position.unwrap();
        assert!(pos.y - 1.0 >= world.sample_height_world(pos));
    }

    #[test]
    fn test_buried_search_exhausts_budget() {
        let world = scene(1.0);
        let mut s = search();
        let area = SpawnArea {
            radius: 10.0,
            altitude: 0.0,
            clearance: 1.0,
        };
        let result = s.find_clear(&[&world], world.centre(), &area);
        assert_eq!(result.position, None, "Every proposal is underground");
        assert_eq!(result.attempts, DEFAULT_SPAWN_ATTEMPTS);
    }

    #[test]
    fn test_points_outside_bounds_are_clear() {
        let world = scene(1.0);
        let outside = Vec3::new(500.0, 0.0, 500.0);
        assert!(is_clear(&[&world], outside, 1.0));
        assert_eq!(max_surface_height(&[&world], outside), NO_SURFACE);
    }

    #[test]
    fn test_grounded_snaps_to_highest_surface() {
        let low = scene(0.25);
        let high = scene(0.5);
        let mut s = search();
        let area = SpawnArea {
            radius: 5.0,
            altitude: 0.0,
            clearance: 0.0,
        };
        let pos = s.find_grounded(&[&low, &high], low.centre(), &area);
        assert!((pos.y - 3.0).abs() < 1e-4, "Expected -7 + 0.5 * 20, got {}", pos.y);
    }
}
