//! Session snapshots persisted as RON.
//!
//! Grids are reproducible from the seed pair, so a snapshot only holds the
//! seed, the tally and the placed instances.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SnapshotError;
use crate::placement::{BonsaiTerrain, TerraformTally, TerrainSettings};
use crate::resource::{ObjectInstance, PrototypeCatalog};
use crate::seed::SeedPair;

/// Saved state of a terrain session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSnapshot {
    pub seed: SeedPair,
    pub tally: TerraformTally,
    pub working_instances: Vec<ObjectInstance>,
    pub world_instances: Vec<ObjectInstance>,
}

impl SessionSnapshot {
    /// Capture the current state of `terrain`.
    pub fn capture(terrain: &BonsaiTerrain) -> Self {
        Self {
            seed: terrain.seed(),
            tally: *terrain.tally(),
            working_instances: terrain.working().data.instances().to_vec(),
            world_instances: terrain.world().data.instances().to_vec(),
        }
    }

    /// Write the snapshot to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SnapshotError::WriteError)?;
        }
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(SnapshotError::SerializeError)?;
        std::fs::write(path, serialized).map_err(SnapshotError::WriteError)?;
        info!(
            path = %path.display(),
            instances = self.world_instances.len(),
            "saved terrain snapshot"
        );
        Ok(())
    }

    /// Read a snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = std::fs::read_to_string(path).map_err(SnapshotError::ReadError)?;
        let snapshot: SessionSnapshot =
            ron::from_str(&contents).map_err(SnapshotError::ParseError)?;
        Ok(snapshot)
    }

    /// Regenerate the terrain from the saved seed and put the saved
    /// instances and tally back.
    pub fn restore(
        self,
        settings: TerrainSettings,
        catalog: Arc<PrototypeCatalog>,
    ) -> Result<BonsaiTerrain, SnapshotError> {
        let mut terrain = BonsaiTerrain::generate(
            TerrainSettings {
                seed: self.seed,
                ..settings
            },
            catalog,
        )?;
        terrain.restore_placements(self.working_instances, self.world_instances, self.tally)?;
        Ok(terrain)
    }
}
