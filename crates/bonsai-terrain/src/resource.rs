//! The terrain resource: physical extents, grids, catalogs and placed
//! object instances.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::grid::{DetailGrid, HeightGrid, LayerWeightGrid};

/// A discrete placed object.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectInstance {
    /// Index into the catalog's object prototypes.
    pub prototype_index: usize,
    /// `x`/`z` in normalized planar coordinates, `y` the absolute elevation
    /// the instance was grounded at.
    pub position: Vec3,
    /// Rotation around the vertical axis, in radians.
    pub rotation: f32,
    /// Horizontal scale multiplier.
    pub width_scale: f32,
    /// Vertical scale multiplier.
    pub height_scale: f32,
}

/// Visual metadata for a placeable object (tree, boulder, sea plant...).
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectPrototype {
    /// Unique name, used for catalog lookup.
    pub name: String,
    /// How strongly the mesh bends in wind.
    pub bend_factor: f32,
}

/// How a detail decoration is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailRenderMode {
    /// Camera-facing grass quads.
    GrassBillboard,
    /// Lit mesh.
    VertexLit,
    /// Grass quads lit like meshes.
    Grass,
}

/// Visual metadata for a detail (grass/pebble) decoration layer.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailPrototype {
    /// Unique name, used for catalog lookup.
    pub name: String,
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Spatial frequency of the size/colour variation noise.
    pub noise_spread: f32,
    pub healthy_color: [f32; 4],
    pub dry_color: [f32; 4],
    pub render_mode: DetailRenderMode,
}

/// A ground-cover material layer.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundLayer {
    /// Unique name, used for catalog lookup.
    pub name: String,
    /// Texture tiling in world units.
    pub tile_size: Vec2,
}

/// Immutable prototype and layer descriptors shared by every resource
/// cloned from the same template.
#[derive(Debug, Default)]
pub struct PrototypeCatalog {
    objects: Vec<ObjectPrototype>,
    details: Vec<DetailPrototype>,
    layers: Vec<GroundLayer>,
    object_names: HashMap<String, usize>,
}

impl PrototypeCatalog {
    /// Build a catalog. Later entries with a duplicate name shadow earlier
    /// ones in [`lookup_object`](Self::lookup_object).
    pub fn new(
        objects: Vec<ObjectPrototype>,
        details: Vec<DetailPrototype>,
        layers: Vec<GroundLayer>,
    ) -> Self {
        let object_names = objects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self {
            objects,
            details,
            layers,
            object_names,
        }
    }

    pub fn objects(&self) -> &[ObjectPrototype] {
        &self.objects
    }

    pub fn details(&self) -> &[DetailPrototype] {
        &self.details
    }

    pub fn layers(&self) -> &[GroundLayer] {
        &self.layers
    }

    /// Looks up an object prototype index by name.
    pub fn lookup_object(&self, name: &str) -> Option<usize> {
        self.object_names.get(name).copied()
    }

    /// Checks that `index` names an object prototype.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MissingPrototype`] otherwise.
    pub fn require_object(&self, index: usize) -> Result<&ObjectPrototype, TerrainError> {
        self.objects.get(index).ok_or(TerrainError::MissingPrototype {
            index,
            len: self.objects.len(),
        })
    }

    /// Checks that `index` names a ground-cover layer.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MissingLayer`] otherwise.
    pub fn require_layer(&self, index: usize) -> Result<&GroundLayer, TerrainError> {
        self.layers.get(index).ok_or(TerrainError::MissingLayer {
            index,
            len: self.layers.len(),
        })
    }

    /// Checks that `index` names a detail layer.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MissingDetailLayer`] otherwise.
    pub fn require_detail(&self, index: usize) -> Result<&DetailPrototype, TerrainError> {
        self.details.get(index).ok_or(TerrainError::MissingDetailLayer {
            index,
            len: self.details.len(),
        })
    }
}

/// The stock catalog: three organic and three inorganic primaries, three
/// decorations for each, two aquatic plants, grass/pebble/seagrass detail
/// layers and sand/grass/rock/seabed ground cover.
pub fn default_catalog() -> PrototypeCatalog {
    let objects = [
        ("palm", 0.4),
        ("fern", 0.3),
        ("shrub", 0.2),
        ("boulder", 0.0),
        ("slab", 0.0),
        ("spire", 0.0),
        ("sprout", 0.3),
        ("moss", 0.1),
        ("flower", 0.3),
        ("pebble", 0.0),
        ("shard", 0.0),
        ("gravel", 0.0),
        ("kelp", 0.5),
        ("coral", 0.0),
    ]
    .into_iter()
    .map(|(name, bend_factor)| ObjectPrototype {
        name: name.to_string(),
        bend_factor,
    })
    .collect();

    let details = [
        ("grass", DetailRenderMode::GrassBillboard, [0.26, 0.98, 0.16, 1.0]),
        ("pebbles", DetailRenderMode::VertexLit, [0.6, 0.6, 0.58, 1.0]),
        ("seagrass", DetailRenderMode::Grass, [0.1, 0.7, 0.5, 1.0]),
    ]
    .into_iter()
    .map(|(name, render_mode, healthy_color)| DetailPrototype {
        name: name.to_string(),
        min_width: 1.0,
        max_width: 2.0,
        min_height: 1.0,
        max_height: 2.0,
        noise_spread: 0.1,
        healthy_color,
        dry_color: [0.8, 0.74, 0.4, 1.0],
        render_mode,
    })
    .collect();

    let layers = ["sand", "grass", "rock", "seabed"]
        .into_iter()
        .map(|name| GroundLayer {
            name: name.to_string(),
            tile_size: Vec2::splat(15.0),
        })
        .collect();

    PrototypeCatalog::new(objects, details, layers)
}

/// Wind animation applied to detail grass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrassSettings {
    pub amount: f32,
    pub speed: f32,
    pub strength: f32,
    pub tint: [f32; 4],
}

impl Default for GrassSettings {
    fn default() -> Self {
        Self {
            amount: 0.5,
            speed: 0.5,
            strength: 0.5,
            tint: [0.7, 0.6, 0.5, 1.0],
        }
    }
}

/// Dimensions used to create a fresh [`TerrainResource`].
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainDescriptor {
    /// Physical extents: width, vertical extent, depth.
    pub size: Vec3,
    pub height_resolution: usize,
    pub alpha_resolution: usize,
    pub detail_resolution: usize,
    pub detail_resolution_per_patch: usize,
    pub base_map_resolution: usize,
    pub grass: GrassSettings,
}

impl Default for TerrainDescriptor {
    fn default() -> Self {
        Self {
            size: Vec3::new(600.0, 300.0, 600.0),
            height_resolution: 129,
            alpha_resolution: 128,
            detail_resolution: 128,
            detail_resolution_per_patch: 16,
            base_map_resolution: 256,
            grass: GrassSettings::default(),
        }
    }
}

/// A terrain dataset.
///
/// The grid resolutions are fixed at creation. Heights, layer weights and
/// detail densities are edited in place; the instance list only grows.
#[derive(Debug)]
pub struct TerrainResource {
    pub(crate) size: Vec3,
    pub(crate) detail_resolution: usize,
    pub(crate) detail_resolution_per_patch: usize,
    pub(crate) base_map_resolution: usize,
    pub(crate) grass: GrassSettings,
    pub(crate) catalog: Arc<PrototypeCatalog>,
    pub(crate) heights: HeightGrid,
    pub(crate) weights: LayerWeightGrid,
    pub(crate) details: Vec<DetailGrid>,
    pub(crate) instances: Vec<ObjectInstance>,
}

impl TerrainResource {
    /// Create a flat terrain with one weight channel per catalog layer and
    /// one density grid per detail prototype.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ZeroResolution`] if any resolution is zero.
    pub fn new(
        desc: &TerrainDescriptor,
        catalog: Arc<PrototypeCatalog>,
    ) -> Result<Self, TerrainError> {
        if desc.detail_resolution == 0 {
            return Err(TerrainError::ZeroResolution { grid: "detail" });
        }
        let heights = HeightGrid::new(desc.height_resolution)?;
        let weights = LayerWeightGrid::new(desc.alpha_resolution, catalog.layers().len())?;
        let details = (0..catalog.details().len())
            .map(|_| DetailGrid::new(desc.detail_resolution))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            size: desc.size,
            detail_resolution: desc.detail_resolution,
            detail_resolution_per_patch: desc.detail_resolution_per_patch,
            base_map_resolution: desc.base_map_resolution,
            grass: desc.grass,
            catalog,
            heights,
            weights,
            details,
            instances: Vec::new(),
        })
    }

    /// Physical extents: width, vertical extent, depth.
    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Rescale the terrain. Normalized grid data is untouched.
    pub fn set_size(&mut self, size: Vec3) {
        self.size = size;
    }

    pub fn catalog(&self) -> &Arc<PrototypeCatalog> {
        &self.catalog
    }

    pub fn grass(&self) -> GrassSettings {
        self.grass
    }

    pub fn base_map_resolution(&self) -> usize {
        self.base_map_resolution
    }

    pub fn detail_resolution_per_patch(&self) -> usize {
        self.detail_resolution_per_patch
    }

    pub fn heights(&self) -> &HeightGrid {
        &self.heights
    }

    pub fn heights_mut(&mut self) -> &mut HeightGrid {
        &mut self.heights
    }

    pub fn weights(&self) -> &LayerWeightGrid {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut LayerWeightGrid {
        &mut self.weights
    }

    pub fn detail_layers(&self) -> &[DetailGrid] {
        &self.details
    }

    /// Density grid for detail layer `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::MissingDetailLayer`] if there is no such layer.
    pub fn detail_layer_mut(&mut self, index: usize) -> Result<&mut DetailGrid, TerrainError> {
        let len = self.details.len();
        self.details
            .get_mut(index)
            .ok_or(TerrainError::MissingDetailLayer { index, len })
    }

    /// Detail grid resolution (shared by all detail layers).
    pub fn detail_resolution(&self) -> usize {
        self.detail_resolution
    }

    /// Placed object instances, in placement order.
    pub fn instances(&self) -> &[ObjectInstance] {
        &self.instances
    }

    /// Append a placed instance.
    pub fn add_instance(&mut self, instance: ObjectInstance) {
        self.instances.push(instance);
    }

    /// Replace the height grid.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ResolutionMismatch`] if the resolution differs.
    pub fn set_heights(&mut self, heights: HeightGrid) -> Result<(), TerrainError> {
        if heights.resolution() != self.heights.resolution() {
            return Err(TerrainError::ResolutionMismatch {
                grid: "height",
                expected: self.heights.resolution(),
                actual: heights.resolution(),
            });
        }
        self.heights = heights;
        Ok(())
    }

    /// Ground elevation, in the terrain's vertical units, under the
    /// normalized planar position `(u, v)`.
    pub fn sample_elevation(&self, u: f32, v: f32) -> f32 {
        self.heights.sample_bilinear(u, v) * self.size.y
    }
}

/// A terrain resource positioned in the world.
#[derive(Debug)]
pub struct SceneTerrain {
    /// World position of the terrain's minimum corner.
    pub origin: Vec3,
    pub data: TerrainResource,
}

impl SceneTerrain {
    pub fn new(origin: Vec3, data: TerrainResource) -> Self {
        Self { origin, data }
    }

    /// Whether `pos` lies inside the terrain's world-space bounding box.
    pub fn bounds_contain(&self, pos: Vec3) -> bool {
        let max = self.origin + self.data.size();
        pos.cmpge(self.origin).all() && pos.cmple(max).all()
    }

    /// Convert a world position into normalized planar coordinates.
    pub fn to_planar(&self, pos: Vec3) -> Vec2 {
        let size = self.data.size();
        Vec2::new(
            (pos.x - self.origin.x) / size.x,
            (pos.z - self.origin.z) / size.z,
        )
    }

    /// World-space height of the surface under `pos`.
    pub fn sample_height_world(&self, pos: Vec3) -> f32 {
        let planar = self.to_planar(pos);
        self.origin.y + self.data.sample_elevation(planar.x, planar.y)
    }

    /// World-space centre of the terrain footprint at the origin's height.
    pub fn centre(&self) -> Vec3 {
        let size = self.data.size();
        Vec3::new(
            self.origin.x + size.x * 0.5,
            self.origin.y,
            self.origin.z + size.z * 0.5,
        )
    }
}
