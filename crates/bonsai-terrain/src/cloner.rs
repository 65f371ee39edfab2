//! Deep copies of terrain resources.
//!
//! Every grid and the instance list are copied element-wise so the copy
//! never shares backing storage with its template. The prototype catalog is
//! immutable after creation and is aliased through its [`Arc`].

use std::sync::Arc;

use tracing::debug;

use crate::resource::TerrainResource;

/// Allocate a new resource holding a deep copy of `template`.
pub fn clone_resource(template: &TerrainResource) -> TerrainResource {
    TerrainResource {
        size: template.size,
        detail_resolution: template.detail_resolution,
        detail_resolution_per_patch: template.detail_resolution_per_patch,
        base_map_resolution: template.base_map_resolution,
        grass: template.grass,
        catalog: Arc::clone(&template.catalog),
        heights: template.heights.clone(),
        weights: template.weights.clone(),
        details: template.details.clone(),
        instances: template.instances.clone(),
    }
}

/// Copy `template` into an existing resource, replacing its contents.
///
/// `dest` keeps its identity; existing allocations are reused where the
/// shapes match.
pub fn clone_into(template: &TerrainResource, dest: &mut TerrainResource) {
    dest.size = template.size;
    dest.detail_resolution = template.detail_resolution;
    dest.detail_resolution_per_patch = template.detail_resolution_per_patch;
    dest.base_map_resolution = template.base_map_resolution;
    dest.grass = template.grass;
    dest.catalog = Arc::clone(&template.catalog);
    dest.heights.clone_from(&template.heights);
    dest.weights.clone_from(&template.weights);
    dest.details.clone_from(&template.details);
    dest.instances.clone_from(&template.instances);
    debug!(
        height_resolution = dest.heights.resolution(),
        instances = dest.instances.len(),
        "republished terrain resource"
    );
}
