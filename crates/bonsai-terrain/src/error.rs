//! Terrain configuration errors.

/// Errors raised when a terrain resource, catalog or placement request is
/// misconfigured. These are caller/template bugs and are reported before any
/// grid or instance list is touched.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TerrainError {
    /// A grid was requested with zero cells per side.
    #[error("{grid} resolution must be non-zero")]
    ZeroResolution {
        /// Which grid was misconfigured.
        grid: &'static str,
    },

    /// Two grids that must agree on their resolution do not.
    #[error("{grid} resolution mismatch: expected {expected}, got {actual}")]
    ResolutionMismatch {
        /// Which grid was misconfigured.
        grid: &'static str,
        /// Resolution the resource was created with.
        expected: usize,
        /// Resolution that was supplied.
        actual: usize,
    },

    /// The layer blender needs at least four ground-cover layers.
    #[error("layer weight grid has {0} layers, at least 4 are required")]
    TooFewLayers(usize),

    /// Size classes are 1 (small) through 3 (large).
    #[error("size class {0} is outside 1..=3")]
    InvalidSizeClass(i32),

    /// A configured object prototype index has no catalog entry.
    #[error("object prototype {index} is not in the catalog ({len} entries)")]
    MissingPrototype {
        /// Requested prototype index.
        index: usize,
        /// Number of prototypes in the catalog.
        len: usize,
    },

    /// A configured ground-cover layer index has no catalog entry.
    #[error("ground-cover layer {index} is not in the catalog ({len} layers)")]
    MissingLayer {
        /// Requested layer index.
        index: usize,
        /// Number of layers in the catalog.
        len: usize,
    },

    /// A detail channel has no density grid.
    #[error("detail layer {index} does not exist ({len} detail layers)")]
    MissingDetailLayer {
        /// Requested detail layer.
        index: usize,
        /// Number of detail layers on the resource.
        len: usize,
    },
}

/// Errors that can occur when saving or restoring a session snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Failed to read the snapshot file.
    #[error("failed to read snapshot: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to write the snapshot file.
    #[error("failed to write snapshot: {0}")]
    WriteError(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse snapshot: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize the snapshot to RON.
    #[error("failed to serialize snapshot: {0}")]
    SerializeError(#[source] ron::Error),

    /// The snapshot is valid RON but does not fit the terrain it is applied to.
    #[error("snapshot does not match terrain: {0}")]
    Terrain(#[from] TerrainError),
}
