// src/error.rs

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building a map or spreading contacts.
///
/// Geometric rejections during a spread are not errors; these variants are
/// reserved for sequencing mistakes (using the subsystem before the map is
/// ready) and for malformed input.
#[derive(Debug, Error)]
pub enum Error {
    /// Point location was requested but the map has no BSP tree.
    #[error("missing BSP tree: the map was built without nodes")]
    MissingBsp,

    /// A blockmap was used before a map was loaded.
    #[error("grid index is not initialized (no map loaded)")]
    GridUninitialized,

    /// A blockmap could not be constructed.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Node building recursed deeper than `BSP_DEPTH_LIMIT`.
    #[error("BSP tree depth limit exceeded")]
    BspDepthExceeded,

    /// No subspace edge separates the remaining subspaces.
    #[error("cannot partition {count} subspaces without splitting one")]
    Unpartitionable { count: usize },

    /// A map element referenced an index that does not exist.
    #[error("invalid {kind} index: {index}")]
    InvalidIndex { kind: &'static str, index: usize },

    /// A subspace polygon has fewer than three distinct vertices or no area.
    #[error("subspace {0} is degenerate")]
    DegeneratePolygon(usize),

    /// A subspace polygon is not convex.
    #[error("subspace {0} is not convex")]
    NonConvex(usize),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error while reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
