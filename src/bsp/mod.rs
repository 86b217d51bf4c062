// src/bsp/mod.rs
pub mod bsp_builder;
pub mod bsp_node;
mod locate;

pub use bsp_builder::BspBuilder;
pub use bsp_node::{BspChild, BspNode, BspTree, Partition};

/// Prevent excessively deep trees.
pub const BSP_DEPTH_LIMIT: usize = 64;

/// Where a subspace polygon lies relative to a partition line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolygonPosition {
    Front,
    Back,
    Spanning,
    /// Every vertex on the line (only possible for degenerate input).
    Coincident,
}
