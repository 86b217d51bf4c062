// src/map/subspace.rs

use crate::map::linedef::LineSideRef;
use crate::map::sector::SectorId;
use crate::map::vertex::VertexId;
use crate::utils::BoundingBox;

pub type HalfEdgeId = usize;
pub type SubspaceId = usize;
pub type SubsectorId = usize;

/// One directed edge of a subspace boundary.
///
/// Boundaries wind clockwise, so the owning face is on the right-hand
/// (front) side of every half-edge.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdge {
    pub origin: VertexId,
    /// Next half-edge around the same face.
    pub next: HalfEdgeId,
    /// The same edge seen from the neighbouring subspace.
    pub twin: Option<HalfEdgeId>,
    pub face: Option<SubspaceId>,
    /// Set when the edge lies along a map line.
    pub line_side: Option<LineSideRef>,
}

impl HalfEdge {
    pub fn has_twin(&self) -> bool {
        self.twin.is_some()
    }
}

/// A convex map region produced by space partitioning.
#[derive(Debug, Clone, PartialEq)]
pub struct Subspace {
    pub first_hedge: HalfEdgeId,
    pub hedge_count: usize,
    pub bbox: BoundingBox,
    pub sector: Option<SectorId>,
    pub subsector: Option<SubsectorId>,
}

impl Subspace {
    pub fn has_subsector(&self) -> bool {
        self.subsector.is_some()
    }
}

/// The subspaces of one sector, sharing its planes.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsector {
    pub sector: SectorId,
    pub subspaces: Vec<SubspaceId>,
    pub bbox: BoundingBox,
}
