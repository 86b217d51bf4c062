// src/map/mod.rs
pub mod builder;
pub mod generator;
pub mod linedef;
pub mod material;
pub mod sector;
pub mod sidedef;
pub mod subspace;
pub mod vertex;

#[cfg(test)]
pub(crate) mod fixtures;

pub use builder::MapBuilder;
pub use linedef::{Line, LineId, LineSide, LineSideRef, SideId};
pub use material::{Material, MaterialId};
pub use sector::{Plane, PlaneKind, Sector, SectorId, SkyFix, SkyHeights};
pub use sidedef::{BlendMode, SideDef, SideFlags, Surface};
pub use subspace::{HalfEdge, HalfEdgeId, Subsector, SubsectorId, Subspace, SubspaceId};
pub use vertex::{Vertex, VertexId};

use crate::blockmap::Blockmap;
use crate::bsp::BspTree;
use crate::error::{Error, Result};
use crate::utils::{BoundingBox, FixedPoint, Line2D, Point2D};

/// A fully built map: geometry, half-edge topology, spatial indexes and the
/// (optional) BSP tree. Built by [`MapBuilder`]; only plane heights change
/// afterwards.
#[derive(Debug)]
pub struct Map {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) materials: Vec<Material>,
    pub(crate) sectors: Vec<Sector>,
    pub(crate) lines: Vec<Line>,
    pub(crate) hedges: Vec<HalfEdge>,
    pub(crate) subspaces: Vec<Subspace>,
    pub(crate) subsectors: Vec<Subsector>,
    pub(crate) bounds: BoundingBox,
    pub(crate) subspace_blockmap: Blockmap<SubspaceId>,
    pub(crate) line_blockmap: Blockmap<LineId>,
    pub(crate) bsp: Option<BspTree>,
}

impl Map {
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id]
    }

    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id]
    }

    pub fn sector_mut(&mut self, id: SectorId) -> &mut Sector {
        &mut self.sectors[id]
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id]
    }

    pub fn hedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.hedges[id]
    }

    pub fn subspace(&self, id: SubspaceId) -> &Subspace {
        &self.subspaces[id]
    }

    pub fn subsector(&self, id: SubsectorId) -> &Subsector {
        &self.subsectors[id]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn subspace_count(&self) -> usize {
        self.subspaces.len()
    }

    pub fn subsector_count(&self) -> usize {
        self.subsectors.len()
    }

    pub fn bsp(&self) -> Option<&BspTree> {
        self.bsp.as_ref()
    }

    /// Replaces the BSP tree, e.g. with nodes read from elsewhere.
    pub fn set_bsp(&mut self, tree: Option<BspTree>) {
        self.bsp = tree;
    }

    pub fn subspace_blockmap(&self) -> &Blockmap<SubspaceId> {
        &self.subspace_blockmap
    }

    pub fn line_blockmap(&self) -> &Blockmap<LineId> {
        &self.line_blockmap
    }

    /// Half-edges of a subspace in ring order, starting at its first edge.
    pub fn hedge_ids(&self, subspace: SubspaceId) -> impl Iterator<Item = HalfEdgeId> + '_ {
        let ss = &self.subspaces[subspace];
        let mut current = ss.first_hedge;
        (0..ss.hedge_count).map(move |_| {
            let id = current;
            current = self.hedges[id].next;
            id
        })
    }

    /// The directed segment of a half-edge, from its origin to the origin of
    /// the next edge in the ring.
    pub fn hedge_line(&self, id: HalfEdgeId) -> Line2D {
        let hedge = &self.hedges[id];
        let next = &self.hedges[hedge.next];
        Line2D::new(self.vertices[hedge.origin].pos, self.vertices[next.origin].pos)
    }

    pub fn subspace_polygon(&self, subspace: SubspaceId) -> Vec<Point2D> {
        self.hedge_ids(subspace)
            .map(|h| self.vertices[self.hedges[h].origin].pos)
            .collect()
    }

    /// The sector a subsector belongs to.
    pub fn subsector_sector(&self, subsector: SubsectorId) -> &Sector {
        &self.sectors[self.subsectors[subsector].sector]
    }

    /// Smoothed (visual) height of a subsector plane.
    pub fn visual_height(&self, subsector: SubsectorId, plane: PlaneKind) -> f64 {
        self.subsector_sector(subsector).plane(plane).height_smoothed()
    }

    /// True when the plane's material is drawn as sky.
    pub fn is_sky_masked(&self, subsector: SubsectorId, plane: PlaneKind) -> bool {
        self.subsector_sector(subsector)
            .plane(plane)
            .material
            .and_then(|m| self.materials.get(m))
            .is_some_and(|m| m.sky_masked)
    }

    /// Default sky-fix heights: the lowest floor and the highest ceiling.
    pub fn sky_heights(&self) -> SkyHeights {
        let mut sky = SkyHeights {
            floor: f64::INFINITY,
            ceiling: f64::NEG_INFINITY,
        };
        for sector in &self.sectors {
            sky.floor = sky.floor.min(sector.floor.height());
            sky.ceiling = sky.ceiling.max(sector.ceiling.height());
        }
        if self.sectors.is_empty() {
            sky = SkyHeights { floor: 0.0, ceiling: 0.0 };
        }
        sky
    }

    /// BSP point location.
    pub fn locate(&self, point: &Point2D) -> Result<SubspaceId> {
        self.bsp.as_ref().map(|bsp| bsp.locate(point)).ok_or(Error::MissingBsp)
    }

    /// BSP point location in 16.16 fixed point.
    pub fn locate_fixed(&self, point: FixedPoint) -> Result<SubspaceId> {
        self.bsp
            .as_ref()
            .map(|bsp| bsp.locate_fixed(point))
            .ok_or(Error::MissingBsp)
    }

    /// Point location without the BSP: the first subspace linked in the
    /// point's blockmap cell whose polygon contains the point.
    pub fn locate_via_blockmap(&self, point: &Point2D) -> Option<SubspaceId> {
        let (cell, outside) = self.subspace_blockmap.to_cell(point);
        if outside {
            return None;
        }
        self.subspace_blockmap
            .cell(cell)
            .iter()
            .copied()
            .find(|&s| self.subspace_contains(s, point))
    }

    /// Inclusive point-in-convex-polygon test (faces lie on the right of
    /// their edges).
    pub fn subspace_contains(&self, subspace: SubspaceId, point: &Point2D) -> bool {
        if !self.subspaces[subspace].bbox.contains_point(point.x, point.y) {
            return false;
        }
        self.hedge_ids(subspace)
            .all(|h| self.hedge_line(h).classify_point(point) >= 0.0)
    }

    /// Subspaces whose blockmap cells touch `region`, sorted and deduplicated.
    pub fn subspaces_in_box(&self, region: &BoundingBox) -> Vec<SubspaceId> {
        collect_unique(&self.subspace_blockmap, region)
    }

    /// Lines whose blockmap cells touch `region`, sorted and deduplicated.
    pub fn lines_in_box(&self, region: &BoundingBox) -> Vec<LineId> {
        collect_unique(&self.line_blockmap, region)
    }
}

fn collect_unique(blockmap: &Blockmap<usize>, region: &BoundingBox) -> Vec<usize> {
    let mut found = Vec::new();
    let _ = blockmap.for_all_in_box::<(), _>(region, |&id| {
        found.push(id);
        std::ops::ControlFlow::Continue(())
    });
    found.sort_unstable();
    found.dedup();
    found
}
