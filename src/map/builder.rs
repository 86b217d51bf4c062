// src/map/builder.rs
//! Assembles a [`Map`] from vertices, sectors, lines and convex subspace
//! polygons: normalizes winding, builds the half-edge rings, links twins,
//! attaches line sides, groups subsectors and builds the spatial indexes.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use rayon::prelude::*;

use crate::blockmap::Blockmap;
use crate::bsp::bsp_builder::BspBuilder;
use crate::config::{SpreadConfig, DEFAULT_CELL_SIZE};
use crate::error::{Error, Result};
use crate::map::{
    HalfEdge, HalfEdgeId, Line, LineId, LineSideRef, Map, Material, MaterialId, Sector, SectorId,
    SideId, Subsector, Subspace, SubspaceId, Vertex, VertexId,
};
use crate::utils::geometry::signed_area2;
use crate::utils::{BoundingBox, Line2D, Point2D, EPSILON};

#[derive(Debug, Clone)]
struct PolygonDef {
    vertices: Vec<VertexId>,
    sector: Option<SectorId>,
}

/// An explicit edge → line-side attachment, keyed by the edge's unordered
/// vertex pair.
#[derive(Debug, Clone, Copy)]
struct Attachment {
    subspace: SubspaceId,
    a: VertexId,
    b: VertexId,
    side: LineSideRef,
}

#[derive(Debug, Clone)]
pub struct MapBuilder {
    vertices: Vec<Vertex>,
    materials: Vec<Material>,
    sectors: Vec<Sector>,
    lines: Vec<Line>,
    polygons: Vec<PolygonDef>,
    attachments: Vec<Attachment>,
    cell_size: f64,
    build_bsp: bool,
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBuilder {
    pub fn new() -> Self {
        MapBuilder {
            vertices: Vec::new(),
            materials: Vec::new(),
            sectors: Vec::new(),
            lines: Vec::new(),
            polygons: Vec::new(),
            attachments: Vec::new(),
            cell_size: DEFAULT_CELL_SIZE,
            build_bsp: true,
        }
    }

    /// Takes the cell size and BSP switch from `config`.
    pub fn with_config(self, config: &SpreadConfig) -> Self {
        self.with_cell_size(config.cell_size).with_bsp(config.build_bsp)
    }

    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_bsp(mut self, build_bsp: bool) -> Self {
        self.build_bsp = build_bsp;
        self
    }

    pub fn add_vertex(&mut self, x: f64, y: f64) -> VertexId {
        self.vertices.push(Vertex::new(x, y));
        self.vertices.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_sector(&mut self, sector: Sector) -> SectorId {
        self.sectors.push(sector);
        self.sectors.len() - 1
    }

    pub fn sector_mut(&mut self, id: SectorId) -> Option<&mut Sector> {
        self.sectors.get_mut(id)
    }

    pub fn add_line(&mut self, line: Line) -> LineId {
        self.lines.push(line);
        self.lines.len() - 1
    }

    /// Adds a convex polygon. Either winding is accepted.
    pub fn add_subspace(&mut self, vertices: &[VertexId], sector: Option<SectorId>) -> SubspaceId {
        self.polygons.push(PolygonDef {
            vertices: vertices.to_vec(),
            sector,
        });
        self.polygons.len() - 1
    }

    /// Attaches the edge of `subspace` between vertices `a` and `b` to one
    /// side of a line, overriding the automatic collinearity match.
    pub fn attach_line(&mut self, subspace: SubspaceId, a: VertexId, b: VertexId, side: LineSideRef) {
        self.attachments.push(Attachment { subspace, a, b, side });
    }

    pub fn build(self) -> Result<Map> {
        self.validate_indices()?;

        let MapBuilder {
            vertices,
            materials,
            sectors,
            lines,
            polygons,
            attachments,
            cell_size,
            build_bsp,
        } = self;

        let rings = polygons
            .iter()
            .enumerate()
            .map(|(i, poly)| normalize_polygon(i, &poly.vertices, &vertices))
            .collect::<Result<Vec<_>>>()?;

        let bounds = BoundingBox::from_points(vertices.iter().map(|v| &v.pos));
        let mut line_blockmap = Blockmap::new(bounds, cell_size)?;
        for (id, line) in lines.iter().enumerate() {
            let segment = Line2D::new(vertices[line.from].pos, vertices[line.to].pos);
            line_blockmap.link_box(&segment.bbox(), id);
        }

        let mut hedges = build_rings(&rings);
        link_twins(&mut hedges);

        let bboxes: Vec<BoundingBox> = rings
            .par_iter()
            .map(|ring| BoundingBox::from_points(ring.iter().map(|&v| &vertices[v].pos)))
            .collect();

        let mut subspaces: Vec<Subspace> = Vec::with_capacity(rings.len());
        let mut first = 0;
        for ((ring, poly), bbox) in rings.iter().zip(&polygons).zip(bboxes) {
            subspaces.push(Subspace {
                first_hedge: first,
                hedge_count: ring.len(),
                bbox,
                sector: poly.sector,
                subsector: None,
            });
            first += ring.len();
        }

        let mut by_sector: BTreeMap<SectorId, Vec<SubspaceId>> = BTreeMap::new();
        for (id, ss) in subspaces.iter().enumerate() {
            if let Some(sector) = ss.sector {
                by_sector.entry(sector).or_default().push(id);
            }
        }
        let mut subsectors = Vec::with_capacity(by_sector.len());
        for (sector, members) in by_sector {
            let mut bbox = BoundingBox::new_empty();
            for &s in &members {
                subspaces[s].subsector = Some(subsectors.len());
                bbox.combine(&subspaces[s].bbox);
            }
            subsectors.push(Subsector {
                sector,
                subspaces: members,
                bbox,
            });
        }

        let mut subspace_blockmap = Blockmap::new(bounds, cell_size)?;
        for (id, ss) in subspaces.iter().enumerate() {
            subspace_blockmap.link_box(&ss.bbox, id);
        }

        let mut map = Map {
            vertices,
            materials,
            sectors,
            lines,
            hedges,
            subspaces,
            subsectors,
            bounds,
            subspace_blockmap,
            line_blockmap,
            bsp: None,
        };

        attach_lines_by_geometry(&mut map);
        for attachment in attachments {
            apply_attachment(&mut map, attachment)?;
        }

        if build_bsp && map.subspace_count() > 0 {
            let tree = BspBuilder::new(&map).build()?;
            map.bsp = Some(tree);
        }

        debug!(
            "map built: {} vertices, {} lines, {} half-edges, {} subspaces, {} subsectors, {} BSP nodes",
            map.vertex_count(),
            map.line_count(),
            map.hedges.len(),
            map.subspace_count(),
            map.subsector_count(),
            map.bsp.as_ref().map_or(0, |b| b.node_count())
        );
        Ok(map)
    }

    fn validate_indices(&self) -> Result<()> {
        let vertex = |index: VertexId| check(index, self.vertices.len(), "vertex");
        let sector = |index: SectorId| check(index, self.sectors.len(), "sector");
        let material = |index: Option<MaterialId>| match index {
            Some(m) => check(m, self.materials.len(), "material"),
            None => Ok(()),
        };

        for s in &self.sectors {
            material(s.floor.material)?;
            material(s.ceiling.material)?;
        }
        for line in &self.lines {
            vertex(line.from)?;
            vertex(line.to)?;
            for side in &line.sides {
                if let Some(s) = side.sector {
                    sector(s)?;
                }
                if let Some(def) = &side.sidedef {
                    material(def.top.material)?;
                    material(def.middle.material)?;
                    material(def.bottom.material)?;
                }
            }
        }
        for poly in &self.polygons {
            for &v in &poly.vertices {
                vertex(v)?;
            }
            if let Some(s) = poly.sector {
                sector(s)?;
            }
        }
        for a in &self.attachments {
            check(a.subspace, self.polygons.len(), "subspace")?;
            check(a.side.line, self.lines.len(), "line")?;
        }
        Ok(())
    }
}

fn check(index: usize, len: usize, kind: &'static str) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::InvalidIndex { kind, index })
    }
}

/// Returns the polygon's vertices in clockwise order, rejecting degenerate
/// and non-convex input. Repeated consecutive vertices are dropped.
fn normalize_polygon(id: SubspaceId, ring: &[VertexId], vertices: &[Vertex]) -> Result<Vec<VertexId>> {
    let mut ring: Vec<VertexId> = ring.to_vec();
    ring.dedup_by(|a, b| vertices[*a].pos == vertices[*b].pos);
    while ring.len() > 1 && vertices[ring[0]].pos == vertices[ring[ring.len() - 1]].pos {
        ring.pop();
    }
    if ring.len() < 3 {
        return Err(Error::DegeneratePolygon(id));
    }

    let points: Vec<Point2D> = ring.iter().map(|&v| vertices[v].pos).collect();
    let area2 = signed_area2(&points);
    if area2.abs() < EPSILON {
        return Err(Error::DegeneratePolygon(id));
    }
    if area2 > 0.0 {
        ring.reverse();
    }

    // Clockwise rings only turn right (or go straight).
    let n = ring.len();
    for i in 0..n {
        let a = vertices[ring[i]].pos;
        let b = vertices[ring[(i + 1) % n]].pos;
        let c = vertices[ring[(i + 2) % n]].pos;
        if b.minus(&a).cross(&c.minus(&b)) > EPSILON {
            return Err(Error::NonConvex(id));
        }
    }
    Ok(ring)
}

fn build_rings(rings: &[Vec<VertexId>]) -> Vec<HalfEdge> {
    let mut hedges = Vec::with_capacity(rings.iter().map(Vec::len).sum());
    for (face, ring) in rings.iter().enumerate() {
        let first = hedges.len();
        let n = ring.len();
        for (k, &origin) in ring.iter().enumerate() {
            hedges.push(HalfEdge {
                origin,
                next: first + (k + 1) % n,
                twin: None,
                face: Some(face),
                line_side: None,
            });
        }
    }
    hedges
}

/// Pairs each half-edge with the reversed edge of a neighbouring ring.
fn link_twins(hedges: &mut [HalfEdge]) {
    let mut directed: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::with_capacity(hedges.len());
    for id in 0..hedges.len() {
        let key = (hedges[id].origin, hedges[hedges[id].next].origin);
        if directed.insert(key, id).is_some() {
            warn!("overlapping subspaces share directed edge {:?}", key);
        }
    }
    for id in 0..hedges.len() {
        if hedges[id].twin.is_some() {
            continue;
        }
        let (from, to) = (hedges[id].origin, hedges[hedges[id].next].origin);
        if let Some(&twin) = directed.get(&(to, from)) {
            if hedges[twin].twin.is_none() {
                hedges[id].twin = Some(twin);
                hedges[twin].twin = Some(id);
            }
        }
    }
}

/// Attaches every half-edge lying along a map line to the line side facing
/// its subspace.
fn attach_lines_by_geometry(map: &mut Map) {
    for id in 0..map.hedges.len() {
        let segment = map.hedge_line(id);
        let length = segment.length();
        if length == 0.0 {
            continue;
        }
        let mid = Point2D::new(
            (segment.start.x + segment.end.x) / 2.0,
            (segment.start.y + segment.end.y) / 2.0,
        );
        let found = map
            .lines_in_box(&segment.bbox())
            .into_iter()
            .find_map(|line_id| {
                let line = &map.lines[line_id];
                let along = Line2D::new(map.vertices[line.from].pos, map.vertices[line.to].pos);
                let collinear = along.signed_distance(&segment.start).abs() <= EPSILON
                    && along.signed_distance(&segment.end).abs() <= EPSILON;
                if !collinear || !along.bbox().expanded(EPSILON).contains_point(mid.x, mid.y) {
                    return None;
                }
                let side = if along.direction().dot(&segment.direction()) > 0.0 {
                    SideId::Front
                } else {
                    SideId::Back
                };
                Some(LineSideRef { line: line_id, side })
            });
        map.hedges[id].line_side = found;
    }
}

fn apply_attachment(map: &mut Map, attachment: Attachment) -> Result<()> {
    let Attachment { subspace, a, b, side } = attachment;
    let edge = map.hedge_ids(subspace).find(|&h| {
        let from = map.hedges[h].origin;
        let to = map.hedges[map.hedges[h].next].origin;
        (from == a && to == b) || (from == b && to == a)
    });
    match edge {
        Some(h) => {
            map.hedges[h].line_side = Some(side);
            Ok(())
        }
        None => Err(Error::InvalidIndex { kind: "subspace edge", index: subspace }),
    }
}
