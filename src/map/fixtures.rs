// src/map/fixtures.rs
// Small hand-built maps shared by unit tests.

use crate::map::{
    Line, LineSide, Map, MapBuilder, Material, Sector, SideDef, SideFlags, Surface, VertexId,
};

/// What lies along the edge shared by the two rooms.
#[derive(Debug, Clone)]
pub(crate) enum SharedEdge {
    /// No map line, just adjacent subspaces.
    Open,
    /// A two-sided line running from (128,128) to (128,0): room A is its
    /// front, room B its back.
    TwoSided { front_sections: bool, back_sections: bool },
    /// Both sides have sections; the front side carries a middle surface.
    Middle {
        material: Material,
        surface: Surface,
        flags: SideFlags,
    },
}

/// Room A is `[0,128]²`, room B is `[128,256]×[0,128]`.
#[derive(Debug, Clone)]
pub(crate) struct TwoRooms {
    shared: SharedEdge,
    a: (f64, f64),
    b: (f64, f64),
    sky_ceilings: (bool, bool),
}

impl TwoRooms {
    pub(crate) fn new(shared: SharedEdge) -> Self {
        TwoRooms {
            shared,
            a: (0.0, 128.0),
            b: (0.0, 128.0),
            sky_ceilings: (false, false),
        }
    }

    pub(crate) fn a(mut self, floor: f64, ceiling: f64) -> Self {
        self.a = (floor, ceiling);
        self
    }

    pub(crate) fn b(mut self, floor: f64, ceiling: f64) -> Self {
        self.b = (floor, ceiling);
        self
    }

    pub(crate) fn sky_ceilings(mut self, a: bool, b: bool) -> Self {
        self.sky_ceilings = (a, b);
        self
    }

    pub(crate) fn build(self) -> Map {
        let mut builder = MapBuilder::new();
        let wall = builder.add_material(Material::new("WALL", 64.0, 128.0));
        let sky = builder.add_material(Material::sky("F_SKY1"));
        let ceiling = |is_sky: bool| if is_sky { Some(sky) } else { Some(wall) };

        let a = builder.add_sector(Sector::new(self.a.0, self.a.1, Some(wall), ceiling(self.sky_ceilings.0)));
        let b = builder.add_sector(Sector::new(self.b.0, self.b.1, Some(wall), ceiling(self.sky_ceilings.1)));

        let v: Vec<VertexId> = [(0.0, 0.0), (128.0, 0.0), (256.0, 0.0), (256.0, 128.0), (128.0, 128.0), (0.0, 128.0)]
            .iter()
            .map(|&(x, y)| builder.add_vertex(x, y))
            .collect();

        let sections = |present: bool| present.then(SideDef::new);
        match self.shared {
            SharedEdge::Open => {}
            SharedEdge::TwoSided { front_sections, back_sections } => {
                builder.add_line(Line::new(
                    v[4],
                    v[1],
                    LineSide::new(Some(a), sections(front_sections)),
                    LineSide::new(Some(b), sections(back_sections)),
                ));
            }
            SharedEdge::Middle { material, surface, flags } => {
                let id = builder.add_material(material);
                let middle = Surface {
                    material: Some(id),
                    ..surface
                };
                builder.add_line(Line::new(
                    v[4],
                    v[1],
                    LineSide::with_sections(a, SideDef::new().with_middle(middle).with_flags(flags)),
                    LineSide::with_sections(b, SideDef::new()),
                ));
            }
        }

        builder.add_subspace(&[v[0], v[1], v[4], v[5]], Some(a));
        builder.add_subspace(&[v[1], v[2], v[3], v[4]], Some(b));
        builder.build().expect("two-room fixture")
    }
}

pub(crate) fn two_rooms(shared: SharedEdge) -> Map {
    TwoRooms::new(shared).build()
}

/// `n` square rooms of side `size` in a row along +x, each its own sector,
/// joined by open two-sided lines and closed by one-sided walls.
pub(crate) fn chain(n: usize, size: f64) -> Map {
    let mut builder = MapBuilder::new();
    let wall = builder.add_material(Material::new("WALL", 64.0, 128.0));
    let bottom: Vec<VertexId> = (0..=n).map(|i| builder.add_vertex(i as f64 * size, 0.0)).collect();
    let top: Vec<VertexId> = (0..=n).map(|i| builder.add_vertex(i as f64 * size, size)).collect();
    let sectors: Vec<_> = (0..n)
        .map(|_| builder.add_sector(Sector::new(0.0, 128.0, Some(wall), Some(wall))))
        .collect();

    let solid = |s| LineSide::with_sections(s, SideDef::with_defaults(wall, false));
    for (i, &s) in sectors.iter().enumerate() {
        builder.add_line(Line::new(bottom[i + 1], bottom[i], solid(s), LineSide::void()));
        builder.add_line(Line::new(top[i], top[i + 1], solid(s), LineSide::void()));
        builder.add_subspace(&[bottom[i], bottom[i + 1], top[i + 1], top[i]], Some(s));
    }
    builder.add_line(Line::new(bottom[0], top[0], solid(sectors[0]), LineSide::void()));
    builder.add_line(Line::new(top[n], bottom[n], solid(sectors[n - 1]), LineSide::void()));
    for i in 1..n {
        builder.add_line(Line::new(
            top[i],
            bottom[i],
            LineSide::with_sections(sectors[i - 1], SideDef::with_defaults(wall, true)),
            LineSide::with_sections(sectors[i], SideDef::with_defaults(wall, true)),
        ));
    }
    builder.build().expect("chain fixture")
}
