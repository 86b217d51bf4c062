// src/map/generator.rs

use log::debug;
use rand::Rng;

use crate::error::{Error, Result};
use crate::map::{
    Line, LineSide, MapBuilder, Material, MaterialId, Sector, SectorId, SideDef, SideFlags, Surface, VertexId,
};

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub cols: usize,
    pub rows: usize,
    pub room_size: f64,
    /// Highest floor; floors are multiples of 8 in `0..=max_floor`.
    pub max_floor: i32,
    pub min_headroom: i32,
    pub max_headroom: i32,
    /// Chance that an interior line lacks sections on one side.
    pub one_way_chance: f64,
    /// Chance that an interior line carries a middle texture.
    pub middle_chance: f64,
    /// Chance that a room has a sky ceiling.
    pub sky_chance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            cols: 8,
            rows: 8,
            room_size: 128.0,
            max_floor: 32,
            min_headroom: 64,
            max_headroom: 160,
            one_way_chance: 0.1,
            middle_chance: 0.15,
            sky_chance: 0.2,
        }
    }
}

impl GeneratorConfig {
    /// Rejects grids the generator cannot lay out.
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Err(Error::InvalidConfig(format!(
                "room grid must be at least 1x1, got {}x{}",
                self.cols, self.rows
            )));
        }
        if !(self.room_size.is_finite() && self.room_size > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "room_size must be positive, got {}",
                self.room_size
            )));
        }
        if self.max_floor < 0 {
            return Err(Error::InvalidConfig(format!(
                "max_floor must be non-negative, got {}",
                self.max_floor
            )));
        }
        if self.min_headroom <= 0 || self.max_headroom < self.min_headroom {
            return Err(Error::InvalidConfig(format!(
                "headroom range {}..={} is empty or closed",
                self.min_headroom, self.max_headroom
            )));
        }
        for (name, chance) in [
            ("one_way_chance", self.one_way_chance),
            ("middle_chance", self.middle_chance),
            ("sky_chance", self.sky_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(Error::InvalidConfig(format!(
                    "{} must lie in 0..=1, got {}",
                    name, chance
                )));
            }
        }
        Ok(())
    }
}

struct Palette {
    wall: MaterialId,
    flat: MaterialId,
    sky: MaterialId,
    grate: MaterialId,
    bars: MaterialId,
}

/// Generates a grid of square rooms, one convex subspace and one sector
/// each, with random heights, one-way windows and middle textures.
pub struct ProceduralGenerator<R: Rng> {
    config: GeneratorConfig,
    rng: R,
}

impl<R: Rng> ProceduralGenerator<R> {
    pub fn new(config: GeneratorConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(ProceduralGenerator { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(&mut self) -> MapBuilder {
        let (cols, rows) = (self.config.cols, self.config.rows);
        let mut builder = MapBuilder::new();
        let palette = Palette {
            wall: builder.add_material(Material::new("WALL", 64.0, 128.0)),
            flat: builder.add_material(Material::new("FLOOR", 64.0, 64.0)),
            sky: builder.add_material(Material::sky("F_SKY1")),
            grate: builder.add_material(Material::new("GRATE", 64.0, 128.0).translucent()),
            bars: builder.add_material(Material::new("MIDBARS", 64.0, 64.0)),
        };

        let size = self.config.room_size;
        let mut vertices = Vec::with_capacity((cols + 1) * (rows + 1));
        for y in 0..=rows {
            for x in 0..=cols {
                vertices.push(builder.add_vertex(x as f64 * size, y as f64 * size));
            }
        }
        let v = |x: usize, y: usize| -> VertexId { vertices[y * (cols + 1) + x] };

        let mut rooms: Vec<SectorId> = Vec::with_capacity(cols * rows);
        for _ in 0..cols * rows {
            let sector = self.random_sector(&palette);
            rooms.push(builder.add_sector(sector));
        }
        let room = |x: usize, y: usize| -> SectorId { rooms[y * cols + x] };

        for y in 0..rows {
            for x in 0..cols {
                builder.add_subspace(&[v(x, y), v(x + 1, y), v(x + 1, y + 1), v(x, y + 1)], Some(room(x, y)));
            }
        }

        // Interior lines: the room with the larger coordinate is the front.
        for y in 0..rows {
            for x in 1..cols {
                let line = self.interior_line(&palette, v(x, y), v(x, y + 1), room(x, y), room(x - 1, y));
                builder.add_line(line);
            }
        }
        for y in 1..rows {
            for x in 0..cols {
                let line = self.interior_line(&palette, v(x + 1, y), v(x, y), room(x, y), room(x, y - 1));
                builder.add_line(line);
            }
        }

        // Boundary walls face inward.
        let wall = |s: SectorId| LineSide::with_sections(s, SideDef::with_defaults(palette.wall, false));
        for x in 0..cols {
            builder.add_line(Line::new(v(x + 1, 0), v(x, 0), wall(room(x, 0)), LineSide::void()));
            builder.add_line(Line::new(v(x, rows), v(x + 1, rows), wall(room(x, rows - 1)), LineSide::void()));
        }
        for y in 0..rows {
            builder.add_line(Line::new(v(0, y), v(0, y + 1), wall(room(0, y)), LineSide::void()));
            builder.add_line(Line::new(v(cols, y + 1), v(cols, y), wall(room(cols - 1, y)), LineSide::void()));
        }

        debug!("generated {}x{} room grid", cols, rows);
        builder
    }

    fn random_sector(&mut self, palette: &Palette) -> Sector {
        let floor = self.rng.random_range(0..=self.config.max_floor / 8) * 8;
        let headroom = self
            .rng
            .random_range(self.config.min_headroom..=self.config.max_headroom);
        let ceiling_material = if self.rng.random_bool(self.config.sky_chance) {
            palette.sky
        } else {
            palette.flat
        };
        Sector::new(
            floor as f64,
            (floor + headroom) as f64,
            Some(palette.flat),
            Some(ceiling_material),
        )
    }

    fn interior_line(
        &mut self,
        palette: &Palette,
        from: VertexId,
        to: VertexId,
        front: SectorId,
        back: SectorId,
    ) -> Line {
        let mut front_def = Some(SideDef::with_defaults(palette.wall, true));
        let mut back_def = Some(SideDef::with_defaults(palette.wall, true));

        if self.rng.random_bool(self.config.one_way_chance) {
            if self.rng.random_bool(0.5) {
                front_def = None;
            } else {
                back_def = None;
            }
        }
        if self.rng.random_bool(self.config.middle_chance) {
            let material = if self.rng.random_bool(0.5) { palette.grate } else { palette.bars };
            let flags = SideFlags {
                lower_unpegged: self.rng.random_bool(0.5),
                ..SideFlags::default()
            };
            for def in [&mut front_def, &mut back_def].into_iter().flatten() {
                def.middle = Surface::with_material(material);
                def.flags = flags;
            }
        }

        Line::new(
            from,
            to,
            LineSide::new(Some(front), front_def),
            LineSide::new(Some(back), back_def),
        )
    }
}

/// Convenience wrapper: a room grid ready to build.
pub fn room_grid<R: Rng>(config: GeneratorConfig, rng: R) -> Result<MapBuilder> {
    Ok(ProceduralGenerator::new(config, rng)?.generate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_room_grid_topology() {
        let config = GeneratorConfig { cols: 4, rows: 3, ..GeneratorConfig::default() };
        let map = room_grid(config, StdRng::seed_from_u64(1)).unwrap().build().unwrap();
        assert_eq!(map.subspace_count(), 12);
        assert_eq!(map.subsector_count(), 12);
        // 3*3 vertical plus 4*2 horizontal interior edges, two half-edges each.
        let twinned = (0..map.hedges.len()).filter(|&h| map.hedge(h).has_twin()).count();
        assert_eq!(twinned, 2 * (9 + 8));
        // Every half-edge lies on a line.
        assert!((0..map.hedges.len()).all(|h| map.hedge(h).line_side.is_some()));
    }

    #[test]
    fn test_generation_is_deterministic_per_seed() {
        let build = |seed| room_grid(GeneratorConfig::default(), StdRng::seed_from_u64(seed)).unwrap().build().unwrap();
        let (a, b) = (build(9), build(9));
        for s in 0..a.sector_count() {
            assert_eq!(a.sector(s), b.sector(s));
        }
        for l in 0..a.line_count() {
            assert_eq!(a.line(l), b.line(l));
        }
    }

    #[test]
    fn test_heights_within_range() {
        let config = GeneratorConfig::default();
        let map = room_grid(config.clone(), StdRng::seed_from_u64(4)).unwrap().build().unwrap();
        for s in 0..map.sector_count() {
            let sector = map.sector(s);
            assert!(sector.floor.height() >= 0.0 && sector.floor.height() <= config.max_floor as f64);
            assert!(sector.headroom() >= config.min_headroom as f64);
        }
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let bad = [
            GeneratorConfig { cols: 0, ..GeneratorConfig::default() },
            GeneratorConfig { max_floor: -8, ..GeneratorConfig::default() },
            GeneratorConfig { min_headroom: 0, ..GeneratorConfig::default() },
            GeneratorConfig { max_headroom: 32, ..GeneratorConfig::default() },
            GeneratorConfig { sky_chance: 1.5, ..GeneratorConfig::default() },
            GeneratorConfig { middle_chance: f64::NAN, ..GeneratorConfig::default() },
        ];
        for config in bad {
            assert!(matches!(
                room_grid(config, StdRng::seed_from_u64(0)),
                Err(Error::InvalidConfig(_))
            ));
        }
        assert!(GeneratorConfig::default().validate().is_ok());
    }
}
