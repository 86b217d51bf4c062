// src/bsp/locate.rs
// Point location by BSP descent.

use crate::bsp::{BspChild, BspTree};
use crate::map::SubspaceId;
use crate::utils::{FixedPoint, Point2D};

impl BspTree {
    /// Returns the subspace whose leaf contains `point`.
    pub fn locate(&self, point: &Point2D) -> SubspaceId {
        let mut child = self.root;
        loop {
            match child {
                BspChild::Leaf(subspace) => return subspace,
                BspChild::Node(index) => {
                    let node = &self.nodes[index];
                    child = node.child(node.partition.point_on_side(point));
                }
            }
        }
    }

    /// Same as [`locate`](Self::locate) using 16.16 arithmetic only, for
    /// results that must match across machines.
    pub fn locate_fixed(&self, point: FixedPoint) -> SubspaceId {
        let mut child = self.root;
        loop {
            match child {
                BspChild::Leaf(subspace) => return subspace,
                BspChild::Node(index) => {
                    let node = &self.nodes[index];
                    child = node.child(node.partition.point_on_side_fixed(point));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::error::Error;
    use crate::map::fixtures::{chain, two_rooms, SharedEdge};
    use crate::map::generator::{GeneratorConfig, ProceduralGenerator};
    use crate::map::MapBuilder;
    use crate::utils::{FixedPoint, Point2D};

    #[test]
    fn test_locate_two_rooms() {
        let map = two_rooms(SharedEdge::Open);
        assert_eq!(map.locate(&Point2D::new(64.0, 64.0)).unwrap(), 0);
        assert_eq!(map.locate(&Point2D::new(200.0, 64.0)).unwrap(), 1);
    }

    #[test]
    fn test_locate_is_idempotent() {
        let map = chain(12, 64.0);
        let p = Point2D::new(64.0 * 7.0 + 5.0, 32.0);
        let first = map.locate(&p).unwrap();
        for _ in 0..5 {
            assert_eq!(map.locate(&p).unwrap(), first);
        }
        assert_eq!(first, 7);
    }

    #[test]
    fn test_every_room_centre_locates_its_subspace() {
        let map = chain(40, 64.0);
        for i in 0..40 {
            let centre = Point2D::new(64.0 * i as f64 + 32.0, 32.0);
            assert_eq!(map.locate(&centre).unwrap(), i);
        }
    }

    #[test]
    fn test_fixed_and_float_agree_on_generated_map() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = GeneratorConfig { cols: 9, rows: 7, ..GeneratorConfig::default() };
        let map = ProceduralGenerator::new(config, StdRng::seed_from_u64(11))
            .unwrap()
            .generate()
            .build()
            .unwrap();
        let bounds = *map.bounds();
        for _ in 0..2000 {
            // Half-unit lattice: exactly representable in both encodings.
            let x = (rng.random_range(bounds.min_x..bounds.max_x) * 2.0).floor() / 2.0;
            let y = (rng.random_range(bounds.min_y..bounds.max_y) * 2.0).floor() / 2.0;
            let p = Point2D::new(x, y);
            assert_eq!(
                map.locate(&p).unwrap(),
                map.locate_fixed(FixedPoint::from(p)).unwrap(),
                "disagreement at {:?}",
                p
            );
        }
    }

    #[test]
    fn test_bsp_and_blockmap_locators_agree() {
        let mut rng = StdRng::seed_from_u64(3);
        let map = ProceduralGenerator::new(GeneratorConfig::default(), StdRng::seed_from_u64(5))
            .unwrap()
            .generate()
            .build()
            .unwrap();
        let bounds = *map.bounds();
        for _ in 0..500 {
            // Stay off the room boundaries, where both answers are valid.
            let x = rng.random_range(bounds.min_x..bounds.max_x).floor() + 0.5;
            let y = rng.random_range(bounds.min_y..bounds.max_y).floor() + 0.5;
            let p = Point2D::new(x, y);
            assert_eq!(Some(map.locate(&p).unwrap()), map.locate_via_blockmap(&p));
        }
    }

    #[test]
    fn test_missing_bsp() {
        let map = {
            let mut builder = MapBuilder::new().with_bsp(false);
            let s = builder.add_sector(crate::map::Sector::new(0.0, 128.0, None, None));
            let v: Vec<_> = [(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]
                .iter()
                .map(|&(x, y)| builder.add_vertex(x, y))
                .collect();
            builder.add_subspace(&v, Some(s));
            builder.build().unwrap()
        };
        assert!(matches!(map.locate(&Point2D::new(1.0, 1.0)), Err(Error::MissingBsp)));
        assert_eq!(map.locate_via_blockmap(&Point2D::new(1.0, 1.0)), Some(0));
    }
}
