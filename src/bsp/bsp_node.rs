//! src/bsp/bsp_node.rs

use crate::error::{Error, Result};
use crate::map::{SideId, SubspaceId};
use crate::utils::{BoundingBox, FixedPoint, Line2D, Point2D, Vector2D};

/// A partition line: an origin and a direction. Its front is the right-hand
/// side. A 16.16 copy is kept for deterministic side tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition {
    pub origin: Point2D,
    pub direction: Vector2D,
    fixed_origin: FixedPoint,
    fixed_direction: FixedPoint,
}

impl Partition {
    pub fn new(origin: Point2D, direction: Vector2D) -> Self {
        Partition {
            origin,
            direction,
            fixed_origin: FixedPoint::from(origin),
            fixed_direction: FixedPoint::from(Point2D::new(direction.x, direction.y)),
        }
    }

    pub fn from_line(line: &Line2D) -> Self {
        Partition::new(line.start, line.direction())
    }

    pub fn line(&self) -> Line2D {
        Line2D::new(
            self.origin,
            Point2D::new(self.origin.x + self.direction.x, self.origin.y + self.direction.y),
        )
    }

    /// Side of the partition `point` lies on. Points exactly on the line
    /// are on the back.
    pub fn point_on_side(&self, point: &Point2D) -> SideId {
        if self.line().classify_point(point) > 0.0 {
            SideId::Front
        } else {
            SideId::Back
        }
    }

    /// Fixed-point version of [`point_on_side`](Self::point_on_side).
    pub fn point_on_side_fixed(&self, point: FixedPoint) -> SideId {
        let dx = point.x.0 as i128 - self.fixed_origin.x.0 as i128;
        let dy = point.y.0 as i128 - self.fixed_origin.y.0 as i128;
        let left = self.fixed_direction.y.0 as i128 * dx;
        let right = dy * self.fixed_direction.x.0 as i128;
        if right < left {
            SideId::Front
        } else {
            SideId::Back
        }
    }
}

/// A reference to either an internal node or a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BspChild {
    Node(usize),
    Leaf(SubspaceId),
}

/// An internal node of the BSP tree.
#[derive(Debug, Clone, PartialEq)]
pub struct BspNode {
    pub partition: Partition,
    pub front: BspChild,
    pub back: BspChild,
    /// Bounds of everything below this node.
    pub bbox: BoundingBox,
}

impl BspNode {
    pub fn child(&self, side: SideId) -> BspChild {
        match side {
            SideId::Front => self.front,
            SideId::Back => self.back,
        }
    }
}

/// Immutable BSP tree stored as a node arena. Children always precede their
/// parent in the arena, so descent is guaranteed to terminate.
#[derive(Debug, Clone, PartialEq)]
pub struct BspTree {
    pub(crate) nodes: Vec<BspNode>,
    pub(crate) root: BspChild,
}

impl BspTree {
    /// A tree for a map with a single subspace.
    pub fn leaf(subspace: SubspaceId) -> Self {
        BspTree {
            nodes: Vec::new(),
            root: BspChild::Leaf(subspace),
        }
    }

    /// Validates a node arena produced elsewhere (e.g. by a map loader).
    pub fn from_nodes(nodes: Vec<BspNode>, root: BspChild, subspace_count: usize) -> Result<Self> {
        let check = |child: BspChild, limit: usize| -> Result<()> {
            match child {
                BspChild::Leaf(s) if s >= subspace_count => Err(Error::InvalidIndex { kind: "subspace", index: s }),
                BspChild::Node(n) if n >= limit => Err(Error::InvalidIndex { kind: "node", index: n }),
                _ => Ok(()),
            }
        };
        for (i, node) in nodes.iter().enumerate() {
            check(node.front, i)?;
            check(node.back, i)?;
        }
        check(root, nodes.len())?;
        Ok(BspTree { nodes, root })
    }

    pub fn root(&self) -> BspChild {
        self.root
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        fn walk(tree: &BspTree, child: BspChild) -> usize {
            match child {
                BspChild::Leaf(_) => 0,
                BspChild::Node(i) => {
                    let node = &tree.nodes[i];
                    1 + walk(tree, node.front).max(walk(tree, node.back))
                }
            }
        }
        walk(self, self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_split() -> BspNode {
        // Line x = 128 pointing down: front is x < 128.
        BspNode {
            partition: Partition::new(Point2D::new(128.0, 128.0), Vector2D::new(0.0, -128.0)),
            front: BspChild::Leaf(0),
            back: BspChild::Leaf(1),
            bbox: BoundingBox::new(0.0, 0.0, 256.0, 128.0),
        }
    }

    #[test]
    fn test_point_on_side_variants_agree() {
        let node = vertical_split();
        for (x, expected) in [(10.0, SideId::Front), (127.5, SideId::Front), (128.0, SideId::Back), (200.0, SideId::Back)] {
            let p = Point2D::new(x, 64.0);
            assert_eq!(node.partition.point_on_side(&p), expected, "x = {}", x);
            assert_eq!(node.partition.point_on_side_fixed(FixedPoint::from(p)), expected, "x = {}", x);
        }
    }

    #[test]
    fn test_from_nodes_validates_children() {
        assert!(BspTree::from_nodes(vec![vertical_split()], BspChild::Node(0), 2).is_ok());

        let err = BspTree::from_nodes(vec![vertical_split()], BspChild::Node(0), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex { kind: "subspace", index: 1 }));

        let mut looping = vertical_split();
        looping.back = BspChild::Node(0);
        let err = BspTree::from_nodes(vec![looping], BspChild::Node(0), 2).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex { kind: "node", .. }));
    }

    #[test]
    fn test_depth() {
        assert_eq!(BspTree::leaf(0).depth(), 0);
        let tree = BspTree::from_nodes(vec![vertical_split()], BspChild::Node(0), 2).unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.node_count(), 1);
    }
}
