// src/bsp/bsp_builder.rs

use log::debug;

use crate::bsp::{BspChild, BspNode, BspTree, Partition, PolygonPosition, BSP_DEPTH_LIMIT};
use crate::error::{Error, Result};
use crate::map::{Map, SubspaceId};
use crate::utils::{BoundingBox, Line2D, Point2D, EPSILON};

/// Builds a BSP tree over a map's convex subspaces.
///
/// Subspaces are never split: at every level the builder picks one of the
/// remaining subspace edges whose line leaves every subspace wholly on one
/// side, preferring the most balanced split. Nodes are appended after their
/// children, so the root is the last node.
pub struct BspBuilder {
    polygons: Vec<Vec<Point2D>>,
    bboxes: Vec<BoundingBox>,
    nodes: Vec<BspNode>,
}

impl BspBuilder {
    pub fn new(map: &Map) -> Self {
        let polygons = (0..map.subspace_count()).map(|s| map.subspace_polygon(s)).collect();
        let bboxes = (0..map.subspace_count()).map(|s| map.subspace(s).bbox).collect();
        BspBuilder {
            polygons,
            bboxes,
            nodes: Vec::new(),
        }
    }

    pub fn build(mut self) -> Result<BspTree> {
        let ids: Vec<SubspaceId> = (0..self.polygons.len()).collect();
        if ids.is_empty() {
            return Err(Error::Unpartitionable { count: 0 });
        }
        let root = self.build_subtree(ids, 0)?;
        let tree = BspTree {
            nodes: self.nodes,
            root,
        };
        debug!("BSP built: {} nodes, depth {}", tree.node_count(), tree.depth());
        Ok(tree)
    }

    fn build_subtree(&mut self, ids: Vec<SubspaceId>, depth: usize) -> Result<BspChild> {
        if depth >= BSP_DEPTH_LIMIT {
            return Err(Error::BspDepthExceeded);
        }
        if let &[only] = ids.as_slice() {
            return Ok(BspChild::Leaf(only));
        }

        let partition = self.choose_partition(&ids)?;
        let bbox = self.compute_node_bbox(&ids);
        let (front_ids, back_ids) = self.split_subspaces(&ids, &partition);

        let front = self.build_subtree(front_ids, depth + 1)?;
        let back = self.build_subtree(back_ids, depth + 1)?;

        self.nodes.push(BspNode {
            partition: Partition::from_line(&partition),
            front,
            back,
            bbox,
        });
        Ok(BspChild::Node(self.nodes.len() - 1))
    }

    /// Picks the edge line with the most even front/back split among those
    /// that split nothing.
    fn choose_partition(&self, ids: &[SubspaceId]) -> Result<Line2D> {
        let mut best: Option<(usize, Line2D)> = None;
        for &candidate in ids {
            let ring = &self.polygons[candidate];
            for k in 0..ring.len() {
                let line = Line2D::new(ring[k], ring[(k + 1) % ring.len()]);
                if line.length() == 0.0 {
                    continue;
                }
                let Some((front, back)) = self.count_sides(ids, &line) else {
                    continue;
                };
                let score = front.abs_diff(back);
                if best.as_ref().map_or(true, |(s, _)| score < *s) {
                    best = Some((score, line));
                    if score <= ids.len() % 2 {
                        return Ok(line);
                    }
                }
            }
        }
        best.map(|(_, line)| line)
            .ok_or(Error::Unpartitionable { count: ids.len() })
    }

    /// Front and back counts, or `None` if the line splits a subspace or
    /// leaves one side empty.
    fn count_sides(&self, ids: &[SubspaceId], line: &Line2D) -> Option<(usize, usize)> {
        let (mut front, mut back) = (0, 0);
        for &id in ids {
            match self.classify_subspace(id, line) {
                PolygonPosition::Front => front += 1,
                PolygonPosition::Back => back += 1,
                PolygonPosition::Spanning | PolygonPosition::Coincident => return None,
            }
        }
        (front > 0 && back > 0).then_some((front, back))
    }

    fn split_subspaces(&self, ids: &[SubspaceId], line: &Line2D) -> (Vec<SubspaceId>, Vec<SubspaceId>) {
        ids.iter()
            .copied()
            .partition(|&id| self.classify_subspace(id, line) == PolygonPosition::Front)
    }

    fn classify_subspace(&self, id: SubspaceId, line: &Line2D) -> PolygonPosition {
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for point in &self.polygons[id] {
            let side = line.signed_distance(point);
            min = min.min(side);
            max = max.max(side);
        }
        if min >= -EPSILON && max > EPSILON {
            PolygonPosition::Front
        } else if max <= EPSILON && min < -EPSILON {
            PolygonPosition::Back
        } else if max <= EPSILON && min >= -EPSILON {
            PolygonPosition::Coincident
        } else {
            PolygonPosition::Spanning
        }
    }

    fn compute_node_bbox(&self, ids: &[SubspaceId]) -> BoundingBox {
        let mut bbox = BoundingBox::new_empty();
        for &id in ids {
            bbox.combine(&self.bboxes[id]);
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::fixtures::chain;
    use crate::map::{MapBuilder, Sector};

    #[test]
    fn test_chain_tree_is_balanced() {
        let map = chain(64, 64.0);
        let tree = map.bsp().unwrap();
        assert_eq!(tree.node_count(), 63);
        assert!(tree.depth() <= 7, "depth {}", tree.depth());
        assert!(matches!(tree.root(), BspChild::Node(i) if i == 62));
    }

    #[test]
    fn test_node_bbox_covers_children() {
        let map = chain(5, 64.0);
        let tree = map.bsp().unwrap();
        if let BspChild::Node(root) = tree.root() {
            assert_eq!(tree.nodes()[root].bbox, BoundingBox::new(0.0, 0.0, 320.0, 64.0));
        } else {
            panic!("expected an internal root");
        }
    }

    #[test]
    fn test_pinwheel_is_unpartitionable() {
        // Four rectangles around a central square; no edge line avoids
        // cutting one of them.
        let mut builder = MapBuilder::new().with_bsp(false);
        let s = builder.add_sector(Sector::new(0.0, 64.0, None, None));
        let mut rect = |x0: f64, y0: f64, x1: f64, y1: f64| {
            let ring = [
                builder.add_vertex(x0, y0),
                builder.add_vertex(x1, y0),
                builder.add_vertex(x1, y1),
                builder.add_vertex(x0, y1),
            ];
            builder.add_subspace(&ring, Some(s));
        };
        rect(0.0, 0.0, 2.0, 1.0);
        rect(2.0, 0.0, 3.0, 2.0);
        rect(1.0, 2.0, 3.0, 3.0);
        rect(0.0, 1.0, 1.0, 3.0);
        rect(1.0, 1.0, 2.0, 2.0);
        let map = builder.build().unwrap();
        let err = BspBuilder::new(&map).build().unwrap_err();
        assert!(matches!(err, Error::Unpartitionable { count: 5 }));
    }
}
