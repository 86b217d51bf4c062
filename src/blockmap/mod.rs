// src/blockmap/mod.rs
//! Uniform-grid spatial index ("blockmap").
//!
//! The grid exactly covers a bounding box with square cells (128 map units by
//! default). Each cell owns a plain `Vec` of linked objects. Point objects
//! live in one cell; AABB-spanning objects (subspaces, lines) are linked into
//! every cell they overlap.
//!
//! A blockmap can optionally carry a processed-cells bitmap, used by the
//! contact spreader to handle each cell at most once per frame. The bitmap is
//! reset together with the cell lists by [`Blockmap::clear`].

use std::ops::ControlFlow;

use bit_vec::BitVec;
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::utils::util::clamp;
use crate::utils::{BoundingBox, Point2D};

/// Column/row of a blockmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockCell {
    pub col: u32,
    pub row: u32,
}

impl BlockCell {
    pub fn new(col: u32, row: u32) -> Self {
        BlockCell { col, row }
    }
}

/// Inclusive range of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCellBox {
    pub min: BlockCell,
    pub max: BlockCell,
}

impl BlockCellBox {
    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = BlockCell> {
        let (min, max) = (self.min, self.max);
        (min.row..=max.row).flat_map(move |row| (min.col..=max.col).map(move |col| BlockCell::new(col, row)))
    }

    /// Number of cells; never zero.
    pub fn len(&self) -> usize {
        ((self.max.col - self.min.col + 1) * (self.max.row - self.min.row + 1)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct Blockmap<T> {
    bounds: BoundingBox,
    cell_size: f64,
    width: u32,
    height: u32,
    cells: Vec<Vec<T>>,
    processed: Option<BitVec>,
}

impl<T> Blockmap<T> {
    /// Builds a grid covering `bounds`; `width = ceil(extent / cell_size)`,
    /// at least one cell in each direction.
    pub fn new(bounds: BoundingBox, cell_size: f64) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::InvalidGrid(format!("cell size {} is not positive", cell_size)));
        }
        if bounds.is_empty() || !bounds.width().is_finite() || !bounds.height().is_finite() {
            return Err(Error::InvalidGrid(format!("bounds {:?} are empty", bounds)));
        }

        let width = ((bounds.width() / cell_size).ceil() as u32).max(1);
        let height = ((bounds.height() / cell_size).ceil() as u32).max(1);
        let count = width as usize * height as usize;

        let mut cells = Vec::with_capacity(count);
        cells.resize_with(count, Vec::new);

        debug!("blockmap {}x{} cells of {} units", width, height, cell_size);
        Ok(Blockmap {
            bounds,
            cell_size,
            width,
            height,
            cells,
            processed: None,
        })
    }

    /// Attaches a processed-cells bitmap.
    pub fn with_processed_cells(mut self) -> Self {
        self.processed = Some(BitVec::from_elem(self.cells.len(), false));
        self
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of links across all cells.
    pub fn link_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    fn index(&self, cell: BlockCell) -> Option<usize> {
        if cell.col < self.width && cell.row < self.height {
            Some(cell.row as usize * self.width as usize + cell.col as usize)
        } else {
            None
        }
    }

    fn axis_cell(&self, value: f64, min: f64, cells: u32) -> u32 {
        let c = ((value - min) / self.cell_size).floor();
        clamp(c, 0.0, (cells - 1) as f64) as u32
    }

    /// Maps a point to its cell. Points outside the bounds are flagged and
    /// clamped to the nearest edge cell.
    pub fn to_cell(&self, point: &Point2D) -> (BlockCell, bool) {
        let outside = !self.bounds.contains_point(point.x, point.y);
        let col = self.axis_cell(point.x, self.bounds.min_x, self.width);
        let row = self.axis_cell(point.y, self.bounds.min_y, self.height);
        (BlockCell::new(col, row), outside)
    }

    /// The cells overlapped by `region`, or `None` if it misses the grid.
    pub fn cell_box(&self, region: &BoundingBox) -> Option<BlockCellBox> {
        if region.is_empty() || !region.intersects(&self.bounds) {
            return None;
        }
        let min = BlockCell::new(
            self.axis_cell(region.min_x.max(self.bounds.min_x), self.bounds.min_x, self.width),
            self.axis_cell(region.min_y.max(self.bounds.min_y), self.bounds.min_y, self.height),
        );
        let max = BlockCell::new(
            self.axis_cell(region.max_x.min(self.bounds.max_x), self.bounds.min_x, self.width),
            self.axis_cell(region.max_y.min(self.bounds.max_y), self.bounds.min_y, self.height),
        );
        Some(BlockCellBox { min, max })
    }

    /// Appends `object` to `cell`. Returns `false` if the cell is not part
    /// of the grid.
    pub fn link(&mut self, cell: BlockCell, object: T) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.cells[i].push(object);
                true
            }
            None => false,
        }
    }

    /// Links a point object into the cell containing `point`. Points outside
    /// the grid are dropped silently.
    pub fn link_point(&mut self, point: &Point2D, object: T) -> bool {
        let (cell, outside) = self.to_cell(point);
        if outside {
            trace!("dropping blockmap insertion outside bounds at ({}, {})", point.x, point.y);
            return false;
        }
        self.link(cell, object)
    }

    /// Empties every cell, keeping the grid allocation.
    pub fn unlink_all(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Empties every cell and resets the processed-cells bitmap.
    pub fn clear(&mut self) {
        self.unlink_all();
        self.clear_processed();
    }

    pub fn cell(&self, cell: BlockCell) -> &[T] {
        match self.index(cell) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    /// Visits the objects linked in `cell` until the visitor breaks.
    pub fn for_all_in_cell<B, F>(&self, cell: BlockCell, mut visitor: F) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        for object in self.cell(cell) {
            visitor(object)?;
        }
        ControlFlow::Continue(())
    }

    /// Visits the objects in every cell overlapped by `region`. An object
    /// linked into several cells is visited once per cell.
    pub fn for_all_in_box<B, F>(&self, region: &BoundingBox, mut visitor: F) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        if let Some(cells) = self.cell_box(region) {
            for cell in cells.cells() {
                self.for_all_in_cell(cell, &mut visitor)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Marks `cell` as handled for the current pass. Returns `true` if it
    /// was not marked before. Without a bitmap every call returns `true`.
    pub fn mark_processed(&mut self, cell: BlockCell) -> bool {
        let index = match self.index(cell) {
            Some(i) => i,
            None => return false,
        };
        match self.processed.as_mut() {
            Some(bits) => {
                if bits.get(index).unwrap_or(false) {
                    false
                } else {
                    bits.set(index, true);
                    true
                }
            }
            None => true,
        }
    }

    pub fn is_processed(&self, cell: BlockCell) -> bool {
        match (self.index(cell), self.processed.as_ref()) {
            (Some(i), Some(bits)) => bits.get(i).unwrap_or(false),
            _ => false,
        }
    }

    pub fn clear_processed(&mut self) {
        if let Some(bits) = self.processed.as_mut() {
            bits.clear();
        }
    }
}

impl<T: Clone> Blockmap<T> {
    /// Links an AABB-spanning object into every overlapped cell. Returns
    /// the number of cells linked.
    pub fn link_box(&mut self, region: &BoundingBox, object: T) -> usize {
        let cells = match self.cell_box(region) {
            Some(cells) => cells,
            None => {
                trace!("dropping blockmap box insertion outside bounds: {:?}", region);
                return 0;
            }
        };
        let mut linked = 0;
        for cell in cells.cells() {
            if self.link(cell, object.clone()) {
                linked += 1;
            }
        }
        linked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Blockmap<u32> {
        Blockmap::new(BoundingBox::new(0.0, 0.0, 300.0, 128.0), 128.0).unwrap()
    }

    #[test]
    fn test_dimensions_round_up() {
        let bm = grid();
        assert_eq!(bm.width(), 3);
        assert_eq!(bm.height(), 1);
        assert_eq!(bm.cell_count(), 3);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Blockmap::<u32>::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0.0).is_err());
        assert!(Blockmap::<u32>::new(BoundingBox::new_empty(), 128.0).is_err());
    }

    #[test]
    fn test_to_cell_flags_outside() {
        let bm = grid();
        assert_eq!(bm.to_cell(&Point2D::new(130.0, 5.0)), (BlockCell::new(1, 0), false));
        // The far edge belongs to the last cell.
        assert_eq!(bm.to_cell(&Point2D::new(300.0, 128.0)), (BlockCell::new(2, 0), false));
        let (cell, outside) = bm.to_cell(&Point2D::new(-1.0, 5.0));
        assert!(outside);
        assert_eq!(cell, BlockCell::new(0, 0));
    }

    #[test]
    fn test_out_of_bounds_insert_is_dropped() {
        let mut bm = grid();
        assert!(!bm.link_point(&Point2D::new(500.0, 5.0), 7));
        assert!(!bm.link(BlockCell::new(9, 9), 7));
        assert_eq!(bm.link_count(), 0);
    }

    #[test]
    fn test_link_box_spans_cells() {
        let mut bm = grid();
        let linked = bm.link_box(&BoundingBox::new(100.0, 10.0, 140.0, 20.0), 1);
        assert_eq!(linked, 2);
        assert_eq!(bm.cell(BlockCell::new(0, 0)), &[1]);
        assert_eq!(bm.cell(BlockCell::new(1, 0)), &[1]);
        assert!(bm.cell(BlockCell::new(2, 0)).is_empty());
        assert_eq!(bm.link_box(&BoundingBox::new(400.0, 0.0, 500.0, 10.0), 2), 0);
    }

    #[test]
    fn test_for_all_in_box_stops_on_break() {
        let mut bm = grid();
        for i in 0..5 {
            bm.link_point(&Point2D::new(10.0 + i as f64 * 60.0, 5.0), i);
        }
        let mut seen = Vec::new();
        let result = bm.for_all_in_box(&BoundingBox::new(0.0, 0.0, 300.0, 128.0), |&obj| {
            seen.push(obj);
            if obj == 2 {
                ControlFlow::Break(obj)
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(result, ControlFlow::Break(2));
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_clear_keeps_structure() {
        let mut bm = grid().with_processed_cells();
        bm.link_point(&Point2D::new(5.0, 5.0), 1);
        assert!(bm.mark_processed(BlockCell::new(0, 0)));
        bm.clear();
        assert_eq!(bm.link_count(), 0);
        assert_eq!(bm.cell_count(), 3);
        assert!(!bm.is_processed(BlockCell::new(0, 0)));
    }

    #[test]
    fn test_processed_cells_mark_once() {
        let mut bm = grid().with_processed_cells();
        let cell = BlockCell::new(1, 0);
        assert!(!bm.is_processed(cell));
        assert!(bm.mark_processed(cell));
        assert!(!bm.mark_processed(cell));
        assert!(bm.is_processed(cell));
        bm.clear_processed();
        assert!(bm.mark_processed(cell));
    }

    #[test]
    fn test_cell_box_clamps_and_misses() {
        let bm = grid();
        let cells = bm.cell_box(&BoundingBox::new(-50.0, -50.0, 129.0, 500.0)).unwrap();
        assert_eq!(cells.min, BlockCell::new(0, 0));
        assert_eq!(cells.max, BlockCell::new(1, 0));
        assert_eq!(cells.len(), 2);
        assert_eq!(cells.cells().count(), 2);
        assert!(bm.cell_box(&BoundingBox::new(301.0, 0.0, 400.0, 10.0)).is_none());
    }
}
