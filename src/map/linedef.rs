// src/map/linedef.rs

use crate::map::sector::SectorId;
use crate::map::sidedef::SideDef;
use crate::map::vertex::VertexId;

pub type LineId = usize;

/// Front is the right-hand side of a line (walking from `from` to `to`),
/// back is the left-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideId {
    Front = 0,
    Back = 1,
}

impl SideId {
    pub fn flip(self) -> SideId {
        match self {
            SideId::Front => SideId::Back,
            SideId::Back => SideId::Front,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Names one side of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSideRef {
    pub line: LineId,
    pub side: SideId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineSide {
    pub sector: Option<SectorId>,
    pub sidedef: Option<SideDef>,
}

impl LineSide {
    pub fn new(sector: Option<SectorId>, sidedef: Option<SideDef>) -> Self {
        LineSide { sector, sidedef }
    }

    /// A side facing `sector` with a sidedef.
    pub fn with_sections(sector: SectorId, sidedef: SideDef) -> Self {
        LineSide::new(Some(sector), Some(sidedef))
    }

    /// The void beyond a one-sided line.
    pub fn void() -> Self {
        LineSide::default()
    }

    pub fn has_sections(&self) -> bool {
        self.sidedef.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub from: VertexId,
    pub to: VertexId,
    pub sides: [LineSide; 2],
}

impl Line {
    pub fn new(from: VertexId, to: VertexId, front: LineSide, back: LineSide) -> Self {
        Line {
            from,
            to,
            sides: [front, back],
        }
    }

    pub fn side(&self, side: SideId) -> &LineSide {
        &self.sides[side.index()]
    }

    pub fn front(&self) -> &LineSide {
        self.side(SideId::Front)
    }

    pub fn back(&self) -> &LineSide {
        self.side(SideId::Back)
    }

    pub fn is_two_sided(&self) -> bool {
        self.front().sector.is_some() && self.back().sector.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_flip() {
        assert_eq!(SideId::Front.flip(), SideId::Back);
        assert_eq!(SideId::Back.flip().index(), 0);
    }

    #[test]
    fn test_sidedness() {
        let one = Line::new(0, 1, LineSide::with_sections(0, SideDef::new()), LineSide::void());
        assert!(!one.is_two_sided());
        assert!(!one.back().has_sections());

        let window = Line::new(0, 1, LineSide::with_sections(0, SideDef::new()), LineSide::new(Some(1), None));
        assert!(window.is_two_sided());
        assert!(!window.back().has_sections());
    }
}
