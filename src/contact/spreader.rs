// src/contact/spreader.rs
//! Flood propagation of contacts across open subspace edges.
//!
//! Starting from the subspace containing a contact's origin, the spreader
//! walks shared half-edges and links the contact into every neighbour it can
//! reach. An edge is crossed only when the neighbour's box overlaps the
//! contact's reach, the origin is closer to the edge than the radius, the
//! two subsectors share open vertical space, and no one-way window or
//! covering middle surface stands on the line.

use std::ops::{AddAssign, ControlFlow};

use log::trace;
use serde::Serialize;

use crate::contact::{Contact, ContactBlockmap, PassCounter, PassId, SpreadState};
use crate::error::{Error, Result};
use crate::map::{HalfEdgeId, Map, PlaneKind, SideDef, SkyFix, SubsectorId, SubspaceId};
use crate::utils::util::span_overlap;
use crate::utils::BoundingBox;

/// Work counters for one or more spreads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpreadStats {
    pub contacts_spread: usize,
    pub subspaces_entered: usize,
    pub edges_evaluated: usize,
    pub cells_processed: usize,
}

impl AddAssign for SpreadStats {
    fn add_assign(&mut self, other: SpreadStats) {
        self.contacts_spread += other.contacts_spread;
        self.subspaces_entered += other.subspaces_entered;
        self.edges_evaluated += other.edges_evaluated;
        self.cells_processed += other.cells_processed;
    }
}

/// Smoothed plane heights of the two subsectors either side of an edge.
#[derive(Debug, Clone, Copy)]
struct Heights {
    front_floor: f64,
    front_ceiling: f64,
    back_floor: f64,
    back_ceiling: f64,
}

pub struct ContactSpreader<'a> {
    map: &'a Map,
    sky: &'a dyn SkyFix,
}

impl<'a> ContactSpreader<'a> {
    pub fn new(map: &'a Map, sky: &'a dyn SkyFix) -> Self {
        ContactSpreader { map, sky }
    }

    /// Spreads every contact linked in the cells overlapped by `region`.
    /// Cells already marked processed are skipped; each contact gets its
    /// own pass.
    pub fn spread_contacts(
        &self,
        state: &mut SpreadState,
        contacts: &[Contact],
        blockmap: &mut ContactBlockmap,
        region: &BoundingBox,
        passes: &mut PassCounter,
    ) -> Result<SpreadStats> {
        if self.map.bsp().is_none() {
            return Err(Error::MissingBsp);
        }
        let mut stats = SpreadStats::default();
        let Some(cells) = blockmap.cell_box(region) else {
            return Ok(stats);
        };

        for cell in cells.cells() {
            if !blockmap.mark_processed(cell) {
                continue;
            }
            stats.cells_processed += 1;
            let flow = blockmap.for_all_in_cell(cell, |&id| {
                let Some(contact) = contacts.get(id) else {
                    return ControlFlow::Continue(());
                };
                match self.spread_contact(state, contact, passes.next()) {
                    Ok(s) => {
                        stats += s;
                        ControlFlow::Continue(())
                    }
                    Err(e) => ControlFlow::Break(e),
                }
            });
            if let ControlFlow::Break(e) = flow {
                return Err(e);
            }
        }
        Ok(stats)
    }

    /// Floods one contact outward from the subspace containing its origin.
    pub fn spread_contact(&self, state: &mut SpreadState, contact: &Contact, pass: PassId) -> Result<SpreadStats> {
        let start = self.map.locate(&contact.origin)?;
        let reach = contact.bbox();

        let mut stats = SpreadStats {
            contacts_spread: 1,
            subspaces_entered: 1,
            ..SpreadStats::default()
        };
        state.mark(start, pass);
        state.link(contact, start);

        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            for hedge in self.map.hedge_ids(current) {
                stats.edges_evaluated += 1;
                if let Some(neighbour) = self.spread_over_edge(state, contact, &reach, current, hedge, pass) {
                    state.mark(neighbour, pass);
                    state.link(contact, neighbour);
                    stats.subspaces_entered += 1;
                    stack.push(neighbour);
                }
            }
        }

        trace!(
            "{:?} contact {} from subspace {} reached {} subspaces",
            contact.kind,
            contact.id,
            start,
            stats.subspaces_entered
        );
        Ok(stats)
    }

    /// Returns the subspace across `hedge` if the contact may spread into it.
    fn spread_over_edge(
        &self,
        state: &SpreadState,
        contact: &Contact,
        reach: &BoundingBox,
        current: SubspaceId,
        hedge: HalfEdgeId,
        pass: PassId,
    ) -> Option<SubspaceId> {
        let map = self.map;
        let edge = map.hedge(hedge);
        let back = map.hedge(edge.twin?).face?;
        let back_subsector = map.subspace(back).subsector?;
        let front_subsector = map.subspace(current).subsector?;

        if state.visited(back, pass) {
            return None;
        }
        if !map.subspace(back).bbox.overlaps(reach) {
            return None;
        }

        let line = map.hedge_line(hedge);
        let length = line.length();
        if length == 0.0 {
            return None;
        }
        let distance = line.classify_point(&contact.origin) / length;
        if distance.abs() >= contact.radius {
            return None;
        }

        let h = self.heights(front_subsector, back_subsector);
        if h.back_ceiling <= h.back_floor {
            return None;
        }
        if h.back_ceiling <= h.front_floor || h.back_floor >= h.front_ceiling {
            return None;
        }

        if let Some(side_ref) = edge.line_side {
            let facing = if distance >= 0.0 { side_ref.side } else { side_ref.side.flip() };
            let line = map.line(side_ref.line);
            // One-way window.
            if !line.side(facing.flip()).has_sections() {
                return None;
            }
            if let Some(def) = &line.side(facing).sidedef {
                let (open_bottom, open_top) =
                    span_overlap(h.front_floor, h.back_floor, h.front_ceiling, h.back_ceiling);
                if self.middle_covers_opening(def, open_bottom, open_top) {
                    return None;
                }
            }
        }
        Some(back)
    }

    /// Plane heights for the range test. A plane that is sky-masked on both
    /// sides uses the sky-fix height instead.
    fn heights(&self, front: SubsectorId, back: SubsectorId) -> Heights {
        let height = |kind: PlaneKind| -> (f64, f64) {
            if self.map.is_sky_masked(front, kind) && self.map.is_sky_masked(back, kind) {
                let fixed = self.sky.sky_fix_height(kind);
                (fixed, fixed)
            } else {
                (self.map.visual_height(front, kind), self.map.visual_height(back, kind))
            }
        };
        let (front_floor, back_floor) = height(PlaneKind::Floor);
        let (front_ceiling, back_ceiling) = height(PlaneKind::Ceiling);
        Heights {
            front_floor,
            front_ceiling,
            back_floor,
            back_ceiling,
        }
    }

    /// True when the middle surface of `side` fills `[open_bottom, open_top]`.
    fn middle_covers_opening(&self, side: &SideDef, open_bottom: f64, open_top: f64) -> bool {
        let surface = &side.middle;
        let Some(material) = surface.material.map(|m| self.map.material(m)) else {
            return false;
        };
        if material.sky_masked {
            return false;
        }
        if !material.opaque || !surface.is_solid() {
            return false;
        }
        if side.flags.middle_stretch {
            return true;
        }
        if material.height < open_top - open_bottom {
            return false;
        }

        let (bottom, top) = if side.flags.lower_unpegged {
            let bottom = open_bottom + surface.y_offset;
            (bottom, bottom + material.height)
        } else {
            let top = open_top + surface.y_offset;
            (top - material.height, top)
        };
        top >= open_top && bottom <= open_bottom
    }
}
