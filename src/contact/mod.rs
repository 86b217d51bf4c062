// src/contact/mod.rs
//! Contacts: per-window records of dynamic objects (map objects and light
//! sources) and the per-subspace lists they are spread into.

pub mod registry;
pub mod spreader;

pub use registry::ContactRegistry;
pub use spreader::{ContactSpreader, SpreadStats};

use serde::Serialize;

use crate::blockmap::Blockmap;
use crate::error::Result;
use crate::map::SubspaceId;
use crate::utils::{BoundingBox, Point2D};

/// The two kinds of contact, each with its own lists and blockmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContactKind {
    /// A moving map object.
    Mobj,
    /// A luminous object (dynamic light).
    Lumobj,
}

impl ContactKind {
    pub const COUNT: usize = 2;
    pub const ALL: [ContactKind; 2] = [ContactKind::Mobj, ContactKind::Lumobj];

    pub fn index(self) -> usize {
        match self {
            ContactKind::Mobj => 0,
            ContactKind::Lumobj => 1,
        }
    }
}

/// Index of a contact within its kind for the current window.
pub type ContactId = usize;

/// External identifier of the object a contact wraps.
pub type ObjectId = u32;

/// A dynamic object placed for one update window. Never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub kind: ContactKind,
    pub object: ObjectId,
    pub origin: Point2D,
    pub radius: f64,
}

impl Contact {
    /// The radius-expanded box around the origin.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::around(&self.origin, self.radius)
    }
}

/// A live object as reported by the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveObject {
    pub id: ObjectId,
    pub origin: Point2D,
    pub radius: f64,
}

impl LiveObject {
    pub fn new(id: ObjectId, x: f64, y: f64, radius: f64) -> Self {
        LiveObject {
            id,
            origin: Point2D::new(x, y),
            radius,
        }
    }
}

/// Identifies one spread pass; a subspace is visited in a pass when its
/// `last_pass` equals the pass id.
pub type PassId = u64;

/// Hands out pass ids. Zero is never issued, so fresh state reads as
/// unvisited.
#[derive(Debug, Default)]
pub struct PassCounter {
    current: PassId,
}

impl PassCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> PassId {
        self.current = self.current.wrapping_add(1).max(1);
        self.current
    }

    pub fn current(&self) -> PassId {
        self.current
    }
}

/// Per-subspace spread state: the visited token and one contact list per
/// kind.
#[derive(Debug, Clone, Default)]
pub struct SubspaceLinks {
    pub last_pass: PassId,
    contacts: [Vec<ContactId>; ContactKind::COUNT],
}

impl SubspaceLinks {
    pub fn contacts(&self, kind: ContactKind) -> &[ContactId] {
        &self.contacts[kind.index()]
    }
}

/// Mutable state written by spreading, kept apart from the shared map.
#[derive(Debug, Clone, Default)]
pub struct SpreadState {
    links: Vec<SubspaceLinks>,
    /// Per kind, per contact: every subspace the contact was linked into.
    touched: [Vec<Vec<SubspaceId>>; ContactKind::COUNT],
}

impl SpreadState {
    pub fn new(subspace_count: usize) -> Self {
        SpreadState {
            links: vec![SubspaceLinks::default(); subspace_count],
            touched: Default::default(),
        }
    }

    pub fn subspace_count(&self) -> usize {
        self.links.len()
    }

    /// Empties every list of `kind`. Visited tokens are left alone; new
    /// passes make them stale.
    pub fn clear_kind(&mut self, kind: ContactKind) {
        for links in &mut self.links {
            links.contacts[kind.index()].clear();
        }
        self.touched[kind.index()].clear();
    }

    pub fn visited(&self, subspace: SubspaceId, pass: PassId) -> bool {
        self.links[subspace].last_pass == pass
    }

    pub fn mark(&mut self, subspace: SubspaceId, pass: PassId) {
        self.links[subspace].last_pass = pass;
    }

    /// Records that `contact` reaches `subspace`.
    pub fn link(&mut self, contact: &Contact, subspace: SubspaceId) {
        let k = contact.kind.index();
        self.links[subspace].contacts[k].push(contact.id);
        let touched = &mut self.touched[k];
        if touched.len() <= contact.id {
            touched.resize_with(contact.id + 1, Vec::new);
        }
        touched[contact.id].push(subspace);
    }

    pub fn contacts(&self, subspace: SubspaceId, kind: ContactKind) -> &[ContactId] {
        self.links
            .get(subspace)
            .map_or(&[][..], |links| links.contacts(kind))
    }

    pub fn touched(&self, kind: ContactKind, contact: ContactId) -> &[SubspaceId] {
        self.touched[kind.index()]
            .get(contact)
            .map_or(&[][..], Vec::as_slice)
    }
}

/// Contacts linked by origin cell, paired with a processed-cells bitmap.
pub type ContactBlockmap = Blockmap<ContactId>;

/// A contact blockmap covering `bounds`.
pub fn contact_blockmap(bounds: BoundingBox, cell_size: f64) -> Result<ContactBlockmap> {
    Ok(Blockmap::new(bounds, cell_size)?.with_processed_cells())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_counter_never_issues_zero() {
        let mut passes = PassCounter { current: u64::MAX };
        assert_eq!(passes.next(), 1);
        assert_eq!(passes.next(), 2);
    }

    #[test]
    fn test_state_links_and_clears() {
        let mut state = SpreadState::new(3);
        let contact = Contact {
            id: 0,
            kind: ContactKind::Lumobj,
            object: 7,
            origin: Point2D::new(0.0, 0.0),
            radius: 10.0,
        };
        state.link(&contact, 2);
        state.link(&contact, 1);
        assert_eq!(state.contacts(2, ContactKind::Lumobj), &[0]);
        assert!(state.contacts(2, ContactKind::Mobj).is_empty());
        assert_eq!(state.touched(ContactKind::Lumobj, 0), &[2, 1]);

        state.mark(1, 5);
        assert!(state.visited(1, 5));
        assert!(!state.visited(1, 6));

        state.clear_kind(ContactKind::Lumobj);
        assert!(state.contacts(2, ContactKind::Lumobj).is_empty());
        assert!(state.touched(ContactKind::Lumobj, 0).is_empty());
        assert!(state.contacts(99, ContactKind::Mobj).is_empty());
    }
}
