// src/contact/registry.rs

use log::{trace, warn};
use rayon::prelude::*;

use crate::contact::{Contact, ContactId, ContactKind, LiveObject, ObjectId};
use crate::utils::Point2D;

/// The contacts of the current update window, per kind.
///
/// Ids restart from zero every window; nothing carries over.
#[derive(Debug, Default)]
pub struct ContactRegistry {
    contacts: [Vec<Contact>; ContactKind::COUNT],
}

impl ContactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every contact of `kind`.
    pub fn begin_window(&mut self, kind: ContactKind) {
        self.contacts[kind.index()].clear();
    }

    /// Creates one contact. Objects with a non-finite origin or a negative or
    /// non-finite radius are rejected.
    pub fn add(&mut self, kind: ContactKind, object: ObjectId, origin: Point2D, radius: f64) -> Option<ContactId> {
        if !is_valid(origin, radius) {
            warn!("rejecting {:?} contact for object {}: origin {:?}, radius {}", kind, object, origin, radius);
            return None;
        }
        let list = &mut self.contacts[kind.index()];
        let id = list.len();
        list.push(Contact {
            id,
            kind,
            object,
            origin,
            radius,
        });
        Some(id)
    }

    /// Creates contacts for every live object of `kind`, in input order.
    /// Returns the ids created.
    pub fn populate(&mut self, kind: ContactKind, objects: &[LiveObject]) -> Vec<ContactId> {
        let accepted: Vec<&LiveObject> = objects
            .par_iter()
            .filter(|o| is_valid(o.origin, o.radius))
            .collect();
        let rejected = objects.len() - accepted.len();
        if rejected > 0 {
            warn!("rejected {} invalid {:?} objects", rejected, kind);
        }

        let list = &mut self.contacts[kind.index()];
        let first = list.len();
        list.extend(accepted.into_iter().enumerate().map(|(i, o)| Contact {
            id: first + i,
            kind,
            object: o.id,
            origin: o.origin,
            radius: o.radius,
        }));
        trace!("{} {:?} contacts in window", list.len(), kind);
        (first..list.len()).collect()
    }

    pub fn contacts(&self, kind: ContactKind) -> &[Contact] {
        &self.contacts[kind.index()]
    }

    pub fn contact(&self, kind: ContactKind, id: ContactId) -> Option<&Contact> {
        self.contacts[kind.index()].get(id)
    }

    pub fn len(&self, kind: ContactKind) -> usize {
        self.contacts[kind.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.iter().all(Vec::is_empty)
    }
}

fn is_valid(origin: Point2D, radius: f64) -> bool {
    origin.is_finite() && radius.is_finite() && radius >= 0.0
}
