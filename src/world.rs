// src/world.rs
//! Per-frame glue: owns the shared map, the contact registry, the per-kind
//! contact blockmaps and the spread state, and runs one update window per
//! call to [`ContactWorld::begin_frame`].

use std::ops::ControlFlow;
use std::sync::Arc;

use log::{debug, error};
use parking_lot::RwLock;
use serde::Serialize;

use crate::config::SpreadConfig;
use crate::contact::{
    contact_blockmap, Contact, ContactBlockmap, ContactId, ContactKind, ContactRegistry, ContactSpreader, LiveObject,
    PassCounter, SpreadState, SpreadStats,
};
use crate::error::{Error, Result};
use crate::map::{Map, MapBuilder, SkyFix, SkyHeights, SubspaceId};
use crate::utils::BoundingBox;

/// Spread statistics of the last frame, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub mobj: SpreadStats,
    pub lumobj: SpreadStats,
}

impl FrameStats {
    pub fn get(&self, kind: ContactKind) -> &SpreadStats {
        match kind {
            ContactKind::Mobj => &self.mobj,
            ContactKind::Lumobj => &self.lumobj,
        }
    }

    fn get_mut(&mut self, kind: ContactKind) -> &mut SpreadStats {
        match kind {
            ContactKind::Mobj => &mut self.mobj,
            ContactKind::Lumobj => &mut self.lumobj,
        }
    }
}

pub struct ContactWorld {
    config: SpreadConfig,
    map: Option<Arc<RwLock<Map>>>,
    /// Overrides the sky heights derived from the map.
    sky: Option<Box<dyn SkyFix + Send + Sync>>,
    map_sky: SkyHeights,
    registry: ContactRegistry,
    blockmaps: Option<[ContactBlockmap; ContactKind::COUNT]>,
    state: SpreadState,
    passes: PassCounter,
    stats: FrameStats,
}

impl ContactWorld {
    pub fn new(config: SpreadConfig) -> Self {
        ContactWorld {
            config,
            map: None,
            sky: None,
            map_sky: SkyHeights { floor: 0.0, ceiling: 0.0 },
            registry: ContactRegistry::new(),
            blockmaps: None,
            state: SpreadState::default(),
            passes: PassCounter::new(),
            stats: FrameStats::default(),
        }
    }

    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Builds `builder` with this world's configuration and loads the result.
    pub fn build_map(&mut self, builder: MapBuilder) -> Result<()> {
        let map = builder.with_config(&self.config).build()?;
        self.load_map(map)
    }

    /// Takes ownership of a built map and allocates the per-map state.
    pub fn load_map(&mut self, map: Map) -> Result<()> {
        let bounds = *map.bounds();
        let blockmaps = [
            contact_blockmap(bounds, self.config.cell_size)?,
            contact_blockmap(bounds, self.config.cell_size)?,
        ];
        self.state = SpreadState::new(map.subspace_count());
        self.map_sky = map.sky_heights();
        self.blockmaps = Some(blockmaps);
        self.stats = FrameStats::default();
        debug!(
            "contact world loaded map with {} subspaces ({} BSP)",
            map.subspace_count(),
            if map.bsp().is_some() { "with" } else { "without" }
        );
        self.map = Some(Arc::new(RwLock::new(map)));
        Ok(())
    }

    pub fn unload_map(&mut self) {
        self.map = None;
        self.blockmaps = None;
        self.state = SpreadState::default();
        for kind in ContactKind::ALL {
            self.registry.begin_window(kind);
        }
        self.stats = FrameStats::default();
    }

    /// Shared handle to the loaded map, e.g. for moving planes between frames.
    pub fn map(&self) -> Option<Arc<RwLock<Map>>> {
        self.map.clone()
    }

    pub fn set_sky_fix(&mut self, sky: Box<dyn SkyFix + Send + Sync>) {
        self.sky = Some(sky);
    }

    /// Runs one update window: recreates the contacts of both kinds, links
    /// them by origin cell and spreads every contact whose cell touches
    /// `view` expanded by the kind's maximum radius.
    pub fn begin_frame(&mut self, mobjs: &[LiveObject], lumobjs: &[LiveObject], view: &BoundingBox) -> Result<&FrameStats> {
        if let Err(e) = self.run_frame(mobjs, lumobjs, view) {
            error!("contact frame aborted: {}", e);
            return Err(e);
        }
        Ok(&self.stats)
    }

    fn run_frame(&mut self, mobjs: &[LiveObject], lumobjs: &[LiveObject], view: &BoundingBox) -> Result<()> {
        let ContactWorld {
            config,
            map,
            sky,
            map_sky,
            registry,
            blockmaps,
            state,
            passes,
            stats,
        } = self;

        let handle = map.as_ref().ok_or(Error::GridUninitialized)?;
        let blockmaps = blockmaps.as_mut().ok_or(Error::GridUninitialized)?;
        let map = handle.read();
        let sky: &dyn SkyFix = match sky {
            Some(custom) => &**custom,
            None => &*map_sky,
        };
        let spreader = ContactSpreader::new(&map, sky);

        *stats = FrameStats::default();
        for (kind, objects) in [(ContactKind::Mobj, mobjs), (ContactKind::Lumobj, lumobjs)] {
            registry.begin_window(kind);
            state.clear_kind(kind);
            let blockmap = &mut blockmaps[kind.index()];
            blockmap.clear();

            registry.populate(kind, objects);
            for contact in registry.contacts(kind) {
                blockmap.link_point(&contact.origin, contact.id);
            }

            let region = view.expanded(config.max_radius(kind));
            *stats.get_mut(kind) = spreader.spread_contacts(state, registry.contacts(kind), blockmap, &region, passes)?;
        }
        Ok(())
    }

    /// Contacts of `kind` linked into `subspace` this frame.
    pub fn contacts_in(&self, subspace: SubspaceId, kind: ContactKind) -> &[ContactId] {
        self.state.contacts(subspace, kind)
    }

    /// Visits the contacts of `kind` in `subspace` until the visitor breaks.
    pub fn for_all_contacts<B, F>(&self, subspace: SubspaceId, kind: ContactKind, mut visitor: F) -> ControlFlow<B>
    where
        F: FnMut(&Contact) -> ControlFlow<B>,
    {
        for &id in self.contacts_in(subspace, kind) {
            if let Some(contact) = self.registry.contact(kind, id) {
                visitor(contact)?;
            }
        }
        ControlFlow::Continue(())
    }

    pub fn contact(&self, kind: ContactKind, id: ContactId) -> Option<&Contact> {
        self.registry.contact(kind, id)
    }

    pub fn contacts(&self, kind: ContactKind) -> &[Contact] {
        self.registry.contacts(kind)
    }

    /// Every subspace the contact reached this frame.
    pub fn touched_subspaces(&self, kind: ContactKind, id: ContactId) -> &[SubspaceId] {
        self.state.touched(kind, id)
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}
