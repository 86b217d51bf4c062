#![warn(non_snake_case)]
//! # spread_demo
//!
//! Generates a random room grid, scatters map objects and light sources over
//! it and runs a few contact frames, logging the spread statistics of each.
//!
//! Usage: `spread_demo [config.json]`. Set `RUST_LOG=debug` for build
//! summaries or `RUST_LOG=trace` for every spread.
//!
//! ## License
//! Licensed under the MIT License.

use std::env;
use std::error::Error;

use log::info;
use rand::Rng;

use subspace_contacts::contact::{ContactKind, LiveObject};
use subspace_contacts::map::generator::{GeneratorConfig, ProceduralGenerator};
use subspace_contacts::utils::BoundingBox;
use subspace_contacts::{ContactWorld, SpreadConfig};

const FRAMES: usize = 4;
const MOBJ_COUNT: u32 = 200;
const LUMOBJ_COUNT: u32 = 40;

fn scatter<R: Rng>(rng: &mut R, bounds: &BoundingBox, count: u32, max_radius: f64) -> Vec<LiveObject> {
    (0..count)
        .map(|id| {
            LiveObject::new(
                id,
                rng.random_range(bounds.min_x..bounds.max_x),
                rng.random_range(bounds.min_y..bounds.max_y),
                rng.random_range(0.0..=max_radius),
            )
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => SpreadConfig::load(&path)?,
        None => SpreadConfig::default(),
    };
    info!("spread_demo starting with {}", config.to_json()?);

    let mut rng = rand::rng();
    let builder = ProceduralGenerator::new(GeneratorConfig::default(), &mut rng)?.generate();
    let mut world = ContactWorld::new(config.clone());
    world.build_map(builder)?;

    let bounds = match world.map() {
        Some(map) => *map.read().bounds(),
        None => return Ok(()),
    };
    // A view over the lower-left quarter of the map.
    let view = BoundingBox::new(
        bounds.min_x,
        bounds.min_y,
        bounds.min_x + bounds.width() / 2.0,
        bounds.min_y + bounds.height() / 2.0,
    );

    for frame in 0..FRAMES {
        let mobjs = scatter(&mut rng, &bounds, MOBJ_COUNT, config.mobj_radius_max);
        let lumobjs = scatter(&mut rng, &bounds, LUMOBJ_COUNT, config.lumobj_radius_max);
        let stats = world.begin_frame(&mobjs, &lumobjs, &view)?;
        info!("frame {}: {}", frame, serde_json::to_string(stats)?);
    }

    let widest = world
        .contacts(ContactKind::Lumobj)
        .iter()
        .map(|c| (c.object, world.touched_subspaces(ContactKind::Lumobj, c.id).len()))
        .max_by_key(|&(_, touched)| touched);
    if let Some((object, touched)) = widest {
        info!("light {} reaches {} subspaces", object, touched);
    }

    info!("spread_demo exiting.");
    Ok(())
}
