// src/lib.rs

pub mod blockmap;
pub mod bsp;
pub mod config;
pub mod contact;
pub mod error;
pub mod map;
pub mod utils;
pub mod world;

pub use config::SpreadConfig;
pub use error::{Error, Result};
pub use world::ContactWorld;
