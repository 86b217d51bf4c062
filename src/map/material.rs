// src/map/material.rs

pub type MaterialId = usize;

/// The subset of material state the contact spreader cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Texture name, up to 8 chars in classic DOOM (uppercased).
    pub name: String,
    pub width: f64,
    pub height: f64,
    /// Every texel is fully opaque.
    pub opaque: bool,
    /// Drawn as sky; planes using it take the sky-fix height.
    pub sky_masked: bool,
}

impl Material {
    /// Creates an opaque, non-sky material.
    pub fn new(name: &str, width: f64, height: f64) -> Self {
        Material {
            name: name.to_uppercase(),
            width,
            height,
            opaque: true,
            sky_masked: false,
        }
    }

    /// Creates a sky material (e.g. `F_SKY1`).
    pub fn sky(name: &str) -> Self {
        Material {
            sky_masked: true,
            ..Material::new(name, 64.0, 64.0)
        }
    }

    pub fn translucent(mut self) -> Self {
        self.opaque = false;
        self
    }
}
