// src/map/sidedef.rs

use crate::map::material::MaterialId;

/// How a surface is composited when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Subtractive,
}

/// One wall section (top, middle or bottom) of a sidedef.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub material: Option<MaterialId>,
    /// Vertical texture offset; positive values raise the texture.
    pub y_offset: f64,
    /// 0.0 (invisible) ..= 1.0 (solid).
    pub opacity: f32,
    pub blend: BlendMode,
}

impl Surface {
    pub fn empty() -> Self {
        Surface {
            material: None,
            y_offset: 0.0,
            opacity: 1.0,
            blend: BlendMode::Normal,
        }
    }

    pub fn with_material(material: MaterialId) -> Self {
        Surface {
            material: Some(material),
            ..Surface::empty()
        }
    }

    /// Fully opaque and drawn without blending.
    pub fn is_solid(&self) -> bool {
        self.opacity >= 1.0 && self.blend == BlendMode::Normal
    }
}

impl Default for Surface {
    fn default() -> Self {
        Surface::empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideFlags {
    /// The middle material is stretched to fill the whole opening.
    pub middle_stretch: bool,
    /// The middle material hangs from the bottom of the opening instead of
    /// the top.
    pub lower_unpegged: bool,
}

/// The wall sections of one side of a line.
///
/// A line side without a sidedef has no sections at all; light and objects
/// never spread through such a "one-way window" from the other side.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SideDef {
    pub top: Surface,
    pub middle: Surface,
    pub bottom: Surface,
    pub flags: SideFlags,
}

impl SideDef {
    /// A sidedef with empty sections, as used on open two-sided lines.
    pub fn new() -> Self {
        SideDef::default()
    }

    /// Sets common defaults for a newly created sidedef.
    ///
    /// For one-sided lines the middle section carries `default_material`;
    /// for two-sided lines the upper and lower sections do and the middle is
    /// left empty.
    pub fn with_defaults(default_material: MaterialId, is_two_sided: bool) -> Self {
        if is_two_sided {
            SideDef {
                top: Surface::with_material(default_material),
                bottom: Surface::with_material(default_material),
                ..SideDef::default()
            }
        } else {
            SideDef {
                middle: Surface::with_material(default_material),
                ..SideDef::default()
            }
        }
    }

    pub fn with_middle(mut self, middle: Surface) -> Self {
        self.middle = middle;
        self
    }

    pub fn with_flags(mut self, flags: SideFlags) -> Self {
        self.flags = flags;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_by_sidedness() {
        let one = SideDef::with_defaults(3, false);
        assert_eq!(one.middle.material, Some(3));
        assert_eq!(one.top.material, None);

        let two = SideDef::with_defaults(3, true);
        assert_eq!(two.middle.material, None);
        assert_eq!(two.top.material, Some(3));
        assert_eq!(two.bottom.material, Some(3));
    }

    #[test]
    fn test_surface_solidity() {
        let mut surface = Surface::with_material(0);
        assert!(surface.is_solid());
        surface.opacity = 0.5;
        assert!(!surface.is_solid());
        surface.opacity = 1.0;
        surface.blend = BlendMode::Additive;
        assert!(!surface.is_solid());
    }
}
