// src/map/sector.rs

use crate::map::material::MaterialId;

pub type SectorId = usize;

/// Which of a sector's two planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    Floor,
    Ceiling,
}

/// A floor or ceiling plane.
///
/// `height` is the simulation height; `height_smoothed` is the visual height
/// interpolated between simulation tics. Contact spreading only ever looks at
/// the smoothed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    height: f64,
    height_smoothed: f64,
    pub material: Option<MaterialId>,
}

impl Plane {
    pub fn new(height: f64, material: Option<MaterialId>) -> Self {
        Plane {
            height,
            height_smoothed: height,
            material,
        }
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn height_smoothed(&self) -> f64 {
        self.height_smoothed
    }

    /// Moves the plane immediately (no interpolation).
    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        self.height_smoothed = height;
    }

    /// Sets the simulation height and interpolates the visual height from
    /// `previous` by `frac` (0..=1).
    pub fn set_height_interpolated(&mut self, previous: f64, height: f64, frac: f64) {
        self.height = height;
        self.height_smoothed = previous + (height - previous) * frac.clamp(0.0, 1.0);
    }
}

/// A sector: a floor and a ceiling plane shared by every subspace of the
/// sector.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub floor: Plane,
    pub ceiling: Plane,
}

impl Sector {
    /// Creates a new sector with the given plane heights and materials.
    ///
    /// **Example**:
    /// ```
    /// use subspace_contacts::map::Sector;
    /// let s = Sector::new(0.0, 128.0, None, None);
    /// assert_eq!(s.headroom(), 128.0);
    /// ```
    pub fn new(
        floor_height: f64,
        ceiling_height: f64,
        floor_material: Option<MaterialId>,
        ceiling_material: Option<MaterialId>,
    ) -> Self {
        Sector {
            floor: Plane::new(floor_height, floor_material),
            ceiling: Plane::new(ceiling_height, ceiling_material),
        }
    }

    pub fn plane(&self, kind: PlaneKind) -> &Plane {
        match kind {
            PlaneKind::Floor => &self.floor,
            PlaneKind::Ceiling => &self.ceiling,
        }
    }

    pub fn plane_mut(&mut self, kind: PlaneKind) -> &mut Plane {
        match kind {
            PlaneKind::Floor => &mut self.floor,
            PlaneKind::Ceiling => &mut self.ceiling,
        }
    }

    /// Returns the difference between the smoothed ceiling and floor heights.
    pub fn headroom(&self) -> f64 {
        self.ceiling.height_smoothed() - self.floor.height_smoothed()
    }
}

/// Supplies the logical height of sky-masked planes.
///
/// When two neighbouring sectors both use a sky material on the same plane,
/// their physical plane heights are meaningless for visibility; the sky
/// collaborator decides the height to compare instead.
pub trait SkyFix {
    fn sky_fix_height(&self, plane: PlaneKind) -> f64;
}

/// Fixed sky heights, one per plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyHeights {
    pub floor: f64,
    pub ceiling: f64,
}

impl SkyFix for SkyHeights {
    fn sky_fix_height(&self, plane: PlaneKind) -> f64 {
        match plane {
            PlaneKind::Floor => self.floor,
            PlaneKind::Ceiling => self.ceiling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolated_height() {
        let mut plane = Plane::new(0.0, None);
        plane.set_height_interpolated(0.0, 64.0, 0.25);
        assert_eq!(plane.height(), 64.0);
        assert_eq!(plane.height_smoothed(), 16.0);
        plane.set_height(8.0);
        assert_eq!(plane.height_smoothed(), 8.0);
    }

    #[test]
    fn test_headroom_follows_planes() {
        let mut sector = Sector::new(0.0, 128.0, None, None);
        assert_eq!(sector.headroom(), 128.0);
        sector.plane_mut(PlaneKind::Ceiling).set_height(0.0);
        assert_eq!(sector.headroom(), 0.0);
    }

    #[test]
    fn test_sky_heights() {
        let sky = SkyHeights { floor: -64.0, ceiling: 512.0 };
        assert_eq!(sky.sky_fix_height(PlaneKind::Ceiling), 512.0);
        assert_eq!(sky.sky_fix_height(PlaneKind::Floor), -64.0);
    }
}
